//! `pqc product` command - product catalogue

use chrono::Local;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::confirm;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{Context, GlobalOpts, OutputFormat};
use crate::core::catalog::{self, ProductForm};
use crate::entities::product::Product;
use crate::entities::standard::ProductStandard;

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List products
    List(ListArgs),

    /// Show a product and its machine standards
    Show(ShowArgs),

    /// Create a product (admin)
    New(NewArgs),

    /// Rename a product or change its number (admin)
    Edit(EditArgs),

    /// Delete a product with its standards and records (admin)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive match on name or product number
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Show only the count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Product number or numeric id
    pub product: String,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Product name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Unique product number
    #[arg(long = "number", short = 'N')]
    pub product_number: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Product number or numeric id
    pub product: String,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New product number
    #[arg(long = "number", short = 'N')]
    pub product_number: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Product number or numeric id
    pub product: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

const PRODUCT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("number", "NUMBER", 20),
    ColumnDef::new("name", "NAME", 40),
    ColumnDef::new("created", "CREATED", 18),
];

pub fn run(cmd: ProductCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProductCommands::List(args) => run_list(args, global),
        ProductCommands::Show(args) => run_show(args, global),
        ProductCommands::New(args) => run_new(args, global),
        ProductCommands::Edit(args) => run_edit(args, global),
        ProductCommands::Delete(args) => run_delete(args, global),
    }
}

fn product_row(product: &Product) -> TableRow {
    let id = product.id.map_or(0, |id| id.get());
    TableRow::new(id)
        .cell("id", CellValue::Id(id))
        .cell("number", CellValue::Text(product.product_number.clone()))
        .cell("name", CellValue::Text(product.name.clone()))
        .cell(
            "created",
            CellValue::DateTime(product.created_at.with_timezone(&Local).naive_local()),
        )
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let mut products = catalog::list_products(&ctx.store, &ctx.session)?;

    if let Some(search) = args.search.as_deref() {
        let needle = search.to_lowercase();
        products.retain(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.product_number.to_lowercase().contains(&needle)
        });
    }

    if args.count {
        println!("{}", products.len());
        return Ok(());
    }

    let format = match ctx.format(global) {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };
    if products.is_empty() && format == OutputFormat::Tsv {
        println!("No products found.");
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&products).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&products).into_diagnostic()?);
        }
        _ => {
            TableFormatter::new(PRODUCT_COLUMNS, "product")
                .output(products.iter().map(product_row), format);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ProductView<'a> {
    #[serde(flatten)]
    product: &'a Product,
    standards: &'a [ProductStandard],
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.session.require_user()?;

    let product = catalog::find_product(&ctx.store, &args.product)?;
    let standards = match product.id {
        Some(id) => catalog::list_standards(&ctx.store, &ctx.session, id)?,
        None => Vec::new(),
    };
    let view = ProductView {
        product: &product,
        standards: &standards,
    };

    match ctx.format(global) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&view).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&view).into_diagnostic()?);
        }
        OutputFormat::Id => {
            println!("{}", product.id.map_or(0, |id| id.get()));
        }
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("Product").bold(),
                style(&product.product_number).cyan()
            );
            println!("{}: {}", style("Name").bold(), product.name);
            if let Some(creator) = product
                .created_by
                .and_then(|id| ctx.store.get_user(id).ok().flatten())
            {
                println!("{}: {}", style("Created by").bold(), creator.full_name);
            }
            println!(
                "{}: {}",
                style("Created").bold(),
                product.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
            println!("{}", style("─".repeat(60)).dim());

            if standards.is_empty() {
                println!("No machine standards defined.");
            } else {
                println!("{}", style("Machine standards").bold());
                for s in &standards {
                    println!(
                        "  {}  {}  qty {}  weight {}  rim {}  load {}",
                        style(s.id.map_or(0, |id| id.get())).cyan(),
                        s.machine_number,
                        s.quantity_per_cycle,
                        s.weight,
                        s.rim_thickness,
                        s.load
                    );
                }
            }
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let form = ProductForm {
        name: args.name,
        product_number: args.product_number,
    };
    let id = catalog::create_product(&ctx.store, &ctx.session, &form)?;

    if matches!(global.format, OutputFormat::Id) {
        println!("{}", id);
    } else if !global.quiet {
        println!(
            "{} Created product {} {}",
            style("✓").green(),
            style(form.product_number.trim()).cyan(),
            form.name.trim()
        );
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.session.require_admin()?;

    let current = catalog::find_product(&ctx.store, &args.product)?;
    let id = current
        .id
        .ok_or_else(|| miette::miette!("product '{}' has not been saved", current.product_number))?;
    let form = ProductForm {
        name: args.name.unwrap_or_else(|| current.name.clone()),
        product_number: args
            .product_number
            .unwrap_or_else(|| current.product_number.clone()),
    };

    let updated = catalog::update_product(&ctx.store, &ctx.session, id, &form)?;
    if !global.quiet {
        println!(
            "{} Updated product {}",
            style("✓").green(),
            style(&updated.product_number).cyan()
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.session.require_admin()?;

    let product = catalog::find_product(&ctx.store, &args.product)?;
    let id = product
        .id
        .ok_or_else(|| miette::miette!("product '{}' has not been saved", product.product_number))?;

    let prompt = format!(
        "Delete product {} and all of its standards and records?",
        product.product_number
    );
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let deleted = catalog::delete_product(&ctx.store, &ctx.session, id)?;
    if !global.quiet {
        println!(
            "{} Deleted product {}",
            style("✓").green(),
            style(&deleted.product_number).cyan()
        );
    }
    Ok(())
}
