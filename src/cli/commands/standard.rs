//! `pqc standard` command - per-machine tolerance standards
//!
//! Bands are given as `NOMINAL:PLUS:MINUS`, or `NOMINAL:TOL` for a
//! symmetric band, e.g. `--weight 100:2:3` accepts 97 to 102 grams.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::confirm;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{Context, GlobalOpts, OutputFormat};
use crate::core::catalog::{self, StandardForm};
use crate::core::identity::ProductId;
use crate::core::tolerance::{Dimension, ToleranceBand};
use crate::entities::product::Product;
use crate::entities::standard::ProductStandard;

#[derive(Subcommand, Debug)]
pub enum StandardCommands {
    /// List the standards of a product
    List(ProductArg),

    /// Show one standard
    Show(TargetArgs),

    /// Define a standard for a machine (admin)
    New(NewArgs),

    /// Change a standard (admin); existing records are re-graded
    Edit(EditArgs),

    /// Delete a standard with its records (admin)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ProductArg {
    /// Product number or numeric id
    #[arg(long, short = 'p')]
    pub product: String,
}

#[derive(clap::Args, Debug)]
pub struct TargetArgs {
    #[command(flatten)]
    pub product: ProductArg,

    /// Standard id or machine number
    pub standard: String,
}

#[derive(clap::Args, Debug)]
pub struct BandArgs {
    /// Weight in grams, NOMINAL:PLUS:MINUS
    #[arg(long, value_parser = parse_band)]
    pub weight: Option<ToleranceBand>,

    /// Height reference, NOMINAL:PLUS:MINUS (judged pass/fail at entry)
    #[arg(long, value_parser = parse_band)]
    pub height: Option<ToleranceBand>,

    /// Rim thickness in mm, NOMINAL:PLUS:MINUS
    #[arg(long, value_parser = parse_band)]
    pub rim: Option<ToleranceBand>,

    /// Load in NM, NOMINAL:PLUS:MINUS
    #[arg(long, value_parser = parse_band)]
    pub load: Option<ToleranceBand>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub product: ProductArg,

    /// Machine number
    #[arg(long, short = 'm')]
    pub machine: String,

    /// Items measured per record (default from config, else 18)
    #[arg(long)]
    pub quantity: Option<u32>,

    #[command(flatten)]
    pub bands: BandArgs,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// New machine number
    #[arg(long, short = 'm')]
    pub machine: Option<String>,

    /// Items measured per record
    #[arg(long)]
    pub quantity: Option<u32>,

    #[command(flatten)]
    pub bands: BandArgs,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Parse `NOMINAL:PLUS:MINUS` or `NOMINAL:TOL`
pub fn parse_band(s: &str) -> Result<ToleranceBand, String> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    let number = |p: &str| {
        p.trim_start_matches('+')
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", p))
    };
    match parts.as_slice() {
        [nominal, plus, minus] => Ok(ToleranceBand::new(
            number(nominal)?,
            number(plus)?,
            number(minus.trim_start_matches('-'))?,
        )),
        [nominal, tol] => {
            let tol = number(tol)?;
            Ok(ToleranceBand::new(number(nominal)?, tol, tol))
        }
        _ => Err("expected NOMINAL:PLUS:MINUS or NOMINAL:TOL".to_string()),
    }
}

const STANDARD_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("machine", "MACHINE", 14),
    ColumnDef::new("quantity", "QTY", 5),
    ColumnDef::new("weight", "WEIGHT (g)", 24),
    ColumnDef::new("rim", "RIM (mm)", 24),
    ColumnDef::new("load", "LOAD (NM)", 24),
];

pub fn run(cmd: StandardCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        StandardCommands::List(args) => run_list(args, global),
        StandardCommands::Show(args) => run_show(args, global),
        StandardCommands::New(args) => run_new(args, global),
        StandardCommands::Edit(args) => run_edit(args, global),
        StandardCommands::Delete(args) => run_delete(args, global),
    }
}

fn saved_product(ctx: &Context, key: &str) -> Result<(Product, ProductId)> {
    let product = catalog::find_product(&ctx.store, key)?;
    let id = product
        .id
        .ok_or_else(|| miette::miette!("product '{}' has not been saved", key))?;
    Ok((product, id))
}

fn standard_row(standard: &ProductStandard) -> TableRow {
    let id = standard.id.map_or(0, |id| id.get());
    TableRow::new(id)
        .cell("id", CellValue::Id(id))
        .cell("machine", CellValue::Text(standard.machine_number.clone()))
        .cell("quantity", CellValue::Number(i64::from(standard.quantity_per_cycle)))
        .cell("weight", CellValue::Text(standard.weight.to_string()))
        .cell("rim", CellValue::Text(standard.rim_thickness.to_string()))
        .cell("load", CellValue::Text(standard.load.to_string()))
}

fn run_list(args: ProductArg, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.session.require_user()?;
    let (product, id) = saved_product(&ctx, &args.product)?;
    let standards = catalog::list_standards(&ctx.store, &ctx.session, id)?;

    let format = match ctx.format(global) {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };
    if standards.is_empty() && format == OutputFormat::Tsv {
        println!("No standards defined for {}.", product.product_number);
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&standards).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&standards).into_diagnostic()?);
        }
        _ => {
            TableFormatter::new(STANDARD_COLUMNS, "standard")
                .output(standards.iter().map(standard_row), format);
        }
    }
    Ok(())
}

fn run_show(args: TargetArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.session.require_user()?;
    let (product, _) = saved_product(&ctx, &args.product.product)?;
    let standard = catalog::find_standard(&ctx.store, &product, &args.standard)?;

    match ctx.format(global) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&standard).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&standard).into_diagnostic()?);
        }
        OutputFormat::Id => {
            println!("{}", standard.id.map_or(0, |id| id.get()));
        }
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} ({})",
                style("Product").bold(),
                style(&product.product_number).cyan(),
                product.name
            );
            println!(
                "{}: {}",
                style("Machine").bold(),
                style(&standard.machine_number).cyan()
            );
            println!(
                "{}: {}",
                style("Quantity per cycle").bold(),
                standard.quantity_per_cycle
            );
            println!("{}", style("─".repeat(60)).dim());
            for (dimension, band) in [
                (Dimension::Weight, &standard.weight),
                (Dimension::Height, &standard.height),
                (Dimension::RimThickness, &standard.rim_thickness),
                (Dimension::Load, &standard.load),
            ] {
                let unit = dimension.unit().map(|u| format!(" {}", u)).unwrap_or_default();
                println!(
                    "{:<14} {:>8}{}  +{} / -{}  [{} .. {}]",
                    style(dimension.label()).bold(),
                    band.nominal,
                    unit,
                    band.plus,
                    band.minus,
                    band.lower(),
                    band.upper()
                );
            }
        }
    }
    Ok(())
}

fn apply_bands(form: &mut StandardForm, bands: BandArgs) {
    if let Some(b) = bands.weight {
        form.weight = b;
    }
    if let Some(b) = bands.height {
        form.height = b;
    }
    if let Some(b) = bands.rim {
        form.rim_thickness = b;
    }
    if let Some(b) = bands.load {
        form.load = b;
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let (product, product_id) = saved_product(&ctx, &args.product.product)?;

    let mut form = StandardForm {
        machine_number: args.machine,
        quantity_per_cycle: args
            .quantity
            .unwrap_or_else(|| ctx.config.default_quantity()),
        ..StandardForm::default()
    };
    apply_bands(&mut form, args.bands);

    let id = catalog::create_standard(&ctx.store, &ctx.session, product_id, &form)?;
    if matches!(global.format, OutputFormat::Id) {
        println!("{}", id);
    } else if !global.quiet {
        println!(
            "{} Created standard {} for {} on machine {}",
            style("✓").green(),
            style(id).cyan(),
            style(&product.product_number).cyan(),
            form.machine_number.trim()
        );
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.session.require_admin()?;
    let (product, _) = saved_product(&ctx, &args.target.product.product)?;
    let current = catalog::find_standard(&ctx.store, &product, &args.target.standard)?;
    let id = current
        .id
        .ok_or_else(|| miette::miette!("standard '{}' has not been saved", args.target.standard))?;

    let mut form = StandardForm::from_standard(&current);
    if let Some(machine) = args.machine {
        form.machine_number = machine;
    }
    if let Some(quantity) = args.quantity {
        form.quantity_per_cycle = quantity;
    }
    apply_bands(&mut form, args.bands);

    let updated = catalog::update_standard(&ctx.store, &ctx.session, id, &form)?;
    if !global.quiet {
        println!(
            "{} Updated standard {} (machine {})",
            style("✓").green(),
            style(id).cyan(),
            updated.machine_number
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.session.require_admin()?;
    let (product, _) = saved_product(&ctx, &args.target.product.product)?;
    let standard = catalog::find_standard(&ctx.store, &product, &args.target.standard)?;
    let id = standard
        .id
        .ok_or_else(|| miette::miette!("standard '{}' has not been saved", args.target.standard))?;

    let prompt = format!(
        "Delete the {} standard for machine {} and all records taken against it?",
        product.product_number, standard.machine_number
    );
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    catalog::delete_standard(&ctx.store, &ctx.session, id)?;
    if !global.quiet {
        println!(
            "{} Deleted standard {} (machine {})",
            style("✓").green(),
            style(id).cyan(),
            standard.machine_number
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_band_asymmetric() {
        let band = parse_band("100:2:3").unwrap();
        assert_eq!(band, ToleranceBand::new(100.0, 2.0, 3.0));
        let band = parse_band("100:+2:-3").unwrap();
        assert_eq!(band, ToleranceBand::new(100.0, 2.0, 3.0));
    }

    #[test]
    fn test_parse_band_symmetric() {
        let band = parse_band("1.5:0.2").unwrap();
        assert_eq!(band, ToleranceBand::new(1.5, 0.2, 0.2));
    }

    #[test]
    fn test_parse_band_rejects_garbage() {
        assert!(parse_band("100").is_err());
        assert!(parse_band("a:1:1").is_err());
        assert!(parse_band("1:2:3:4").is_err());
    }
}
