//! `pqc compare` command - out-of-spec rates across records

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::resolve_range;
use crate::cli::table::issue_table;
use crate::cli::{Context, GlobalOpts, OutputFormat};
use crate::core::catalog;
use crate::core::history;

/// Default look-back for comparisons
const COMPARE_DAYS: u64 = 30;

#[derive(clap::Args, Debug)]
pub struct CompareArgs {
    /// Product number or numeric id
    #[arg(long, short = 'p')]
    pub product: String,

    /// Limit to one standard (id or machine number); default all machines
    #[arg(long, short = 's')]
    pub standard: Option<String>,

    /// First day, YYYY-MM-DD (default: 30 days before --to)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub to: Option<String>,
}

pub fn run(args: CompareArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.session.require_admin()?;

    let product = catalog::find_product(&ctx.store, &args.product)?;
    let standard = match args.standard.as_deref() {
        Some(key) => Some(catalog::find_standard(&ctx.store, &product, key)?),
        None => None,
    };
    let range = resolve_range(args.from.as_deref(), args.to.as_deref(), COMPARE_DAYS)?;

    let Some(report) =
        history::compare(&ctx.store, &ctx.session, &product, standard.as_ref(), &range)?
    else {
        println!(
            "No records found for {} in {}.",
            style(&product.product_number).cyan(),
            range.label()
        );
        return Ok(());
    };

    match ctx.format(global) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
        }
        format => {
            if format == OutputFormat::Md {
                println!(
                    "## {} - {}\n\n{}\n",
                    report.product_name, report.standard_label, report.date_range
                );
            } else {
                println!("{}", style("─".repeat(60)).dim());
                println!("{}: {}", style("Product").bold(), report.product_name);
                println!("{}: {}", style("Standard").bold(), report.standard_label);
                println!("{}: {}", style("Period").bold(), report.date_range);
                println!(
                    "{}: {} records, {} items",
                    style("Measured").bold(),
                    style(report.total_records).cyan(),
                    style(report.total_measurements).cyan()
                );
                println!("{}", style("─".repeat(60)).dim());
            }
            println!(
                "{}",
                issue_table(&report.issues, report.total_measurements, format)
            );
        }
    }
    Ok(())
}
