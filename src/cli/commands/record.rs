//! `pqc record` command - production record history (admin)

use std::path::PathBuf;

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::entry::{apply_csv, save_draft};
use crate::cli::helpers::{confirm, parse_datetime, resolve_range};
use crate::cli::table::{issue_table, CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{Context, GlobalOpts, OutputFormat};
use crate::core::catalog;
use crate::core::entry::EntryDraft;
use crate::core::history::{self, RecordDetails, RecordQuery};
use crate::core::identity::RecordId;
use crate::core::summary::{percentage, DimensionIssues, RecordSummary};
use crate::core::tolerance::Dimension;
use crate::export::{export_record, ExportFormat};

/// Default look-back for `record list`
const LIST_DAYS: u64 = 7;

#[derive(Subcommand, Debug)]
pub enum RecordCommands {
    /// List records, newest first (default: the last 7 days)
    List(ListArgs),

    /// Show a record with every item's readings
    Show(IdArg),

    /// Out-of-spec counts for one record
    Summary(IdArg),

    /// Replace readings of a saved record from a CSV file
    Edit(EditArgs),

    /// Delete a record and its measurements
    Delete(DeleteArgs),

    /// Export a record as PDF, Excel or CSV
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only records of this product (number or id)
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// First day, YYYY-MM-DD
    #[arg(long)]
    pub from: Option<String>,

    /// Last day, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub to: Option<String>,

    /// Case-insensitive match on product, machine or creator
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only records with at least one out-of-spec item
    #[arg(long)]
    pub issues: bool,

    /// Show only the count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct IdArg {
    /// Record id
    pub id: RecordId,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Record id
    pub id: RecordId,

    /// CSV file with the corrected rows
    #[arg(long, value_name = "FILE")]
    pub from_csv: PathBuf,

    /// New record date, `YYYY-MM-DD HH:MM`
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Record id
    pub id: RecordId,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Record id
    pub id: RecordId,

    /// Document format
    #[arg(long = "to", short = 't', value_enum, default_value = "pdf")]
    pub to: ExportFormat,

    /// Output file (default: Record_<number>_<date>.<ext> in the export directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

const RECORD_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("date", "DATE", 18),
    ColumnDef::new("product", "PRODUCT", 16),
    ColumnDef::new("machine", "MACHINE", 12),
    ColumnDef::new("by", "BY", 20),
    ColumnDef::new("items", "ITEMS", 6),
    ColumnDef::new("weight", "WT", 4),
    ColumnDef::new("height", "HT", 4),
    ColumnDef::new("rim", "RIM", 5),
    ColumnDef::new("load", "LOAD", 5),
    ColumnDef::new("visual", "VIS", 4),
];

const ITEM_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("item", "ITEM", 6),
    ColumnDef::new("visual", "VISUAL", 8),
    ColumnDef::new("weight", "WEIGHT (g)", 12),
    ColumnDef::new("height", "HEIGHT", 8),
    ColumnDef::new("rim", "RIM (mm)", 10),
    ColumnDef::new("load", "LOAD (NM)", 10),
];

pub fn run(cmd: RecordCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RecordCommands::List(args) => run_list(args, global),
        RecordCommands::Show(args) => run_show(args, global),
        RecordCommands::Summary(args) => run_summary(args, global),
        RecordCommands::Edit(args) => run_edit(args, global),
        RecordCommands::Delete(args) => run_delete(args, global),
        RecordCommands::Export(args) => run_export(args, global),
    }
}

fn summary_row(summary: &RecordSummary) -> TableRow {
    let id = summary.record_id.get();
    let counts = &summary.out_of_spec;
    TableRow::new(id)
        .cell("id", CellValue::Id(id))
        .cell("date", CellValue::DateTime(summary.record_date))
        .cell("product", CellValue::Text(summary.product_number.clone()))
        .cell("machine", CellValue::Text(summary.machine_number.clone()))
        .cell("by", CellValue::Text(summary.created_by.clone()))
        .cell("items", CellValue::Number(summary.total_measurements as i64))
        .cell("weight", CellValue::Issues(counts.weight))
        .cell("height", CellValue::Issues(counts.height))
        .cell("rim", CellValue::Issues(counts.rim_thickness))
        .cell("load", CellValue::Issues(counts.load))
        .cell("visual", CellValue::Issues(counts.visual))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.session.require_admin()?;

    let product = match args.product.as_deref() {
        Some(key) => catalog::find_product(&ctx.store, key)?.id,
        None => None,
    };
    let query = RecordQuery {
        product,
        range: resolve_range(args.from.as_deref(), args.to.as_deref(), LIST_DAYS)?,
        search: args.search,
    };
    let mut summaries = history::list_records(&ctx.store, &ctx.session, &query)?;
    if args.issues {
        summaries.retain(RecordSummary::has_issues);
    }

    if args.count {
        println!("{}", summaries.len());
        return Ok(());
    }

    let format = match ctx.format(global) {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };
    if summaries.is_empty() && format == OutputFormat::Tsv {
        println!("No records found for {}.", query.range.label());
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summaries).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&summaries).into_diagnostic()?);
        }
        _ => {
            TableFormatter::new(RECORD_COLUMNS, "record")
                .output(summaries.iter().map(summary_row), format);
        }
    }
    Ok(())
}

fn print_header(details: &RecordDetails) {
    let h = &details.header;
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {}",
        style("Record").bold(),
        style(h.record_id).cyan()
    );
    println!(
        "{}: {} ({})",
        style("Product").bold(),
        h.product_name,
        style(&h.product_number).cyan()
    );
    println!("{}: {}", style("Machine").bold(), h.machine_number);
    println!(
        "{}: {}",
        style("Date").bold(),
        h.record_date.format("%Y-%m-%d %H:%M")
    );
    println!("{}: {}", style("Recorded by").bold(), h.created_by);
    println!("{}: {}", style("Quantity").bold(), h.quantity_measured);
    println!("{}", style("─".repeat(60)).dim());
}

fn run_show(args: IdArg, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let details = history::record_details(&ctx.store, &ctx.session, args.id)?;

    match ctx.format(global) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&details).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&details).into_diagnostic()?);
        }
        OutputFormat::Id => {
            println!("{}", details.header.record_id);
        }
        format => {
            let table_format = match format {
                OutputFormat::Auto => OutputFormat::Tsv,
                f => f,
            };
            if table_format == OutputFormat::Tsv {
                print_header(&details);
            }
            let rows = details.rows.iter().map(|row| {
                TableRow::new(i64::from(row.item_number))
                    .cell("item", CellValue::Number(i64::from(row.item_number)))
                    .cell("visual", CellValue::Check(row.visual_ok))
                    .cell("weight", CellValue::Reading(row.weight, row.weight_in_spec))
                    .cell("height", CellValue::Check(row.height_ok))
                    .cell(
                        "rim",
                        CellValue::Reading(row.rim_thickness, row.rim_thickness_in_spec),
                    )
                    .cell("load", CellValue::Reading(row.load, row.load_in_spec))
            });
            TableFormatter::new(ITEM_COLUMNS, "item").output(rows, table_format);
        }
    }
    Ok(())
}

fn dimension_issues(summary: &RecordSummary) -> Vec<DimensionIssues> {
    Dimension::all()
        .iter()
        .map(|d| {
            let count = summary.out_of_spec.get(*d);
            DimensionIssues {
                dimension: *d,
                count,
                percent: percentage(count, summary.total_measurements),
            }
        })
        .collect()
}

fn run_summary(args: IdArg, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let summary = history::record_summary(&ctx.store, &ctx.session, args.id)?;

    match ctx.format(global) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&summary).into_diagnostic()?);
        }
        format => {
            if format != OutputFormat::Md {
                println!(
                    "{} {} on {} ({}), {} items",
                    style("Record").bold(),
                    style(summary.record_id).cyan(),
                    summary.machine_number,
                    summary.record_date.format("%Y-%m-%d %H:%M"),
                    summary.total_measurements
                );
            }
            println!(
                "{}",
                issue_table(&dimension_issues(&summary), summary.total_measurements, format)
            );
            if format != OutputFormat::Md {
                if summary.has_issues() {
                    println!("{}", style("Record has out-of-spec items").red());
                } else {
                    println!("{}", style("All items in spec").green());
                }
            }
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let mut draft = EntryDraft::load(&ctx.store, &ctx.session, args.id)?;
    if let Some(date) = args.date.as_deref() {
        draft.set_record_date(parse_datetime(date)?);
    }
    apply_csv(&mut draft, &args.from_csv)?;
    save_draft(&mut ctx, draft, global)
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let summary = history::record_summary(&ctx.store, &ctx.session, args.id)?;

    let prompt = format!(
        "Delete record {} ({} on {}, {})?",
        summary.record_id,
        summary.product_number,
        summary.machine_number,
        summary.record_date.format("%Y-%m-%d %H:%M")
    );
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    history::delete_record(&ctx.store, &ctx.session, args.id)?;
    if !global.quiet {
        println!(
            "{} Deleted record {}",
            style("✓").green(),
            style(args.id).cyan()
        );
    }
    Ok(())
}

fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let details = history::record_details(&ctx.store, &ctx.session, args.id)?;

    let sink = args.to.sink();
    let path = export_record(
        &details,
        sink.as_ref(),
        args.output.as_deref(),
        &ctx.config.export_dir(),
    )?;

    if global.quiet || global.format == OutputFormat::Id {
        println!("{}", path.display());
    } else {
        println!(
            "{} Exported record {} to {}",
            style("✓").green(),
            style(args.id).cyan(),
            style(path.display()).cyan()
        );
    }
    Ok(())
}
