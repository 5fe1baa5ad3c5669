//! `pqc entry` command - record a production run
//!
//! Measurements come from a CSV file or interactive prompts. The CSV needs
//! a header row; recognised columns are `item` (or `item_number`),
//! `weight`, `rim` (or `rim_thickness`), `load`, `visual` and `height`.
//! Rows without an item number fill items in order. Visual and height
//! accept OK/FAIL, yes/no, true/false or 1/0 and default to OK. Files
//! written by `pqc record export --to csv` can be read back unchanged.

use std::path::{Path, PathBuf};

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use miette::{IntoDiagnostic, Result};
use serde::Deserialize;

use crate::cli::helpers::parse_datetime;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{Context, GlobalOpts, OutputFormat};
use crate::core::catalog;
use crate::core::entry::EntryDraft;
use crate::core::tolerance::Dimension;
use crate::entities::measurement::MeasurementEntry;

#[derive(clap::Args, Debug)]
pub struct EntryArgs {
    /// Product number or numeric id
    #[arg(long, short = 'p')]
    pub product: String,

    /// Standard id or machine number
    #[arg(long, short = 's')]
    pub standard: String,

    /// Read measurements from a CSV file
    #[arg(long, value_name = "FILE", conflicts_with = "interactive")]
    pub from_csv: Option<PathBuf>,

    /// Prompt for each item's readings
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Record date, `YYYY-MM-DD HH:MM` (default: now)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CsvMeasurement {
    #[serde(default, alias = "item_number")]
    item: Option<u32>,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default, alias = "rim_thickness")]
    rim: Option<f64>,
    #[serde(default)]
    load: Option<f64>,
    #[serde(default)]
    visual: Option<String>,
    #[serde(default)]
    height: Option<String>,
}

/// Parse a pass/fail cell; blank means pass
fn parse_check(value: Option<&str>, column: &str, line: usize) -> Result<bool> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(true);
    };
    match raw.to_ascii_lowercase().as_str() {
        "ok" | "pass" | "yes" | "y" | "true" | "1" => Ok(true),
        "fail" | "nok" | "no" | "n" | "false" | "0" => Ok(false),
        _ => Err(miette::miette!(
            "line {}: invalid {} value '{}' (expected OK or FAIL)",
            line,
            column,
            raw
        )),
    }
}

/// Read measurement rows from a CSV file
pub fn read_measurements(path: &Path) -> Result<Vec<MeasurementEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| miette::miette!("cannot read {}: {}", path.display(), e))?;

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<CsvMeasurement>().enumerate() {
        // header is line 1
        let line = index + 2;
        let raw = result.map_err(|e| miette::miette!("line {}: {}", line, e))?;
        let item_number = raw.item.unwrap_or(index as u32 + 1);
        rows.push(MeasurementEntry {
            visual_ok: parse_check(raw.visual.as_deref(), "visual", line)?,
            height_ok: parse_check(raw.height.as_deref(), "height", line)?,
            weight: raw.weight,
            rim_thickness: raw.rim,
            load: raw.load,
            ..MeasurementEntry::blank(item_number)
        });
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "read measurements");
    Ok(rows)
}

/// Load CSV rows into a draft, replacing the matching items
pub fn apply_csv(draft: &mut EntryDraft, path: &Path) -> Result<()> {
    for row in read_measurements(path)? {
        draft.set_row(row)?;
    }
    Ok(())
}

fn prompt_reading(
    theme: &ColorfulTheme,
    draft: &EntryDraft,
    item: u32,
    dimension: Dimension,
    current: Option<f64>,
) -> Result<f64> {
    let unit = dimension.unit().unwrap_or_default();
    let prompt = match draft.bounds(dimension) {
        Some((lo, hi)) => format!("Item {} {} ({}) [{:.2}..{:.2}]", item, dimension, unit, lo, hi),
        None => format!("Item {} {} ({})", item, dimension, unit),
    };
    let mut input = Input::<f64>::with_theme(theme).with_prompt(prompt);
    if let Some(v) = current {
        input = input.default(v);
    }
    let value = input.interact_text().into_diagnostic()?;

    if let Some((lo, hi)) = draft.bounds(dimension) {
        if value < lo || value > hi {
            println!(
                "  {} {} {} is outside {:.2}..{:.2}",
                style("✗").red(),
                dimension,
                value,
                lo,
                hi
            );
        }
    }
    Ok(value)
}

/// Walk every item, prompting for readings and checks
pub fn fill_interactive(draft: &mut EntryDraft) -> Result<()> {
    let theme = ColorfulTheme::default();
    let items: Vec<MeasurementEntry> = draft.rows().to_vec();
    println!(
        "Entering {} items for machine {}",
        style(items.len()).cyan(),
        style(&draft.standard().machine_number).cyan()
    );

    for current in items {
        let item = current.item_number;
        let weight = prompt_reading(&theme, draft, item, Dimension::Weight, current.weight)?;
        let rim = prompt_reading(
            &theme,
            draft,
            item,
            Dimension::RimThickness,
            current.rim_thickness,
        )?;
        let load = prompt_reading(&theme, draft, item, Dimension::Load, current.load)?;
        let height_ok = Confirm::with_theme(&theme)
            .with_prompt(format!("Item {} height OK?", item))
            .default(current.height_ok)
            .interact()
            .into_diagnostic()?;
        let visual_ok = Confirm::with_theme(&theme)
            .with_prompt(format!("Item {} visual OK?", item))
            .default(current.visual_ok)
            .interact()
            .into_diagnostic()?;

        draft.set_row(MeasurementEntry {
            weight: Some(weight),
            rim_thickness: Some(rim),
            load: Some(load),
            height_ok,
            visual_ok,
            ..MeasurementEntry::blank(item)
        })?;
    }
    Ok(())
}

const DRAFT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("item", "ITEM", 6),
    ColumnDef::new("visual", "VISUAL", 8),
    ColumnDef::new("weight", "WEIGHT", 10),
    ColumnDef::new("height", "HEIGHT", 8),
    ColumnDef::new("rim", "RIM", 10),
    ColumnDef::new("load", "LOAD", 10),
];

/// Graded rows of a draft, out-of-spec readings highlighted
pub fn print_draft(draft: &EntryDraft, format: OutputFormat) {
    let rows = draft
        .rows()
        .iter()
        .zip(draft.verdicts())
        .map(|(row, verdict)| {
            TableRow::new(i64::from(row.item_number))
                .cell("item", CellValue::Number(i64::from(row.item_number)))
                .cell("visual", CellValue::Check(verdict.visual_ok))
                .cell("weight", CellValue::Reading(row.weight, verdict.weight_in_spec))
                .cell("height", CellValue::Check(verdict.height_ok))
                .cell(
                    "rim",
                    CellValue::Reading(row.rim_thickness, verdict.rim_thickness_in_spec),
                )
                .cell("load", CellValue::Reading(row.load, verdict.load_in_spec))
        });
    TableFormatter::new(DRAFT_COLUMNS, "item").without_summary().output(rows, format);
}

/// Save a draft and report the outcome
pub fn save_draft(ctx: &mut Context, draft: EntryDraft, global: &GlobalOpts) -> Result<()> {
    let format = match ctx.format(global) {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };
    if !global.quiet && matches!(format, OutputFormat::Tsv | OutputFormat::Md) {
        print_draft(&draft, format);
        println!();
    }

    let items = draft.rows().len();
    let failing = draft.verdicts().iter().filter(|v| !v.all_ok()).count();
    let id = draft.save(&mut ctx.store, &ctx.session)?;

    if format == OutputFormat::Id {
        println!("{}", id);
    } else if !global.quiet {
        let issues = if failing == 0 {
            style("all in spec".to_string()).green()
        } else {
            style(format!("{} out of spec", failing)).red()
        };
        println!(
            "{} Saved record {} ({} items, {})",
            style("✓").green(),
            style(id).cyan(),
            items,
            issues
        );
    }
    Ok(())
}

pub fn run(args: EntryArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.session.require_user()?;

    let product = catalog::find_product(&ctx.store, &args.product)?;
    let standard = catalog::find_standard(&ctx.store, &product, &args.standard)?;
    let mut draft = EntryDraft::new(standard);
    if let Some(date) = args.date.as_deref() {
        draft.set_record_date(parse_datetime(date)?);
    }

    match (args.from_csv.as_deref(), args.interactive) {
        (Some(path), _) => apply_csv(&mut draft, path)?,
        (None, true) => fill_interactive(&mut draft)?,
        (None, false) => {
            return Err(miette::miette!(
                help = "pass --from-csv FILE or -i",
                "no measurements given"
            ))
        }
    }

    save_draft(&mut ctx, draft, global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tolerance::ToleranceBand;
    use crate::core::{ProductId, StandardId};
    use crate::entities::standard::ProductStandard;
    use tempfile::tempdir;

    fn write_csv(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.csv");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_read_measurements_in_order() {
        let (_dir, path) = write_csv("weight,rim,load\n100,1.5,40\n101,1.6,41\n");
        let rows = read_measurements(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].item_number, 1);
        assert_eq!(rows[1].item_number, 2);
        assert_eq!(rows[1].weight, Some(101.0));
        assert!(rows[0].visual_ok && rows[0].height_ok);
    }

    #[test]
    fn test_read_measurements_explicit_items_and_checks() {
        let (_dir, path) = write_csv(
            "item,weight,rim_thickness,load,visual,height\n3,99,1.4,39,FAIL,ok\n1,,1.5,40,,no\n",
        );
        let rows = read_measurements(&path).unwrap();
        assert_eq!(rows[0].item_number, 3);
        assert!(!rows[0].visual_ok);
        assert!(rows[0].height_ok);
        assert_eq!(rows[1].item_number, 1);
        assert_eq!(rows[1].weight, None);
        assert!(!rows[1].height_ok);
    }

    #[test]
    fn test_read_measurements_rejects_bad_values() {
        let (_dir, path) = write_csv("weight,rim,load,visual\n100,1.5,40,maybe\n");
        let err = read_measurements(&path).unwrap_err();
        assert!(err.to_string().contains("line 2"));

        let (_dir, path) = write_csv("weight,rim,load\nheavy,1.5,40\n");
        assert!(read_measurements(&path).is_err());
    }

    #[test]
    fn test_apply_csv_rejects_items_beyond_quantity() {
        let mut standard = ProductStandard::new(ProductId(1), "M-01", 2, None);
        standard.id = Some(StandardId(1));
        standard.weight = ToleranceBand::new(100.0, 2.0, 3.0);
        let mut draft = EntryDraft::new(standard);

        let (_dir, path) = write_csv("item,weight,rim,load\n1,100,1.5,40\n");
        apply_csv(&mut draft, &path).unwrap();
        assert_eq!(draft.rows()[0].weight, Some(100.0));
        assert_eq!(draft.rows()[1].weight, None);

        let (_dir, path) = write_csv("item,weight,rim,load\n5,100,1.5,40\n");
        assert!(apply_csv(&mut draft, &path).is_err());
    }

    #[test]
    fn test_exported_csv_reads_back() {
        let (_dir, path) = write_csv(
            "record_id,product_number,machine_number,record_date,item_number,visual,weight,weight_in_spec,height,rim_thickness,load\n\
             7,PN-250,M-01,2024-03-01 14:05:09,1,OK,100.0,true,FAIL,1.5,40.0\n",
        );
        let rows = read_measurements(&path).unwrap();
        assert_eq!(rows[0].item_number, 1);
        assert_eq!(rows[0].rim_thickness, Some(1.5));
        assert!(!rows[0].height_ok);
    }
}
