//! Table formatting utilities for CLI list commands
//!
//! Every list command builds [`TableRow`]s and hands them to a
//! [`TableFormatter`], which renders tsv, csv, markdown or bare ids.
//! JSON and YAML output serialize the underlying values directly and
//! never reach this module.

use chrono::NaiveDateTime;
use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, format_reading, truncate_str};
use crate::cli::OutputFormat;
use crate::core::summary::DimensionIssues;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Row id, cyan
    Id(i64),
    /// Plain text, truncated to the column width
    Text(String),
    /// Pass/fail check, OK green, FAIL red
    Check(bool),
    /// Out-of-spec count, red when non-zero
    Issues(usize),
    /// Measured value and whether it is within tolerance
    Reading(Option<f64>, bool),
    /// Role or kind label
    Type(String),
    /// Local wall-clock time
    DateTime(NaiveDateTime),
    Number(i64),
    /// Float value with precision
    Float(f64, usize),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan(), width = width),
            CellValue::Text(s) | CellValue::Type(s) => {
                format!("{:<width$}", truncate_str(s, width.saturating_sub(2)), width = width)
            }
            CellValue::Check(ok) => {
                let styled = if *ok {
                    style("OK").green()
                } else {
                    style("FAIL").red().bold()
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Issues(n) => {
                let styled = if *n > 0 {
                    style(n.to_string()).red()
                } else {
                    style(n.to_string()).dim()
                };
                format!("{:>width$}", styled, width = width)
            }
            CellValue::Reading(value, ok) => {
                let text = format_reading(*value);
                let styled = if *ok { style(text) } else { style(text).red().bold() };
                format!("{:>width$}", styled, width = width)
            }
            CellValue::DateTime(dt) => {
                format!("{:<width$}", dt.format("%Y-%m-%d %H:%M"), width = width)
            }
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Float(f, precision) => {
                format!("{:>width$.prec$}", f, width = width, prec = precision)
            }
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Text(s) | CellValue::Type(s) => escape_csv(s),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            other => other.raw(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Check(false) => "**FAIL**".to_string(),
            CellValue::Reading(value, false) => format!("**{}**", format_reading(*value)),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            CellValue::Empty => "-".to_string(),
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(id) => id.to_string(),
            CellValue::Text(s) | CellValue::Type(s) => s.clone(),
            CellValue::Check(ok) => if *ok { "OK" } else { "FAIL" }.to_string(),
            CellValue::Issues(n) => n.to_string(),
            CellValue::Reading(value, _) => format_reading(*value),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Float(f, precision) => format!("{:.prec$}", f, prec = precision),
            CellValue::Empty => String::new(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Check(_) => 4,
            CellValue::DateTime(_) => 16, // "YYYY-MM-DD HH:MM"
            CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with header label and width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: i64,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Drop the "N x(s) found." footer
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Output rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat)
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();
        print!("{}", self.render(&rows, format));
    }

    /// Render rows to a string; Json and Yaml fall back to tsv
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> String {
        match format {
            OutputFormat::Csv => self.render_csv(rows),
            OutputFormat::Md => self.render_md(rows),
            OutputFormat::Id => rows.iter().map(|r| format!("{}\n", r.id)).collect(),
            _ => self.render_tsv(rows),
        }
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);
                // +2 keeps truncate_str from clipping content that fits
                col.header
                    .len()
                    .max(max_content.saturating_add(2))
                    .min(col.width)
            })
            .collect()
    }

    fn render_tsv(&self, rows: &[TableRow]) -> String {
        let widths = self.calculate_widths(rows);
        let mut out = String::new();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = w))
            .collect();
        out.push_str(&header.join(" "));
        out.push('\n');

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total_width));
        out.push('\n');

        for row in rows {
            let parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, w)| match row.get(col.key) {
                    Some(value) => value.format_tsv(*w),
                    None => format!("{:<width$}", "-", width = w),
                })
                .collect();
            out.push_str(&parts.join(" "));
            out.push('\n');
        }

        if self.show_summary {
            out.push('\n');
            out.push_str(&format!(
                "{} {}(s) found.\n",
                style(rows.len()).cyan(),
                self.entity_name
            ));
        }
        out
    }

    fn render_csv(&self, rows: &[TableRow]) -> String {
        let mut out = self
            .columns
            .iter()
            .map(|c| c.key)
            .collect::<Vec<_>>()
            .join(",");
        out.push('\n');
        for row in rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(col.key).map(|v| v.format_csv()).unwrap_or_default())
                .collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }

    fn render_md(&self, rows: &[TableRow]) -> String {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header).collect();
        let mut out = format!("| {} |\n", headers.join(" | "));
        out.push_str(&format!(
            "|{}|\n",
            self.columns.iter().map(|_| "---").collect::<Vec<_>>().join("|")
        ));
        for row in rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|col| {
                    row.get(col.key)
                        .map(|v| v.format_md())
                        .unwrap_or_else(|| "-".to_string())
                })
                .collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        out
    }
}

/// Out-of-spec counts per dimension as a boxed table, or markdown for `Md`
pub fn issue_table(issues: &[DimensionIssues], total: usize, format: OutputFormat) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Dimension", "Out of spec", "Share"]);
    for issue in issues {
        builder.push_record([
            issue.dimension.label().to_string(),
            format!("{} of {}", issue.count, total),
            format!("{:.2}%", issue.percent),
        ]);
    }
    let mut table = builder.build();
    if format == OutputFormat::Md {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("number", "NUMBER", 16),
        ColumnDef::new("name", "NAME", 30),
    ];

    fn rows() -> Vec<TableRow> {
        vec![
            TableRow::new(1)
                .cell("number", CellValue::Text("PN-250".to_string()))
                .cell("name", CellValue::Text("Cup, 250ml".to_string())),
            TableRow::new(2)
                .cell("number", CellValue::Text("PN|9".to_string()))
                .cell("name", CellValue::Empty),
        ]
    }

    #[test]
    fn test_csv_escapes_and_headers() {
        let out = TableFormatter::new(COLUMNS, "product").render(&rows(), OutputFormat::Csv);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "number,name");
        assert_eq!(lines[1], "PN-250,\"Cup, 250ml\"");
        assert_eq!(lines[2], "PN|9,");
    }

    #[test]
    fn test_md_escapes_pipes() {
        let out = TableFormatter::new(COLUMNS, "product").render(&rows(), OutputFormat::Md);
        assert!(out.starts_with("| NUMBER | NAME |\n|---|---|\n"));
        assert!(out.contains("| PN\\|9 | - |"));
    }

    #[test]
    fn test_id_output() {
        let out = TableFormatter::new(COLUMNS, "product").render(&rows(), OutputFormat::Id);
        assert_eq!(out, "1\n2\n");
    }

    #[test]
    fn test_tsv_summary_line() {
        let out = TableFormatter::new(COLUMNS, "product").render(&rows(), OutputFormat::Tsv);
        assert!(out.contains("product(s) found."));
        assert!(out.contains("PN-250"));

        let out = TableFormatter::new(COLUMNS, "product")
            .without_summary()
            .render(&rows(), OutputFormat::Tsv);
        assert!(!out.contains("found."));
    }

    #[test]
    fn test_issue_table() {
        use crate::core::tolerance::Dimension;
        let issues = [DimensionIssues {
            dimension: Dimension::Weight,
            count: 1,
            percent: 33.33,
        }];
        let out = issue_table(&issues, 3, OutputFormat::Md);
        assert!(out.contains("| weight"));
        assert!(out.contains("1 of 3"));
        assert!(out.contains("33.33%"));
    }

    #[test]
    fn test_check_cells() {
        assert_eq!(CellValue::Check(true).raw(), "OK");
        assert_eq!(CellValue::Check(false).format_md(), "**FAIL**");
        assert_eq!(CellValue::Float(1.256, 2).raw(), "1.26");
        assert_eq!(CellValue::Reading(Some(96.0), false).format_md(), "**96.0**");
        assert_eq!(CellValue::Reading(None, false).raw(), "-");
    }
}
