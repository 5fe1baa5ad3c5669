//! Record export to PDF, Excel and CSV documents

mod csv;
mod pdf;
mod xlsx;

pub use self::csv::CsvSink;
pub use self::pdf::PdfSink;
pub use self::xlsx::XlsxSink;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use miette::Diagnostic;
use thiserror::Error;

use crate::core::history::{RecordDetails, RecordHeader};
use crate::core::summary::IssueCounts;
use crate::core::tolerance::Dimension;

/// Errors raised while writing a document
#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("could not write export file: {0}")]
    #[diagnostic(code(pqc::export::io))]
    Io(#[from] std::io::Error),

    #[error("PDF generation failed: {0}")]
    #[diagnostic(code(pqc::export::pdf))]
    Pdf(String),

    #[error("Excel generation failed: {0}")]
    #[diagnostic(code(pqc::export::xlsx))]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV generation failed: {0}")]
    #[diagnostic(code(pqc::export::csv))]
    Csv(#[from] ::csv::Error),
}

/// A writer that renders one record to a file
pub trait DocumentSink {
    /// File extension without the dot
    fn extension(&self) -> &'static str;

    fn write(&self, details: &RecordDetails, path: &Path) -> Result<(), ExportError>;
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Pdf,
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn sink(self) -> Box<dyn DocumentSink> {
        match self {
            ExportFormat::Pdf => Box::new(PdfSink),
            ExportFormat::Xlsx => Box::new(XlsxSink),
            ExportFormat::Csv => Box::new(CsvSink),
        }
    }
}

/// `Record_{product_number}_{yyyyMMdd_HHmmss}.{ext}`, stamped with the record date
pub fn default_file_name(header: &RecordHeader, extension: &str) -> String {
    let number: String = header
        .product_number
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!(
        "Record_{}_{}.{}",
        number,
        header.record_date.format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Write a record with the given sink and return the path written
///
/// With no explicit `output`, the default file name is used inside `export_dir`.
pub fn export_record(
    details: &RecordDetails,
    sink: &dyn DocumentSink,
    output: Option<&Path>,
    export_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let path = match output {
        Some(p) => p.to_path_buf(),
        None => export_dir.join(default_file_name(&details.header, sink.extension())),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    if let Err(e) = sink.write(details, &path) {
        tracing::error!(path = %path.display(), error = %e, "export failed");
        return Err(e);
    }
    tracing::info!(record = %details.header.record_id, path = %path.display(), "exported record");
    Ok(path)
}

fn pass_fail(ok: bool) -> &'static str {
    if ok {
        "OK"
    } else {
        "FAIL"
    }
}

/// One decimal place; blank readings render as "-"
fn reading(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

fn display_date(date: &NaiveDateTime) -> String {
    date.format("%-d %b %Y %H:%M").to_string()
}

/// Summary lines shared by the document writers, e.g. ("Weight out of spec:", "1 of 18")
fn summary_lines(details: &RecordDetails) -> Vec<(&'static str, String)> {
    let counts: IssueCounts = details.issue_counts();
    let total = details.rows.len();
    Dimension::all()
        .iter()
        .map(|d| {
            let label = match d {
                Dimension::Weight => "Weight out of spec:",
                Dimension::Height => "Height out of spec:",
                Dimension::RimThickness => "Rim thickness out of spec:",
                Dimension::Load => "Load out of spec:",
                Dimension::Visual => "Visual appearance issues:",
            };
            (label, format!("{} of {}", counts.get(*d), total))
        })
        .collect()
}

/// Header/detail pairs shared by the document writers
fn detail_lines(header: &RecordHeader) -> Vec<(&'static str, String)> {
    vec![
        ("Product Number:", header.product_number.clone()),
        ("Machine:", header.machine_number.clone()),
        ("Date:", display_date(&header.record_date)),
        ("Recorded by:", header.created_by.clone()),
        ("Quantity:", format!("{} items", header.quantity_measured)),
    ]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::history::MeasurementRow;
    use crate::core::identity::{ProductId, RecordId};
    use crate::core::tolerance::ToleranceBand;
    use crate::entities::standard::ProductStandard;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    pub(crate) fn sample_details(items: u32) -> RecordDetails {
        let mut standard = ProductStandard::new(ProductId(1), "M-01", items, None);
        standard.weight = ToleranceBand::new(100.0, 2.0, 3.0);
        standard.rim_thickness = ToleranceBand::new(1.5, 0.2, 0.2);
        standard.load = ToleranceBand::new(40.0, 5.0, 5.0);

        let rows = (1..=items)
            .map(|i| {
                let weight = if i == 2 { 96.0 } else { 100.0 };
                MeasurementRow {
                    item_number: i,
                    visual_ok: true,
                    weight: Some(weight),
                    weight_in_spec: standard.weight.contains(weight),
                    height_ok: true,
                    rim_thickness: Some(1.5),
                    rim_thickness_in_spec: true,
                    load: Some(40.0),
                    load_in_spec: true,
                    weight_standard: standard.weight,
                    rim_thickness_standard: standard.rim_thickness,
                    load_standard: standard.load,
                }
            })
            .collect();

        RecordDetails {
            header: RecordHeader {
                record_id: RecordId(7),
                product_name: "Cup 250".to_string(),
                product_number: "PN-250".to_string(),
                machine_number: "M-01".to_string(),
                record_date: NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(14, 5, 9)
                    .unwrap(),
                created_by: "Administrator".to_string(),
                quantity_measured: items,
            },
            standard,
            rows,
        }
    }

    #[test]
    fn test_default_file_name() {
        let details = sample_details(3);
        assert_eq!(
            default_file_name(&details.header, "pdf"),
            "Record_PN-250_20240301_140509.pdf"
        );

        let mut header = details.header.clone();
        header.product_number = "PN/250 A".to_string();
        assert_eq!(
            default_file_name(&header, "csv"),
            "Record_PN_250_A_20240301_140509.csv"
        );
    }

    #[test]
    fn test_summary_lines() {
        let details = sample_details(3);
        let lines = summary_lines(&details);
        assert_eq!(lines[0], ("Weight out of spec:", "1 of 3".to_string()));
        assert_eq!(lines[4], ("Visual appearance issues:", "0 of 3".to_string()));
    }

    #[test]
    fn test_reading_format() {
        assert_eq!(reading(Some(100.0)), "100.0");
        assert_eq!(reading(Some(1.26)), "1.3");
        assert_eq!(reading(None), "-");
    }

    #[test]
    fn test_export_uses_default_name_in_dir() {
        let tmp = tempdir().unwrap();
        let details = sample_details(3);
        let path = export_record(&details, &CsvSink, None, tmp.path()).unwrap();
        assert_eq!(
            path,
            tmp.path().join("Record_PN-250_20240301_140509.csv")
        );
        assert!(path.exists());
    }

    #[test]
    fn test_export_to_explicit_path() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("nested/out.xlsx");
        let details = sample_details(3);
        let path = export_record(&details, &XlsxSink, Some(&out), tmp.path()).unwrap();
        assert_eq!(path, out);
        assert!(out.exists());
    }

    #[test]
    fn test_every_sink_writes() {
        let tmp = tempdir().unwrap();
        let details = sample_details(40);
        for format in [ExportFormat::Pdf, ExportFormat::Xlsx, ExportFormat::Csv] {
            let sink = format.sink();
            let path = export_record(&details, sink.as_ref(), None, tmp.path()).unwrap();
            let len = std::fs::metadata(&path).unwrap().len();
            assert!(len > 0, "{} export is empty", sink.extension());
        }
    }
}
