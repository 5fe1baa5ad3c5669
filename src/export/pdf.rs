//! PDF export - A4 report with details, measurement table and summary

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::Local;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::{detail_lines, pass_fail, reading, summary_lines, DocumentSink, ExportError};
use crate::core::history::{MeasurementRow, RecordDetails};
use crate::core::tolerance::ToleranceBand;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT: f32 = 20.0;
const TOP: f32 = 277.0;
const BOTTOM: f32 = 22.0;
const LINE: f32 = 6.0;

/// Column x offsets (mm) and headers of the measurement table
const COLUMNS: [(f32, &str); 6] = [
    (LEFT, "Item #"),
    (LEFT + 15.0, "Visual"),
    (LEFT + 32.0, "Weight (g)"),
    (LEFT + 77.0, "Height"),
    (LEFT + 94.0, "Rim (mm)"),
    (LEFT + 132.0, "Load (NM)"),
];

pub struct PdfSink;

/// Tracks the current layer and cursor, adding pages as content overflows
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl PageCursor<'_> {
    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn advance(&mut self, by: f32) {
        self.y -= by;
    }

    /// Start a new page if fewer than `needed` mm remain
    fn ensure_room(&mut self, needed: f32) -> bool {
        if self.y - needed >= BOTTOM {
            return false;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
        true
    }

    fn table_header(&mut self) {
        for (x, label) in COLUMNS {
            self.text(label, 10.0, x, true);
        }
        self.advance(LINE);
    }

    fn table_row(&mut self, row: &MeasurementRow) {
        if self.ensure_room(LINE) {
            self.table_header();
        }
        let cells = [
            row.item_number.to_string(),
            pass_fail(row.visual_ok).to_string(),
            with_standard(row.weight, &row.weight_standard),
            pass_fail(row.height_ok).to_string(),
            with_standard(row.rim_thickness, &row.rim_thickness_standard),
            with_standard(row.load, &row.load_standard),
        ];
        for ((x, _), cell) in COLUMNS.iter().zip(cells.iter()) {
            self.text(cell, 9.0, *x, false);
        }
        self.advance(LINE);
    }
}

/// e.g. "100.0 (Std: 100.0)"
fn with_standard(value: Option<f64>, band: &ToleranceBand) -> String {
    format!("{} (Std: {:.1})", reading(value), band.nominal)
}

impl DocumentSink for PdfSink {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn write(&self, details: &RecordDetails, path: &Path) -> Result<(), ExportError> {
        let title = format!("Production Record: {}", details.header.product_name);
        let (doc, page1, layer1) =
            PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(format!("failed to add font: {}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(format!("failed to add font: {}", e)))?;

        {
            let mut cursor = PageCursor {
                doc: &doc,
                layer: doc.get_page(page1).get_layer(layer1),
                y: TOP,
                regular,
                bold,
            };

            cursor.text(&title, 18.0, LEFT, true);
            cursor.advance(LINE * 2.0);

            for (label, value) in detail_lines(&details.header) {
                cursor.text(label, 12.0, LEFT, true);
                cursor.text(&value, 12.0, LEFT + 40.0, false);
                cursor.advance(LINE);
            }
            cursor.advance(LINE);

            cursor.table_header();
            for row in &details.rows {
                cursor.table_row(row);
            }
            cursor.advance(LINE);

            let summary = summary_lines(details);
            cursor.ensure_room(LINE * (summary.len() as f32 + 2.0));
            cursor.text("Summary:", 12.0, LEFT, true);
            cursor.advance(LINE);
            for (label, value) in summary {
                cursor.text(label, 11.0, LEFT, true);
                cursor.text(&value, 11.0, LEFT + 60.0, false);
                cursor.advance(LINE);
            }

            let footer = format!(
                "Generated on {}",
                Local::now().format("%-d %b %Y %H:%M:%S")
            );
            cursor.y = BOTTOM - LINE;
            cursor.text(&footer, 8.0, PAGE_WIDTH - 75.0, false);
        }

        let file = File::create(path)?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| ExportError::Pdf(format!("failed to save PDF: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_details;
    use tempfile::tempdir;

    #[test]
    fn test_with_standard_cell() {
        let band = ToleranceBand::new(100.0, 2.0, 3.0);
        assert_eq!(with_standard(Some(99.04), &band), "99.0 (Std: 100.0)");
        assert_eq!(with_standard(None, &band), "- (Std: 100.0)");
    }

    #[test]
    fn test_writes_pdf_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("record.pdf");
        PdfSink.write(&sample_details(3), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_record_spans_pages() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("long.pdf");
        PdfSink.write(&sample_details(80), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
