//! Excel export - single worksheet with out-of-spec cells in red

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};

use super::{detail_lines, pass_fail, summary_lines, DocumentSink, ExportError};
use crate::core::history::RecordDetails;

const HEADERS: [&str; 6] = [
    "Item #",
    "Visual",
    "Weight (g)",
    "Height",
    "Rim (mm)",
    "Load (NM)",
];

pub struct XlsxSink;

fn write_reading(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<f64>,
    format: &Format,
) -> Result<(), XlsxError> {
    match value {
        Some(v) => sheet.write_number_with_format(row, col, v, format)?,
        None => sheet.write_string_with_format(row, col, "-", format)?,
    };
    Ok(())
}

impl DocumentSink for XlsxSink {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn write(&self, details: &RecordDetails, path: &Path) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Production Record")?;

        let title_fmt = Format::new()
            .set_bold()
            .set_font_size(14)
            .set_align(FormatAlign::Center);
        let bold = Format::new().set_bold();
        let header_fmt = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(Color::RGB(0xC8C8C8));
        let normal = Format::new();
        let fail = Format::new().set_font_color(Color::Red);
        let pick = |ok: bool| if ok { &normal } else { &fail };

        let title = format!("Production Record: {}", details.header.product_name);
        sheet.merge_range(0, 0, 0, 5, &title, &title_fmt)?;

        let mut row: u32 = 2;
        for (label, value) in detail_lines(&details.header) {
            sheet.write_string_with_format(row, 0, label, &bold)?;
            sheet.write_string(row, 1, &value)?;
            row += 1;
        }

        row += 1;
        for (col, header) in HEADERS.iter().enumerate() {
            sheet.write_string_with_format(row, col as u16, *header, &header_fmt)?;
        }
        row += 1;

        for m in &details.rows {
            sheet.write_number(row, 0, m.item_number as f64)?;
            sheet.write_string_with_format(row, 1, pass_fail(m.visual_ok), pick(m.visual_ok))?;
            write_reading(sheet, row, 2, m.weight, pick(m.weight_in_spec))?;
            sheet.write_string_with_format(row, 3, pass_fail(m.height_ok), pick(m.height_ok))?;
            write_reading(sheet, row, 4, m.rim_thickness, pick(m.rim_thickness_in_spec))?;
            write_reading(sheet, row, 5, m.load, pick(m.load_in_spec))?;
            row += 1;
        }

        row += 1;
        sheet.write_string_with_format(row, 0, "Standard Values", &bold)?;
        row += 1;
        let s = &details.standard;
        let bands: [(&str, f64, f64, f64); 3] = [
            ("Standard:", s.weight.nominal, s.rim_thickness.nominal, s.load.nominal),
            ("Tolerance +", s.weight.plus, s.rim_thickness.plus, s.load.plus),
            ("Tolerance -", s.weight.minus, s.rim_thickness.minus, s.load.minus),
        ];
        for (label, weight, rim, load) in bands {
            sheet.write_string(row, 0, label)?;
            sheet.write_number(row, 2, weight)?;
            sheet.write_number(row, 4, rim)?;
            sheet.write_number(row, 5, load)?;
            row += 1;
        }

        row += 1;
        sheet.write_string_with_format(row, 0, "Summary", &bold)?;
        row += 1;
        for (label, value) in summary_lines(details) {
            sheet.write_string(row, 0, label)?;
            sheet.write_string(row, 1, &value)?;
            row += 1;
        }

        sheet.autofit();
        workbook.save(path)?;
        Ok(())
    }
}
