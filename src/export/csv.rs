//! CSV export - one machine-readable row per item

use std::path::Path;

use serde::Serialize;

use super::{pass_fail, DocumentSink, ExportError};
use crate::core::history::{MeasurementRow, RecordDetails};

pub struct CsvSink;

#[derive(Serialize)]
struct CsvRow<'a> {
    record_id: i64,
    product_number: &'a str,
    machine_number: &'a str,
    record_date: String,
    item_number: u32,
    visual: &'static str,
    weight: Option<f64>,
    weight_in_spec: bool,
    weight_nominal: f64,
    weight_plus: f64,
    weight_minus: f64,
    height: &'static str,
    rim_thickness: Option<f64>,
    rim_thickness_in_spec: bool,
    rim_nominal: f64,
    rim_plus: f64,
    rim_minus: f64,
    load: Option<f64>,
    load_in_spec: bool,
    load_nominal: f64,
    load_plus: f64,
    load_minus: f64,
}

impl<'a> CsvRow<'a> {
    fn new(details: &'a RecordDetails, row: &MeasurementRow) -> Self {
        let header = &details.header;
        Self {
            record_id: header.record_id.get(),
            product_number: &header.product_number,
            machine_number: &header.machine_number,
            record_date: header.record_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            item_number: row.item_number,
            visual: pass_fail(row.visual_ok),
            weight: row.weight,
            weight_in_spec: row.weight_in_spec,
            weight_nominal: row.weight_standard.nominal,
            weight_plus: row.weight_standard.plus,
            weight_minus: row.weight_standard.minus,
            height: pass_fail(row.height_ok),
            rim_thickness: row.rim_thickness,
            rim_thickness_in_spec: row.rim_thickness_in_spec,
            rim_nominal: row.rim_thickness_standard.nominal,
            rim_plus: row.rim_thickness_standard.plus,
            rim_minus: row.rim_thickness_standard.minus,
            load: row.load,
            load_in_spec: row.load_in_spec,
            load_nominal: row.load_standard.nominal,
            load_plus: row.load_standard.plus,
            load_minus: row.load_standard.minus,
        }
    }
}

impl DocumentSink for CsvSink {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write(&self, details: &RecordDetails, path: &Path) -> Result<(), ExportError> {
        let mut wtr = ::csv::Writer::from_path(path)?;
        for row in &details.rows {
            wtr.serialize(CsvRow::new(details, row))?;
        }
        wtr.flush()?;
        Ok(())
    }
}
