//! Record history: listing, detail views, summaries and comparison

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::core::error::{QcError, QcResult};
use crate::core::identity::{ProductId, RecordId, StandardId};
use crate::core::session::Session;
use crate::core::store::Store;
use crate::core::summary::{
    filter_records, ComparisonReport, DateRange, IssueCounts, RecordSummary,
};
use crate::core::tolerance::ToleranceBand;
use crate::entities::measurement::{MeasurementEntry, MeasurementVerdict};
use crate::entities::product::Product;
use crate::entities::record::ProductionRecord;
use crate::entities::standard::ProductStandard;

/// Shown when a record's creator has since been deleted
pub const UNKNOWN_CREATOR: &str = "Unknown";

/// Label used by comparisons spanning every standard of a product
pub const ALL_MACHINES: &str = "All Machines";

/// Read-only header of a record, resolved for display and export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordHeader {
    pub record_id: RecordId,
    pub product_name: String,
    pub product_number: String,
    pub machine_number: String,
    pub record_date: NaiveDateTime,
    pub created_by: String,
    pub quantity_measured: u32,
}

/// One item's readings with verdicts and the standard it was graded against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRow {
    pub item_number: u32,
    pub visual_ok: bool,
    pub weight: Option<f64>,
    pub weight_in_spec: bool,
    pub height_ok: bool,
    pub rim_thickness: Option<f64>,
    pub rim_thickness_in_spec: bool,
    pub load: Option<f64>,
    pub load_in_spec: bool,
    pub weight_standard: ToleranceBand,
    pub rim_thickness_standard: ToleranceBand,
    pub load_standard: ToleranceBand,
}

impl MeasurementRow {
    fn new(entry: &MeasurementEntry, standard: &ProductStandard) -> Self {
        let verdict = entry.evaluate(standard);
        Self {
            item_number: entry.item_number,
            visual_ok: entry.visual_ok,
            weight: entry.weight,
            weight_in_spec: verdict.weight_in_spec,
            height_ok: entry.height_ok,
            rim_thickness: entry.rim_thickness,
            rim_thickness_in_spec: verdict.rim_thickness_in_spec,
            load: entry.load,
            load_in_spec: verdict.load_in_spec,
            weight_standard: standard.weight,
            rim_thickness_standard: standard.rim_thickness,
            load_standard: standard.load,
        }
    }

    pub fn verdict(&self) -> MeasurementVerdict {
        MeasurementVerdict {
            visual_ok: self.visual_ok,
            weight_in_spec: self.weight_in_spec,
            height_ok: self.height_ok,
            rim_thickness_in_spec: self.rim_thickness_in_spec,
            load_in_spec: self.load_in_spec,
        }
    }
}

/// Everything needed to show or export one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDetails {
    pub header: RecordHeader,
    pub standard: ProductStandard,
    /// Sorted by item number
    pub rows: Vec<MeasurementRow>,
}

impl RecordDetails {
    pub fn issue_counts(&self) -> IssueCounts {
        let verdicts: Vec<_> = self.rows.iter().map(MeasurementRow::verdict).collect();
        IssueCounts::from_verdicts(&verdicts)
    }

    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            record_id: self.header.record_id,
            product_name: self.header.product_name.clone(),
            product_number: self.header.product_number.clone(),
            machine_number: self.header.machine_number.clone(),
            record_date: self.header.record_date,
            created_by: self.header.created_by.clone(),
            total_measurements: self.rows.len(),
            out_of_spec: self.issue_counts(),
        }
    }
}

/// Filters for the record list
#[derive(Debug, Clone)]
pub struct RecordQuery {
    pub product: Option<ProductId>,
    pub range: DateRange,
    /// Case-insensitive match on product name/number, machine or creator
    pub search: Option<String>,
}

impl RecordQuery {
    fn matches(&self, summary: &RecordSummary) -> bool {
        let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return true;
        };
        let needle = needle.to_lowercase();
        [
            &summary.product_name,
            &summary.product_number,
            &summary.machine_number,
            &summary.created_by,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

fn creator_name(store: &Store, record: &ProductionRecord) -> QcResult<String> {
    let name = match record.created_by {
        Some(id) => store.get_user(id)?.map(|u| u.full_name),
        None => None,
    };
    Ok(name.unwrap_or_else(|| UNKNOWN_CREATOR.to_string()))
}

fn load_details(store: &Store, record: &ProductionRecord) -> QcResult<RecordDetails> {
    let record_id = record
        .id
        .ok_or_else(|| QcError::not_found(RecordId::KIND, "unsaved"))?;
    let product = store
        .get_product(record.product_id)?
        .ok_or_else(|| QcError::not_found(ProductId::KIND, record.product_id))?;
    let standard = store
        .get_standard(record.standard_id)?
        .ok_or_else(|| QcError::not_found(StandardId::KIND, record.standard_id))?;

    let mut entries = store.measurements_for_record(record_id)?;
    entries.sort_by_key(|e| e.item_number);
    let rows = entries
        .iter()
        .map(|e| MeasurementRow::new(e, &standard))
        .collect();

    Ok(RecordDetails {
        header: RecordHeader {
            record_id,
            product_name: product.name,
            product_number: product.product_number,
            machine_number: record.machine_number.clone(),
            record_date: record.record_date,
            created_by: creator_name(store, record)?,
            quantity_measured: record.quantity_measured,
        },
        standard,
        rows,
    })
}

/// Summaries of records matching the query, newest first
pub fn list_records(
    store: &Store,
    session: &Session,
    query: &RecordQuery,
) -> QcResult<Vec<RecordSummary>> {
    session.require_admin()?;
    let records = match query.product {
        Some(product) => store.list_records_by_product(product)?,
        None => store.list_records_in_range(&query.range)?,
    };

    let mut summaries = Vec::new();
    for record in filter_records(records, &query.range, None) {
        let summary = load_details(store, &record)?.summary();
        if query.matches(&summary) {
            summaries.push(summary);
        }
    }
    Ok(summaries)
}

/// Full detail of one record with rows sorted by item number
pub fn record_details(store: &Store, session: &Session, id: RecordId) -> QcResult<RecordDetails> {
    session.require_admin()?;
    let record = store
        .get_record(id)?
        .ok_or_else(|| QcError::not_found(RecordId::KIND, id))?;
    load_details(store, &record)
}

pub fn record_summary(store: &Store, session: &Session, id: RecordId) -> QcResult<RecordSummary> {
    Ok(record_details(store, session, id)?.summary())
}

/// Aggregate a product's records over a date range
///
/// Returns `None` when no record matches.
pub fn compare(
    store: &Store,
    session: &Session,
    product: &Product,
    standard: Option<&ProductStandard>,
    range: &DateRange,
) -> QcResult<Option<ComparisonReport>> {
    session.require_admin()?;
    let product_id = product
        .id
        .ok_or_else(|| QcError::not_found(ProductId::KIND, &product.product_number))?;

    let records = filter_records(
        store.list_records_by_product(product_id)?,
        range,
        standard.and_then(|s| s.id),
    );
    if records.is_empty() {
        tracing::debug!(product = %product.product_number, range = %range.label(), "no records to compare");
        return Ok(None);
    }

    let summaries = records
        .iter()
        .map(|r| load_details(store, r).map(|d| d.summary()))
        .collect::<QcResult<Vec<_>>>()?;

    let label = standard
        .map(|s| s.machine_number.clone())
        .unwrap_or_else(|| ALL_MACHINES.to_string());
    Ok(Some(ComparisonReport::from_summaries(
        &product.name,
        label,
        range,
        &summaries,
    )))
}

pub fn delete_record(store: &Store, session: &Session, id: RecordId) -> QcResult<()> {
    session.require_admin()?;
    if !store.delete_record(id)? {
        return Err(QcError::not_found(RecordId::KIND, id));
    }
    Ok(())
}
