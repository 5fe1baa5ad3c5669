//! Measurement entry drafts
//!
//! An [`EntryDraft`] is the in-progress form an operator fills in: one row
//! per item of the standard's quantity per cycle, graded live against the
//! standard, and saved as a record only once every row is complete.

use chrono::{Local, NaiveDateTime};

use crate::core::error::{QcError, QcResult, ValidationError};
use crate::core::identity::{RecordId, StandardId, UserId};
use crate::core::session::Session;
use crate::core::store::Store;
use crate::core::tolerance::Dimension;
use crate::entities::measurement::{MeasurementEntry, MeasurementVerdict};
use crate::entities::record::ProductionRecord;
use crate::entities::standard::ProductStandard;

/// True when every row holds positive weight, rim thickness and load
pub fn is_complete(rows: &[MeasurementEntry]) -> bool {
    rows.iter().all(MeasurementEntry::has_data)
}

/// Item numbers of rows that are not yet complete
pub fn missing_items(rows: &[MeasurementEntry]) -> Vec<u32> {
    rows.iter()
        .filter(|r| !r.has_data())
        .map(|r| r.item_number)
        .collect()
}

/// An unsaved (or re-opened) production record
#[derive(Debug, Clone)]
pub struct EntryDraft {
    standard: ProductStandard,
    record_id: Option<RecordId>,
    created_by: Option<UserId>,
    record_date: NaiveDateTime,
    rows: Vec<MeasurementEntry>,
}

impl EntryDraft {
    /// Blank draft with rows `1..=quantity_per_cycle`, dated now
    pub fn new(standard: ProductStandard) -> Self {
        let quantity = standard.quantity_per_cycle;
        Self::with_items(standard, quantity)
    }

    /// Blank draft with rows `1..=items`, independent of the standard's quantity
    fn with_items(standard: ProductStandard, items: u32) -> Self {
        let rows = (1..=items).map(MeasurementEntry::blank).collect();
        Self {
            standard,
            record_id: None,
            created_by: None,
            record_date: Local::now().naive_local(),
            rows,
        }
    }

    /// Re-open a saved record for correction
    ///
    /// Rows follow the record as it was measured, not the standard's current
    /// quantity per cycle.
    pub fn reopen(
        record: &ProductionRecord,
        standard: ProductStandard,
        measurements: Vec<MeasurementEntry>,
    ) -> Self {
        let items = measurements
            .iter()
            .map(|m| m.item_number)
            .max()
            .unwrap_or(0)
            .max(record.quantity_measured);
        let mut draft = Self::with_items(standard, items);
        draft.record_id = record.id;
        draft.created_by = record.created_by;
        draft.record_date = record.record_date;
        for m in measurements {
            if let Some(slot) = draft.rows.iter_mut().find(|r| r.item_number == m.item_number) {
                *slot = MeasurementEntry {
                    id: None,
                    record_id: None,
                    ..m
                };
            }
        }
        draft
    }

    /// Re-open a stored record by id; correcting records is an admin task
    pub fn load(store: &Store, session: &Session, id: RecordId) -> QcResult<Self> {
        session.require_admin()?;
        let record = store
            .get_record(id)?
            .ok_or_else(|| QcError::not_found(RecordId::KIND, id))?;
        let standard = store
            .get_standard(record.standard_id)?
            .ok_or_else(|| QcError::not_found(StandardId::KIND, record.standard_id))?;
        let measurements = store.measurements_for_record(id)?;
        Ok(Self::reopen(&record, standard, measurements))
    }

    pub fn standard(&self) -> &ProductStandard {
        &self.standard
    }

    pub fn rows(&self) -> &[MeasurementEntry] {
        &self.rows
    }

    pub fn record_date(&self) -> NaiveDateTime {
        self.record_date
    }

    pub fn set_record_date(&mut self, date: NaiveDateTime) {
        self.record_date = date;
    }

    /// Acceptable `(lower, upper)` range for a numeric dimension
    pub fn bounds(&self, dimension: Dimension) -> Option<(f64, f64)> {
        self.standard
            .band(dimension)
            .map(|band| (band.lower(), band.upper()))
    }

    fn slot(&mut self, item: u32) -> Result<&mut MeasurementEntry, ValidationError> {
        let quantity = self.rows.len() as u32;
        self.rows
            .iter_mut()
            .find(|r| r.item_number == item)
            .ok_or(ValidationError::ItemOutOfRange { item, quantity })
    }

    /// Replace one row; the row's item number selects the slot
    pub fn set_row(&mut self, row: MeasurementEntry) -> Result<(), ValidationError> {
        let slot = self.slot(row.item_number)?;
        *slot = MeasurementEntry {
            id: None,
            record_id: None,
            ..row
        };
        Ok(())
    }

    /// Set a single numeric reading
    pub fn set_value(
        &mut self,
        item: u32,
        dimension: Dimension,
        value: Option<f64>,
    ) -> Result<(), ValidationError> {
        let slot = self.slot(item)?;
        match dimension {
            Dimension::Weight => slot.weight = value,
            Dimension::RimThickness => slot.rim_thickness = value,
            Dimension::Load => slot.load = value,
            Dimension::Height => slot.height_ok = value.is_some_and(|v| v != 0.0),
            Dimension::Visual => slot.visual_ok = value.is_some_and(|v| v != 0.0),
        }
        Ok(())
    }

    /// Live grading of every row
    pub fn verdicts(&self) -> Vec<MeasurementVerdict> {
        self.rows
            .iter()
            .map(|r| r.evaluate(&self.standard))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        is_complete(&self.rows)
    }

    pub fn missing_items(&self) -> Vec<u32> {
        missing_items(&self.rows)
    }

    /// Persist the draft as a production record
    ///
    /// New records are attributed to the logged-in user; re-opened records
    /// keep their original creator.
    pub fn save(self, store: &mut Store, session: &Session) -> QcResult<RecordId> {
        let user = session.require_user()?;

        if !self.is_complete() {
            return Err(ValidationError::IncompleteRecord {
                missing_items: self.missing_items(),
            }
            .into());
        }

        let created_by = match self.record_id {
            Some(_) => self.created_by,
            None => user.id,
        };
        let mut record = ProductionRecord::for_standard(&self.standard, created_by, self.record_date)
            .ok_or_else(|| QcError::not_found("standard", &self.standard.machine_number))?;
        record.id = self.record_id;
        record.quantity_measured = self.rows.len() as u32;

        let id = store.save_record_with_measurements(&record, &self.rows)?;
        Ok(id)
    }
}
