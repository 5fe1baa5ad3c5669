//! Production record and measurement persistence

use rusqlite::{params, OptionalExtension, Row, Transaction};

use super::{format_record_date, parse_record_date, Store, StoreError};
use crate::core::entity::Entity;
use crate::core::identity::{ProductId, RecordId, UserId};
use crate::core::summary::DateRange;
use crate::entities::measurement::MeasurementEntry;
use crate::entities::record::ProductionRecord;

const RECORD_COLUMNS: &str =
    "id, product_id, standard_id, machine_number, quantity_measured, record_date, created_by";

const MEASUREMENT_COLUMNS: &str =
    "id, record_id, item_number, visual_ok, height_ok, weight, rim_thickness, load";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ProductionRecord> {
    Ok(ProductionRecord {
        id: Some(row.get(0)?),
        product_id: row.get(1)?,
        standard_id: row.get(2)?,
        machine_number: row.get(3)?,
        quantity_measured: row.get(4)?,
        record_date: parse_record_date(row, 5)?,
        created_by: row.get(6)?,
    })
}

fn measurement_from_row(row: &Row<'_>) -> rusqlite::Result<MeasurementEntry> {
    Ok(MeasurementEntry {
        id: Some(row.get(0)?),
        record_id: Some(row.get(1)?),
        item_number: row.get(2)?,
        visual_ok: row.get(3)?,
        height_ok: row.get(4)?,
        weight: row.get(5)?,
        rim_thickness: row.get(6)?,
        load: row.get(7)?,
    })
}

impl Store {
    fn query_records(
        &self,
        filter: &str,
        args: impl rusqlite::Params,
    ) -> Result<Vec<ProductionRecord>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM production_records {filter}
             ORDER BY record_date DESC, id DESC"
        ))?;
        let records = stmt
            .query_map(args, record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(count = records.len(), filter, "listed records");
        Ok(records)
    }

    /// All records, newest first
    pub fn list_records(&self) -> Result<Vec<ProductionRecord>, StoreError> {
        self.query_records("", [])
    }

    pub fn list_records_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductionRecord>, StoreError> {
        self.query_records("WHERE product_id = ?1", params![product_id])
    }

    pub fn list_records_by_user(&self, user_id: UserId) -> Result<Vec<ProductionRecord>, StoreError> {
        self.query_records("WHERE created_by = ?1", params![user_id])
    }

    /// Records whose calendar date falls inside the range (both ends inclusive)
    pub fn list_records_in_range(
        &self,
        range: &DateRange,
    ) -> Result<Vec<ProductionRecord>, StoreError> {
        self.query_records(
            "WHERE date(record_date) BETWEEN ?1 AND ?2",
            params![
                range.start.format("%Y-%m-%d").to_string(),
                range.end.format("%Y-%m-%d").to_string()
            ],
        )
    }

    pub fn get_record(&self, id: RecordId) -> Result<Option<ProductionRecord>, StoreError> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM production_records WHERE id = ?1"),
                params![id],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Measurements of one record ordered by item number
    pub fn measurements_for_record(
        &self,
        record_id: RecordId,
    ) -> Result<Vec<MeasurementEntry>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEASUREMENT_COLUMNS} FROM measurement_entries
             WHERE record_id = ?1 ORDER BY item_number"
        ))?;
        let entries = stmt
            .query_map(params![record_id], measurement_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Save a record and its measurements atomically
    ///
    /// On update, all prior measurements of the record are replaced. If any
    /// write fails the transaction is rolled back and nothing is persisted.
    pub fn save_record_with_measurements(
        &mut self,
        record: &ProductionRecord,
        measurements: &[MeasurementEntry],
    ) -> Result<RecordId, StoreError> {
        let tx = self.conn.transaction()?;

        let record_id = write_record(&tx, record).map_err(|source| {
            tracing::error!(error = %source, "record write failed");
            StoreError::RecordWrite { source }
        })?;

        for entry in measurements {
            write_measurement(&tx, record_id, entry).map_err(|source| {
                tracing::error!(
                    record = %record_id,
                    item = entry.item_number,
                    error = %source,
                    "measurement write failed, rolling back"
                );
                StoreError::MeasurementWrite {
                    item_number: entry.item_number,
                    source,
                }
            })?;
        }

        tx.commit()?;
        tracing::info!(
            record = %record_id,
            items = measurements.len(),
            "saved production record"
        );
        Ok(record_id)
    }

    /// Delete a record and its measurements
    pub fn delete_record(&self, id: RecordId) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM production_records WHERE id = ?1", params![id])?;
        if removed > 0 {
            tracing::info!(%id, "deleted production record");
        }
        Ok(removed > 0)
    }
}

fn write_record(tx: &Transaction<'_>, record: &ProductionRecord) -> rusqlite::Result<RecordId> {
    let date = format_record_date(&record.record_date);
    match record.id() {
        None => {
            tx.execute(
                "INSERT INTO production_records
                    (product_id, standard_id, machine_number, quantity_measured, record_date, created_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.product_id,
                    record.standard_id,
                    record.machine_number,
                    record.quantity_measured,
                    date,
                    record.created_by,
                ],
            )?;
            Ok(RecordId(tx.last_insert_rowid()))
        }
        Some(id) => {
            let changed = tx.execute(
                "UPDATE production_records SET
                    product_id = ?1, standard_id = ?2, machine_number = ?3,
                    quantity_measured = ?4, record_date = ?5, created_by = ?6
                 WHERE id = ?7",
                params![
                    record.product_id,
                    record.standard_id,
                    record.machine_number,
                    record.quantity_measured,
                    date,
                    record.created_by,
                    id,
                ],
            )?;
            if changed == 0 {
                return Err(rusqlite::Error::QueryReturnedNoRows);
            }
            tx.execute(
                "DELETE FROM measurement_entries WHERE record_id = ?1",
                params![id],
            )?;
            Ok(id)
        }
    }
}

fn write_measurement(
    tx: &Transaction<'_>,
    record_id: RecordId,
    entry: &MeasurementEntry,
) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO measurement_entries
            (record_id, item_number, visual_ok, height_ok, weight, rim_thickness, load)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record_id,
            entry.item_number,
            entry.visual_ok,
            entry.height_ok,
            entry.weight,
            entry.rim_thickness,
            entry.load,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::StandardId;
    use crate::core::tolerance::ToleranceBand;
    use crate::entities::product::Product;
    use crate::entities::standard::ProductStandard;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn seed(store: &Store) -> (ProductId, StandardId) {
        let product = store
            .save_product(&Product::new("Cup 250", "PN-250", None))
            .unwrap();
        let mut s = ProductStandard::new(product, "M-01", 3, None);
        s.weight = ToleranceBand::new(100.0, 2.0, 3.0);
        let standard = store.save_standard(&s).unwrap();
        (product, standard)
    }

    fn record(product: ProductId, standard: StandardId, date: NaiveDateTime) -> ProductionRecord {
        ProductionRecord {
            id: None,
            product_id: product,
            standard_id: standard,
            machine_number: "M-01".to_string(),
            quantity_measured: 3,
            record_date: date,
            created_by: None,
        }
    }

    fn rows(weights: &[f64]) -> Vec<MeasurementEntry> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| MeasurementEntry {
                weight: Some(*w),
                rim_thickness: Some(1.5),
                load: Some(40.0),
                ..MeasurementEntry::blank(i as u32 + 1)
            })
            .collect()
    }

    #[test]
    fn test_save_and_read_back_sorted() {
        let mut store = Store::open_in_memory().unwrap();
        let (product, standard) = seed(&store);

        let mut entries = rows(&[100.0, 101.0, 99.0]);
        entries.reverse();
        let id = store
            .save_record_with_measurements(&record(product, standard, at(1, 8)), &entries)
            .unwrap();

        let saved = store.measurements_for_record(id).unwrap();
        let items: Vec<u32> = saved.iter().map(|m| m.item_number).collect();
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(saved[0].weight, Some(100.0));
        assert_eq!(saved[0].record_id, Some(id));

        let r = store.get_record(id).unwrap().unwrap();
        assert_eq!(r.record_date, at(1, 8));
    }

    #[test]
    fn test_unset_values_stay_unset() {
        let mut store = Store::open_in_memory().unwrap();
        let (product, standard) = seed(&store);
        let id = store
            .save_record_with_measurements(
                &record(product, standard, at(1, 8)),
                &[MeasurementEntry::blank(1)],
            )
            .unwrap();
        let saved = store.measurements_for_record(id).unwrap();
        assert_eq!(saved[0].weight, None);
        assert_eq!(saved[0].load, None);
    }

    #[test]
    fn test_failed_measurement_rolls_back_record() {
        let mut store = Store::open_in_memory().unwrap();
        let (product, standard) = seed(&store);

        let mut entries = rows(&[100.0, 100.0]);
        entries[1].item_number = 0;
        let err = store
            .save_record_with_measurements(&record(product, standard, at(1, 8)), &entries)
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::MeasurementWrite { item_number: 0, .. }
        ));
        assert!(store.list_records().unwrap().is_empty());
    }

    #[test]
    fn test_failed_record_write_reports_record() {
        let mut store = Store::open_in_memory().unwrap();
        let (product, _) = seed(&store);
        let orphan = record(product, StandardId(999), at(1, 8));
        let err = store
            .save_record_with_measurements(&orphan, &rows(&[100.0]))
            .unwrap_err();
        assert!(matches!(err, StoreError::RecordWrite { .. }));
    }

    #[test]
    fn test_update_replaces_measurements() {
        let mut store = Store::open_in_memory().unwrap();
        let (product, standard) = seed(&store);
        let id = store
            .save_record_with_measurements(
                &record(product, standard, at(1, 8)),
                &rows(&[100.0, 100.0, 100.0]),
            )
            .unwrap();

        let mut existing = store.get_record(id).unwrap().unwrap();
        existing.quantity_measured = 2;
        let again = store
            .save_record_with_measurements(&existing, &rows(&[98.0, 99.0]))
            .unwrap();
        assert_eq!(again, id);

        let saved = store.measurements_for_record(id).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].weight, Some(98.0));
        assert_eq!(store.list_records().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_record_removes_measurements() {
        let mut store = Store::open_in_memory().unwrap();
        let (product, standard) = seed(&store);
        let id = store
            .save_record_with_measurements(&record(product, standard, at(1, 8)), &rows(&[100.0]))
            .unwrap();

        assert!(store.delete_record(id).unwrap());
        assert!(store.get_record(id).unwrap().is_none());
        assert!(store.measurements_for_record(id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_product_cascades_to_records() {
        let mut store = Store::open_in_memory().unwrap();
        let (product, standard) = seed(&store);
        let id = store
            .save_record_with_measurements(&record(product, standard, at(1, 8)), &rows(&[100.0]))
            .unwrap();

        store.delete_product(product).unwrap();
        assert!(store.get_record(id).unwrap().is_none());
        assert!(store.measurements_for_record(id).unwrap().is_empty());
    }

    #[test]
    fn test_range_query_is_inclusive() {
        let mut store = Store::open_in_memory().unwrap();
        let (product, standard) = seed(&store);
        for (day, hour) in [(1, 0), (15, 12), (31, 23), (29, 23)] {
            let mut r = record(product, standard, at(day, hour));
            if day == 29 {
                r.record_date = NaiveDate::from_ymd_opt(2024, 2, 29)
                    .unwrap()
                    .and_hms_opt(23, 59, 0)
                    .unwrap();
            }
            store.save_record_with_measurements(&r, &rows(&[100.0])).unwrap();
        }

        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        );
        let found = store.list_records_in_range(&range).unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].record_date, at(31, 23));
    }

    #[test]
    fn test_records_by_product_and_user() {
        let mut store = Store::open_in_memory().unwrap();
        let (product, standard) = seed(&store);
        let admin = store.get_user_by_username("admin").unwrap().unwrap();

        let mut mine = record(product, standard, at(2, 8));
        mine.created_by = admin.id;
        store.save_record_with_measurements(&mine, &rows(&[100.0])).unwrap();
        store
            .save_record_with_measurements(&record(product, standard, at(3, 8)), &rows(&[100.0]))
            .unwrap();

        assert_eq!(store.list_records_by_product(product).unwrap().len(), 2);
        assert_eq!(
            store
                .list_records_by_user(admin.id.unwrap())
                .unwrap()
                .len(),
            1
        );
    }
}
