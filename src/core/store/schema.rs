//! Database schema initialization

use rusqlite::{params, OptionalExtension};

use super::{Store, StoreError, SCHEMA_VERSION};

impl Store {
    /// Create missing tables and check the stored schema version
    pub(super) fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                full_name TEXT NOT NULL,
                is_admin INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                product_number TEXT NOT NULL UNIQUE,
                created_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS product_standards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                machine_number TEXT NOT NULL,
                quantity_per_cycle INTEGER NOT NULL CHECK (quantity_per_cycle > 0),
                standard_weight REAL NOT NULL,
                weight_plus_tol REAL NOT NULL,
                weight_minus_tol REAL NOT NULL,
                standard_height REAL NOT NULL,
                height_plus_tol REAL NOT NULL,
                height_minus_tol REAL NOT NULL,
                standard_rim_thickness REAL NOT NULL,
                rim_plus_tol REAL NOT NULL,
                rim_minus_tol REAL NOT NULL,
                standard_load REAL NOT NULL,
                load_plus_tol REAL NOT NULL,
                load_minus_tol REAL NOT NULL,
                created_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_standards_product ON product_standards(product_id);

            CREATE TABLE IF NOT EXISTS production_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                standard_id INTEGER NOT NULL REFERENCES product_standards(id) ON DELETE CASCADE,
                machine_number TEXT NOT NULL,
                quantity_measured INTEGER NOT NULL,
                record_date TEXT NOT NULL,
                created_by INTEGER REFERENCES users(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_records_product ON production_records(product_id);
            CREATE INDEX IF NOT EXISTS idx_records_standard ON production_records(standard_id);
            CREATE INDEX IF NOT EXISTS idx_records_date ON production_records(record_date);
            CREATE INDEX IF NOT EXISTS idx_records_creator ON production_records(created_by);

            CREATE TABLE IF NOT EXISTS measurement_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                record_id INTEGER NOT NULL REFERENCES production_records(id) ON DELETE CASCADE,
                item_number INTEGER NOT NULL CHECK (item_number >= 1),
                visual_ok INTEGER NOT NULL,
                height_ok INTEGER NOT NULL,
                weight REAL,
                rim_thickness REAL,
                load REAL,
                UNIQUE (record_id, item_number)
            );
            CREATE INDEX IF NOT EXISTS idx_measurements_record ON measurement_entries(record_id);
            "#,
        )?;

        let stored: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match stored {
            None => {
                self.conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )?;
                tracing::debug!(version = SCHEMA_VERSION, "initialized schema");
                Ok(())
            }
            Some(found) if found == SCHEMA_VERSION => Ok(()),
            Some(found) => {
                tracing::error!(found, expected = SCHEMA_VERSION, "schema version mismatch");
                Err(StoreError::SchemaMismatch {
                    found,
                    expected: SCHEMA_VERSION,
                })
            }
        }
    }
}
