//! SQLite-backed entity store
//!
//! One database file per workspace (`.pqc/plasticqc.db`) holding users,
//! products, standards, production records and their measurements.
//!
//! Lookups that find nothing return `Ok(None)` or an empty `Vec`. Every
//! `save_*` inserts when the entity has no id yet and updates otherwise,
//! returning the id either way.

mod catalog;
mod records;
mod schema;
mod users;

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use miette::Diagnostic;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use thiserror::Error;

use crate::core::password::hash_password;
use crate::entities::user::{User, BOOTSTRAP_USERNAME};

/// Current schema version; an existing database with another version is refused
pub const SCHEMA_VERSION: i32 = 1;

/// Storage format for record dates (local wall-clock time)
const RECORD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stock password of the seeded administrator
pub const BOOTSTRAP_PASSWORD: &str = "password";
const BOOTSTRAP_FULL_NAME: &str = "Administrator";

/// Errors raised by the store
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("database error: {0}")]
    #[diagnostic(code(pqc::store::sqlite))]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {found} does not match expected version {expected}")]
    #[diagnostic(
        code(pqc::store::schema_mismatch),
        help("this database was written by a different version of pqc; it has not been modified")
    )]
    SchemaMismatch { found: i32, expected: i32 },

    #[error("could not write production record; nothing was saved")]
    #[diagnostic(code(pqc::store::record_write))]
    RecordWrite {
        #[source]
        source: rusqlite::Error,
    },

    #[error("could not write measurement for item {item_number}; the record was rolled back")]
    #[diagnostic(code(pqc::store::measurement_write))]
    MeasurementWrite {
        item_number: u32,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{entity} {id} no longer exists")]
    #[diagnostic(code(pqc::store::missing))]
    Missing { entity: &'static str, id: i64 },

    #[error("could not hash bootstrap password: {0}")]
    #[diagnostic(code(pqc::store::hash))]
    Hash(#[from] bcrypt::BcryptError),

    #[error("could not create database directory: {0}")]
    #[diagnostic(code(pqc::store::io))]
    Io(#[from] std::io::Error),
}

/// The entity store backed by SQLite
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        tracing::debug!(path = %path.display(), "opening store");
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Fresh in-memory database, used by tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Self { conn };
        store.init_schema()?;
        store.bootstrap_admin()?;
        Ok(store)
    }

    /// Seed the default administrator when no `admin` user exists
    ///
    /// Returns true if a user was created.
    pub fn bootstrap_admin(&self) -> Result<bool, StoreError> {
        if self.get_user_by_username(BOOTSTRAP_USERNAME)?.is_some() {
            return Ok(false);
        }
        let hash = hash_password(BOOTSTRAP_PASSWORD)?;
        let admin = User::new(BOOTSTRAP_USERNAME, hash, BOOTSTRAP_FULL_NAME, true);
        self.save_user(&admin)?;
        tracing::warn!(
            username = BOOTSTRAP_USERNAME,
            "created default administrator with the stock password; change it with `pqc user edit`"
        );
        Ok(true)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Read an RFC 3339 timestamp column; malformed text is a conversion error
fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, &text, e))
}

fn format_record_date(date: &NaiveDateTime) -> String {
    date.format(RECORD_DATE_FORMAT).to_string()
}

/// Read a record date column stored as `RECORD_DATE_FORMAT`
fn parse_record_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&text, RECORD_DATE_FORMAT)
        .map_err(|e| conversion_error(idx, &text, e))
}

fn conversion_error(idx: usize, text: &str, err: chrono::ParseError) -> rusqlite::Error {
    tracing::error!(column = idx, value = text, error = %err, "unreadable date in database");
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}
