//! Typed row identifiers
//!
//! Every persisted entity is keyed by an SQLite `INTEGER PRIMARY KEY`.
//! Wrapping the raw `i64` per entity type keeps a product id from being
//! passed where a standard id is expected.

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing an identifier from user input
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("invalid {kind} id '{input}': expected a positive number")]
    NotANumber { kind: &'static str, input: String },

    #[error("invalid {kind} id '{input}': ids start at 1")]
    NotPositive { kind: &'static str, input: String },
}

fn parse_row_id(kind: &'static str, input: &str) -> Result<i64, IdParseError> {
    let trimmed = input.trim().trim_start_matches('#');
    let value: i64 = trimmed.parse().map_err(|_| IdParseError::NotANumber {
        kind,
        input: input.to_string(),
    })?;
    if value < 1 {
        return Err(IdParseError::NotPositive {
            kind,
            input: input.to_string(),
        });
    }
    Ok(value)
}

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Human-readable entity kind, used in messages
            pub const KIND: &'static str = $kind;

            /// The raw SQLite rowid
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_row_id($kind, s).map($name)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map($name)
            }
        }
    };
}

row_id!(
    /// Identifies a [`User`](crate::entities::user::User)
    UserId,
    "user"
);
row_id!(
    /// Identifies a [`Product`](crate::entities::product::Product)
    ProductId,
    "product"
);
row_id!(
    /// Identifies a [`ProductStandard`](crate::entities::standard::ProductStandard)
    StandardId,
    "standard"
);
row_id!(
    /// Identifies a [`ProductionRecord`](crate::entities::record::ProductionRecord)
    RecordId,
    "record"
);
row_id!(
    /// Identifies a [`MeasurementEntry`](crate::entities::measurement::MeasurementEntry)
    MeasurementId,
    "measurement"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_hash_prefixed() {
        assert_eq!("12".parse::<RecordId>().unwrap(), RecordId(12));
        assert_eq!("#7".parse::<ProductId>().unwrap(), ProductId(7));
        assert_eq!(" 3 ".parse::<UserId>().unwrap(), UserId(3));
    }

    #[test]
    fn test_parse_rejects_garbage_and_zero() {
        let err = "abc".parse::<StandardId>().unwrap_err();
        assert!(matches!(err, IdParseError::NotANumber { kind: "standard", .. }));

        let err = "0".parse::<RecordId>().unwrap_err();
        assert!(matches!(err, IdParseError::NotPositive { .. }));
    }

    #[test]
    fn test_display_is_bare_number() {
        assert_eq!(ProductId(42).to_string(), "42");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&UserId(5)).unwrap();
        assert_eq!(json, "5");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UserId(5));
    }
}
