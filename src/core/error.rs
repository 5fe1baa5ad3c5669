//! Error types shared by the service layer
//!
//! Lookups that find nothing return `Ok(None)` from the store; the
//! variants here cover rejected input, credentials and gating.

use miette::Diagnostic;
use thiserror::Error;

use crate::core::store::StoreError;

/// Input rejected before anything is written
#[derive(Debug, Clone, Error, Diagnostic, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    #[diagnostic(code(pqc::validation::required))]
    Required { field: &'static str },

    #[error("username '{0}' already exists")]
    #[diagnostic(code(pqc::validation::duplicate_username))]
    DuplicateUsername(String),

    #[error("product number '{0}' already exists")]
    #[diagnostic(code(pqc::validation::duplicate_product_number))]
    DuplicateProductNumber(String),

    #[error("quantity per cycle must be greater than zero")]
    #[diagnostic(code(pqc::validation::quantity))]
    InvalidQuantity,

    #[error("invalid {dimension} tolerance: {reason}")]
    #[diagnostic(code(pqc::validation::tolerance))]
    InvalidTolerance {
        dimension: &'static str,
        reason: String,
    },

    #[error("you cannot delete your own account")]
    #[diagnostic(code(pqc::validation::self_delete))]
    SelfDeletion,

    #[error("record is incomplete: items {} are missing weight, rim thickness or load", format_items(.missing_items))]
    #[diagnostic(
        code(pqc::validation::incomplete),
        help("every item needs a positive weight, rim thickness and load before saving")
    )]
    IncompleteRecord { missing_items: Vec<u32> },

    #[error("item {item} is outside the record (1..={quantity})")]
    #[diagnostic(code(pqc::validation::item_number))]
    ItemOutOfRange { item: u32, quantity: u32 },
}

fn format_items(items: &[u32]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Credential and permission failures
#[derive(Debug, Error, Diagnostic)]
pub enum AuthError {
    /// Deliberately the same message for unknown users and wrong passwords
    #[error("invalid username or password")]
    #[diagnostic(code(pqc::auth::invalid_credentials))]
    InvalidCredentials,

    #[error("not logged in")]
    #[diagnostic(code(pqc::auth::not_logged_in), help("run `pqc login` first"))]
    NotLoggedIn,

    #[error("administrator rights required")]
    #[diagnostic(code(pqc::auth::admin_required))]
    AdminRequired,

    #[error("password hashing failed: {0}")]
    #[diagnostic(code(pqc::auth::hash))]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Umbrella error for service operations
#[derive(Debug, Error, Diagnostic)]
pub enum QcError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error("{kind} not found: {id}")]
    #[diagnostic(code(pqc::not_found))]
    NotFound { kind: &'static str, id: String },
}

impl QcError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        QcError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Convenience alias for service results
pub type QcResult<T> = Result<T, QcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_record_lists_items() {
        let err = ValidationError::IncompleteRecord {
            missing_items: vec![2, 5],
        };
        assert_eq!(
            err.to_string(),
            "record is incomplete: items 2, 5 are missing weight, rim thickness or load"
        );
    }

    #[test]
    fn test_credentials_message_is_generic() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "invalid username or password"
        );
    }

    #[test]
    fn test_not_found_formatting() {
        let err = QcError::not_found("product", "PN-9");
        assert_eq!(err.to_string(), "product not found: PN-9");
    }
}
