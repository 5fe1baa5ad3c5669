//! Core module - storage, evaluation, sessions and services

pub mod accounts;
pub mod catalog;
pub mod config;
pub mod entity;
pub mod entry;
pub mod error;
pub mod history;
pub mod identity;
pub mod password;
pub mod session;
pub mod store;
pub mod summary;
pub mod tolerance;
pub mod workspace;

pub use config::Config;
pub use entity::Entity;
pub use entry::EntryDraft;
pub use error::{AuthError, QcError, QcResult, ValidationError};
pub use history::{MeasurementRow, RecordDetails, RecordHeader, RecordQuery};
pub use identity::{IdParseError, MeasurementId, ProductId, RecordId, StandardId, UserId};
pub use session::{Session, SessionError};
pub use store::{Store, StoreError};
pub use summary::{ComparisonReport, DateRange, IssueCounts, RecordSummary};
pub use tolerance::{in_spec, Dimension, ToleranceBand};
pub use workspace::{Workspace, WorkspaceError};
