//! Entity type definitions
//!
//! PlasticQC persists five record types:
//!
//! - [`User`] - operators and administrators
//! - [`Product`] - a moulded product with a unique product number
//! - [`ProductStandard`] - per-machine nominal values and tolerances
//! - [`ProductionRecord`] - one measurement session for a product on a machine
//! - [`MeasurementEntry`] - one item's readings within a record

pub mod measurement;
pub mod product;
pub mod record;
pub mod standard;
pub mod user;

pub use measurement::{MeasurementEntry, MeasurementVerdict};
pub use product::Product;
pub use record::ProductionRecord;
pub use standard::ProductStandard;
pub use user::User;
