//! PlasticQC: line quality-control for plastics production
//!
//! Operators record per-item measurements against a product's machine
//! standard; administrators maintain users, products and tolerance
//! standards, browse history, compare quality and export records.

pub mod cli;
pub mod core;
pub mod entities;
pub mod export;
