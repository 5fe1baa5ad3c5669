//! Command implementations

pub mod auth;
pub mod compare;
pub mod completions;
pub mod entry;
pub mod init;
pub mod product;
pub mod record;
pub mod standard;
pub mod user;
