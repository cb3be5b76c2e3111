//! Supplier registration backend centered on the profile change arbitration
//! engine: vendor-submitted profile edits are split by field sensitivity into
//! immediate updates and admin-reviewed change requests.

pub mod config;
pub mod error;
pub mod profile;
pub mod telemetry;
