//! CLI command implementations.

pub mod history;
pub mod profile;
pub mod sweep;
pub mod version;
