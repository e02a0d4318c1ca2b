//! Command implementations

pub mod install;
pub mod plan;
pub mod version;
