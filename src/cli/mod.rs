//! Command implementations

pub mod delete;
pub mod import;
pub mod list;
pub mod search;
pub mod show;
pub mod stats;
