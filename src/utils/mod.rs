//! This module aggregates various utility submodules used throughout the application.

/// Reading and writing the JSON files kept under the data directory.
pub mod json_store;
/// UTC time helpers.
pub mod time;
