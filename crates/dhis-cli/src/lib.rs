//! Library half of the `dhis2-viewer` binary.
//!
//! Holds the pieces shared between the binary and its integration tests:
//! logging setup, the settings file, terminal rendering and the tables of a
//! full dashboard export.

pub mod export_all;
pub mod logging;
pub mod render;
pub mod settings;
