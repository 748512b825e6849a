//! `tripsheet-reconcile`: header discovery and field reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded sheet grids, returns normalized
//! records plus per-sheet reports. No CLI or IO dependencies.

pub mod cell;
pub mod config;
pub mod cost_center;
pub mod date;
pub mod engine;
pub mod error;
pub mod fields;
pub mod header;
pub mod model;
pub mod project;

pub use config::Profile;
pub use engine::run;
pub use error::ReconcileError;
pub use model::{CellValue, OutputRecord, RawGrid, SheetReport, Workbook, WorkbookOutcome};
