// File I/O around the reconciliation engine

pub mod csv;
pub mod discover;
pub mod xlsx;
