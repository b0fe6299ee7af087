//! File export of simulation snapshots
//!
//! # Architecture
//!
//! Each format is a [`Storage`](crate::output::Storage) implementation in its
//! own sub-module, so a solver streams into a file exactly as it streams into
//! memory. Adding a format means adding a file.
//!
//! # Available formats
//!
//! | Format  | Module  |
//! |---------|---------|
//! | CSV     | [`csv`] |
//!
//! # Usage example
//!
//! ```rust,ignore
//! use pde_rs::output::export::{CsvConfig, CsvStorage};
//!
//! let mut storage = CsvStorage::create("run.csv", CsvConfig::default())?;
//! solver.solve(&mut storage, &SolverConfiguration::steps(500).output_every(50))?;
//! ```

pub mod csv;

pub use csv::{CsvConfig, CsvMetadata, CsvStorage};
