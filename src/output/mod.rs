//! Output module for simulation results
//!
//! Solvers push [`Snapshot`]s into a [`Storage`] sink supplied to each
//! `solve` call:
//! - **[`MemoryStorage`]**: keeps every snapshot, for tests and analysis
//! - **[`CsvStorage`]**: streams rows to a file or any writer
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs              ← This file
//! ├── storage.rs          ← Storage trait, snapshots, in-memory sink
//! └── export/             ← File formats
//!     ├── mod.rs
//!     └── csv.rs
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use pde_rs::output::{MemoryStorage, Snapshot, Storage};
//!
//! let mut storage = MemoryStorage::new();
//! storage.accept(&Snapshot::new(0, 0, 0.0, &[1.0, 2.0])).unwrap();
//! assert_eq!(storage.latest(0), Some(&[1.0, 2.0][..]));
//! ```
//!
//! # Implementing a Sink
//!
//! ```rust
//! use pde_rs::output::{Snapshot, Storage, StorageError};
//!
//! /// Keeps only the peak amplitude of each snapshot
//! #[derive(Default)]
//! struct PeakTracker {
//!     peaks: Vec<f64>,
//! }
//!
//! impl Storage for PeakTracker {
//!     fn accept(&mut self, snapshot: &Snapshot<'_>) -> Result<(), StorageError> {
//!         let peak = snapshot.values.iter().fold(0.0f64, |m, v| m.max(v.abs()));
//!         self.peaks.push(peak);
//!         Ok(())
//!     }
//! }
//! ```

pub mod export;
pub mod storage;

pub use export::{CsvConfig, CsvMetadata, CsvStorage};
pub use storage::{MemoryStorage, Record, Snapshot, Storage, StorageError};
