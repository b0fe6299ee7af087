//! Snapshot storage
//!
//! A [`Storage`] sink receives the domain at selected steps of a run. It is
//! handed to each `solve` call rather than owned by the solver, so one sink
//! can collect several runs and one solver can write to different sinks.
//!
//! Snapshots arrive in increasing simulated time. A multi-domain solver hands
//! over one snapshot per constituent at each recorded step, in constituent
//! order, tagged with [`Snapshot::source`], through a single
//! [`accept_step`](Storage::accept_step) call: a step is stored whole or not
//! at all.

use std::io;

use thiserror::Error;

// =================================================================================================
// Snapshot
// =================================================================================================

/// Borrowed view of a domain at one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<'a> {
    /// Constituent index (always 0 for a single-domain solver)
    pub source: usize,

    /// Global step index
    pub step: usize,

    /// Simulated time, `step · dt`
    pub time: f64,

    /// Domain values
    pub values: &'a [f64],
}

impl<'a> Snapshot<'a> {
    pub fn new(source: usize, step: usize, time: f64, values: &'a [f64]) -> Self {
        Self { source, step, time, values }
    }
}

// =================================================================================================
// Errors
// =================================================================================================

/// Failure of a storage sink
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage is closed")]
    Closed,

    #[error("storage capacity of {capacity} snapshots exceeded")]
    CapacityExceeded { capacity: usize },

    #[error("snapshot has {actual} values but storage expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("invalid storage configuration: {0}")]
    Configuration(String),

    #[error("snapshot rejected: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

// =================================================================================================
// Storage trait
// =================================================================================================

/// Sink for snapshots
pub trait Storage {
    /// Check that snapshots can be accepted; called once before a run starts
    fn ready(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Store one snapshot
    fn accept(&mut self, snapshot: &Snapshot<'_>) -> Result<(), StorageError>;

    /// Store the snapshots of one step, all of them or none
    ///
    /// The default checks [`ready`](Storage::ready) and then accepts the
    /// snapshots in order. Sinks that can reject a snapshot after accepting
    /// earlier ones (capacity, shape, value checks) must override it and
    /// validate the whole batch before writing anything.
    fn accept_step(&mut self, snapshots: &[Snapshot<'_>]) -> Result<(), StorageError> {
        self.ready()?;
        for snapshot in snapshots {
            self.accept(snapshot)?;
        }
        Ok(())
    }

    /// Called once after a run that did not fail
    fn flush(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn ready(&self) -> Result<(), StorageError> {
        (**self).ready()
    }

    fn accept(&mut self, snapshot: &Snapshot<'_>) -> Result<(), StorageError> {
        (**self).accept(snapshot)
    }

    fn accept_step(&mut self, snapshots: &[Snapshot<'_>]) -> Result<(), StorageError> {
        (**self).accept_step(snapshots)
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        (**self).flush()
    }
}

// =================================================================================================
// In-memory storage
// =================================================================================================

/// Owned copy of a [`Snapshot`]
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub source: usize,
    pub step: usize,
    pub time: f64,
    pub values: Vec<f64>,
}

impl From<&Snapshot<'_>> for Record {
    fn from(snapshot: &Snapshot<'_>) -> Self {
        Self {
            source: snapshot.source,
            step: snapshot.step,
            time: snapshot.time,
            values: snapshot.values.to_vec(),
        }
    }
}

/// Keeps every snapshot in memory
///
/// # Example
///
/// ```rust
/// use pde_rs::output::{MemoryStorage, Snapshot, Storage};
///
/// let mut storage = MemoryStorage::with_capacity_limit(1);
/// storage.accept(&Snapshot::new(0, 0, 0.0, &[1.0, 2.0])).unwrap();
/// assert!(storage.accept(&Snapshot::new(0, 1, 0.1, &[1.0, 2.0])).is_err());
/// assert_eq!(storage.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: Vec<Record>,
    capacity_limit: Option<usize>,
    closed: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects snapshots beyond `limit`
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            capacity_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Refuse any further snapshot
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in arrival order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Records of one constituent
    pub fn for_source(&self, source: usize) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |record| record.source == source)
    }

    /// Most recent values of one constituent
    pub fn latest(&self, source: usize) -> Option<&[f64]> {
        self.records
            .iter()
            .rev()
            .find(|record| record.source == source)
            .map(|record| record.values.as_slice())
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Storage for MemoryStorage {
    fn ready(&self) -> Result<(), StorageError> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        Ok(())
    }

    fn accept(&mut self, snapshot: &Snapshot<'_>) -> Result<(), StorageError> {
        self.accept_step(std::slice::from_ref(snapshot))
    }

    fn accept_step(&mut self, snapshots: &[Snapshot<'_>]) -> Result<(), StorageError> {
        self.ready()?;
        if let Some(capacity) = self.capacity_limit {
            if self.records.len() + snapshots.len() > capacity {
                return Err(StorageError::CapacityExceeded { capacity });
            }
        }
        self.records.extend(snapshots.iter().map(Record::from));
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
