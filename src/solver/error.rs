//! Solver error taxonomy
//!
//! - [`SolverInitializationError`]: raised while building a solver, before
//!   any step runs. No partially built solver is returned.
//! - [`SolverExecutionError`]: raised by `solve`. Fatal for the run; the
//!   solver moves to [`SolverState::Failed`](super::SolverState::Failed).
//! - [`SpacingError`]: raised by a grid-spacing policy, surfaced through
//!   `SolverInitializationError::Spacing`.

use thiserror::Error;

use crate::equation::RhsError;
use crate::output::StorageError;

/// Any solver failure
#[derive(Error, Debug)]
pub enum SolverError {
    #[error(transparent)]
    Initialization(#[from] SolverInitializationError),

    #[error(transparent)]
    Execution(#[from] SolverExecutionError),
}

/// Failure while constructing a solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverInitializationError {
    #[error("domain is empty")]
    EmptyDomain,

    #[error("domain sample {index} is not finite ({value})")]
    NonFiniteDomain { index: usize, value: f64 },

    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    #[error("grid spacing must be non-negative and finite, got {0}")]
    InvalidGridSpacing(f64),

    #[error("automatic grid spacing failed: {0}")]
    Spacing(#[from] SpacingError),

    #[error("multi-solver needs at least one constituent")]
    NoConstituents,

    #[error("constituent {member} uses dt = {dt}, expected {expected} for lockstep integration")]
    TimeStepMismatch { member: usize, dt: f64, expected: f64 },

    #[error("constituent {member} is at step {step}, expected {expected} for lockstep integration")]
    StepMismatch { member: usize, step: usize, expected: usize },

    #[error("constituent {member} failed earlier and must be reset before joining")]
    ConstituentFailed { member: usize },

    #[error("coupling term targets constituent {target} but only {count} exist")]
    InvalidCouplingTarget { target: usize, count: usize },
}

/// Failure while running `solve`
#[derive(Error, Debug)]
pub enum SolverExecutionError {
    #[error("storage is not ready to accept snapshots: {0}")]
    StorageUnavailable(#[source] StorageError),

    #[error("storage rejected the snapshot of step {step}: {source}")]
    StorageRejected { step: usize, source: StorageError },

    #[error("storage failed to flush after step {step}: {source}")]
    StorageFlush { step: usize, source: StorageError },

    #[error("right-hand side failed at step {step}, grid index {index}: {source}")]
    Rhs { step: usize, index: usize, source: RhsError },

    #[error("non-finite value {value} at step {step}, grid index {index}")]
    NonFinite { step: usize, index: usize, value: f64 },

    #[error("step {step}: integrator '{integrator}' returned {actual} domains, expected {expected}")]
    IntegratorOutput { step: usize, integrator: String, expected: usize, actual: usize },

    #[error("invalid solver configuration: {0}")]
    InvalidConfiguration(String),

    #[error("solver failed earlier and must be reset before reuse")]
    Poisoned,

    #[error("constituent {member} failed: {source}")]
    Constituent { member: usize, source: Box<SolverExecutionError> },
}

impl SolverExecutionError {
    /// Step at which the failure happened, when known
    pub fn step(&self) -> Option<usize> {
        match self {
            Self::StorageRejected { step, .. }
            | Self::StorageFlush { step, .. }
            | Self::Rhs { step, .. }
            | Self::NonFinite { step, .. }
            | Self::IntegratorOutput { step, .. } => Some(*step),
            Self::Constituent { source, .. } => source.step(),
            Self::StorageUnavailable(_) | Self::InvalidConfiguration(_) | Self::Poisoned => None,
        }
    }
}

/// Failure of a grid-spacing policy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpacingError {
    #[error("grid spacing policy '{policy}' is not implemented; supply an explicit dx or a concrete policy")]
    Unimplemented { policy: String },

    #[error("equation '{equation}' reports no characteristic scale to derive dx from")]
    NoCharacteristicScale { equation: String },

    #[error("invalid spacing policy parameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("policy produced an unusable grid spacing {0}")]
    Degenerate(f64),
}

// =================================================================================================
// Tests
// =================================================================================================
