//! Numerical solvers
//!
//! This module advances sampled fields in time.
//!
//! # Core Concepts
//!
//! 1. **Equation** ([`Rhs`](crate::equation::Rhs) + [`Domain`](crate::equation::Domain)) - WHAT to solve
//!    - Spatial operator built from stencils
//!    - Initial field
//!
//! 2. **Solver** ([`PdeSolver`], [`PdeMultiSolver`]) - the discretisation
//!    - Time step `dt` and grid spacing `dx`, fixed at construction
//!    - Time integrator ([`ForwardEuler`], [`RungeKutta4`])
//!    - Lifecycle ([`SolverState`])
//!
//! 3. **Configuration** ([`SolverConfiguration`]) - HOW LONG and WHAT to record
//!    - Stop condition (steps or simulated time)
//!    - Snapshot subsampling
//!    - Cancellation
//!
//! Snapshots are pushed into a [`Storage`](crate::output::Storage) sink given
//! to each `solve` call.
//!
//! # Module Organization
//!
//! - **`traits`**: [`SolverBase`], configuration, lifecycle and report types
//! - **`error`**: initialization and execution error taxonomy
//! - **`spacing`**: grid spacing policies ([`GridSpacer`])
//! - **`methods`**: time integrators ([`TimeIntegrator`])
//! - **`pde`**: single-domain solver
//! - **`multi`**: lockstep multi-domain solver
//!
//! # Quick Start Example
//!
//! ```rust
//! use pde_rs::equation::{Domain, from_fn};
//! use pde_rs::operators::laplacian;
//! use pde_rs::output::MemoryStorage;
//! use pde_rs::solver::{PdeSolver, SolverBase, SolverConfiguration};
//!
//! # fn main() -> Result<(), pde_rs::solver::SolverError> {
//! let heat = from_fn(|u: &[f64], i: usize, dx: f64| 0.1 * laplacian(u, i, dx));
//! let domain = Domain::sampled(64, 0.1, |x| (x * std::f64::consts::PI / 3.2).sin());
//!
//! let mut solver = PdeSolver::builder(domain, heat)
//!     .dt(0.01)
//!     .dx(0.1)
//!     .build()?;
//!
//! let mut storage = MemoryStorage::new();
//! let report = solver.solve(&mut storage, &SolverConfiguration::steps(100).output_every(10))?;
//!
//! assert!(report.is_completed());
//! assert_eq!(storage.len(), 11);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Construction returns [`SolverInitializationError`]; no half-built solver
//! is ever handed out. `solve` returns [`SolverExecutionError`], which is
//! fatal: the solver moves to [`SolverState::Failed`] and must be
//! [`reset`](SolverBase::reset) before reuse.
//!
//! Common errors:
//! - Automatic spacing requested without a concrete policy
//! - Non-finite values (instability, `dx = 0`)
//! - Storage sink refusing snapshots

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod error;
pub mod methods;
pub mod multi;
pub mod pde;
mod run;
pub mod spacing;
pub mod traits;

// =================================================================================================
// Sweep parallelism
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Grid size from which a right-hand side sweep is handed to Rayon
///
/// Smaller grids are swept on the calling thread: a stencil evaluation costs
/// a handful of flops, far less than a work-stealing split.
const DEFAULT_PARALLEL_THRESHOLD: usize = 999;

/// Process-wide sweep threshold, relaxed ordering (a tuning knob only)
static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Number of grid points a domain must exceed before its sweeps run in parallel
///
/// Has no effect unless the crate is built with the `parallel` feature.
///
/// # Example
///
/// ```rust
/// use pde_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() >= 1);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Change the grid size from which sweeps run in parallel
///
/// Applies to every solver in the process, including runs already in
/// progress (from their next sweep on). `usize::MAX` keeps every sweep
/// sequential; 1 parallelises everything but single-point domains.
///
/// # Panics
///
/// Panics when `threshold == 0`.
///
/// # Example
///
/// ```rust
/// use pde_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let saved = parallel_threshold();
/// set_parallel_threshold(4096);
/// assert_eq!(parallel_threshold(), 4096);
/// set_parallel_threshold(saved);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// Serializes threshold overrides between concurrently running unit tests
#[cfg(test)]
static OVERRIDE_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Scoped threshold override for unit tests; the old value comes back on drop
///
/// Only one override is alive at a time: a second one blocks until the
/// first is dropped.
#[cfg(test)]
pub(crate) struct ThresholdOverride {
    saved: usize,
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
impl ThresholdOverride {
    pub(crate) fn new(threshold: usize) -> Self {
        // A test that panicked while holding the lock still restored the value
        let lock = OVERRIDE_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let saved = parallel_threshold();
        set_parallel_threshold(threshold);
        Self { saved, _lock: lock }
    }
}

#[cfg(test)]
impl Drop for ThresholdOverride {
    fn drop(&mut self) {
        PARALLEL_THRESHOLD.store(self.saved, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use error::{SolverError, SolverExecutionError, SolverInitializationError, SpacingError};
pub use methods::{Derivative, ForwardEuler, RungeKutta4, TimeIntegrator};
pub use multi::{CouplingTerm, FnCoupling, PdeMultiSolver, PdeMultiSolverBuilder, coupling_fn};
pub use pde::{DEFAULT_DT, PdeSolver, PdeSolverBuilder};
pub use spacing::{
    CflSpacer, FixedSpacer, GridSpacer, GridSpacing, SpacingRequest, UnimplementedSpacer,
};
pub use traits::{
    CancellationToken, SolveOutcome, SolveReport, SolverBase, SolverConfiguration, SolverState,
    StopCondition,
};

// =================================================================================================
// Helper Functions
// =================================================================================================

use crate::equation::{Domain, RhsError};

/// Evaluate `f` at every grid index and collect the slopes
///
/// All calls read the same (old) input; the result is assembled only after
/// every index succeeded. The first failing index aborts the sweep. Above
/// [`parallel_threshold()`] the evaluation order (and so which of several
/// failing indices is reported) is unspecified.
///
/// # Arguments
///
/// * `len` - Number of grid points
/// * `step` - Step being computed (for error reporting)
/// * `f` - Per-index evaluation
pub(crate) fn evaluate_sweep<F>(len: usize, step: usize, f: F) -> Result<Domain, SolverExecutionError>
where
    F: Fn(usize) -> Result<f64, RhsError> + Send + Sync,
{
    let evaluate = |index: usize| -> Result<f64, SolverExecutionError> {
        let value = f(index).map_err(|source| SolverExecutionError::Rhs { step, index, source })?;
        if !value.is_finite() {
            return Err(SolverExecutionError::NonFinite { step, index, value });
        }
        Ok(value)
    };

    #[cfg(feature = "parallel")]
    let values: Vec<f64> = if len > parallel_threshold() {
        (0..len).into_par_iter().map(evaluate).collect::<Result<_, _>>()?
    } else {
        (0..len).map(evaluate).collect::<Result<_, _>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let values: Vec<f64> = (0..len).map(evaluate).collect::<Result<_, _>>()?;

    Ok(Domain::new(values))
}

/// Validate a committed domain for numerical issues
///
/// NaN arises from 0/0 or Inf - Inf; Inf from overflow or division by zero.
/// Either indicates instability (dt too large for dx) or a degenerate `dx`.
///
/// # Example
///
/// ```rust,ignore
/// validate_state(&domain, 42)?;  // Validates the domain of step 42
/// ```
pub(crate) fn validate_state(domain: &Domain, step: usize) -> Result<(), SolverExecutionError> {
    match domain.first_non_finite() {
        Some((index, value)) => Err(SolverExecutionError::NonFinite { step, index, value }),
        None => Ok(()),
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_defaults_below_a_thousand_points() {
        assert_eq!(DEFAULT_PARALLEL_THRESHOLD, 999);
    }

    #[test]
    #[should_panic(expected = "parallel threshold must be at least 1")]
    fn test_zero_threshold_is_refused() {
        set_parallel_threshold(0);
    }

    #[test]
    fn test_override_is_scoped() {
        let first = ThresholdOverride::new(64);
        assert_eq!(parallel_threshold(), 64);

        let seen = std::thread::spawn(parallel_threshold).join().unwrap();
        assert_eq!(seen, 64);

        let outer = first.saved;
        drop(first);

        // Whatever ran in between restored its own value, so the next
        // override starts from the value the first one put back
        let second = ThresholdOverride::new(32);
        assert_eq!(second.saved, outer);
        assert_eq!(parallel_threshold(), 32);
    }

    #[test]
    fn test_sweep_parallel_matches_sequential() {
        let f = |i: usize| Ok((i as f64 * 0.37).sin());
        let sequential = evaluate_sweep(2000, 1, f).unwrap();

        let _override = ThresholdOverride::new(10);
        let parallel = evaluate_sweep(2000, 1, f).unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_sweep_reports_non_finite_index() {
        let result = evaluate_sweep(4, 7, |i| Ok(if i == 2 { f64::NAN } else { 1.0 }));
        match result {
            Err(SolverExecutionError::NonFinite { step, index, value }) => {
                assert_eq!(step, 7);
                assert_eq!(index, 2);
                assert!(value.is_nan());
            }
            other => panic!("expected NonFinite, got {:?}", other),
        }
    }

    #[test]
    fn test_sweep_reports_rhs_failure() {
        let result = evaluate_sweep(4, 3, |i| {
            if i == 1 {
                Err(RhsError::failed("bad input"))
            } else {
                Ok(0.0)
            }
        });
        assert!(matches!(result, Err(SolverExecutionError::Rhs { step: 3, index: 1, .. })));
    }

    #[test]
    fn test_validate_state() {
        assert!(validate_state(&Domain::new(vec![1.0, 2.0]), 1).is_ok());

        let error = validate_state(&Domain::new(vec![1.0, f64::INFINITY]), 9).unwrap_err();
        assert!(matches!(error, SolverExecutionError::NonFinite { step: 9, index: 1, .. }));
    }
}
