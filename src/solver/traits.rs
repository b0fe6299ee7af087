//! Solver traits and types
//!
//! # Design Philosophy
//!
//! - `SolverBase`: common interface of everything that advances one or more
//!   domains in time ([`PdeSolver`](super::PdeSolver),
//!   [`PdeMultiSolver`](super::PdeMultiSolver))
//! - `SolverConfiguration`: HOW LONG to run and WHAT to record, supplied per
//!   `solve` call so a solver can be rerun against different sinks
//! - `SolverState`: lifecycle of a solver instance
//! - `SolveReport`: what a completed or cancelled run did

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::SolverExecutionError;
use crate::output::Storage;

// =================================================================================================
// Solver lifecycle
// =================================================================================================

/// Lifecycle of a solver
///
/// ```text
/// build ──(validation ok)──▶ Ready ──solve──▶ Stepping ──▶ Done
///                                               │      └──▶ Cancelled
///                                               └─────────▶ Failed ──reset──▶ Ready
/// ```
///
/// `Done` and `Cancelled` solvers can be solved again; they continue from
/// their current domain and time. A `Failed` solver refuses to run until
/// `reset` is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverState {
    Ready,
    Stepping,
    Done,
    Cancelled,
    Failed,
}

impl SolverState {
    /// True when `solve` may be called
    pub fn can_solve(&self) -> bool {
        !matches!(self, Self::Failed | Self::Stepping)
    }
}

impl fmt::Display for SolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ready => "ready",
            Self::Stepping => "stepping",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

// =================================================================================================
// Stop condition
// =================================================================================================

/// When a run stops
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopCondition {
    /// Take exactly this many steps (zero is allowed)
    Steps(usize),

    /// Advance by this much simulated time, rounded up to whole steps
    Duration(f64),
}

impl StopCondition {
    /// Number of steps this condition requires at time step `dt`
    ///
    /// A duration within a relative 1e-9 of a whole number of steps does not
    /// round up to an extra step (`1.0 / 0.1` is 10 steps, not 11).
    pub fn steps_for(&self, dt: f64) -> usize {
        match self {
            Self::Steps(steps) => *steps,
            Self::Duration(duration) => {
                let ratio = duration / dt;
                let rounded = ratio.round();
                if (ratio - rounded).abs() <= 1e-9 * rounded.max(1.0) {
                    rounded as usize
                } else {
                    ratio.ceil() as usize
                }
            }
        }
    }

    /// Validate that parameters are meaningful
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Steps(_) => Ok(()),
            Self::Duration(duration) => {
                if !duration.is_finite() || *duration < 0.0 {
                    return Err(format!("Duration must be non-negative and finite, got {}", duration));
                }
                Ok(())
            }
        }
    }
}

// =================================================================================================
// Cancellation
// =================================================================================================

/// Cooperative cancellation signal
///
/// Cloning shares the flag. A solver checks it between steps, never in the
/// middle of one.
///
/// # Example
///
/// ```rust
/// use pde_rs::solver::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// True once `cancel` was called on any clone
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

// =================================================================================================
// Solver configuration
// =================================================================================================

/// Configuration of a single `solve` call
///
/// # Examples
///
/// ```rust
/// use pde_rs::solver::{SolverConfiguration, StopCondition};
///
/// // 1000 steps, record every 10th state
/// let config = SolverConfiguration::steps(1000).output_every(10);
/// assert_eq!(config.stop, StopCondition::Steps(1000));
///
/// // One second of simulated time
/// let config = SolverConfiguration::duration(1.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SolverConfiguration {
    /// When the run stops
    pub stop: StopCondition,

    /// Record every n-th step (the initial and final states are always recorded)
    pub output_every: usize,

    /// Optional cancellation signal
    pub cancellation: Option<CancellationToken>,
}

impl SolverConfiguration {
    /// Create a configuration with a given stop condition
    pub fn new(stop: StopCondition) -> Self {
        Self {
            stop,
            output_every: 1,
            cancellation: None,
        }
    }

    /// Run a fixed number of steps
    pub fn steps(steps: usize) -> Self {
        Self::new(StopCondition::Steps(steps))
    }

    /// Run for a span of simulated time
    pub fn duration(duration: f64) -> Self {
        Self::new(StopCondition::Duration(duration))
    }

    /// Builder pattern: record every n-th step
    pub fn output_every(mut self, every: usize) -> Self {
        self.output_every = every;
        self
    }

    /// Builder pattern: attach a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// True when the attached token (if any) was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.output_every == 0 {
            return Err("Output interval must be at least 1 step".to_string());
        }
        self.stop.validate()
    }
}

impl Default for SolverConfiguration {
    fn default() -> Self {
        Self::steps(1)
    }
}

// =================================================================================================
// Run report
// =================================================================================================

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// The stop condition was reached
    Completed,

    /// The cancellation token fired between two steps
    Cancelled,
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    /// How the run ended
    pub outcome: SolveOutcome,

    /// Steps taken during this run
    pub steps_taken: usize,

    /// Global step index reached (counted since construction or reset)
    pub final_step: usize,

    /// Simulated time reached
    pub final_time: f64,

    /// Snapshots handed to storage during this run
    pub snapshots_written: usize,
}

impl SolveReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == SolveOutcome::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == SolveOutcome::Cancelled
    }
}

// =================================================================================================
// Solver base trait
// =================================================================================================

/// Common interface of single and multi-domain solvers
pub trait SolverBase {
    /// Run according to `config`, writing snapshots to `storage`
    fn solve(
        &mut self,
        storage: &mut dyn Storage,
        config: &SolverConfiguration,
    ) -> Result<SolveReport, SolverExecutionError>;

    /// Restore the initial domain(s), rewind time and clear a failure
    fn reset(&mut self);

    /// Current lifecycle state
    fn state(&self) -> SolverState;

    /// Time step
    fn dt(&self) -> f64;

    /// Global step index
    fn current_step(&self) -> usize;

    /// Simulated time, computed as `step · dt`
    fn current_time(&self) -> f64 {
        self.current_step() as f64 * self.dt()
    }

    /// Name of the solver (used for display and logging)
    fn name(&self) -> &str;
}

// =================================================================================================
// Tests
// =================================================================================================
