//! Single-domain PDE solver
//!
//! [`PdeSolver`] owns a domain, a right-hand side, a time step and a grid
//! spacing, and advances the domain with an explicit
//! [`TimeIntegrator`](super::TimeIntegrator) (Forward Euler by default):
//!
//! ```text
//! u_i^{n+1} = u_i^n + dt · F(u^n, i, dx)     for every i, then commit
//! ```
//!
//! `dt` and `dx` are fixed at construction. Construction validates everything
//! that can be validated up front; a solver that exists is ready to run.

use std::fmt;
use std::sync::Arc;

use super::error::{SolverExecutionError, SolverInitializationError, SpacingError};
use super::methods::{ForwardEuler, TimeIntegrator};
use super::run::{self, Stepper};
use super::spacing::{GridSpacer, GridSpacing, SpacingRequest};
use super::traits::{SolveOutcome, SolveReport, SolverBase, SolverConfiguration, SolverState};
use super::{evaluate_sweep, validate_state};
use crate::equation::{Domain, Rhs};
use crate::output::{Snapshot, Storage};

/// Default time step: one sample at 22.05 kHz
pub const DEFAULT_DT: f64 = 1.0 / 22050.0;

// =================================================================================================
// PDE Solver
// =================================================================================================

/// Solver for `∂u/∂t = F(u)` on one domain
///
/// # Example
///
/// ```rust
/// use pde_rs::equation::Domain;
/// use pde_rs::models::LinearRhs;
/// use pde_rs::output::MemoryStorage;
/// use pde_rs::solver::{PdeSolver, SolverBase, SolverConfiguration, SolverState};
///
/// # fn main() -> Result<(), pde_rs::solver::SolverError> {
/// let mut solver = PdeSolver::builder(Domain::uniform(8, 1.0), LinearRhs::diffusion(0.5))
///     .dt(0.01)
///     .dx(0.25)
///     .build()?;
///
/// let mut storage = MemoryStorage::new();
/// solver.solve(&mut storage, &SolverConfiguration::steps(10))?;
///
/// // A constant field does not diffuse
/// assert!(solver.domain().as_slice().iter().all(|&u| (u - 1.0).abs() < 1e-12));
/// assert_eq!(solver.state(), SolverState::Done);
/// # Ok(())
/// # }
/// ```
pub struct PdeSolver {
    initial: Domain,
    domain: Domain,
    rhs: Arc<dyn Rhs>,
    dt: f64,
    dx: f64,
    integrator: Arc<dyn TimeIntegrator>,
    step: usize,
    state: SolverState,
}

impl PdeSolver {
    /// Create a solver with the default integrator
    ///
    /// # Arguments
    ///
    /// * `domain` - Initial field, at least one point
    /// * `rhs` - Right-hand side
    /// * `dt` - Time step, [`DEFAULT_DT`] when `None`
    /// * `spacing` - Explicit `dx` or automatic policy
    ///
    /// # Errors
    ///
    /// - Empty or non-finite domain
    /// - `dt` not positive and finite
    /// - Explicit `dx` negative or non-finite
    /// - Spacing policy failure
    pub fn new(
        domain: impl Into<Domain>,
        rhs: impl Rhs + 'static,
        dt: Option<f64>,
        spacing: impl Into<GridSpacing>,
    ) -> Result<Self, SolverInitializationError> {
        let mut builder = Self::builder(domain, rhs).spacing(spacing.into());
        builder.dt = dt;
        builder.build()
    }

    /// Start building a solver
    pub fn builder(domain: impl Into<Domain>, rhs: impl Rhs + 'static) -> PdeSolverBuilder {
        PdeSolverBuilder::new(domain.into(), Arc::new(rhs))
    }

    /// Start building a solver around a shared right-hand side
    pub fn builder_shared(domain: impl Into<Domain>, rhs: Arc<dyn Rhs>) -> PdeSolverBuilder {
        PdeSolverBuilder::new(domain.into(), rhs)
    }

    // ====================================== Accessors ============================================

    /// Current domain
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Domain the solver was built with
    pub fn initial_domain(&self) -> &Domain {
        &self.initial
    }

    /// Resolved grid spacing
    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn rhs(&self) -> &dyn Rhs {
        self.rhs.as_ref()
    }

    pub fn integrator(&self) -> &dyn TimeIntegrator {
        self.integrator.as_ref()
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    /// Always false: construction rejects empty domains
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    // ================================= Crate-internal stepping ===================================

    /// Slope `F(u, i, dx)` of every index of `u`
    pub(crate) fn slopes(&self, u: &Domain, step: usize) -> Result<Domain, SolverExecutionError> {
        let values = u.as_slice();
        evaluate_sweep(values.len(), step, |i| self.rhs.evaluate(values, i, self.dx))
    }

    /// Replace the current domain by the result of step `step`
    pub(crate) fn commit(&mut self, domain: Domain, step: usize) {
        self.domain = domain;
        self.step = step;
    }

    pub(crate) fn integrator_handle(&self) -> Arc<dyn TimeIntegrator> {
        Arc::clone(&self.integrator)
    }

    pub(crate) fn set_state(&mut self, state: SolverState) {
        self.state = state;
    }

    pub(crate) fn snapshot(&self, source: usize) -> Snapshot<'_> {
        Snapshot::new(source, self.step, self.current_time(), self.domain.as_slice())
    }
}

impl Stepper for PdeSolver {
    fn step_index(&self) -> usize {
        self.step
    }

    fn time_step(&self) -> f64 {
        self.dt
    }

    fn advance(&mut self) -> Result<(), SolverExecutionError> {
        let step = self.step + 1;
        let derivative = |state: &[Domain]| -> Result<Vec<Domain>, SolverExecutionError> {
            state.iter().map(|u| self.slopes(u, step)).collect()
        };

        let next = self
            .integrator
            .advance(std::slice::from_ref(&self.domain), self.dt, &derivative)?;
        let [next] = <[Domain; 1]>::try_from(next).map_err(|other| {
            SolverExecutionError::IntegratorOutput {
                step,
                integrator: self.integrator.name().to_string(),
                expected: 1,
                actual: other.len(),
            }
        })?;

        validate_state(&next, step)?;
        self.commit(next, step);
        Ok(())
    }

    fn emit(&self, storage: &mut dyn Storage) -> Result<usize, SolverExecutionError> {
        storage
            .accept(&self.snapshot(0))
            .map_err(|source| SolverExecutionError::StorageRejected { step: self.step, source })?;
        Ok(1)
    }
}

impl SolverBase for PdeSolver {
    /// Advance the domain according to `config`
    ///
    /// On error the solver moves to [`SolverState::Failed`]; snapshots
    /// already accepted by `storage` stay there, and the domain stays at the
    /// last committed step.
    fn solve(
        &mut self,
        storage: &mut dyn Storage,
        config: &SolverConfiguration,
    ) -> Result<SolveReport, SolverExecutionError> {
        if !self.state.can_solve() {
            log::warn!("{} refused to run in state '{}'", self.name(), self.state);
            return Err(SolverExecutionError::Poisoned);
        }

        log::info!(
            "{} starting at step {} ({} points, dt = {:e}, dx = {:e}, {})",
            self.name(),
            self.step,
            self.len(),
            self.dt,
            self.dx,
            self.integrator.name()
        );

        self.state = SolverState::Stepping;
        match run::drive(self, storage, config) {
            Ok(report) => {
                self.state = match report.outcome {
                    SolveOutcome::Completed => SolverState::Done,
                    SolveOutcome::Cancelled => SolverState::Cancelled,
                };
                log::info!(
                    "{} {} after {} steps (t = {}), {} snapshots",
                    self.name(),
                    self.state,
                    report.steps_taken,
                    report.final_time,
                    report.snapshots_written
                );
                Ok(report)
            }
            Err(error) => {
                self.state = SolverState::Failed;
                log::error!("{} failed: {}", self.name(), error);
                Err(error)
            }
        }
    }

    fn reset(&mut self) {
        log::debug!("{} reset from step {} ({})", self.name(), self.step, self.state);
        self.domain = self.initial.clone();
        self.step = 0;
        self.state = SolverState::Ready;
    }

    fn state(&self) -> SolverState {
        self.state
    }

    fn dt(&self) -> f64 {
        self.dt
    }

    fn current_step(&self) -> usize {
        self.step
    }

    fn name(&self) -> &str {
        "PDE Solver"
    }
}

impl fmt::Debug for PdeSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdeSolver")
            .field("points", &self.domain.len())
            .field("rhs", &self.rhs.name())
            .field("dt", &self.dt)
            .field("dx", &self.dx)
            .field("integrator", &self.integrator.name())
            .field("step", &self.step)
            .field("state", &self.state)
            .finish()
    }
}

// =================================================================================================
// Builder
// =================================================================================================

/// Builder for [`PdeSolver`]
///
/// Defaults: `dt` = [`DEFAULT_DT`], automatic spacing with the base policy
/// (which fails, so `dx` or a concrete policy must be given), Forward Euler.
pub struct PdeSolverBuilder {
    domain: Domain,
    rhs: Arc<dyn Rhs>,
    dt: Option<f64>,
    spacing: GridSpacing,
    integrator: Arc<dyn TimeIntegrator>,
}

impl PdeSolverBuilder {
    fn new(domain: Domain, rhs: Arc<dyn Rhs>) -> Self {
        Self {
            domain,
            rhs,
            dt: None,
            spacing: GridSpacing::default(),
            integrator: Arc::new(ForwardEuler),
        }
    }

    /// Builder pattern: set time step
    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Builder pattern: set explicit grid spacing
    pub fn dx(mut self, dx: f64) -> Self {
        self.spacing = GridSpacing::Explicit(dx);
        self
    }

    /// Builder pattern: derive grid spacing with a policy
    pub fn auto_dx(mut self, spacer: impl GridSpacer + 'static) -> Self {
        self.spacing = GridSpacing::auto(spacer);
        self
    }

    /// Builder pattern: set grid spacing specification
    pub fn spacing(mut self, spacing: GridSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    /// Builder pattern: set time integrator
    pub fn integrator(mut self, integrator: impl TimeIntegrator + 'static) -> Self {
        self.integrator = Arc::new(integrator);
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<PdeSolver, SolverInitializationError> {
        if self.domain.is_empty() {
            return Err(SolverInitializationError::EmptyDomain);
        }
        if let Some((index, value)) = self.domain.first_non_finite() {
            return Err(SolverInitializationError::NonFiniteDomain { index, value });
        }

        let dt = self.dt.unwrap_or(DEFAULT_DT);
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SolverInitializationError::InvalidTimeStep(dt));
        }

        let dx = match &self.spacing {
            GridSpacing::Explicit(dx) => {
                if !dx.is_finite() || *dx < 0.0 {
                    return Err(SolverInitializationError::InvalidGridSpacing(*dx));
                }
                if *dx == 0.0 {
                    log::warn!("grid spacing is zero; every stencil will divide by zero");
                }
                *dx
            }
            GridSpacing::Auto(spacer) => {
                let request = SpacingRequest::new(self.domain.as_slice(), self.rhs.as_ref(), dt);
                let dx = spacer.grid_spacing(&request).inspect_err(|error| {
                    log::error!("{} spacing policy failed: {}", spacer.name(), error);
                })?;
                if !(dx.is_finite() && dx > 0.0) {
                    return Err(SpacingError::Degenerate(dx).into());
                }
                log::debug!("{} spacing policy chose dx = {:e}", spacer.name(), dx);
                dx
            }
        };

        log::debug!(
            "built solver for '{}' ({} points, dt = {:e}, dx = {:e})",
            self.rhs.name(),
            self.domain.len(),
            dt,
            dx
        );

        Ok(PdeSolver {
            initial: self.domain.clone(),
            domain: self.domain,
            rhs: self.rhs,
            dt,
            dx,
            integrator: self.integrator,
            step: 0,
            state: SolverState::Ready,
        })
    }
}

// =================================================================================================
// Tests
// =================================================================================================
