//! Lockstep multi-domain solver
//!
//! [`PdeMultiSolver`] advances several [`PdeSolver`]s as one system. Every
//! step evaluates all constituents (and the [`CouplingTerm`]s between them)
//! from the same committed domains, and commits all new domains together:
//!
//! ```text
//! for every constituent m and index i:
//!     k_m[i] = F_m(u_m, i, dx_m) + Σ coupling_m(u_0 … u_{M-1}, i, dx_m)
//! barrier
//! u_m ← integrator(u_m, k_m)   for every m, then commit
//! ```
//!
//! A failing constituent fails the whole step. Nothing of that step is
//! committed, every constituent is marked failed, and the multi-solver
//! refuses to run until [`reset`](SolverBase::reset).
//!
//! # Example
//!
//! ```rust
//! use pde_rs::equation::{Domain, from_fn};
//! use pde_rs::output::MemoryStorage;
//! use pde_rs::solver::{PdeMultiSolver, PdeSolver, SolverBase, SolverConfiguration, coupling_fn};
//!
//! # fn main() -> Result<(), pde_rs::solver::SolverError> {
//! let idle = || from_fn(|_u: &[f64], _i: usize, _dx: f64| 0.0);
//! let source = PdeSolver::builder(Domain::uniform(4, 1.0), idle()).dt(0.1).dx(1.0).build()?;
//! let sink = PdeSolver::builder(Domain::uniform(4, 0.0), idle()).dt(0.1).dx(1.0).build()?;
//!
//! // The sink grows at the rate of the source's value
//! let mut system = PdeMultiSolver::builder()
//!     .member(source)
//!     .member(sink)
//!     .coupling(1, coupling_fn(|u: &[&[f64]], i: usize, _dx: f64| u[0][i]))
//!     .build()?;
//!
//! let mut storage = MemoryStorage::new();
//! system.solve(&mut storage, &SolverConfiguration::steps(10))?;
//!
//! assert!((system.member(1).unwrap().domain()[0] - 1.0).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use super::error::{SolverExecutionError, SolverInitializationError};
use super::methods::TimeIntegrator;
use super::pde::PdeSolver;
use super::run::{self, Stepper};
use super::traits::{SolveOutcome, SolveReport, SolverBase, SolverConfiguration, SolverState};
use super::{evaluate_sweep, validate_state};
use crate::equation::{Domain, RhsError};
use crate::output::Storage;

/// Relative tolerance when comparing constituent time steps
const DT_TOLERANCE: f64 = 1e-12;

// =================================================================================================
// Coupling terms
// =================================================================================================

/// Extra right-hand-side contribution reading every constituent's domain
///
/// `domains[m]` is the committed (or stage) domain of constituent `m`; `i`
/// and `dx` belong to the constituent the term is attached to. Reading
/// another constituent at an index it does not have should be reported as
/// [`RhsError::IndexOutOfRange`].
pub trait CouplingTerm: Send + Sync {
    fn evaluate(&self, domains: &[&[f64]], i: usize, dx: f64) -> Result<f64, RhsError>;

    fn name(&self) -> &str {
        "coupling"
    }
}

/// Closure adapter for [`CouplingTerm`]
pub struct FnCoupling<F> {
    function: F,
    name: String,
}

/// Wrap an infallible closure as a coupling term
pub fn coupling_fn<F>(function: F) -> FnCoupling<F>
where
    F: Fn(&[&[f64]], usize, f64) -> f64 + Send + Sync,
{
    FnCoupling {
        function,
        name: "coupling".to_string(),
    }
}

impl<F> FnCoupling<F> {
    /// Builder pattern: set display name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<F> CouplingTerm for FnCoupling<F>
where
    F: Fn(&[&[f64]], usize, f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, domains: &[&[f64]], i: usize, dx: f64) -> Result<f64, RhsError> {
        Ok((self.function)(domains, i, dx))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// =================================================================================================
// Multi-solver
// =================================================================================================

/// Several solvers advanced in lockstep
pub struct PdeMultiSolver {
    members: Vec<PdeSolver>,
    couplings: Vec<(usize, Box<dyn CouplingTerm>)>,
    integrator: Arc<dyn TimeIntegrator>,
    dt: f64,
    step: usize,
    state: SolverState,
}

impl PdeMultiSolver {
    /// Combine uncoupled solvers
    pub fn new(members: Vec<PdeSolver>) -> Result<Self, SolverInitializationError> {
        members
            .into_iter()
            .fold(Self::builder(), PdeMultiSolverBuilder::member)
            .build()
    }

    pub fn builder() -> PdeMultiSolverBuilder {
        PdeMultiSolverBuilder::default()
    }

    /// Constituent solvers, in insertion order
    pub fn members(&self) -> &[PdeSolver] {
        &self.members
    }

    pub fn member(&self, index: usize) -> Option<&PdeSolver> {
        self.members.get(index)
    }

    /// Number of constituents
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false: construction rejects an empty set
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn integrator(&self) -> &dyn TimeIntegrator {
        self.integrator.as_ref()
    }

    /// Give the constituents back
    pub fn into_members(self) -> Vec<PdeSolver> {
        self.members
    }

    fn set_all(&mut self, state: SolverState) {
        self.state = state;
        for member in &mut self.members {
            member.set_state(state);
        }
    }

    /// Slopes of every constituent for one stage
    fn slopes(&self, state: &[Domain], step: usize) -> Result<Vec<Domain>, SolverExecutionError> {
        let views: Vec<&[f64]> = state.iter().map(Domain::as_slice).collect();

        self.members
            .iter()
            .enumerate()
            .map(|(m, member)| {
                let terms: Vec<&dyn CouplingTerm> = self
                    .couplings
                    .iter()
                    .filter(|(target, _)| *target == m)
                    .map(|(_, term)| term.as_ref())
                    .collect();
                let rhs = member.rhs();
                let dx = member.dx();
                let own = views[m];

                evaluate_sweep(own.len(), step, |i| {
                    let mut value = rhs.evaluate(own, i, dx)?;
                    for term in &terms {
                        value += term.evaluate(&views, i, dx)?;
                    }
                    Ok(value)
                })
                .map_err(|source| SolverExecutionError::Constituent {
                    member: m,
                    source: Box::new(source),
                })
            })
            .collect()
    }
}

impl Stepper for PdeMultiSolver {
    fn step_index(&self) -> usize {
        self.step
    }

    fn time_step(&self) -> f64 {
        self.dt
    }

    fn advance(&mut self) -> Result<(), SolverExecutionError> {
        let step = self.step + 1;
        let current: Vec<Domain> = self.members.iter().map(|m| m.domain().clone()).collect();
        let derivative = |state: &[Domain]| self.slopes(state, step);

        let next = self.integrator.advance(&current, self.dt, &derivative)?;
        if next.len() != current.len() {
            return Err(SolverExecutionError::IntegratorOutput {
                step,
                integrator: self.integrator.name().to_string(),
                expected: current.len(),
                actual: next.len(),
            });
        }

        // Barrier: every constituent must be valid before any is committed
        for (m, domain) in next.iter().enumerate() {
            validate_state(domain, step).map_err(|source| SolverExecutionError::Constituent {
                member: m,
                source: Box::new(source),
            })?;
        }

        for (member, domain) in self.members.iter_mut().zip(next) {
            member.commit(domain, step);
        }
        self.step = step;
        Ok(())
    }

    /// One batch per step: the sink stores every constituent's snapshot or none
    fn emit(&self, storage: &mut dyn Storage) -> Result<usize, SolverExecutionError> {
        let snapshots: Vec<_> = self
            .members
            .iter()
            .enumerate()
            .map(|(m, member)| member.snapshot(m))
            .collect();
        storage
            .accept_step(&snapshots)
            .map_err(|source| SolverExecutionError::StorageRejected { step: self.step, source })?;
        Ok(snapshots.len())
    }
}

impl SolverBase for PdeMultiSolver {
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
            "{} starting at step {} ({} constituents, {} couplings, dt = {:e}, {})",
            self.name(),
            self.step,
            self.members.len(),
            self.couplings.len(),
            self.dt,
            self.integrator.name()
        );

        self.set_all(SolverState::Stepping);
        match run::drive(self, storage, config) {
            Ok(report) => {
                self.set_all(match report.outcome {
                    SolveOutcome::Completed => SolverState::Done,
                    SolveOutcome::Cancelled => SolverState::Cancelled,
                });
                log::info!(
                    "{} {} after {} steps (t = {})",
                    self.name(),
                    self.state,
                    report.steps_taken,
                    report.final_time
                );
                Ok(report)
            }
            Err(error) => {
                self.set_all(SolverState::Failed);
                log::error!("{} failed, all constituents poisoned: {}", self.name(), error);
                Err(error)
            }
        }
    }

    fn reset(&mut self) {
        log::debug!("{} reset from step {} ({})", self.name(), self.step, self.state);
        for member in &mut self.members {
            member.reset();
        }
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
        "PDE Multi-Solver"
    }
}

impl fmt::Debug for PdeMultiSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let couplings: Vec<(usize, &str)> =
            self.couplings.iter().map(|(target, term)| (*target, term.name())).collect();
        f.debug_struct("PdeMultiSolver")
            .field("members", &self.members)
            .field("couplings", &couplings)
            .field("integrator", &self.integrator.name())
            .field("dt", &self.dt)
            .field("step", &self.step)
            .field("state", &self.state)
            .finish()
    }
}

// =================================================================================================
// Builder
// =================================================================================================

/// Builder for [`PdeMultiSolver`]
///
/// Without an explicit integrator the first constituent's integrator drives
/// the whole system.
#[derive(Default)]
pub struct PdeMultiSolverBuilder {
    members: Vec<PdeSolver>,
    couplings: Vec<(usize, Box<dyn CouplingTerm>)>,
    integrator: Option<Arc<dyn TimeIntegrator>>,
}

impl PdeMultiSolverBuilder {
    /// Builder pattern: add a constituent
    pub fn member(mut self, solver: PdeSolver) -> Self {
        self.members.push(solver);
        self
    }

    /// Builder pattern: add a coupling term to constituent `target`
    pub fn coupling(mut self, target: usize, term: impl CouplingTerm + 'static) -> Self {
        self.couplings.push((target, Box::new(term)));
        self
    }

    /// Builder pattern: set time integrator for the coupled system
    pub fn integrator(mut self, integrator: impl TimeIntegrator + 'static) -> Self {
        self.integrator = Some(Arc::new(integrator));
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<PdeMultiSolver, SolverInitializationError> {
        let first = self.members.first().ok_or(SolverInitializationError::NoConstituents)?;
        let expected_dt = first.dt();
        let expected_step = first.current_step();

        for (member, solver) in self.members.iter().enumerate() {
            if solver.state() == SolverState::Failed {
                return Err(SolverInitializationError::ConstituentFailed { member });
            }
            if (solver.dt() - expected_dt).abs() > DT_TOLERANCE * expected_dt {
                return Err(SolverInitializationError::TimeStepMismatch {
                    member,
                    dt: solver.dt(),
                    expected: expected_dt,
                });
            }
            if solver.current_step() != expected_step {
                return Err(SolverInitializationError::StepMismatch {
                    member,
                    step: solver.current_step(),
                    expected: expected_step,
                });
            }
        }

        let count = self.members.len();
        if let Some((target, _)) = self.couplings.iter().find(|(target, _)| *target >= count) {
            return Err(SolverInitializationError::InvalidCouplingTarget { target: *target, count });
        }

        let integrator = self.integrator.unwrap_or_else(|| first.integrator_handle());

        log::debug!(
            "built multi-solver with {} constituents and {} couplings",
            count,
            self.couplings.len()
        );

        Ok(PdeMultiSolver {
            members: self.members,
            couplings: self.couplings,
            integrator,
            dt: expected_dt,
            step: expected_step,
            state: SolverState::Ready,
        })
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation::{Rhs, from_fn};
    use crate::models::LinearRhs;
    use crate::operators::laplacian;
    use crate::output::{MemoryStorage, StorageError};
    use crate::solver::RungeKutta4;

    fn idle() -> impl Rhs {
        from_fn(|_u: &[f64], _i: usize, _dx: f64| 0.0)
    }

    fn heat(diffusivity: f64) -> impl Rhs {
        from_fn(move |u: &[f64], i: usize, dx: f64| diffusivity * laplacian(u, i, dx))
    }

    fn solver(values: Vec<f64>, rhs: impl Rhs + 'static, dt: f64) -> PdeSolver {
        PdeSolver::builder(values, rhs).dt(dt).dx(1.0).build().unwrap()
    }

    // ====== Construction ======

    #[test]
    fn test_empty_multi_solver_rejected() {
        let result = PdeMultiSolver::new(Vec::new());
        assert_eq!(result.unwrap_err(), SolverInitializationError::NoConstituents);
    }

    #[test]
    fn test_dt_mismatch_rejected() {
        let result = PdeMultiSolver::new(vec![
            solver(vec![0.0; 3], idle(), 0.1),
            solver(vec![0.0; 3], idle(), 0.2),
        ]);
        assert!(matches!(
            result,
            Err(SolverInitializationError::TimeStepMismatch { member: 1, .. })
        ));
    }

    #[test]
    fn test_step_mismatch_rejected() {
        let mut ahead = solver(vec![0.0; 3], idle(), 0.1);
        ahead
            .solve(&mut MemoryStorage::new(), &SolverConfiguration::steps(2))
            .unwrap();

        let result = PdeMultiSolver::new(vec![solver(vec![0.0; 3], idle(), 0.1), ahead]);
        assert!(matches!(
            result,
            Err(SolverInitializationError::StepMismatch { member: 1, step: 2, expected: 0 })
        ));
    }

    #[test]
    fn test_failed_constituent_rejected() {
        let mut broken = PdeSolver::builder(vec![1.0, 2.0], heat(1.0)).dt(0.1).dx(0.0).build().unwrap();
        assert!(broken
            .solve(&mut MemoryStorage::new(), &SolverConfiguration::steps(1))
            .is_err());

        let result = PdeMultiSolver::new(vec![broken]);
        assert_eq!(
            result.unwrap_err(),
            SolverInitializationError::ConstituentFailed { member: 0 }
        );
    }

    #[test]
    fn test_invalid_coupling_target_rejected() {
        let result = PdeMultiSolver::builder()
            .member(solver(vec![0.0; 3], idle(), 0.1))
            .coupling(3, coupling_fn(|_u: &[&[f64]], _i: usize, _dx: f64| 0.0))
            .build();
        assert_eq!(
            result.unwrap_err(),
            SolverInitializationError::InvalidCouplingTarget { target: 3, count: 1 }
        );
    }

    #[test]
    fn test_integrator_defaults_to_first_member() {
        let first = PdeSolver::builder(vec![0.0], idle())
            .dt(0.1)
            .dx(1.0)
            .integrator(RungeKutta4)
            .build()
            .unwrap();
        let system = PdeMultiSolver::new(vec![first]).unwrap();
        assert_eq!(system.integrator().name(), "Runge-Kutta 4");
    }

    // ====== Stepping ======

    #[test]
    fn test_uncoupled_members_match_individual_runs() {
        let config = SolverConfiguration::steps(25);

        let mut alone = solver(vec![1.0, 3.0, 2.0, 5.0], heat(0.2), 0.1);
        alone.solve(&mut MemoryStorage::new(), &config).unwrap();

        let mut system = PdeMultiSolver::new(vec![
            solver(vec![1.0, 3.0, 2.0, 5.0], heat(0.2), 0.1),
            solver(vec![0.0, 1.0, 0.0], LinearRhs::diffusion(0.3), 0.1),
        ])
        .unwrap();
        system.solve(&mut MemoryStorage::new(), &config).unwrap();

        assert_eq!(system.member(0).unwrap().domain(), alone.domain());
        assert_eq!(system.current_step(), 25);
        assert!(system.members().iter().all(|m| m.current_step() == 25));
    }

    #[test]
    fn test_coupling_reads_old_domains() {
        // u0' = u1, u1' = -u0 with dt = 1: (1, 0) -> (1, -1) -> (0, -2).
        // Reading the already updated u0 would give u1 = -1 after two steps.
        let a = solver(vec![1.0], idle(), 1.0);
        let b = solver(vec![0.0], idle(), 1.0);
        let mut system = PdeMultiSolver::builder()
            .member(a)
            .member(b)
            .coupling(0, coupling_fn(|u: &[&[f64]], i: usize, _dx: f64| u[1][i]))
            .coupling(1, coupling_fn(|u: &[&[f64]], i: usize, _dx: f64| -u[0][i]))
            .build()
            .unwrap();

        system.solve(&mut MemoryStorage::new(), &SolverConfiguration::steps(2)).unwrap();

        assert_eq!(system.member(0).unwrap().domain().as_slice(), &[0.0]);
        assert_eq!(system.member(1).unwrap().domain().as_slice(), &[-2.0]);
    }

    #[test]
    fn test_snapshots_interleaved_by_member() {
        let mut system = PdeMultiSolver::new(vec![
            solver(vec![0.0; 2], idle(), 0.5),
            solver(vec![1.0; 3], idle(), 0.5),
        ])
        .unwrap();
        let mut storage = MemoryStorage::new();

        let report = system.solve(&mut storage, &SolverConfiguration::steps(2)).unwrap();

        let order: Vec<(usize, usize)> =
            storage.records().iter().map(|r| (r.step, r.source)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);
        assert_eq!(report.snapshots_written, 6);
        assert_eq!(storage.records()[5].values.len(), 3);
    }

    #[test]
    fn test_failure_is_atomic_and_poisons_all() {
        // Member 1 blows up at the first step; member 0 must not advance
        let mut system = PdeMultiSolver::new(vec![
            solver(vec![1.0, 2.0, 3.0], heat(0.1), 0.1),
            PdeSolver::builder(vec![1.0, 2.0], heat(1.0)).dt(0.1).dx(0.0).build().unwrap(),
        ])
        .unwrap();
        let before = system.member(0).unwrap().domain().clone();

        let error = system
            .solve(&mut MemoryStorage::new(), &SolverConfiguration::steps(3))
            .unwrap_err();

        match &error {
            SolverExecutionError::Constituent { member, source } => {
                assert_eq!(*member, 1);
                assert!(matches!(**source, SolverExecutionError::NonFinite { step: 1, .. }));
            }
            other => panic!("expected constituent failure, got {:?}", other),
        }
        assert_eq!(system.member(0).unwrap().domain(), &before);
        assert_eq!(system.state(), SolverState::Failed);
        assert!(system.members().iter().all(|m| m.state() == SolverState::Failed));

        let again = system.solve(&mut MemoryStorage::new(), &SolverConfiguration::steps(1));
        assert!(matches!(again, Err(SolverExecutionError::Poisoned)));
    }

    #[test]
    fn test_coupling_error_names_constituent() {
        let strict = TryCoupling;
        let mut system = PdeMultiSolver::builder()
            .member(solver(vec![0.0; 2], idle(), 0.1))
            .member(solver(vec![0.0; 4], idle(), 0.1))
            .coupling(1, strict)
            .build()
            .unwrap();

        let error = system
            .solve(&mut MemoryStorage::new(), &SolverConfiguration::steps(1))
            .unwrap_err();

        match error {
            SolverExecutionError::Constituent { member: 1, source } => match *source {
                SolverExecutionError::Rhs { step: 1, index: 2, source } => {
                    assert_eq!(source, RhsError::IndexOutOfRange { index: 2, len: 2 });
                }
                other => panic!("unexpected inner error {:?}", other),
            },
            other => panic!("unexpected error {:?}", other),
        }
    }

    /// Reads constituent 0 at the caller's index
    struct TryCoupling;

    impl CouplingTerm for TryCoupling {
        fn evaluate(&self, domains: &[&[f64]], i: usize, _dx: f64) -> Result<f64, RhsError> {
            domains[0]
                .get(i)
                .copied()
                .ok_or(RhsError::IndexOutOfRange { index: i, len: domains[0].len() })
        }
    }

    #[test]
    fn test_reset_restores_all_members() {
        let mut system = PdeMultiSolver::new(vec![
            solver(vec![1.0, 2.0, 3.0], heat(0.1), 0.1),
            PdeSolver::builder(vec![1.0, 2.0], heat(1.0)).dt(0.1).dx(0.0).build().unwrap(),
        ])
        .unwrap();
        assert!(system
            .solve(&mut MemoryStorage::new(), &SolverConfiguration::steps(3))
            .is_err());

        system.reset();

        assert_eq!(system.state(), SolverState::Ready);
        assert_eq!(system.current_step(), 0);
        assert!(system.members().iter().all(|m| m.state() == SolverState::Ready));
        assert_eq!(system.member(1).unwrap().domain().as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn test_storage_rejection_fails_multi_run() {
        let mut system = PdeMultiSolver::new(vec![
            solver(vec![0.0; 2], idle(), 0.5),
            solver(vec![0.0; 2], idle(), 0.5),
        ])
        .unwrap();
        let mut storage = MemoryStorage::with_capacity_limit(3);

        let error = system.solve(&mut storage, &SolverConfiguration::steps(2)).unwrap_err();

        assert!(matches!(
            error,
            SolverExecutionError::StorageRejected {
                step: 1,
                source: StorageError::CapacityExceeded { capacity: 3 }
            }
        ));
        assert_eq!(system.state(), SolverState::Failed);
    }

    #[test]
    fn test_storage_never_holds_part_of_a_step() {
        let mut system = PdeMultiSolver::new(vec![
            solver(vec![0.0; 2], idle(), 0.5),
            solver(vec![1.0; 2], idle(), 0.5),
        ])
        .unwrap();
        let mut storage = MemoryStorage::with_capacity_limit(3);

        let error = system.solve(&mut storage, &SolverConfiguration::steps(2)).unwrap_err();
        assert_eq!(error.step(), Some(1));

        let stored: Vec<(usize, usize)> =
            storage.records().iter().map(|record| (record.step, record.source)).collect();
        assert_eq!(stored, vec![(0, 0), (0, 1)]);
    }

    /// Integrator that only advances the first domain it is given
    #[derive(Debug)]
    struct FirstOnly;

    impl TimeIntegrator for FirstOnly {
        fn advance(
            &self,
            state: &[Domain],
            _dt: f64,
            _derivative: &crate::solver::Derivative<'_>,
        ) -> Result<Vec<Domain>, SolverExecutionError> {
            Ok(state.iter().take(1).cloned().collect())
        }

        fn name(&self) -> &str {
            "first only"
        }

        fn order(&self) -> usize {
            1
        }

        fn stages(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_short_integrator_output_fails_the_step() {
        let mut system = PdeMultiSolver::builder()
            .member(solver(vec![0.0; 2], idle(), 0.5))
            .member(solver(vec![1.0; 2], idle(), 0.5))
            .integrator(FirstOnly)
            .build()
            .unwrap();

        let error = system
            .solve(&mut MemoryStorage::new(), &SolverConfiguration::steps(1))
            .unwrap_err();

        assert!(matches!(
            error,
            SolverExecutionError::IntegratorOutput { step: 1, expected: 2, actual: 1, .. }
        ));
        assert!(system.members().iter().all(|member| member.current_step() == 0));
        assert_eq!(system.state(), SolverState::Failed);
    }
}
