//! Time integration methods
//!
//! This module contains concrete implementations of the [`TimeIntegrator`] trait.
//!
//! # Architecture
//!
//! A solver reduces the PDE to a system of ODEs `du_i/dt = F(u, i, dx)` by
//! evaluating its right-hand side at every grid index (method of lines). The
//! integrator only sees that system through a `derivative` callback mapping a
//! set of domains to their slopes, so the same integrator drives a single
//! [`PdeSolver`](crate::solver::PdeSolver) and a coupled
//! [`PdeMultiSolver`](crate::solver::PdeMultiSolver).
//!
//! Every stage is synchronous: all slopes of a stage are computed from the
//! same input domains before any of them is combined into the next stage.
//!
//! # Available Methods
//!
//! - **[`ForwardEuler`]**: default
//!   - Order: First-order O(dt)
//!   - Cost: 1 derivative evaluation per step
//!
//! - **[`RungeKutta4`]**: classical fourth-order Runge-Kutta
//!   - Order: Fourth-order O(dt⁴)
//!   - Cost: 4 derivative evaluations per step
//!
//! Implicit methods are out of scope: every integrator here is explicit.
//!
//! # Example
//!
//! ```rust
//! use pde_rs::equation::Domain;
//! use pde_rs::solver::{ForwardEuler, SolverExecutionError, TimeIntegrator};
//!
//! // du/dt = -u
//! let decay = |state: &[Domain]| -> Result<Vec<Domain>, SolverExecutionError> {
//!     Ok(state.iter().map(|u| u.clone() * -1.0).collect())
//! };
//!
//! let state = vec![Domain::uniform(3, 1.0)];
//! let next = ForwardEuler.advance(&state, 0.1, &decay).unwrap();
//! assert!((next[0][0] - 0.9).abs() < 1e-15);
//! ```

use std::fmt;

use super::error::SolverExecutionError;
use crate::equation::Domain;

pub mod euler;
pub mod rk4;

pub use euler::ForwardEuler;
pub use rk4::RungeKutta4;

/// Slopes of a set of domains: `dU/dt = F(U)`
pub type Derivative<'a> = dyn Fn(&[Domain]) -> Result<Vec<Domain>, SolverExecutionError> + 'a;

/// Explicit one-step time integrator
pub trait TimeIntegrator: Send + Sync + fmt::Debug {
    /// Advance every domain of `state` by `dt`
    fn advance(
        &self,
        state: &[Domain],
        dt: f64,
        derivative: &Derivative<'_>,
    ) -> Result<Vec<Domain>, SolverExecutionError>;

    /// Name of the method (used for display and logging)
    fn name(&self) -> &str;

    /// Order of accuracy
    fn order(&self) -> usize;

    /// Derivative evaluations per step
    fn stages(&self) -> usize;
}

/// `state + h · slopes`, domain by domain
pub(crate) fn offset_all(state: &[Domain], slopes: &[Domain], h: f64) -> Vec<Domain> {
    state
        .iter()
        .zip(slopes)
        .map(|(u, k)| u.offset(k, h))
        .collect()
}
