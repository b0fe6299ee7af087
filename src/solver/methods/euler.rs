//! Forward Euler time integration
//!
//! # Mathematical Background
//!
//! The Forward Euler method is the simplest explicit time-stepping scheme
//! for the semi-discrete system produced by the stencil operators:
//!
//! ```text
//! du_i/dt = F(u, i, dx)
//! ```
//!
//! The state at t_{n+1} = t_n + dt is:
//!
//! ```text
//! u_i^{n+1} = u_i^n + dt · F(u^n, i, dx)
//! ```
//!
//! Every `F(u^n, i, dx)` reads the old domain `u^n`; the new domain is
//! committed only after all indices were evaluated.
//!
//! # Characteristics
//!
//! - **Order**: First-order accurate (error ~ O(dt))
//! - **Stability**: Conditionally stable (see [`CflSpacer`](crate::solver::CflSpacer))
//! - **Complexity**: 1 derivative evaluation per step
//! - **Memory**: one extra domain per step
//!
//! # When NOT to Use
//!
//! - Pure advection or dispersion with central differences: Euler is
//!   unconditionally unstable there, use upwinding or [`RungeKutta4`](super::RungeKutta4)
//! - High-accuracy requirements: use [`RungeKutta4`](super::RungeKutta4)

use super::{Derivative, TimeIntegrator, offset_all};
use crate::equation::Domain;
use crate::solver::error::SolverExecutionError;

// =================================================================================================
// Forward Euler
// =================================================================================================

/// Forward Euler time integrator
///
/// # Example
///
/// ```rust
/// use pde_rs::solver::{ForwardEuler, TimeIntegrator};
///
/// let euler = ForwardEuler::new();
/// assert_eq!(euler.name(), "Forward Euler");
/// assert_eq!(euler.order(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardEuler;

impl ForwardEuler {
    pub fn new() -> Self {
        Self
    }
}

impl TimeIntegrator for ForwardEuler {
    fn advance(
        &self,
        state: &[Domain],
        dt: f64,
        derivative: &Derivative<'_>,
    ) -> Result<Vec<Domain>, SolverExecutionError> {
        let slopes = derivative(state)?;
        Ok(offset_all(state, &slopes, dt))
    }

    fn name(&self) -> &str {
        "Forward Euler"
    }

    fn order(&self) -> usize {
        1
    }

    fn stages(&self) -> usize {
        1
    }
}

// =================================================================================================
// Tests
// =================================================================================================
