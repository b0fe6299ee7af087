//! Equations
//!
//! This module provides the types describing WHAT is solved:
//! - **Domain**: the sampled field `u(x_i)` on a 1D grid
//! - **Rhs**: the right-hand side `F` of `∂u/∂t = F(u, x, t)`, evaluated one
//!   grid index at a time
//!
//! # Architecture
//!
//! Equations are **separate from numerical solvers**:
//! - The RHS provides the **spatial operator** (built from stencils)
//! - The solver provides the **time integration**
//!
//! # Implementing a New Equation
//!
//! Either wrap a closure:
//!
//! ```rust
//! use pde_rs::equation::from_fn;
//! use pde_rs::operators::laplacian;
//!
//! let heat = from_fn(|u: &[f64], i: usize, dx: f64| 0.01 * laplacian(u, i, dx))
//!     .named("heat")
//!     .with_diffusion(0.01);
//! ```
//!
//! or implement [`Rhs`] on a struct:
//!
//! ```rust
//! use pde_rs::equation::{Rhs, RhsCharacteristics, RhsError};
//! use pde_rs::operators::dudx;
//!
//! struct Transport {
//!     speed: f64,
//! }
//!
//! impl Rhs for Transport {
//!     fn evaluate(&self, u: &[f64], i: usize, dx: f64) -> Result<f64, RhsError> {
//!         Ok(-self.speed * dudx(u, i, dx))
//!     }
//!
//!     fn characteristics(&self, _u: &[f64]) -> RhsCharacteristics {
//!         RhsCharacteristics::unknown().with_advection(self.speed)
//!     }
//!
//!     fn name(&self) -> &str {
//!         "transport"
//!     }
//! }
//! ```

pub mod domain;
pub mod traits;

pub use domain::Domain;
pub use traits::{
    FirstOrderPde, FnRhs, Rhs, RhsCharacteristics, RhsError, TryFnRhs, from_fn, try_from_fn,
};
