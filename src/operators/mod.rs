//! Finite-difference stencil operators
//!
//! Pure functions approximating spatial derivatives of a sampled field at a
//! single grid index. They hold no state and never allocate, so an RHS can
//! call them once per grid point per stage without measurable overhead.
//!
//! # Module Organization
//!
//! - **`stencil`**: centered 1st–4th derivative stencils
//! - **`boundary`**: [`BoundaryPolicy`] strategies (periodic, reflective, fixed)
//! - **`scheme`**: [`FirstDerivativeScheme`] (central or upwind)
//!
//! # Example
//!
//! ```rust
//! use pde_rs::operators::{d3udx3, dudx, laplacian};
//!
//! // Korteweg-de Vries right-hand side: -6·u·u_x - u_xxx
//! fn kdv(u: &[f64], i: usize, dx: f64) -> f64 {
//!     -6.0 * u[i] * dudx(u, i, dx) - d3udx3(u, i, dx)
//! }
//!
//! let u = vec![0.0; 16];
//! assert_eq!(kdv(&u, 3, 0.1), 0.0);
//! # let _ = laplacian(&u, 0, 0.1);
//! ```

pub mod boundary;
pub mod scheme;
pub mod stencil;

pub use boundary::{BoundaryPolicy, Fixed, Periodic, Reflective, periodic_index, reflected_index};
pub use scheme::FirstDerivativeScheme;
pub use stencil::{
    d3, d3udx3, d3udx3_with, d4, d4udx4, d4udx4_with, dudx, dudx_with, lap, laplacian,
    laplacian_with,
};
