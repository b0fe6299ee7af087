//! Equation families
//!
//! Ready-made right-hand sides. All models implement the
//! [`Rhs`](crate::equation::Rhs) trait and report their characteristic
//! scales, so they work with [`CflSpacer`](crate::solver::CflSpacer) for
//! automatic grid spacing.
//!
//! # Available Models
//!
//! ## [`LinearRhs`]: constant coefficients
//!
//! Advection, diffusion, dispersion and hyperdiffusion in any combination,
//! with a selectable first-derivative scheme and boundary policy.
//!
//! ## Nonlinear
//!
//! - [`Burgers`]: viscous Burgers (shock formation)
//! - [`KortewegDeVries`]: solitons
//! - [`KuramotoSivashinsky`]: spatio-temporal chaos

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod linear;
pub mod nonlinear;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use linear::LinearRhs;
pub use nonlinear::{Burgers, KortewegDeVries, KuramotoSivashinsky};
