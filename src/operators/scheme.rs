//! Discretization schemes for the first derivative
//!
//! Central differencing is second-order accurate but, combined with an
//! explicit integrator, it does not damp the odd-even oscillations that
//! advection produces. Upwind differencing takes the one-sided difference
//! from the side the information comes from:
//!
//! ```text
//! UpwindLeft   (backward): (u[i] − u[i−1]) / dx     for speed > 0
//! UpwindRight  (forward):  (u[i+1] − u[i]) / dx     for speed < 0
//! ```
//!
//! One-sided schemes are only first-order accurate, O(dx).

use std::fmt;

use super::boundary::{BoundaryPolicy, Periodic};
use super::stencil::dudx_with;

/// Selectable first-derivative discretization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FirstDerivativeScheme {
    /// Centered difference over `i − 1` and `i + 1`, O(dx²)
    #[default]
    Central,

    /// Backward difference over `i − 1` and `i`, O(dx)
    UpwindLeft,

    /// Forward difference over `i` and `i + 1`, O(dx)
    UpwindRight,
}

impl FirstDerivativeScheme {
    /// Upwind scheme for a transport speed `speed`.
    ///
    /// Information travels in the direction of `speed`, so a positive speed
    /// reads from the left. A zero speed falls back to central differencing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pde_rs::operators::FirstDerivativeScheme;
    ///
    /// assert_eq!(FirstDerivativeScheme::upwind_for(2.0), FirstDerivativeScheme::UpwindLeft);
    /// assert_eq!(FirstDerivativeScheme::upwind_for(-1.0), FirstDerivativeScheme::UpwindRight);
    /// ```
    pub fn upwind_for(speed: f64) -> Self {
        if speed > 0.0 {
            Self::UpwindLeft
        } else if speed < 0.0 {
            Self::UpwindRight
        } else {
            Self::Central
        }
    }

    /// Formal order of accuracy in dx
    pub fn order(&self) -> u32 {
        match self {
            Self::Central => 2,
            Self::UpwindLeft | Self::UpwindRight => 1,
        }
    }

    /// Evaluate the first derivative at `i` under `boundary`
    #[inline]
    pub fn apply_with<B: BoundaryPolicy + ?Sized>(
        &self,
        u: &[f64],
        i: usize,
        dx: f64,
        boundary: &B,
    ) -> f64 {
        let index = i as isize;
        match self {
            Self::Central => dudx_with(u, i, dx, boundary),
            Self::UpwindLeft => {
                (boundary.sample(u, index) - boundary.sample(u, index - 1)) / dx
            }
            Self::UpwindRight => {
                (boundary.sample(u, index + 1) - boundary.sample(u, index)) / dx
            }
        }
    }

    /// Evaluate the first derivative at `i` with periodic boundaries
    #[inline]
    pub fn apply(&self, u: &[f64], i: usize, dx: f64) -> f64 {
        self.apply_with(u, i, dx, &Periodic)
    }

    /// Name of the scheme
    pub fn name(&self) -> &'static str {
        match self {
            Self::Central => "central",
            Self::UpwindLeft => "upwind-left",
            Self::UpwindRight => "upwind-right",
        }
    }
}

impl fmt::Display for FirstDerivativeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
