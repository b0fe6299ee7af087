//! Linear constant-coefficient equations
//!
//! # Mathematical Background
//!
//! [`LinearRhs`] covers every equation of the form
//!
//! ```text
//! ∂u/∂t = −c·u_x + ν·u_xx − β·u_xxx − κ·u_xxxx
//! ```
//!
//! Special cases:
//!
//! | Equation | c | ν | β | κ |
//! |----------|---|---|---|---|
//! | Linear advection | c | 0 | 0 | 0 |
//! | Heat / diffusion | 0 | ν | 0 | 0 |
//! | Advection-diffusion | c | ν | 0 | 0 |
//! | Linearised KdV (Airy) | c | 0 | β | 0 |
//! | Hyperdiffusion | 0 | 0 | 0 | κ |
//!
//! Zero coefficients are skipped entirely, so a pure heat equation costs one
//! Laplacian per grid point.
//!
//! # Discretization
//!
//! The advection term uses a selectable [`FirstDerivativeScheme`]. Central
//! differencing with forward Euler amplifies every Fourier mode; use
//! [`LinearRhs::upwind`] for advection-dominated problems.
//!
//! # Example
//!
//! ```rust
//! use pde_rs::models::LinearRhs;
//! use pde_rs::equation::Rhs;
//!
//! let rhs = LinearRhs::advection(1.0).with_diffusion(0.01).upwind();
//! let scales = rhs.characteristics(&[]);
//! assert_eq!(scales.advection_speed, Some(1.0));
//! assert_eq!(scales.diffusivity, Some(0.01));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::equation::{Rhs, RhsCharacteristics, RhsError};
use crate::operators::{
    BoundaryPolicy, FirstDerivativeScheme, Periodic, d3udx3_with, d4udx4_with, laplacian_with,
};

// =================================================================================================
// Linear constant-coefficient RHS
// =================================================================================================

/// `∂u/∂t = −c·u_x + ν·u_xx − β·u_xxx − κ·u_xxxx`
#[derive(Clone)]
pub struct LinearRhs {
    advection: f64,
    diffusion: f64,
    dispersion: f64,
    hyperdiffusion: f64,
    scheme: FirstDerivativeScheme,
    boundary: Arc<dyn BoundaryPolicy>,
}

impl Default for LinearRhs {
    fn default() -> Self {
        Self {
            advection: 0.0,
            diffusion: 0.0,
            dispersion: 0.0,
            hyperdiffusion: 0.0,
            scheme: FirstDerivativeScheme::Central,
            boundary: Arc::new(Periodic),
        }
    }
}

impl LinearRhs {
    /// Equation with every coefficient at zero (`∂u/∂t = 0`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Linear advection `∂u/∂t = −c·u_x`
    pub fn advection(speed: f64) -> Self {
        Self::new().with_advection(speed)
    }

    /// Heat equation `∂u/∂t = ν·u_xx`
    pub fn diffusion(diffusivity: f64) -> Self {
        Self::new().with_diffusion(diffusivity)
    }

    /// Builder pattern: set the advection speed c
    pub fn with_advection(mut self, speed: f64) -> Self {
        self.advection = speed;
        self
    }

    /// Builder pattern: set the diffusivity ν
    pub fn with_diffusion(mut self, diffusivity: f64) -> Self {
        self.diffusion = diffusivity;
        self
    }

    /// Builder pattern: set the dispersion coefficient β
    pub fn with_dispersion(mut self, dispersion: f64) -> Self {
        self.dispersion = dispersion;
        self
    }

    /// Builder pattern: set the hyperdiffusivity κ
    pub fn with_hyperdiffusion(mut self, hyperdiffusivity: f64) -> Self {
        self.hyperdiffusion = hyperdiffusivity;
        self
    }

    /// Builder pattern: choose the first-derivative scheme
    pub fn with_scheme(mut self, scheme: FirstDerivativeScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Builder pattern: upwind the advection term for the current speed
    ///
    /// Set the speed before calling this.
    pub fn upwind(mut self) -> Self {
        self.scheme = FirstDerivativeScheme::upwind_for(self.advection);
        self
    }

    /// Builder pattern: choose the boundary policy used by every stencil
    pub fn with_boundary<B: BoundaryPolicy + 'static>(mut self, boundary: B) -> Self {
        self.boundary = Arc::new(boundary);
        self
    }

    /// First-derivative scheme in use
    pub fn scheme(&self) -> FirstDerivativeScheme {
        self.scheme
    }
}

impl Rhs for LinearRhs {
    fn evaluate(&self, u: &[f64], i: usize, dx: f64) -> Result<f64, RhsError> {
        let boundary = self.boundary.as_ref();
        let mut value = 0.0;

        if self.advection != 0.0 {
            value -= self.advection * self.scheme.apply_with(u, i, dx, boundary);
        }
        if self.diffusion != 0.0 {
            value += self.diffusion * laplacian_with(u, i, dx, boundary);
        }
        if self.dispersion != 0.0 {
            value -= self.dispersion * d3udx3_with(u, i, dx, boundary);
        }
        if self.hyperdiffusion != 0.0 {
            value -= self.hyperdiffusion * d4udx4_with(u, i, dx, boundary);
        }

        Ok(value)
    }

    fn characteristics(&self, _u: &[f64]) -> RhsCharacteristics {
        let mut scales = RhsCharacteristics::unknown();
        if self.advection != 0.0 {
            scales = scales.with_advection(self.advection);
        }
        if self.diffusion != 0.0 {
            scales = scales.with_diffusion(self.diffusion);
        }
        if self.dispersion != 0.0 {
            scales = scales.with_dispersion(self.dispersion);
        }
        if self.hyperdiffusion != 0.0 {
            scales = scales.with_hyperdiffusion(self.hyperdiffusion);
        }
        scales
    }

    fn name(&self) -> &str {
        "linear"
    }
}

impl fmt::Debug for LinearRhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearRhs")
            .field("advection", &self.advection)
            .field("diffusion", &self.diffusion)
            .field("dispersion", &self.dispersion)
            .field("hyperdiffusion", &self.hyperdiffusion)
            .field("scheme", &self.scheme)
            .field("boundary", &self.boundary.name())
            .finish()
    }
}

// =================================================================================================
// Tests
// =================================================================================================
