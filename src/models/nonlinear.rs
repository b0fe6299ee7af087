//! Nonlinear model equations
//!
//! Classic nonlinear 1D equations written with the periodic stencils.
//! Their characteristic transport speed depends on the data, so
//! `characteristics` scans the domain for the largest |u|.
//!
//! | Model | Equation |
//! |-------|----------|
//! | [`Burgers`] | `u_t = −u·u_x + ν·u_xx` |
//! | [`KortewegDeVries`] | `u_t = −α·u·u_x − β·u_xxx` |
//! | [`KuramotoSivashinsky`] | `u_t = −u·u_x − u_xx − u_xxxx` |

use crate::equation::{Rhs, RhsCharacteristics, RhsError};
use crate::operators::{d3udx3, d4udx4, dudx, laplacian};

fn max_abs(u: &[f64]) -> f64 {
    u.iter().fold(0.0_f64, |acc, value| acc.max(value.abs()))
}

// =================================================================================================
// Viscous Burgers
// =================================================================================================

/// Viscous Burgers equation `u_t = −u·u_x + ν·u_xx`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burgers {
    /// Viscosity ν
    pub viscosity: f64,
}

impl Burgers {
    pub fn new(viscosity: f64) -> Self {
        Self { viscosity }
    }
}

impl Rhs for Burgers {
    fn evaluate(&self, u: &[f64], i: usize, dx: f64) -> Result<f64, RhsError> {
        Ok(-u[i] * dudx(u, i, dx) + self.viscosity * laplacian(u, i, dx))
    }

    fn characteristics(&self, u: &[f64]) -> RhsCharacteristics {
        let mut scales = RhsCharacteristics::unknown().with_advection(max_abs(u));
        if self.viscosity != 0.0 {
            scales = scales.with_diffusion(self.viscosity);
        }
        scales
    }

    fn name(&self) -> &str {
        "burgers"
    }
}

// =================================================================================================
// Korteweg-de Vries
// =================================================================================================

/// Korteweg-de Vries equation `u_t = −α·u·u_x − β·u_xxx`
///
/// The canonical form uses α = 6, β = 1 ([`KortewegDeVries::canonical`]),
/// for which a single soliton of speed `c` is
///
/// ```text
/// u(x, t) = c/2 · sech²(√c/2 · (x − c·t − x₀))
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KortewegDeVries {
    /// Nonlinear coefficient α
    pub alpha: f64,

    /// Dispersion coefficient β
    pub beta: f64,
}

impl KortewegDeVries {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// `u_t = −6·u·u_x − u_xxx`
    pub fn canonical() -> Self {
        Self::new(6.0, 1.0)
    }

    /// Single-soliton profile of the canonical equation at `t = 0`
    ///
    /// # Example
    ///
    /// ```rust
    /// use pde_rs::models::KortewegDeVries;
    ///
    /// // Peak height is half the speed
    /// assert!((KortewegDeVries::soliton(4.0, 10.0, 10.0) - 2.0).abs() < 1e-12);
    /// ```
    pub fn soliton(speed: f64, centre: f64, x: f64) -> f64 {
        let argument = 0.5 * speed.sqrt() * (x - centre);
        let sech = 1.0 / argument.cosh();
        0.5 * speed * sech * sech
    }
}

impl Default for KortewegDeVries {
    fn default() -> Self {
        Self::canonical()
    }
}

impl Rhs for KortewegDeVries {
    fn evaluate(&self, u: &[f64], i: usize, dx: f64) -> Result<f64, RhsError> {
        Ok(-self.alpha * u[i] * dudx(u, i, dx) - self.beta * d3udx3(u, i, dx))
    }

    fn characteristics(&self, u: &[f64]) -> RhsCharacteristics {
        RhsCharacteristics::unknown()
            .with_advection(self.alpha * max_abs(u))
            .with_dispersion(self.beta)
    }

    fn name(&self) -> &str {
        "korteweg-de-vries"
    }
}

// =================================================================================================
// Kuramoto-Sivashinsky
// =================================================================================================

/// Kuramoto-Sivashinsky equation `u_t = −u·u_x − u_xx − u_xxxx`
///
/// The anti-diffusive `u_xx` term injects energy at long wavelengths and
/// `u_xxxx` removes it at short ones.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KuramotoSivashinsky;

impl Rhs for KuramotoSivashinsky {
    fn evaluate(&self, u: &[f64], i: usize, dx: f64) -> Result<f64, RhsError> {
        Ok(-u[i] * dudx(u, i, dx) - laplacian(u, i, dx) - d4udx4(u, i, dx))
    }

    fn characteristics(&self, u: &[f64]) -> RhsCharacteristics {
        RhsCharacteristics::unknown()
            .with_advection(max_abs(u))
            .with_diffusion(1.0)
            .with_hyperdiffusion(1.0)
    }

    fn name(&self) -> &str {
        "kuramoto-sivashinsky"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
