//! Mock right-hand sides for testing
//!
//! These equations have known analytical solutions, making them
//! ideal for validating numerical solver accuracy.

use std::f64::consts::PI;

use pde_rs::equation::{Domain, Rhs, RhsCharacteristics, RhsError};
use pde_rs::operators::laplacian;

// =================================================================================================
// Exponential Decay: du/dt = -k*u
// =================================================================================================

/// Exponential decay at every grid point: du/dt = -k*u
///
/// Analytical solution: u(t) = u₀ * exp(-k*t)
pub struct ExponentialDecay {
    pub decay_rate: f64,
}

impl ExponentialDecay {
    pub fn new(decay_rate: f64) -> Self {
        Self { decay_rate }
    }

    /// Compute analytical solution at time t
    pub fn analytical_solution(&self, t: f64, u0: f64) -> f64 {
        u0 * (-self.decay_rate * t).exp()
    }
}

impl Rhs for ExponentialDecay {
    fn evaluate(&self, u: &[f64], i: usize, _dx: f64) -> Result<f64, RhsError> {
        Ok(-self.decay_rate * u[i])
    }

    fn name(&self) -> &str {
        "Exponential Decay"
    }
}

// =================================================================================================
// Constant Growth: du/dt = c
// =================================================================================================

/// Constant growth at every grid point: du/dt = c
///
/// Analytical solution: u(t) = u₀ + c*t
///
/// Euler is exact for this problem, RK4 should also be exact.
pub struct ConstantGrowth {
    pub growth_rate: f64,
}

impl ConstantGrowth {
    pub fn new(growth_rate: f64) -> Self {
        Self { growth_rate }
    }

    pub fn analytical_solution(&self, t: f64, u0: f64) -> f64 {
        u0 + self.growth_rate * t
    }
}

impl Rhs for ConstantGrowth {
    fn evaluate(&self, _u: &[f64], _i: usize, _dx: f64) -> Result<f64, RhsError> {
        Ok(self.growth_rate)
    }

    fn name(&self) -> &str {
        "Constant Growth"
    }
}

// =================================================================================================
// Heat equation, single Fourier mode
// =================================================================================================

/// Heat equation u_t = ν·u_xx on a periodic grid of `points` covering one
/// wavelength, started from `sin(2πx/L)`
///
/// Analytical solution: u(x, t) = exp(-ν·k²·t) · sin(k·x), k = 2π/L
pub struct HeatMode {
    pub diffusivity: f64,
    pub points: usize,
    pub length: f64,
}

impl HeatMode {
    pub fn new(diffusivity: f64, points: usize, length: f64) -> Self {
        Self { diffusivity, points, length }
    }

    pub fn dx(&self) -> f64 {
        self.length / self.points as f64
    }

    fn wavenumber(&self) -> f64 {
        2.0 * PI / self.length
    }

    pub fn initial(&self) -> Domain {
        let k = self.wavenumber();
        Domain::sampled(self.points, self.dx(), |x| (k * x).sin())
    }

    pub fn analytical_solution(&self, t: f64) -> Domain {
        let k = self.wavenumber();
        let decay = (-self.diffusivity * k * k * t).exp();
        Domain::sampled(self.points, self.dx(), |x| decay * (k * x).sin())
    }
}

impl Rhs for HeatMode {
    fn evaluate(&self, u: &[f64], i: usize, dx: f64) -> Result<f64, RhsError> {
        Ok(self.diffusivity * laplacian(u, i, dx))
    }

    fn characteristics(&self, _u: &[f64]) -> RhsCharacteristics {
        RhsCharacteristics::unknown().with_diffusion(self.diffusivity)
    }

    fn name(&self) -> &str {
        "Heat Mode"
    }
}
