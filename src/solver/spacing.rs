//! Grid spacing policies
//!
//! When a solver is built without an explicit `dx`, a [`GridSpacer`] derives
//! one from the domain, the right-hand side and the time step.
//!
//! # Mathematical Background
//!
//! Explicit schemes stay stable only while the dimensionless numbers of the
//! discretised operators are bounded. For a right-hand side
//!
//! ```text
//! ∂u/∂t = −c·u_x + ν·u_xx − β·u_xxx − κ·u_xxxx
//! ```
//!
//! the relevant numbers and the grid spacing they imply are:
//!
//! | Term | Number | Bound | Minimum dx |
//! |---|---|---|---|
//! | advection | C = c·dt/dx | C ≤ 1 | c·dt / C |
//! | diffusion | r = ν·dt/dx² | r ≤ 0.5 | √(ν·dt / r) |
//! | dispersion | s = β·dt/dx³ | user-chosen | ∛(β·dt / s) |
//! | hyperdiffusion | h = κ·dt/dx⁴ | h ≤ 0.125 | ⁴√(κ·dt / h) |
//!
//! The most restrictive (largest) minimum wins. There is no closed form for
//! an arbitrary right-hand side, so an equation that reports no scale is an
//! error rather than a guess.
//!
//! # Example
//!
//! ```rust
//! use pde_rs::equation::from_fn;
//! use pde_rs::operators::laplacian;
//! use pde_rs::solver::{CflSpacer, GridSpacer, SpacingRequest};
//!
//! let heat = from_fn(|u: &[f64], i: usize, dx: f64| laplacian(u, i, dx)).with_diffusion(1.0);
//! let domain = vec![0.0; 32];
//! let request = SpacingRequest::new(&domain, &heat, 0.005);
//!
//! // √(1 · 0.005 / 0.5) = 0.1
//! let dx = CflSpacer::default().grid_spacing(&request).unwrap();
//! assert!((dx - 0.1).abs() < 1e-12);
//! ```

use std::fmt;
use std::sync::Arc;

use super::error::SpacingError;
use crate::equation::{Rhs, RhsCharacteristics};

// =================================================================================================
// Spacing request
// =================================================================================================

/// Everything a policy may look at
#[derive(Clone, Copy)]
pub struct SpacingRequest<'a> {
    /// Initial domain values
    pub domain: &'a [f64],

    /// Right-hand side that will be integrated
    pub rhs: &'a dyn Rhs,

    /// Time step of the solver
    pub dt: f64,
}

impl<'a> SpacingRequest<'a> {
    pub fn new(domain: &'a [f64], rhs: &'a dyn Rhs, dt: f64) -> Self {
        Self { domain, rhs, dt }
    }

    /// Characteristic scales reported by the right-hand side for this domain
    pub fn characteristics(&self) -> RhsCharacteristics {
        self.rhs.characteristics(self.domain)
    }
}

// =================================================================================================
// Policy trait
// =================================================================================================

/// Strategy computing `dx` for automatic grid spacing
pub trait GridSpacer: Send + Sync {
    /// Derive a grid spacing, or explain why none can be derived
    fn grid_spacing(&self, request: &SpacingRequest<'_>) -> Result<f64, SpacingError>;

    /// Name of the policy (used for display and logging)
    fn name(&self) -> &str;
}

// =================================================================================================
// Grid spacing specification
// =================================================================================================

/// How a solver obtains its `dx`
#[derive(Clone)]
pub enum GridSpacing {
    /// Use this value as-is
    Explicit(f64),

    /// Ask a policy at construction time
    Auto(Arc<dyn GridSpacer>),
}

impl GridSpacing {
    /// Automatic spacing with a concrete policy
    pub fn auto(spacer: impl GridSpacer + 'static) -> Self {
        Self::Auto(Arc::new(spacer))
    }

    /// True for [`GridSpacing::Auto`]
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto(_))
    }
}

/// Automatic spacing with the base policy, which always fails
impl Default for GridSpacing {
    fn default() -> Self {
        Self::auto(UnimplementedSpacer)
    }
}

impl From<f64> for GridSpacing {
    fn from(dx: f64) -> Self {
        Self::Explicit(dx)
    }
}

impl fmt::Debug for GridSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(dx) => f.debug_tuple("Explicit").field(dx).finish(),
            Self::Auto(spacer) => f.debug_tuple("Auto").field(&spacer.name()).finish(),
        }
    }
}

// =================================================================================================
// Base policy
// =================================================================================================

/// Base policy: no generic rule exists
#[derive(Debug, Clone, Copy, Default)]
pub struct UnimplementedSpacer;

impl GridSpacer for UnimplementedSpacer {
    fn grid_spacing(&self, _request: &SpacingRequest<'_>) -> Result<f64, SpacingError> {
        Err(SpacingError::Unimplemented {
            policy: self.name().to_string(),
        })
    }

    fn name(&self) -> &str {
        "unimplemented"
    }
}

// =================================================================================================
// Fixed policy
// =================================================================================================

/// Always returns the same spacing
#[derive(Debug, Clone, Copy)]
pub struct FixedSpacer {
    dx: f64,
}

impl FixedSpacer {
    pub fn new(dx: f64) -> Self {
        Self { dx }
    }
}

impl GridSpacer for FixedSpacer {
    fn grid_spacing(&self, _request: &SpacingRequest<'_>) -> Result<f64, SpacingError> {
        if self.dx.is_finite() && self.dx > 0.0 {
            Ok(self.dx)
        } else {
            Err(SpacingError::Degenerate(self.dx))
        }
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

// =================================================================================================
// CFL policy
// =================================================================================================

/// Stability-number policy
///
/// Each term reported by [`Rhs::characteristics`] yields a minimum `dx`; the
/// largest one, multiplied by `safety`, is returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CflSpacer {
    /// Target Courant number (0 < C ≤ 1)
    pub courant: f64,

    /// Target diffusion number (0 < r ≤ 0.5)
    pub diffusion_number: f64,

    /// Target dispersion number (s > 0)
    pub dispersion_number: f64,

    /// Target hyperdiffusion number (0 < h ≤ 0.125)
    pub hyperdiffusion_number: f64,

    /// Multiplier applied to the final spacing (≥ 1)
    pub safety: f64,
}

impl Default for CflSpacer {
    fn default() -> Self {
        Self {
            courant: 1.0,
            diffusion_number: 0.5,
            dispersion_number: 0.5,
            hyperdiffusion_number: 0.125,
            safety: 1.0,
        }
    }
}

impl CflSpacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set target Courant number
    pub fn with_courant(mut self, courant: f64) -> Self {
        self.courant = courant;
        self
    }

    /// Builder pattern: set target diffusion number
    pub fn with_diffusion_number(mut self, number: f64) -> Self {
        self.diffusion_number = number;
        self
    }

    /// Builder pattern: set target dispersion number
    pub fn with_dispersion_number(mut self, number: f64) -> Self {
        self.dispersion_number = number;
        self
    }

    /// Builder pattern: set target hyperdiffusion number
    pub fn with_hyperdiffusion_number(mut self, number: f64) -> Self {
        self.hyperdiffusion_number = number;
        self
    }

    /// Builder pattern: set safety factor
    pub fn with_safety(mut self, safety: f64) -> Self {
        self.safety = safety;
        self
    }

    /// Validate that parameters are physically meaningful
    pub fn validate(&self) -> Result<(), SpacingError> {
        let bounded = [
            ("courant", self.courant, 1.0),
            ("diffusion_number", self.diffusion_number, 0.5),
            ("dispersion_number", self.dispersion_number, f64::INFINITY),
            ("hyperdiffusion_number", self.hyperdiffusion_number, 0.125),
        ];
        for (name, value, limit) in bounded {
            if !(value > 0.0 && value <= limit) {
                return Err(SpacingError::InvalidParameter { name, value });
            }
        }
        if !self.safety.is_finite() || self.safety < 1.0 {
            return Err(SpacingError::InvalidParameter {
                name: "safety",
                value: self.safety,
            });
        }
        Ok(())
    }

    /// Minimum spacing for each reported term, in advection, diffusion,
    /// dispersion, hyperdiffusion order
    fn bounds(&self, scales: &RhsCharacteristics, dt: f64) -> [Option<f64>; 4] {
        [
            scales.advection_speed.map(|c| c * dt / self.courant),
            scales.diffusivity.map(|nu| (nu * dt / self.diffusion_number).sqrt()),
            scales.dispersion.map(|beta| (beta * dt / self.dispersion_number).cbrt()),
            scales
                .hyperdiffusivity
                .map(|kappa| (kappa * dt / self.hyperdiffusion_number).powf(0.25)),
        ]
    }
}

impl GridSpacer for CflSpacer {
    fn grid_spacing(&self, request: &SpacingRequest<'_>) -> Result<f64, SpacingError> {
        self.validate()?;

        let scales = request.characteristics();
        let dx = self
            .bounds(&scales, request.dt)
            .into_iter()
            .flatten()
            .filter(|bound| *bound > 0.0)
            .fold(None, |acc: Option<f64>, bound| Some(acc.map_or(bound, |a| a.max(bound))))
            .ok_or_else(|| SpacingError::NoCharacteristicScale {
                equation: request.rhs.name().to_string(),
            })?
            * self.safety;

        if dx.is_finite() && dx > 0.0 {
            log::debug!("{} spacer derived dx = {:e} for '{}'", self.name(), dx, request.rhs.name());
            Ok(dx)
        } else {
            Err(SpacingError::Degenerate(dx))
        }
    }

    fn name(&self) -> &str {
        "cfl"
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation::from_fn;

    fn rhs_with(characteristics: RhsCharacteristics) -> impl Rhs {
        from_fn(|_u: &[f64], _i: usize, _dx: f64| 0.0)
            .named("probe")
            .with_characteristics(characteristics)
    }

    #[test]
    fn test_unimplemented_spacer_always_fails() {
        let rhs = rhs_with(RhsCharacteristics::unknown().with_advection(1.0));
        let domain = [0.0; 4];
        let request = SpacingRequest::new(&domain, &rhs, 0.1);

        let result = UnimplementedSpacer.grid_spacing(&request);
        assert!(matches!(result, Err(SpacingError::Unimplemented { .. })));
    }

    #[test]
    fn test_default_spacing_is_unimplemented_auto() {
        let spacing = GridSpacing::default();
        assert!(spacing.is_auto());
        assert_eq!(format!("{:?}", spacing), "Auto(\"unimplemented\")");
    }

    #[test]
    fn test_fixed_spacer() {
        let rhs = rhs_with(RhsCharacteristics::unknown());
        let domain = [0.0; 4];
        let request = SpacingRequest::new(&domain, &rhs, 0.1);

        assert_eq!(FixedSpacer::new(0.25).grid_spacing(&request), Ok(0.25));
        assert!(FixedSpacer::new(0.0).grid_spacing(&request).is_err());
    }

    #[test]
    fn test_cfl_advection_bound() {
        let rhs = rhs_with(RhsCharacteristics::unknown().with_advection(2.0));
        let domain = [0.0; 8];
        let request = SpacingRequest::new(&domain, &rhs, 0.01);

        let dx = CflSpacer::default().grid_spacing(&request).unwrap();
        assert!((dx - 0.02).abs() < 1e-15);

        let dx = CflSpacer::default().with_courant(0.5).grid_spacing(&request).unwrap();
        assert!((dx - 0.04).abs() < 1e-15);
    }

    #[test]
    fn test_cfl_most_restrictive_wins() {
        // advection: 1 · 0.01 = 0.01, diffusion: √(2 · 0.01 / 0.5) ≈ 0.2
        let rhs = rhs_with(
            RhsCharacteristics::unknown()
                .with_advection(1.0)
                .with_diffusion(2.0),
        );
        let domain = [0.0; 8];
        let request = SpacingRequest::new(&domain, &rhs, 0.01);

        let dx = CflSpacer::default().grid_spacing(&request).unwrap();
        assert!((dx - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_cfl_higher_order_terms() {
        let domain = [0.0; 8];

        let dispersive = rhs_with(RhsCharacteristics::unknown().with_dispersion(1.0));
        let request = SpacingRequest::new(&domain, &dispersive, 0.004);
        // ∛(1 · 0.004 / 0.5) = 0.2
        let dx = CflSpacer::default().grid_spacing(&request).unwrap();
        assert!((dx - 0.2).abs() < 1e-12);

        let hyper = rhs_with(RhsCharacteristics::unknown().with_hyperdiffusion(1.0));
        let request = SpacingRequest::new(&domain, &hyper, 0.002);
        // ⁴√(1 · 0.002 / 0.125) = ⁴√0.016
        let dx = CflSpacer::default().grid_spacing(&request).unwrap();
        assert!((dx - 0.016f64.powf(0.25)).abs() < 1e-12);
    }

    #[test]
    fn test_cfl_safety_factor() {
        let rhs = rhs_with(RhsCharacteristics::unknown().with_advection(1.0));
        let domain = [0.0; 8];
        let request = SpacingRequest::new(&domain, &rhs, 0.1);

        let dx = CflSpacer::default().with_safety(2.0).grid_spacing(&request).unwrap();
        assert!((dx - 0.2).abs() < 1e-15);
    }

    #[test]
    fn test_cfl_without_scale_fails() {
        let rhs = rhs_with(RhsCharacteristics::unknown());
        let domain = [0.0; 8];
        let request = SpacingRequest::new(&domain, &rhs, 0.1);

        let result = CflSpacer::default().grid_spacing(&request);
        assert_eq!(
            result,
            Err(SpacingError::NoCharacteristicScale {
                equation: "probe".to_string()
            })
        );
    }

    #[test]
    fn test_cfl_zero_speed_is_no_scale() {
        // Quiescent Burgers field: max|u| = 0 gives no usable bound
        let rhs = rhs_with(RhsCharacteristics::unknown().with_advection(0.0));
        let domain = [0.0; 8];
        let request = SpacingRequest::new(&domain, &rhs, 0.1);

        assert!(matches!(
            CflSpacer::default().grid_spacing(&request),
            Err(SpacingError::NoCharacteristicScale { .. })
        ));
    }

    #[test]
    fn test_cfl_rejects_unstable_targets() {
        assert!(CflSpacer::default().with_courant(1.5).validate().is_err());
        assert!(CflSpacer::default().with_diffusion_number(0.6).validate().is_err());
        assert!(CflSpacer::default().with_hyperdiffusion_number(0.2).validate().is_err());
        assert!(CflSpacer::default().with_courant(0.0).validate().is_err());
        assert!(CflSpacer::default().with_safety(0.5).validate().is_err());
        assert!(CflSpacer::default().validate().is_ok());
    }
}
