//! Right-hand side traits and types
//!
//! This module defines the core API for equations:
//! - `Rhs`: trait for every right-hand side `∂u/∂t = F(u, x, t)`
//! - `RhsCharacteristics`: characteristic scales used by spacing policies
//! - `FnRhs` / `TryFnRhs`: adapters turning closures into an `Rhs`

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Signature of a plain, infallible right-hand side closure
///
/// `(domain, index, dx) → ∂u/∂t at index`
pub type FirstOrderPde = dyn Fn(&[f64], usize, f64) -> f64 + Send + Sync;

// =================================================================================================
// Errors
// =================================================================================================

/// Failure raised while evaluating a right-hand side
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RhsError {
    /// Index outside the domain handed to the RHS
    #[error("grid index {index} out of range for a domain of {len} samples")]
    IndexOutOfRange { index: usize, len: usize },

    /// Equation-specific failure
    #[error("{0}")]
    Failed(String),
}

impl RhsError {
    /// Create an equation-specific failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

// =================================================================================================
// Characteristic scales
// =================================================================================================

/// Characteristic scales of an equation
///
/// A spacing policy turns these into a lower bound on `dx` for a given `dt`.
/// Each field is the magnitude of the coefficient in front of the matching
/// derivative, `None` when the equation has no such term:
///
/// ```text
/// ∂u/∂t = −c·u_x + ν·u_xx − β·u_xxx − κ·u_xxxx
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RhsCharacteristics {
    /// |c|, transport speed of the first-derivative term
    pub advection_speed: Option<f64>,

    /// ν, coefficient of the second-derivative term
    pub diffusivity: Option<f64>,

    /// |β|, coefficient of the third-derivative term
    pub dispersion: Option<f64>,

    /// κ, coefficient of the fourth-derivative term
    pub hyperdiffusivity: Option<f64>,
}

impl RhsCharacteristics {
    /// No known scale
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Builder pattern: set advection speed
    pub fn with_advection(mut self, speed: f64) -> Self {
        self.advection_speed = Some(speed.abs());
        self
    }

    /// Builder pattern: set diffusivity
    pub fn with_diffusion(mut self, diffusivity: f64) -> Self {
        self.diffusivity = Some(diffusivity.abs());
        self
    }

    /// Builder pattern: set dispersion coefficient
    pub fn with_dispersion(mut self, dispersion: f64) -> Self {
        self.dispersion = Some(dispersion.abs());
        self
    }

    /// Builder pattern: set hyperdiffusivity
    pub fn with_hyperdiffusion(mut self, hyperdiffusivity: f64) -> Self {
        self.hyperdiffusivity = Some(hyperdiffusivity.abs());
        self
    }

    /// True when no scale is known
    pub fn is_unknown(&self) -> bool {
        self.advection_speed.is_none()
            && self.diffusivity.is_none()
            && self.dispersion.is_none()
            && self.hyperdiffusivity.is_none()
    }

    /// Combine two sets of scales, keeping the largest magnitude per term.
    ///
    /// Used for sums of terms, where the most restrictive scale governs.
    pub fn merge(self, other: Self) -> Self {
        fn largest(a: Option<f64>, b: Option<f64>) -> Option<f64> {
            match (a, b) {
                (Some(x), Some(y)) => Some(x.max(y)),
                (x, None) => x,
                (None, y) => y,
            }
        }

        Self {
            advection_speed: largest(self.advection_speed, other.advection_speed),
            diffusivity: largest(self.diffusivity, other.diffusivity),
            dispersion: largest(self.dispersion, other.dispersion),
            hyperdiffusivity: largest(self.hyperdiffusivity, other.hyperdiffusivity),
        }
    }
}

// =================================================================================================
// Rhs trait
// =================================================================================================

/// Trait for right-hand sides
///
/// # Responsibility
///
/// Evaluates `∂u/∂t` at one grid index from the current domain. Does NOT
/// integrate in time (that's the solver's job).
///
/// # Contract
///
/// - `evaluate` must be pure: it reads `u` and returns a value, nothing else
/// - the solver calls it for every index of a step against the same,
///   unmodified domain, possibly from several threads at once
/// - a non-finite return value is reported by the solver as an execution
///   failure, it does not need to be checked here
pub trait Rhs: Send + Sync {
    /// Evaluate `∂u/∂t` at index `i` of `u` with grid spacing `dx`
    fn evaluate(&self, u: &[f64], i: usize, dx: f64) -> Result<f64, RhsError>;

    /// Characteristic scales of the equation for the domain `u`.
    ///
    /// Nonlinear equations may derive their scales from the data (e.g. the
    /// largest |u| for Burgers). Defaults to unknown.
    fn characteristics(&self, _u: &[f64]) -> RhsCharacteristics {
        RhsCharacteristics::unknown()
    }

    /// Name of the equation (used to display and logging)
    fn name(&self) -> &str {
        "custom"
    }
}

impl<R: Rhs + ?Sized> Rhs for Arc<R> {
    fn evaluate(&self, u: &[f64], i: usize, dx: f64) -> Result<f64, RhsError> {
        (**self).evaluate(u, i, dx)
    }

    fn characteristics(&self, u: &[f64]) -> RhsCharacteristics {
        (**self).characteristics(u)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<R: Rhs + ?Sized> Rhs for Box<R> {
    fn evaluate(&self, u: &[f64], i: usize, dx: f64) -> Result<f64, RhsError> {
        (**self).evaluate(u, i, dx)
    }

    fn characteristics(&self, u: &[f64]) -> RhsCharacteristics {
        (**self).characteristics(u)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// =================================================================================================
// Closure adapters
// =================================================================================================

/// Right-hand side backed by an infallible closure
///
/// Built with [`from_fn`].
#[derive(Clone)]
pub struct FnRhs<F> {
    function: F,
    name: String,
    characteristics: RhsCharacteristics,
}

/// Right-hand side backed by a fallible closure
///
/// Built with [`try_from_fn`].
#[derive(Clone)]
pub struct TryFnRhs<F> {
    function: F,
    name: String,
    characteristics: RhsCharacteristics,
}

/// Wrap a closure `(u, i, dx) → f64` as an [`Rhs`].
///
/// # Example
///
/// ```rust
/// use pde_rs::equation::{from_fn, Rhs};
/// use pde_rs::operators::laplacian;
///
/// let heat = from_fn(|u: &[f64], i: usize, dx: f64| 0.5 * laplacian(u, i, dx))
///     .named("heat")
///     .with_diffusion(0.5);
///
/// let u = [0.0, 1.0, 0.0];
/// assert_eq!(heat.evaluate(&u, 1, 1.0), Ok(-1.0));
/// ```
pub fn from_fn<F>(function: F) -> FnRhs<F>
where
    F: Fn(&[f64], usize, f64) -> f64 + Send + Sync,
{
    FnRhs {
        function,
        name: "closure".to_string(),
        characteristics: RhsCharacteristics::unknown(),
    }
}

/// Wrap a fallible closure `(u, i, dx) → Result<f64, RhsError>` as an [`Rhs`].
pub fn try_from_fn<F>(function: F) -> TryFnRhs<F>
where
    F: Fn(&[f64], usize, f64) -> Result<f64, RhsError> + Send + Sync,
{
    TryFnRhs {
        function,
        name: "closure".to_string(),
        characteristics: RhsCharacteristics::unknown(),
    }
}

macro_rules! closure_builders {
    ($adapter:ident) => {
        impl<F> $adapter<F> {
            /// Builder pattern: set the display name
            pub fn named(mut self, name: impl Into<String>) -> Self {
                self.name = name.into();
                self
            }

            /// Builder pattern: declare all characteristic scales at once
            pub fn with_characteristics(mut self, characteristics: RhsCharacteristics) -> Self {
                self.characteristics = characteristics;
                self
            }

            /// Builder pattern: declare an advection speed
            pub fn with_advection(mut self, speed: f64) -> Self {
                self.characteristics = self.characteristics.with_advection(speed);
                self
            }

            /// Builder pattern: declare a diffusivity
            pub fn with_diffusion(mut self, diffusivity: f64) -> Self {
                self.characteristics = self.characteristics.with_diffusion(diffusivity);
                self
            }

            /// Builder pattern: declare a dispersion coefficient
            pub fn with_dispersion(mut self, dispersion: f64) -> Self {
                self.characteristics = self.characteristics.with_dispersion(dispersion);
                self
            }

            /// Builder pattern: declare a hyperdiffusivity
            pub fn with_hyperdiffusion(mut self, hyperdiffusivity: f64) -> Self {
                self.characteristics = self.characteristics.with_hyperdiffusion(hyperdiffusivity);
                self
            }
        }

        impl<F> fmt::Debug for $adapter<F> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($adapter))
                    .field("name", &self.name)
                    .field("characteristics", &self.characteristics)
                    .finish()
            }
        }
    };
}

closure_builders!(FnRhs);
closure_builders!(TryFnRhs);

impl<F> Rhs for FnRhs<F>
where
    F: Fn(&[f64], usize, f64) -> f64 + Send + Sync,
{
    #[inline]
    fn evaluate(&self, u: &[f64], i: usize, dx: f64) -> Result<f64, RhsError> {
        Ok((self.function)(u, i, dx))
    }

    fn characteristics(&self, _u: &[f64]) -> RhsCharacteristics {
        self.characteristics
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> Rhs for TryFnRhs<F>
where
    F: Fn(&[f64], usize, f64) -> Result<f64, RhsError> + Send + Sync,
{
    #[inline]
    fn evaluate(&self, u: &[f64], i: usize, dx: f64) -> Result<f64, RhsError> {
        (self.function)(u, i, dx)
    }

    fn characteristics(&self, _u: &[f64]) -> RhsCharacteristics {
        self.characteristics
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// =================================================================================================
// Tests
// =================================================================================================
