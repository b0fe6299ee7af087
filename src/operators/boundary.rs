//! Boundary policies for stencil lookups
//!
//! A stencil operator asks for samples at logical indices `i - 2 ..= i + 2`.
//! Near the ends of the grid some of those indices fall outside `[0, N)`.
//! A [`BoundaryPolicy`] decides what value such a lookup produces:
//!
//! - [`Periodic`]: the grid wraps, index `-1` is the last sample
//! - [`Reflective`]: the grid is mirrored about its end points
//! - [`Fixed`]: a constant ghost value on each side (Dirichlet)
//!
//! The solver contract is periodic. The other policies exist so that
//! equation authors can build operators for other boundaries without
//! rewriting the stencils.

use std::fmt;

// =================================================================================================
// Index arithmetic
// =================================================================================================

/// Map a logical index onto `[0, len)` with true mathematical modulo.
///
/// `%` on signed integers truncates towards zero (`-1 % 5 == -1`), which would
/// index out of bounds. `rem_euclid` always returns a non-negative remainder.
///
/// # Panics
///
/// Panics when `len == 0`.
///
/// # Example
///
/// ```rust
/// use pde_rs::operators::periodic_index;
///
/// assert_eq!(periodic_index(5, -1), 4);
/// assert_eq!(periodic_index(5, 5), 0);
/// assert_eq!(periodic_index(5, -7), 3);
/// ```
#[inline]
pub fn periodic_index(len: usize, index: isize) -> usize {
    index.rem_euclid(len as isize) as usize
}

/// Mirror a logical index about the first and last samples.
///
/// Index `-1` maps to `1`, index `len` maps to `len - 2`. The mapping is
/// periodic with period `2 * (len - 1)`, so arbitrarily distant indices are
/// folded back as well. A single-sample grid always maps to `0`.
#[inline]
pub fn reflected_index(len: usize, index: isize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let folded = index.rem_euclid(period);
    if folded >= len as isize {
        (period - folded) as usize
    } else {
        folded as usize
    }
}

// =================================================================================================
// Boundary policy trait
// =================================================================================================

/// Strategy mapping a logical stencil index onto a sample value.
///
/// Implementations must be pure: the same `(u, index)` always yields the
/// same value.
pub trait BoundaryPolicy: Send + Sync {
    /// Sample `u` at a logical index that may lie outside `[0, u.len())`.
    fn sample(&self, u: &[f64], index: isize) -> f64;

    /// Name of the policy (used for display and logging)
    fn name(&self) -> &str;
}

/// Periodic wraparound: the point after the last equals the first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Periodic;

impl BoundaryPolicy for Periodic {
    #[inline]
    fn sample(&self, u: &[f64], index: isize) -> f64 {
        u[periodic_index(u.len(), index)]
    }

    fn name(&self) -> &str {
        "periodic"
    }
}

/// Even reflection about the end points (zero-flux / Neumann-like).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reflective;

impl BoundaryPolicy for Reflective {
    #[inline]
    fn sample(&self, u: &[f64], index: isize) -> f64 {
        u[reflected_index(u.len(), index)]
    }

    fn name(&self) -> &str {
        "reflective"
    }
}

/// Fixed ghost values outside the grid (Dirichlet).
///
/// Any index below zero reads `left`, any index at or past `len` reads
/// `right`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixed {
    /// Value seen to the left of sample 0
    pub left: f64,

    /// Value seen to the right of the last sample
    pub right: f64,
}

impl Fixed {
    /// Create a fixed boundary with distinct ghost values
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Create a fixed boundary with the same ghost value on both sides
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value)
    }
}

impl BoundaryPolicy for Fixed {
    #[inline]
    fn sample(&self, u: &[f64], index: isize) -> f64 {
        if index < 0 {
            self.left
        } else if index as usize >= u.len() {
            self.right
        } else {
            u[index as usize]
        }
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fixed (left = {}, right = {})", self.left, self.right)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
