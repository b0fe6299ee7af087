//! Centered finite-difference stencils
//!
//! # Mathematical Background
//!
//! Each operator approximates one spatial derivative of `u` at grid index `i`
//! from its neighbours, assuming uniform spacing `dx`:
//!
//! ```text
//! du/dx      ≈ (u[i+1] − u[i−1]) / (2·dx)
//! d²u/dx²    ≈ (u[i+1] − 2u[i] + u[i−1]) / dx²
//! d³u/dx³    ≈ (u[i+2] − 2u[i+1] + 2u[i−1] − u[i−2]) / (2·dx³)
//! d⁴u/dx⁴    ≈ (u[i+2] − 4u[i+1] + 6u[i] − 4u[i−1] + u[i−2]) / dx⁴
//! ```
//!
//! All four are centered and second-order accurate, O(dx²). Each stencil is
//! exact for polynomials up to the degree of the derivative it computes plus
//! one (a parabola has Laplacian exactly 2, a cubic has third derivative
//! exactly 6, a quartic has fourth derivative exactly 24).
//!
//! # Boundaries
//!
//! The plain functions (`dudx`, `laplacian`, `d3udx3`, `d4udx4`) apply
//! periodic wraparound. The `*_with` variants take any
//! [`BoundaryPolicy`](super::BoundaryPolicy).
//!
//! # Validation
//!
//! None. Operators do not check `dx`, the grid length or the index beyond the
//! boundary policy itself. `dx == 0` produces `inf`/`NaN`, which the solver
//! detects and reports. An empty slice panics.
//!
//! # Example
//!
//! ```rust
//! use pde_rs::operators::{dudx, laplacian};
//!
//! let u = [1.0, 2.0, 3.0, 4.0, 5.0];
//! assert_eq!(dudx(&u, 2, 1.0), 1.0);
//! assert_eq!(laplacian(&u, 0, 1.0), 5.0);
//! ```

use super::boundary::{BoundaryPolicy, Periodic};

// =================================================================================================
// Boundary-aware operators
// =================================================================================================

/// First derivative, central differences, under `boundary`.
#[inline]
pub fn dudx_with<B: BoundaryPolicy + ?Sized>(u: &[f64], i: usize, dx: f64, boundary: &B) -> f64 {
    let i = i as isize;
    (boundary.sample(u, i + 1) - boundary.sample(u, i - 1)) / (2.0 * dx)
}

/// Second derivative (Laplacian), central differences, under `boundary`.
#[inline]
pub fn laplacian_with<B: BoundaryPolicy + ?Sized>(u: &[f64], i: usize, dx: f64, boundary: &B) -> f64 {
    let i = i as isize;
    (boundary.sample(u, i + 1) - 2.0 * boundary.sample(u, i) + boundary.sample(u, i - 1)) / (dx * dx)
}

/// Third derivative, central differences, under `boundary`.
#[inline]
pub fn d3udx3_with<B: BoundaryPolicy + ?Sized>(u: &[f64], i: usize, dx: f64, boundary: &B) -> f64 {
    let i = i as isize;
    let ip2 = boundary.sample(u, i + 2);
    let ip1 = boundary.sample(u, i + 1);
    let im1 = boundary.sample(u, i - 1);
    let im2 = boundary.sample(u, i - 2);
    (ip2 - 2.0 * ip1 + 2.0 * im1 - im2) / (2.0 * dx * dx * dx)
}

/// Fourth derivative, central differences, under `boundary`.
#[inline]
pub fn d4udx4_with<B: BoundaryPolicy + ?Sized>(u: &[f64], i: usize, dx: f64, boundary: &B) -> f64 {
    let i = i as isize;
    let ip2 = boundary.sample(u, i + 2);
    let ip1 = boundary.sample(u, i + 1);
    let centre = boundary.sample(u, i);
    let im1 = boundary.sample(u, i - 1);
    let im2 = boundary.sample(u, i - 2);
    (ip2 - 4.0 * ip1 + 6.0 * centre - 4.0 * im1 + im2) / (dx * dx * dx * dx)
}

// =================================================================================================
// Periodic operators
// =================================================================================================

/// First derivative at `i` with periodic boundaries.
///
/// ```text
/// (u[i+1] − u[i−1]) / (2·dx)
/// ```
///
/// Central differencing is not upwind-stable for advection-dominated
/// problems. Use [`FirstDerivativeScheme`](super::FirstDerivativeScheme) to
/// select an upwind variant.
#[inline]
pub fn dudx(u: &[f64], i: usize, dx: f64) -> f64 {
    dudx_with(u, i, dx, &Periodic)
}

/// Laplacian (second derivative) at `i` with periodic boundaries.
#[inline]
pub fn laplacian(u: &[f64], i: usize, dx: f64) -> f64 {
    laplacian_with(u, i, dx, &Periodic)
}

/// Third derivative at `i` with periodic boundaries.
#[inline]
pub fn d3udx3(u: &[f64], i: usize, dx: f64) -> f64 {
    d3udx3_with(u, i, dx, &Periodic)
}

/// Fourth derivative at `i` with periodic boundaries.
#[inline]
pub fn d4udx4(u: &[f64], i: usize, dx: f64) -> f64 {
    d4udx4_with(u, i, dx, &Periodic)
}

/// Short alias for [`laplacian`]
pub use self::laplacian as lap;

/// Short alias for [`d3udx3`]
pub use self::d3udx3 as d3;

/// Short alias for [`d4udx4`]
pub use self::d4udx4 as d4;

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::boundary::{Fixed, Reflective};

    const TOLERANCE: f64 = 1e-6;

    fn powers(n: usize, exponent: i32) -> Vec<f64> {
        (0..n).map(|x| (x as f64).powi(exponent)).collect()
    }

    // ====== First derivative ======

    #[test]
    fn test_dudx_linear_interior() {
        let u = [1.0, 2.0, 3.0, 4.0, 5.0];
        for i in 1..u.len() - 1 {
            assert!((dudx(&u, i, 1.0) - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_dudx_periodic_boundaries() {
        let u = [1.0, 2.0, 3.0, 4.0, 5.0];

        // (2 - 5) / 2 at the left end, (1 - 4) / 2 at the right end
        assert!((dudx(&u, 0, 1.0) + 1.5).abs() < TOLERANCE);
        assert!((dudx(&u, 4, 1.0) + 1.5).abs() < TOLERANCE);
    }

    #[test]
    fn test_dudx_constant_is_zero() {
        for n in 1..12 {
            let u = vec![3.25; n];
            for i in 0..n {
                assert_eq!(dudx(&u, i, 0.1), 0.0);
            }
        }
    }

    // ====== Laplacian ======

    #[test]
    fn test_laplacian_linear() {
        let u = [1.0, 2.0, 3.0, 4.0, 5.0];
        for i in 1..u.len() - 1 {
            assert!(laplacian(&u, i, 1.0).abs() < TOLERANCE);
        }
        assert!((laplacian(&u, 0, 1.0) - 5.0).abs() < TOLERANCE);
        assert!((laplacian(&u, 4, 1.0) + 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_laplacian_parabola() {
        let u = powers(5, 2);
        for i in 1..u.len() - 1 {
            assert!((laplacian(&u, i, 1.0) - 2.0).abs() < TOLERANCE);
        }

        // Wraparound: (1 - 0 + 16) and (0 - 32 + 9)
        assert!((laplacian(&u, 0, 1.0) - 17.0).abs() < TOLERANCE);
        assert!((laplacian(&u, 4, 1.0) + 23.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_laplacian_scales_with_dx() {
        let h = 0.1;
        let u: Vec<f64> = (0..20).map(|k| (k as f64 * h).powi(2)).collect();
        for i in 1..u.len() - 1 {
            assert!((laplacian(&u, i, h) - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_laplacian_constant_is_zero() {
        for n in 5..10 {
            let u = vec![-1.5; n];
            for i in 0..n {
                assert_eq!(laplacian(&u, i, 0.5), 0.0);
            }
        }
    }

    // ====== Third derivative ======

    #[test]
    fn test_d3udx3_cubic() {
        let u = powers(5, 3);
        for i in 2..u.len() - 2 {
            assert!((d3udx3(&u, i, 1.0) - 6.0).abs() < TOLERANCE);
        }

        let expected = [53.5, -26.5, -56.5, 23.5];
        let indices = [0, 1, 3, 4];
        for (&i, &value) in indices.iter().zip(expected.iter()) {
            let result = d3udx3(&u, i, 1.0);
            assert!(
                (result - value).abs() < TOLERANCE,
                "d3udx3 at {} = {}, expected {}", i, result, value
            );
        }
    }

    #[test]
    fn test_d3udx3_longer_grid() {
        let u = powers(12, 3);
        for i in 2..u.len() - 2 {
            assert!((d3udx3(&u, i, 1.0) - 6.0).abs() < TOLERANCE);
        }
    }

    // ====== Fourth derivative ======

    #[test]
    fn test_d4udx4_quartic_interior() {
        let u = powers(9, 4);
        for i in 2..u.len() - 2 {
            assert!((d4udx4(&u, i, 1.0) - 24.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_d4udx4_periodic_boundaries() {
        let u = powers(5, 4);

        let expected = [-931.0, 279.0, -601.0, 1229.0];
        let indices = [0, 1, 3, 4];
        for (&i, &value) in indices.iter().zip(expected.iter()) {
            let result = d4udx4(&u, i, 1.0);
            assert!(
                (result - value).abs() < TOLERANCE,
                "d4udx4 at {} = {}, expected {}", i, result, value
            );
        }
    }

    // ====== Aliases and properties ======

    #[test]
    fn test_aliases_match() {
        let u = powers(7, 3);
        for i in 0..u.len() {
            assert_eq!(lap(&u, i, 0.3).to_bits(), laplacian(&u, i, 0.3).to_bits());
            assert_eq!(d3(&u, i, 0.3).to_bits(), d3udx3(&u, i, 0.3).to_bits());
            assert_eq!(d4(&u, i, 0.3).to_bits(), d4udx4(&u, i, 0.3).to_bits());
        }
    }

    #[test]
    fn test_operators_are_deterministic() {
        let u: Vec<f64> = (0..16).map(|k| (k as f64 * 0.37).sin()).collect();
        for i in 0..u.len() {
            assert_eq!(dudx(&u, i, 0.01).to_bits(), dudx(&u, i, 0.01).to_bits());
            assert_eq!(laplacian(&u, i, 0.01).to_bits(), laplacian(&u, i, 0.01).to_bits());
            assert_eq!(d3udx3(&u, i, 0.01).to_bits(), d3udx3(&u, i, 0.01).to_bits());
            assert_eq!(d4udx4(&u, i, 0.01).to_bits(), d4udx4(&u, i, 0.01).to_bits());
        }
    }

    #[test]
    fn test_tiny_grids_alias_neighbours() {
        // N = 1: every neighbour is the sample itself
        let u = [2.0];
        assert_eq!(dudx(&u, 0, 1.0), 0.0);
        assert_eq!(laplacian(&u, 0, 1.0), 0.0);
        assert_eq!(d3udx3(&u, 0, 1.0), 0.0);
        assert_eq!(d4udx4(&u, 0, 1.0), 0.0);

        // N = 2: i + 1 and i - 1 alias onto the same sample
        let u = [1.0, 3.0];
        assert_eq!(dudx(&u, 0, 1.0), 0.0);
        assert_eq!(laplacian(&u, 0, 1.0), 4.0);
    }

    #[test]
    fn test_zero_dx_is_not_finite() {
        let u = [1.0, 2.0, 4.0, 8.0, 16.0];
        assert!(!dudx(&u, 2, 0.0).is_finite());
        assert!(!laplacian(&u, 2, 0.0).is_finite());
        assert!(!d3udx3(&u, 2, 0.0).is_finite());
        assert!(!d4udx4(&u, 2, 0.0).is_finite());

        // 0 / 0 on a flat profile
        assert!(laplacian(&[1.0; 5], 2, 0.0).is_nan());
    }

    // ====== Other boundary policies ======

    #[test]
    fn test_reflective_boundary_flat_derivative() {
        let u = [1.0, 2.0, 3.0, 4.0, 5.0];

        // Mirrored neighbours are equal, slope vanishes at the ends
        assert_eq!(dudx_with(&u, 0, 1.0, &Reflective), 0.0);
        assert_eq!(dudx_with(&u, 4, 1.0, &Reflective), 0.0);

        // Interior behaves like the periodic stencil
        assert_eq!(dudx_with(&u, 2, 1.0, &Reflective), dudx(&u, 2, 1.0));
    }

    #[test]
    fn test_fixed_boundary_uses_ghost_values() {
        let u = [1.0, 2.0, 3.0, 4.0, 5.0];
        let boundary = Fixed::new(0.0, 6.0);

        // Linear continuation: the ghost values extend the ramp
        for i in 0..u.len() {
            assert!((dudx_with(&u, i, 1.0, &boundary) - 1.0).abs() < TOLERANCE);
            assert!(laplacian_with(&u, i, 1.0, &boundary).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_dyn_boundary_policy() {
        let boundary: Box<dyn BoundaryPolicy> = Box::new(Periodic);
        let u = powers(5, 4);
        assert_eq!(
            d4udx4_with(&u, 0, 1.0, boundary.as_ref()),
            d4udx4(&u, 0, 1.0)
        );
    }
}
