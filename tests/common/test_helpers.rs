//! Helper functions for integration tests

use pde_rs::equation::Domain;
use pde_rs::output::MemoryStorage;
use pde_rs::solver::{PdeSolver, SolveReport, SolverBase, SolverConfiguration};

/// Assert that two domains are close (within tolerance)
pub fn assert_domains_close(actual: &Domain, expected: &Domain, tolerance: f64, message: &str) {
    assert_eq!(actual.len(), expected.len(), "{}: Dimension mismatch", message);

    for (i, (&v1, &v2)) in actual.as_slice().iter().zip(expected.as_slice()).enumerate() {
        let diff = (v1 - v2).abs();
        assert!(
            diff < tolerance,
            "{}: Element {} differs by {} (tolerance {})",
            message,
            i,
            diff,
            tolerance
        );
    }
}

/// Root-mean-square difference between two equally long sequences
pub fn compute_l2_error(actual: &[f64], expected: &[f64]) -> f64 {
    assert_eq!(actual.len(), expected.len());
    if actual.is_empty() {
        return 0.0;
    }

    let sum_squared_diff: f64 = actual
        .iter()
        .zip(expected)
        .map(|(a, e)| (a - e).powi(2))
        .sum();
    (sum_squared_diff / actual.len() as f64).sqrt()
}

/// Run `steps` steps into a throwaway memory sink
pub fn run_steps(solver: &mut PdeSolver, steps: usize) -> SolveReport {
    solver
        .solve(&mut MemoryStorage::new(), &SolverConfiguration::steps(steps))
        .expect("run should succeed")
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_error() {
        assert!((relative_error(1.0, 1.0) - 0.0).abs() < 1e-10);
        assert!((relative_error(1.1, 1.0) - 0.1).abs() < 1e-10);
        assert!((relative_error(0.9, 1.0) - 0.1).abs() < 1e-10);
    }

    #[test]
    fn test_l2_error() {
        assert_eq!(compute_l2_error(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
        assert!((compute_l2_error(&[0.0, 0.0], &[1.0, 1.0]) - 1.0).abs() < 1e-15);
    }
}
