//! Sampled field on a 1D grid
//!
//! A [`Domain`] is the ordered, fixed-length sequence of samples `u(x_i)`.
//! Storage is a `nalgebra::DVector<f64>`, so integrators can combine domains
//! with vector arithmetic while right-hand sides read plain slices.

use nalgebra::DVector;
use std::fmt;

/// Ordered, fixed-length sequence of real samples on a 1D grid
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    values: DVector<f64>,
}

impl Domain {
    // ======================================= constructors =======================================

    /// Create from a vector of samples
    pub fn new(values: Vec<f64>) -> Self {
        Self { values: DVector::from_vec(values) }
    }

    /// Create from a DVector
    pub fn from_vector(values: DVector<f64>) -> Self {
        Self { values }
    }

    /// Create a uniform domain
    pub fn uniform(len: usize, value: f64) -> Self {
        Self { values: DVector::from_element(len, value) }
    }

    /// Sample `f` at every grid index
    ///
    /// # Example
    ///
    /// ```rust
    /// use pde_rs::equation::Domain;
    ///
    /// let squares = Domain::from_fn(4, |i| (i * i) as f64);
    /// assert_eq!(squares.as_slice(), &[0.0, 1.0, 4.0, 9.0]);
    /// ```
    pub fn from_fn<F>(len: usize, f: F) -> Self
    where
        F: Fn(usize) -> f64,
    {
        Self { values: DVector::from_fn(len, |i, _| f(i)) }
    }

    /// Sample `f(x)` on a periodic grid of `len` points with spacing `dx`
    /// starting at `x = 0`
    pub fn sampled<F>(len: usize, dx: f64, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self::from_fn(len, |i| f(i as f64 * dx))
    }

    // ========================================== Queries ==========================================

    /// Number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check emptiness
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Samples as a slice
    pub fn as_slice(&self) -> &[f64] {
        self.values.as_slice()
    }

    /// Samples as a mutable slice
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        self.values.as_mut_slice()
    }

    /// Underlying vector
    pub fn as_vector(&self) -> &DVector<f64> {
        &self.values
    }

    /// Consume into the underlying vector
    pub fn into_vector(self) -> DVector<f64> {
        self.values
    }

    /// First non-finite sample as `(index, value)`
    pub fn first_non_finite(&self) -> Option<(usize, f64)> {
        self.values
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite())
            .map(|(index, value)| (index, *value))
    }

    /// True when every sample is finite
    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }

    /// Sum of all samples (discrete mass, up to a factor dx)
    pub fn sum(&self) -> f64 {
        self.values.sum()
    }

    /// Largest absolute sample, 0 for an empty domain
    pub fn max_abs(&self) -> f64 {
        self.values.iter().fold(0.0_f64, |acc, value| acc.max(value.abs()))
    }

    // ======================================== Arithmetic =========================================

    /// `self + h · slope`, the Euler-style prediction used by every stage
    pub fn offset(&self, slope: &Domain, h: f64) -> Domain {
        assert_eq!(self.len(), slope.len(), "Domain lengths must match");
        Self { values: &self.values + &slope.values * h }
    }
}

impl From<Vec<f64>> for Domain {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<&[f64]> for Domain {
    fn from(values: &[f64]) -> Self {
        Self { values: DVector::from_row_slice(values) }
    }
}

impl From<DVector<f64>> for Domain {
    fn from(values: DVector<f64>) -> Self {
        Self::from_vector(values)
    }
}

impl std::ops::Index<usize> for Domain {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}

// Operator overloading for numerical operations

impl std::ops::Add for Domain {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        assert_eq!(self.len(), rhs.len(), "Domain lengths must match");
        self.values += rhs.values;
        self
    }
}

impl std::ops::Mul<f64> for Domain {
    type Output = Self;

    fn mul(mut self, scalar: f64) -> Self::Output {
        self.values *= scalar;
        self
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Domain [{}]", self.len())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
