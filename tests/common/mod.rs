//! Common utilities for integration tests

#![allow(dead_code)]

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
#[allow(unused_imports)]
pub use mock_models::{ConstantGrowth, ExponentialDecay, HeatMode};
#[allow(unused_imports)]
pub use test_helpers::{assert_domains_close, compute_l2_error, relative_error, run_steps};
