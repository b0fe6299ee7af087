//! pde-rs: Periodic 1D PDE Solver Framework
//!
//! Numerically solves first-order-in-time partial differential equations
//!
//! ```text
//! ∂u/∂t = F(u, x, t)
//! ```
//!
//! on a one-dimensional periodic grid, with finite-difference stencils in
//! space and explicit integrators in time.
//!
//! # Architecture
//!
//! pde-rs is built on two core principles:
//!
//! 1. **Separation of Equations and Numerics**
//!    - Right-hand sides define equations (what to solve), built from the
//!      stencil operators
//!    - Solvers provide discretisation, time integration and the run loop
//!      (how to solve)
//!
//! 2. **Extensibility and Type Safety**
//!    - Trait-based seams: [`Rhs`](equation::Rhs),
//!      [`BoundaryPolicy`](operators::BoundaryPolicy),
//!      [`GridSpacer`](solver::GridSpacer),
//!      [`TimeIntegrator`](solver::TimeIntegrator),
//!      [`Storage`](output::Storage)
//!    - Typed errors for construction and execution
//!
//! # Quick Start
//!
//! ```rust
//! use pde_rs::prelude::*;
//!
//! # fn main() -> Result<(), SolverError> {
//! // 1. Equation: Korteweg-de Vries, initial soliton
//! let kdv = KortewegDeVries::canonical();
//! let dx = 0.4;
//! let domain = Domain::sampled(100, dx, |x| KortewegDeVries::soliton(1.0, 20.0, x));
//!
//! // 2. Solver
//! let mut solver = PdeSolver::builder(domain, kdv)
//!     .dt(0.01)
//!     .dx(dx)
//!     .integrator(RungeKutta4)
//!     .build()?;
//!
//! // 3. Run, recording every 50th step
//! let mut storage = MemoryStorage::new();
//! let report = solver.solve(&mut storage, &SolverConfiguration::steps(200).output_every(50))?;
//!
//! // 4. Access results
//! assert!(report.is_completed());
//! assert_eq!(storage.len(), 5);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`operators`]: Finite-difference stencils, boundary policies, derivative schemes
//! - [`equation`]: Domains and right-hand sides
//! - [`models`]: Ready-made equations (linear, Burgers, KdV, Kuramoto-Sivashinsky)
//! - [`solver`]: Solvers, spacing policies, integrators
//! - [`output`]: Snapshot storage and CSV export
//!
//! # Features
//!
//! - `parallel` (default): evaluate large grids with Rayon

pub mod equation;
pub mod models;
pub mod operators;
pub mod output;
pub mod solver;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use pde_rs::prelude::*;
    //! ```
    pub use crate::equation::{Domain, Rhs, RhsCharacteristics, RhsError, from_fn, try_from_fn};
    pub use crate::models::{Burgers, KortewegDeVries, KuramotoSivashinsky, LinearRhs};
    pub use crate::operators::{
        BoundaryPolicy, FirstDerivativeScheme, Periodic, d3udx3, d4udx4, dudx, laplacian,
    };
    pub use crate::output::{CsvConfig, CsvStorage, MemoryStorage, Storage};
    pub use crate::solver::{
        CancellationToken, CflSpacer, ForwardEuler, GridSpacing, PdeMultiSolver, PdeSolver,
        RungeKutta4, SolveOutcome, SolverBase, SolverConfiguration, SolverError, SolverState,
    };
}
