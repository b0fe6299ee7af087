//! Fisher-KPP Equation on a Periodic Ring
//!
//! ∂u/∂t = D·∂²u/∂x² + r·u·(1-u)
//!
//! A localised colony spreads in both directions around the ring. The same
//! run is solved with Forward Euler and RK4, the front positions are
//! compared and the RK4 trajectory is written to CSV.

use pde_rs::equation::{Domain, Rhs, RhsCharacteristics, RhsError};
use pde_rs::operators::laplacian;
use pde_rs::output::{CsvConfig, CsvMetadata, CsvStorage, MemoryStorage};
use pde_rs::solver::{
    CflSpacer, ForwardEuler, PdeSolver, RungeKutta4, SolverBase, SolverConfiguration,
};
use std::error::Error;

/// Fisher-KPP diffusion-reaction model
struct FisherKpp {
    diffusion: f64,
    growth_rate: f64,
}

impl Rhs for FisherKpp {
    fn evaluate(&self, u: &[f64], i: usize, dx: f64) -> Result<f64, RhsError> {
        // Diffusion term: D·∂²u/∂x²
        let diffusion_term = self.diffusion * laplacian(u, i, dx);

        // Reaction term: r·u·(1-u)
        let reaction_term = self.growth_rate * u[i] * (1.0 - u[i]);

        Ok(diffusion_term + reaction_term)
    }

    fn characteristics(&self, _u: &[f64]) -> RhsCharacteristics {
        RhsCharacteristics::unknown().with_diffusion(self.diffusion)
    }

    fn name(&self) -> &str {
        "Fisher-KPP Diffusion-Reaction"
    }
}

/// Rightmost crossing of u = 0.5, interpolated between grid points
fn find_front(u: &[f64], dx: f64) -> Option<f64> {
    (0..u.len() - 1).rev().find_map(|i| {
        if u[i] >= 0.5 && u[i + 1] < 0.5 {
            let t = (u[i] - 0.5) / (u[i] - u[i + 1]);
            Some((i as f64 + t) * dx)
        } else {
            None
        }
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== Fisher-KPP: Periodic Ring ===\n");

    // Physical parameters
    let length = 1.0;
    let n_points = 200;
    let diffusion = 0.001;
    let growth_rate = 1.0;

    // Simulation parameters
    let final_time = 5.0;
    let dt = 0.002;

    println!("Physical Parameters:");
    println!("  Ring length: {} m", length);
    println!("  Spatial points: {}", n_points);
    println!("  Diffusion D: {} m²/s", diffusion);
    println!("  Growth rate r: {} s⁻¹", growth_rate);
    println!("\nSimulation:");
    println!("  Final time: {} s", final_time);
    println!("  dt: {} s\n", dt);

    let dx = length / n_points as f64;
    let initial = Domain::sampled(n_points, dx, |x| {
        if (x - 0.5 * length).abs() < 0.05 { 1.0 } else { 0.0 }
    });

    let model = || FisherKpp { diffusion, growth_rate };
    let config = SolverConfiguration::duration(final_time).output_every(250);

    // CFL check: the diffusion bound must admit the chosen dx
    let mut euler = PdeSolver::builder(initial.clone(), model())
        .dt(dt)
        .dx(dx)
        .integrator(ForwardEuler)
        .build()?;
    let cfl = PdeSolver::builder(initial.clone(), model())
        .dt(dt)
        .auto_dx(CflSpacer::default())
        .build()?;
    println!("Smallest stable dx for dt = {}: {:.5} m (using {:.5} m)\n", dt, cfl.dx(), dx);

    // Solve with Euler
    println!("Solving with Forward Euler...");
    let start = std::time::Instant::now();
    let mut euler_storage = MemoryStorage::new();
    let report = euler.solve(&mut euler_storage, &config)?;
    println!(
        "✓ Euler completed {} steps in {:.3}s ({} snapshots)\n",
        report.steps_taken,
        start.elapsed().as_secs_f64(),
        report.snapshots_written
    );

    // Solve with RK4, streaming every snapshot to CSV
    let mut rk4 = PdeSolver::builder(initial, model())
        .dt(dt)
        .dx(dx)
        .integrator(RungeKutta4)
        .build()?;

    let mut metadata = CsvMetadata::from_solver(&rk4);
    metadata.add_custom("Diffusion", diffusion);
    metadata.add_custom("Growth rate", growth_rate);

    let path = std::env::temp_dir().join("fisher_kpp_rk4.csv");
    let mut csv = CsvStorage::create(&path, CsvConfig::default().with_metadata(metadata))?;
    let mut rk4_storage = MemoryStorage::new();

    println!("Solving with RK4...");
    let start = std::time::Instant::now();
    let report = rk4.solve(&mut rk4_storage, &config)?;
    println!("✓ RK4 completed in {:.3}s\n", start.elapsed().as_secs_f64());

    rk4.reset();
    rk4.solve(&mut csv, &config)?;
    csv.close()?;
    println!("✓ {} rows written to {}\n", csv.rows(), path.display());

    // Analysis
    let u_euler = euler_storage.latest(0).ok_or("Euler run produced no snapshot")?;
    let u_rk4 = rk4_storage.latest(0).ok_or("RK4 run produced no snapshot")?;

    println!("Analysis at t = {:.3} s:", report.final_time);
    if let Some(front) = find_front(u_euler, dx) {
        println!("  Euler front position (u=0.5): {:.4} m", front);
    }
    if let Some(front) = find_front(u_rk4, dx) {
        println!("  RK4 front position (u=0.5):   {:.4} m", front);
    }

    let diff: f64 = u_euler
        .iter()
        .zip(u_rk4)
        .map(|(a, b)| (a - b).powi(2))
        .sum();
    let l2_diff = (diff / n_points as f64).sqrt();
    println!("  L² difference Euler/RK4: {:.6}", l2_diff);

    // Theoretical front speed 2·√(D·r)
    let speed = 2.0 * (diffusion * growth_rate).sqrt();
    println!("  Theoretical front speed: {:.4} m/s", speed);

    println!("\n=== Simulation Complete ===");
    println!("Expected: two fronts travelling away from the centre of the ring");

    Ok(())
}
