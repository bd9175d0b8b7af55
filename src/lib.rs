//! # fvm-rs
//!
//! Cell-centred finite-volume core for systems of conservation laws on
//! unstructured meshes.
//!
//! This crate provides:
//! - Mesh topology with face deduplication and ghost cells ([`mesh`])
//! - Shape measures for the supported VTK cell types ([`geometry`])
//! - Governing-equation contracts and a few models ([`equations`])
//! - Approximate Riemann solvers: Rusanov, HLL, HLLC ([`flux`])
//! - Boundary conditions ([`boundary`])
//! - Reconstruction, residual assembly and local time steps ([`solver`])
//! - Explicit SSP Runge-Kutta integration ([`time`])
//! - A configurable run driver ([`simulation`])
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use fvm_rs::boundary::Extrapolated;
//! use fvm_rs::equations::{Euler, GoverningEquations};
//! use fvm_rs::flux::{RiemannSolverKind, create_riemann_solver};
//! use fvm_rs::mesh::structured_1d;
//! use fvm_rs::simulation::{Solver, SolverConfig};
//! use fvm_rs::solver::{ConvectionResidual, LeastSquares};
//!
//! // Sod shock tube
//! let euler = Euler::air(1);
//! let eq: Arc<dyn GoverningEquations> = Arc::new(euler);
//! let mut mesh = structured_1d(0.0, 1.0, 50).unwrap();
//! mesh.allocate_state(3, 1);
//! mesh.set_initial_condition(|x| {
//!     if x.x < 0.5 {
//!         euler.conservative_vars(&[1.0, 0.0, 1.0])
//!     } else {
//!         euler.conservative_vars(&[0.125, 0.0, 0.1])
//!     }
//! })
//! .unwrap();
//! for name in ["left", "right"] {
//!     mesh.set_boundary_condition(name, Arc::new(Extrapolated::new(eq.clone()))).unwrap();
//! }
//!
//! let convection = ConvectionResidual::new(
//!     create_riemann_solver(RiemannSolverKind::Hll, eq.clone()),
//!     Arc::new(LeastSquares::new(true)),
//! );
//! let config = SolverConfig::default().with_max_iterations(20);
//! let mut solver = Solver::new(mesh, eq, config).unwrap().with_assembler(convection);
//!
//! solver.run().unwrap();
//! assert_eq!(solver.iteration(), 20);
//! ```

pub mod boundary;
pub mod equations;
pub mod flux;
pub mod geometry;
pub mod mesh;
pub mod simulation;
pub mod solver;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use equations::GoverningEquations;
pub use flux::{RiemannSolver, RiemannSolverKind, create_riemann_solver};
pub use mesh::{Mesh, MeshBuilder, MeshError};
pub use simulation::{Solver, SolverConfig};
pub use solver::SolverError;
pub use time::{ResidualNorm, StandardIntegrator};
pub use types::{CellIndex, FaceIndex, NodeIndex};
