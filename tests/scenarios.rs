//! End-to-end scenarios checked against hand-computed values:
//! - a resting gas column (exact internal flux and time step)
//! - one SSP-RK3 step of an ODE source against its closed form
//! - Courant scaling of the global step
//! - Sod shock tube: conservation and undisturbed far field
//! - uniform channel flow between slip walls

use std::sync::Arc;

use fvm_rs::boundary::{BoundaryCondition, Extrapolated, SlipWall};
use fvm_rs::equations::{
    Convection, Diffusion, Euler, GoverningEquations, Source, ZeroDiffusion,
};
use fvm_rs::flux::{RiemannSolverKind, create_riemann_solver};
use fvm_rs::mesh::{structured_1d, structured_2d};
use fvm_rs::solver::{
    ConvectionResidual, LeastSquares, PiecewiseConstant, SourceResidual, SpatialDiscretization,
    TimeStepping,
};
use fvm_rs::time::{IntegratorInfo, StandardIntegrator, TimeIntegrator};
use fvm_rs::{Mesh, Solver, SolverConfig};
use glam::DVec3;

fn extrapolate_everywhere(mesh: &mut Mesh, eq: &Arc<dyn GoverningEquations>) {
    let names: Vec<String> = mesh.boundaries().iter().map(|b| b.name().to_string()).collect();
    for name in names {
        let bc: Arc<dyn BoundaryCondition> = Arc::new(Extrapolated::new(eq.clone()));
        mesh.set_boundary_condition(&name, bc).unwrap();
    }
}

// =============================================================================
// Resting gas
// =============================================================================

#[test]
fn test_resting_gas_column() {
    let euler = Euler::air(1);
    let eq: Arc<dyn GoverningEquations> = Arc::new(euler);
    let mut mesh = structured_1d(0.0, 1.0, 2).unwrap();
    mesh.allocate_state(3, 1);
    mesh.set_initial_condition(|_| vec![1.0, 0.0, 2.5]).unwrap();
    extrapolate_everywhere(&mut mesh, &eq);

    let courant = 0.8;
    let spatial = SpatialDiscretization::new(eq.clone(), TimeStepping::Local, courant)
        .with_assembler(ConvectionResidual::new(
            create_riemann_solver(RiemannSolverKind::Rusanov, eq.clone()),
            Arc::new(PiecewiseConstant),
        ));
    spatial.clear_residuals(&mut mesh);
    spatial.assemble_residual(&mut mesh, 0.0).unwrap();
    spatial.update_time_steps(&mut mesh).unwrap();

    let p = euler.pressure(&[1.0, 0.0, 2.5]);
    assert!((p - 1.0).abs() < 1e-14);
    let internal = &mesh.internal_faces()[0];
    assert!(internal.flux[0].abs() < 1e-14);
    assert!((internal.flux[1] - p).abs() < 1e-14);
    assert!(internal.flux[2].abs() < 1e-14);

    let a = euler.sound_speed(&[1.0, 0.0, 2.5]);
    let expected_dt = courant * 0.5 / (2.0 * a);
    for cell in mesh.cells() {
        assert!(cell.residual.iter().all(|r| r.abs() < 1e-14));
        assert!((cell.dt - expected_dt).abs() < 1e-14, "dt = {}", cell.dt);
    }
}

// =============================================================================
// SSP-RK3 on a source-driven ODE
// =============================================================================

/// `dU/dt = [U0 + U1, U0² + 2 U1]` with unit wave speeds and no flux.
struct CoupledOde;

impl Convection for CoupledOde {
    fn flux(&self, u: &[f64], _normal: DVec3) -> Vec<f64> {
        vec![0.0; u.len()]
    }

    fn sorted_eigenvalues(&self, _u: &[f64], _normal: DVec3) -> Vec<f64> {
        vec![-1.0, 1.0]
    }
}

impl Source for CoupledOde {
    fn source_vector(&self, _position: DVec3, u: &[f64], _gradient: &[DVec3]) -> Vec<f64> {
        ode_rate(u).to_vec()
    }
}

fn ode_rate(u: &[f64]) -> [f64; 2] {
    [u[0] + u[1], u[0] * u[0] + 2.0 * u[1]]
}

impl GoverningEquations for CoupledOde {
    fn name(&self) -> &'static str {
        "coupled-ode"
    }

    fn num_vars(&self) -> usize {
        2
    }

    fn conservative_vars(&self, primitive: &[f64]) -> Vec<f64> {
        primitive.to_vec()
    }

    fn primitive_vars(&self, conservative: &[f64]) -> Vec<f64> {
        conservative.to_vec()
    }

    fn convection(&self) -> &dyn Convection {
        self
    }

    fn diffusion(&self) -> &dyn Diffusion {
        &ZeroDiffusion
    }

    fn source(&self) -> &dyn Source {
        self
    }
}

#[test]
fn test_ssp_rk3_step_matches_closed_form() {
    let eq: Arc<dyn GoverningEquations> = Arc::new(CoupledOde);
    let mut mesh = structured_1d(0.0, 1.0, 1).unwrap();
    mesh.allocate_state(2, 1);
    let u0 = [0.4, 78.5];
    mesh.set_initial_condition(|_| u0.to_vec()).unwrap();

    let spatial = SpatialDiscretization::new(eq.clone(), TimeStepping::Global, 0.8)
        .with_assembler(SourceResidual::new(eq));
    let integrator = StandardIntegrator::SspRk3;
    assert_eq!(integrator.n_stages(), 3);
    let dt = integrator
        .update_cell_averages(&mut mesh, &spatial, 0.0)
        .unwrap();

    // Unit volume, two unit faces, |λ| = 1.
    assert!((dt - 0.4).abs() < 1e-14);

    let euler_step = |u: [f64; 2]| {
        let s = ode_rate(&u);
        [u[0] + dt * s[0], u[1] + dt * s[1]]
    };
    let u1 = euler_step(u0);
    let e1 = euler_step(u1);
    let u2 = [
        0.75 * u0[0] + 0.25 * e1[0],
        0.75 * u0[1] + 0.25 * e1[1],
    ];
    let e2 = euler_step(u2);
    let expected = [
        u0[0] / 3.0 + 2.0 / 3.0 * e2[0],
        u0[1] / 3.0 + 2.0 / 3.0 * e2[1],
    ];

    let cell = &mesh.cells()[0];
    for k in 0..2 {
        let scale = expected[k].abs().max(1.0);
        assert!(
            (cell.u[k] - expected[k]).abs() < 1e-12 * scale,
            "component {k}: {} vs {}",
            cell.u[k],
            expected[k]
        );
    }
    assert_eq!(cell.history[0], u0.to_vec());
}

// =============================================================================
// Courant scaling
// =============================================================================

#[test]
fn test_global_step_scales_with_courant() {
    let euler = Euler::air(2);
    let eq: Arc<dyn GoverningEquations> = Arc::new(euler);

    let step = |courant: f64| {
        let mut mesh = structured_2d([0.0, 2.0, 0.0, 1.0], 8, 4).unwrap();
        mesh.allocate_state(4, 1);
        mesh.set_initial_condition(|x| euler.conservative_vars(&[1.0 + 0.1 * x.x, 0.3, 0.1, 1.0]))
            .unwrap();
        extrapolate_everywhere(&mut mesh, &eq);
        let config = SolverConfig::default()
            .with_courant(courant)
            .with_integrator(StandardIntegrator::ExplicitEuler);
        let mut solver = Solver::new(mesh, eq.clone(), config)
            .unwrap()
            .with_assembler(ConvectionResidual::new(
                create_riemann_solver(RiemannSolverKind::Hll, eq.clone()),
                Arc::new(PiecewiseConstant),
            ));
        solver.update_cell_averages().unwrap()
    };

    let full = step(0.8);
    let half = step(0.4);
    assert!(full > 0.0);
    assert!((full - 2.0 * half).abs() < 1e-14 * full.max(1.0));
}

// =============================================================================
// Sod shock tube
// =============================================================================

#[test]
fn test_sod_shock_tube() {
    let euler = Euler::air(1);
    let eq: Arc<dyn GoverningEquations> = Arc::new(euler);
    let mut mesh = structured_1d(0.0, 1.0, 100).unwrap();
    mesh.allocate_state(3, 1);
    mesh.set_initial_condition(|x| {
        if x.x < 0.5 {
            euler.conservative_vars(&[1.0, 0.0, 1.0])
        } else {
            euler.conservative_vars(&[0.125, 0.0, 0.1])
        }
    })
    .unwrap();
    extrapolate_everywhere(&mut mesh, &eq);

    let mass = |mesh: &Mesh| -> f64 { mesh.cells().iter().map(|c| c.u[0] * c.volume()).sum() };
    let initial_mass = mass(&mesh);

    let config = SolverConfig::default().with_courant(0.5);
    let mut solver = Solver::new(mesh, eq.clone(), config)
        .unwrap()
        .with_assembler(ConvectionResidual::new(
            create_riemann_solver(RiemannSolverKind::Hll, eq),
            Arc::new(LeastSquares::new(true)),
        ));
    while solver.time() < 0.1 {
        solver.update_cell_averages().unwrap();
    }

    let mesh = solver.mesh();
    assert!((mass(mesh) - initial_mass).abs() < 1e-10);
    for cell in mesh.cells() {
        let rho = cell.u[0];
        assert!(rho > 0.1 && rho < 1.01, "rho = {rho}");
        assert!(euler.pressure(&cell.u) > 0.0);
    }

    // Rarefaction head and shock have not reached these points yet.
    let probe = |x: f64| {
        let i = (x * 100.0) as usize;
        mesh.cells()[i].u[0]
    };
    assert!((probe(0.2) - 1.0).abs() < 1e-3);
    assert!((probe(0.85) - 0.125).abs() < 1e-3);
    // Between the contact and the shock the gas is compressed.
    assert!(probe(0.62) > 0.2);
}

// =============================================================================
// Slip-wall channel
// =============================================================================

#[test]
fn test_uniform_channel_flow_is_preserved() {
    let euler = Euler::air(2);
    let eq: Arc<dyn GoverningEquations> = Arc::new(euler);
    let mut mesh = structured_2d([0.0, 4.0, 0.0, 1.0], 8, 3).unwrap();
    mesh.allocate_state(4, 1);
    let state = euler.conservative_vars(&[1.0, 0.5, 0.0, 1.0]);
    mesh.set_initial_condition(|_| state.clone()).unwrap();
    for name in ["bottom", "top"] {
        let wall: Arc<dyn BoundaryCondition> = Arc::new(SlipWall::new(eq.clone()));
        mesh.set_boundary_condition(name, wall).unwrap();
    }
    for name in ["left", "right"] {
        let open: Arc<dyn BoundaryCondition> = Arc::new(Extrapolated::new(eq.clone()));
        mesh.set_boundary_condition(name, open).unwrap();
    }

    let config = SolverConfig::default()
        .with_time_stepping(TimeStepping::Local)
        .with_max_iterations(10);
    let mut solver = Solver::new(mesh, eq.clone(), config)
        .unwrap()
        .with_assembler(ConvectionResidual::new(
            create_riemann_solver(RiemannSolverKind::Rusanov, eq),
            Arc::new(LeastSquares::new(false)),
        ));
    let summary = solver.run().unwrap();
    assert!(summary.converged);

    for cell in solver.mesh().cells() {
        for (a, b) in cell.u.iter().zip(&state) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
