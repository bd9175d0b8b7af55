//! Linear advection-diffusion of a single scalar.
//!
//! ∂φ/∂t + ∇·(a φ) = ∇·(κ ∇φ)

use glam::DVec3;

use super::{Convection, Diffusion, GoverningEquations, Source, ZeroSource};

/// Scalar transported by a uniform velocity with constant diffusivity.
#[derive(Clone, Copy, Debug)]
pub struct ScalarAdvection {
    pub velocity: DVec3,
    pub diffusivity: f64,
}

impl ScalarAdvection {
    pub fn new(velocity: DVec3, diffusivity: f64) -> Self {
        Self {
            velocity,
            diffusivity,
        }
    }
}

impl Convection for ScalarAdvection {
    fn flux(&self, u: &[f64], normal: DVec3) -> Vec<f64> {
        vec![u[0] * self.velocity.dot(normal)]
    }

    fn sorted_eigenvalues(&self, _u: &[f64], normal: DVec3) -> Vec<f64> {
        vec![self.velocity.dot(normal)]
    }
}

impl Diffusion for ScalarAdvection {
    fn flux(&self, _u: &[f64], gradient: &[DVec3], normal: DVec3) -> Vec<f64> {
        vec![self.diffusivity * gradient[0].dot(normal)]
    }

    fn max_abs_diffusivity(&self, _u: &[f64]) -> f64 {
        self.diffusivity.abs()
    }
}

impl GoverningEquations for ScalarAdvection {
    fn name(&self) -> &'static str {
        "scalar-advection"
    }

    fn num_vars(&self) -> usize {
        1
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
        self
    }

    fn source(&self) -> &dyn Source {
        &ZeroSource
    }
}
