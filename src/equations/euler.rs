//! Compressible Euler equations for an ideal gas.
//!
//! Conservative variables: `[ρ, ρu_1, .., ρu_d, E]`
//! Primitive variables: `[ρ, u_1, .., u_d, p]`
//!
//! with `p = (γ - 1)(E - ½ρ|u|²)` and sound speed `a = √(γp/ρ)`.

use std::ops::Range;

use glam::DVec3;

use super::{Convection, Diffusion, GoverningEquations, Source, ZeroDiffusion, ZeroSource};

/// Inviscid compressible flow.
#[derive(Clone, Copy, Debug)]
pub struct Euler {
    /// Ratio of specific heats.
    pub gamma: f64,
    /// Spatial dimension (1, 2 or 3).
    pub dimension: usize,
}

impl Euler {
    pub fn new(gamma: f64, dimension: usize) -> Self {
        Self { gamma, dimension }
    }

    /// Air at standard conditions.
    pub fn air(dimension: usize) -> Self {
        Self::new(1.4, dimension)
    }

    fn velocity(&self, u: &[f64]) -> DVec3 {
        let mut v = DVec3::ZERO;
        for i in 0..self.dimension {
            v[i] = u[1 + i] / u[0];
        }
        v
    }

    /// Static pressure of a conservative state.
    pub fn pressure(&self, u: &[f64]) -> f64 {
        let v = self.velocity(u);
        (self.gamma - 1.0) * (u[self.dimension + 1] - 0.5 * u[0] * v.length_squared())
    }

    /// Speed of sound of a conservative state.
    pub fn sound_speed(&self, u: &[f64]) -> f64 {
        (self.gamma * self.pressure(u) / u[0]).sqrt()
    }
}

impl Convection for Euler {
    fn flux(&self, u: &[f64], normal: DVec3) -> Vec<f64> {
        let d = self.dimension;
        let v = self.velocity(u);
        let p = self.pressure(u);
        let un = v.dot(normal);

        let mut f = Vec::with_capacity(d + 2);
        f.push(u[0] * un);
        for i in 0..d {
            f.push(u[1 + i] * un + p * normal[i]);
        }
        f.push((u[d + 1] + p) * un);
        f
    }

    fn sorted_eigenvalues(&self, u: &[f64], normal: DVec3) -> Vec<f64> {
        let un = self.velocity(u).dot(normal);
        let a = self.sound_speed(u);
        let mut eig = Vec::with_capacity(self.dimension + 2);
        eig.push(un - a);
        eig.extend(std::iter::repeat_n(un, self.dimension));
        eig.push(un + a);
        eig
    }

    fn max_abs_eigenvalue(&self, u: &[f64], normal: DVec3) -> f64 {
        self.velocity(u).dot(normal).abs() + self.sound_speed(u)
    }
}

impl GoverningEquations for Euler {
    fn name(&self) -> &'static str {
        "euler"
    }

    fn num_vars(&self) -> usize {
        self.dimension + 2
    }

    fn conservative_vars(&self, primitive: &[f64]) -> Vec<f64> {
        let d = self.dimension;
        let rho = primitive[0];
        let mut kinetic = 0.0;
        let mut u = Vec::with_capacity(d + 2);
        u.push(rho);
        for i in 0..d {
            let vi = primitive[1 + i];
            u.push(rho * vi);
            kinetic += vi * vi;
        }
        u.push(primitive[d + 1] / (self.gamma - 1.0) + 0.5 * rho * kinetic);
        u
    }

    fn primitive_vars(&self, conservative: &[f64]) -> Vec<f64> {
        let d = self.dimension;
        let v = self.velocity(conservative);
        let mut w = Vec::with_capacity(d + 2);
        w.push(conservative[0]);
        for i in 0..d {
            w.push(v[i]);
        }
        w.push(self.pressure(conservative));
        w
    }

    fn convection(&self) -> &dyn Convection {
        self
    }

    fn diffusion(&self) -> &dyn Diffusion {
        &ZeroDiffusion
    }

    fn source(&self) -> &dyn Source {
        &ZeroSource
    }

    fn vector_components(&self) -> Option<Range<usize>> {
        Some(1..1 + self.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_primitive_roundtrip() {
        let euler = Euler::air(3);
        let w = [1.2, 3.0, -1.0, 0.5, 2.5e5];
        let back = euler.primitive_vars(&euler.conservative_vars(&w));
        for (a, b) in w.iter().zip(&back) {
            assert!((a - b).abs() < 1e-9 * a.abs().max(1.0), "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_flux_at_rest_is_pressure() {
        let euler = Euler::air(2);
        let u = euler.conservative_vars(&[1.0, 0.0, 0.0, 2.0]);
        let n = DVec3::new(0.6, 0.8, 0.0);
        let f = euler.flux(&u, n);
        assert!(f[0].abs() < TOL);
        assert!((f[1] - 2.0 * 0.6).abs() < TOL);
        assert!((f[2] - 2.0 * 0.8).abs() < TOL);
        assert!(f[3].abs() < TOL);
    }

    #[test]
    fn test_eigenvalues_sorted() {
        let euler = Euler::air(1);
        let u = euler.conservative_vars(&[1.0, 0.5, 1.0]);
        let eig = euler.sorted_eigenvalues(&u, DVec3::X);
        let a = (1.4f64).sqrt();
        assert_eq!(eig.len(), 3);
        assert!((eig[0] - (0.5 - a)).abs() < TOL);
        assert!((eig[1] - 0.5).abs() < TOL);
        assert!((eig[2] - (0.5 + a)).abs() < TOL);
        assert!((euler.max_abs_eigenvalue(&u, DVec3::X) - (0.5 + a)).abs() < TOL);
    }
}
