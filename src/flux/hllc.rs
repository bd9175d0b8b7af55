//! HLLC solvers for the artificial-compressibility models.
//!
//! States are rotated into the face frame (normal, tangent1, tangent2) of the
//! [`Surface`], solved as a one-dimensional problem along the normal and the
//! momentum flux is rotated back. The contact speed `S*` splits the fan:
//!
//! ```text
//!        S_L      S*      S_R
//!   U_L   \  U*_L  |  U*_R  /   U_R
//! ```
//!
//! and the flux is `F_K + S_K (U*_K − U_K)` on the side `K` holding the face.
//! A configuration matching no branch (NaN speeds) is an error carrying both
//! states.

use glam::DVec3;

use super::RiemannSolver;
use super::traits::all_finite;
use crate::equations::{ArtificialCompressibility, ArtificialCompressibilityVof};
use crate::geometry::Surface;
use crate::solver::SolverError;

/// Which part of the fan holds the face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FanRegion {
    Left,
    StarLeft,
    StarRight,
    Right,
}

fn fan_region(sl: f64, s_star: f64, sr: f64) -> Option<FanRegion> {
    if sl >= 0.0 {
        Some(FanRegion::Left)
    } else if sr <= 0.0 {
        Some(FanRegion::Right)
    } else if s_star >= 0.0 {
        Some(FanRegion::StarLeft)
    } else if s_star < 0.0 {
        Some(FanRegion::StarRight)
    } else {
        None
    }
}

/// `F + s (U* − U)`.
fn star_flux(f: &[f64], s: f64, star: &[f64], q: &[f64]) -> Vec<f64> {
    (0..f.len()).map(|i| f[i] + s * (star[i] - q[i])).collect()
}

// =============================================================================
// Single phase
// =============================================================================

/// HLLC for [`ArtificialCompressibility`].
///
/// Star velocity and pressure are the HLL averages of the normal velocity and
/// pressure; tangential velocities follow `(S U − F)/(S − S*)`.
#[derive(Clone, Copy, Debug)]
pub struct HllcArtificialCompressibility {
    equations: ArtificialCompressibility,
}

impl HllcArtificialCompressibility {
    pub fn new(equations: ArtificialCompressibility) -> Self {
        Self { equations }
    }

    /// Local state `[p, u_n, u_t1, u_t2]`.
    fn local_state(u: &[f64], surface: &Surface) -> [f64; 4] {
        let v = surface.to_local(ArtificialCompressibility::velocity(u));
        [u[0], v.x, v.y, v.z]
    }

    fn local_flux(&self, q: &[f64; 4]) -> [f64; 4] {
        let un = q[1];
        [self.equations.beta * un, un * un + q[0], q[2] * un, q[3] * un]
    }
}

impl RiemannSolver for HllcArtificialCompressibility {
    fn flux(&self, ul: &[f64], ur: &[f64], surface: &Surface) -> Result<Vec<f64>, SolverError> {
        let beta = self.equations.beta;
        let ql = Self::local_state(ul, surface);
        let qr = Self::local_state(ur, surface);
        let fl = self.local_flux(&ql);
        let fr = self.local_flux(&qr);

        let cl = self.equations.pseudo_sound_speed(ql[1]);
        let cr = self.equations.pseudo_sound_speed(qr[1]);
        let sl = (ql[1] - cl).min(qr[1] - cr);
        let sr = (ql[1] + cl).max(qr[1] + cr);
        if !all_finite(&[sl, sr]) || !all_finite(&fl) || !all_finite(&fr) {
            return Err(SolverError::non_finite(self.name(), ul, ur));
        }

        let local = match fan_region(sl, 0.0, sr) {
            Some(FanRegion::Left) => fl.to_vec(),
            Some(FanRegion::Right) => fr.to_vec(),
            _ => {
                let inv = 1.0 / (sr - sl);
                let s_star = (sr * qr[1] - sl * ql[1] - (fr[1] - fl[1])) * inv;
                let p_star = (sr * qr[0] - sl * ql[0] - beta * (qr[1] - ql[1])) * inv;
                let star = |q: &[f64; 4], f: &[f64; 4], s: f64| {
                    let k = 1.0 / (s - s_star);
                    [
                        p_star,
                        s_star,
                        (s * q[2] - f[2]) * k,
                        (s * q[3] - f[3]) * k,
                    ]
                };
                match fan_region(sl, s_star, sr) {
                    Some(FanRegion::StarLeft) => star_flux(&fl, sl, &star(&ql, &fl, sl), &ql),
                    Some(FanRegion::StarRight) => star_flux(&fr, sr, &star(&qr, &fr, sr), &qr),
                    _ => {
                        return Err(SolverError::UnresolvedFan {
                            solver: self.name(),
                            sl,
                            s_star,
                            sr,
                            left: ul.to_vec(),
                            right: ur.to_vec(),
                        });
                    }
                }
            }
        };

        let m = surface.to_global(DVec3::new(local[1], local[2], local[3]));
        let flux = vec![local[0], m.x, m.y, m.z];
        if !all_finite(&flux) {
            return Err(SolverError::non_finite(self.name(), ul, ur));
        }
        Ok(flux)
    }

    fn name(&self) -> &'static str {
        "hllc-ac"
    }
}

// =============================================================================
// Volume of fluid
// =============================================================================

/// HLLC for [`ArtificialCompressibilityVof`].
///
/// Contact speed from the momentum jump conditions,
///
/// S* = (p_R − p_L + ρ_L u_L (S_L − u_L) − ρ_R u_R (S_R − u_R))
///      / (ρ_L (S_L − u_L) − ρ_R (S_R − u_R))
///
/// star pressure as the mean of `p_K + ρ_K (S_K − u_K)(S* − u_K)` and star
/// states scaled by `χ_K = (S_K − u_K)/(S_K − S*)`.
#[derive(Clone, Copy, Debug)]
pub struct HllcArtificialCompressibilityVof {
    equations: ArtificialCompressibilityVof,
}

impl HllcArtificialCompressibilityVof {
    pub fn new(equations: ArtificialCompressibilityVof) -> Self {
        Self { equations }
    }

    /// Local state `[p, ρu_n, ρu_t1, ρu_t2, α]`.
    fn local_state(u: &[f64], surface: &Surface) -> [f64; 5] {
        let m = surface.to_local(DVec3::new(u[1], u[2], u[3]));
        [u[0], m.x, m.y, m.z, u[4]]
    }

    fn local_flux(&self, q: &[f64; 5], rho: f64) -> [f64; 5] {
        let un = q[1] / rho;
        [
            self.equations.beta * un,
            q[1] * un + q[0],
            q[2] * un,
            q[3] * un,
            q[4] * un,
        ]
    }
}

impl RiemannSolver for HllcArtificialCompressibilityVof {
    fn flux(&self, ul: &[f64], ur: &[f64], surface: &Surface) -> Result<Vec<f64>, SolverError> {
        let eq = &self.equations;
        let ql = Self::local_state(ul, surface);
        let qr = Self::local_state(ur, surface);
        let rho_l = eq.density(ql[4]);
        let rho_r = eq.density(qr[4]);
        let (u_l, u_r) = (ql[1] / rho_l, qr[1] / rho_r);
        let fl = self.local_flux(&ql, rho_l);
        let fr = self.local_flux(&qr, rho_r);

        let cl = eq.pseudo_sound_speed(u_l, rho_l);
        let cr = eq.pseudo_sound_speed(u_r, rho_r);
        let sl = (u_l - cl).min(u_r - cr);
        let sr = (u_l + cl).max(u_r + cr);
        if !all_finite(&[sl, sr, rho_l, rho_r]) || !all_finite(&fl) || !all_finite(&fr) {
            return Err(SolverError::non_finite(self.name(), ul, ur));
        }

        let (pl, pr) = (ql[0], qr[0]);
        let s_star = (pr - pl + rho_l * u_l * (sl - u_l) - rho_r * u_r * (sr - u_r))
            / (rho_l * (sl - u_l) - rho_r * (sr - u_r));
        let p_star = 0.5
            * (pl + rho_l * (sl - u_l) * (s_star - u_l) + pr + rho_r * (sr - u_r) * (s_star - u_r));

        let star = |q: &[f64; 5], rho: f64, u: f64, s: f64| {
            let chi = (s - u) / (s - s_star);
            [
                p_star,
                rho * chi * s_star,
                chi * q[2],
                chi * q[3],
                chi * q[4],
            ]
        };

        let local = match fan_region(sl, s_star, sr) {
            Some(FanRegion::Left) => fl.to_vec(),
            Some(FanRegion::StarLeft) => star_flux(&fl, sl, &star(&ql, rho_l, u_l, sl), &ql),
            Some(FanRegion::StarRight) => star_flux(&fr, sr, &star(&qr, rho_r, u_r, sr), &qr),
            Some(FanRegion::Right) => fr.to_vec(),
            None => {
                return Err(SolverError::UnresolvedFan {
                    solver: self.name(),
                    sl,
                    s_star,
                    sr,
                    left: ul.to_vec(),
                    right: ur.to_vec(),
                });
            }
        };

        let m = surface.to_global(DVec3::new(local[1], local[2], local[3]));
        let flux = vec![local[0], m.x, m.y, m.z, local[4]];
        if !all_finite(&flux) {
            return Err(SolverError::non_finite(self.name(), ul, ur));
        }
        Ok(flux)
    }

    fn name(&self) -> &'static str {
        "hllc-ac-vof"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::Convection;

    const TOL: f64 = 1e-10;

    fn oblique() -> Surface {
        Surface::new(0.7, DVec3::ZERO, DVec3::new(1.0, 2.0, -0.5)).unwrap()
    }

    fn assert_close(a: &[f64], b: &[f64], what: &str) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).abs() < TOL, "{}[{}]: {} vs {}", what, i, x, y);
        }
    }

    #[test]
    fn test_fan_region() {
        assert_eq!(fan_region(0.0, 1.0, 2.0), Some(FanRegion::Left));
        assert_eq!(fan_region(-2.0, -1.0, 0.0), Some(FanRegion::Right));
        assert_eq!(fan_region(-1.0, 0.0, 1.0), Some(FanRegion::StarLeft));
        assert_eq!(fan_region(-1.0, -0.5, 1.0), Some(FanRegion::StarRight));
        assert_eq!(fan_region(-1.0, f64::NAN, 1.0), None);
    }

    #[test]
    fn test_ac_consistency() {
        let eq = ArtificialCompressibility::new(2.0, 0.0);
        let solver = HllcArtificialCompressibility::new(eq);
        let u = [1.3, 0.4, -0.2, 0.7];
        let s = oblique();
        let f = solver.flux(&u, &u, &s).unwrap();
        assert_close(&f, &eq.flux(&u, s.normal), "hllc-ac");
    }

    #[test]
    fn test_ac_antisymmetry() {
        let solver = HllcArtificialCompressibility::new(ArtificialCompressibility::new(2.0, 0.0));
        let ul = [1.0, 0.5, 0.1, -0.3];
        let ur = [0.2, -0.4, 0.8, 0.0];
        let s = oblique();
        let f = solver.flux(&ul, &ur, &s).unwrap();
        let g = solver.flux(&ur, &ul, &s.flipped()).unwrap();
        let neg: Vec<f64> = g.iter().map(|v| -v).collect();
        assert_close(&f, &neg, "hllc-ac antisymmetry");
    }

    #[test]
    fn test_ac_without_compressibility_upwinds() {
        // beta = 0 with positive normal velocity puts S_L at 0: pure left flux.
        let eq = ArtificialCompressibility::new(0.0, 0.0);
        let solver = HllcArtificialCompressibility::new(eq);
        let s = Surface::new(1.0, DVec3::ZERO, DVec3::X).unwrap();
        let ul = [1.0, 2.0, 0.5, 0.0];
        let ur = [0.5, 1.5, -0.5, 0.2];
        let f = solver.flux(&ul, &ur, &s).unwrap();
        assert_close(&f, &eq.flux(&ul, DVec3::X), "upwind");
    }

    #[test]
    fn test_ac_nan_reports_states() {
        let solver = HllcArtificialCompressibility::new(ArtificialCompressibility::new(1.0, 0.0));
        let s = Surface::new(1.0, DVec3::ZERO, DVec3::X).unwrap();
        let err = solver
            .flux(&[0.0, f64::NAN, 0.0, 0.0], &[0.0; 4], &s)
            .unwrap_err();
        assert!(matches!(err, SolverError::NonFiniteState { solver: "hllc-ac", .. }));
    }

    fn vof() -> ArtificialCompressibilityVof {
        ArtificialCompressibilityVof::new(10.0, 1000.0, 1.2, DVec3::ZERO)
    }

    #[test]
    fn test_vof_consistency() {
        let eq = vof();
        let solver = HllcArtificialCompressibilityVof::new(eq);
        let u = eq_state(&eq, [2.0, 0.3, -0.1, 0.05, 0.6]);
        let s = oblique();
        let f = solver.flux(&u, &u, &s).unwrap();
        assert_close(&f, &eq.flux(&u, s.normal), "hllc-vof");
    }

    #[test]
    fn test_vof_antisymmetry() {
        let eq = vof();
        let solver = HllcArtificialCompressibilityVof::new(eq);
        let ul = eq_state(&eq, [1.0, 0.2, 0.1, 0.0, 1.0]);
        let ur = eq_state(&eq, [0.5, -0.1, 0.0, 0.3, 0.0]);
        let s = oblique();
        let f = solver.flux(&ul, &ur, &s).unwrap();
        let g = solver.flux(&ur, &ul, &s.flipped()).unwrap();
        let neg: Vec<f64> = g.iter().map(|v| -v).collect();
        assert_close(&f, &neg, "hllc-vof antisymmetry");
    }

    #[test]
    fn test_vof_interface_stays_sharp_at_rest() {
        // Equal pressure, no motion: nothing crosses the face.
        let eq = vof();
        let solver = HllcArtificialCompressibilityVof::new(eq);
        let ul = eq_state(&eq, [1.0, 0.0, 0.0, 0.0, 1.0]);
        let ur = eq_state(&eq, [1.0, 0.0, 0.0, 0.0, 0.0]);
        let s = Surface::new(1.0, DVec3::ZERO, DVec3::X).unwrap();
        let f = solver.flux(&ul, &ur, &s).unwrap();
        assert!(f[0].abs() < TOL);
        assert!(f[4].abs() < TOL);
        assert!((f[1] - 1.0).abs() < TOL, "momentum flux is the pressure");
    }

    fn eq_state(eq: &ArtificialCompressibilityVof, primitive: [f64; 5]) -> Vec<f64> {
        use crate::equations::GoverningEquations;
        eq.conservative_vars(&primitive)
    }
}
