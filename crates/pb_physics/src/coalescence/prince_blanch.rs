// crates/pb_physics/src/coalescence/prince_blanch.rs

//! Prince & Blanch (1990) 聚并模型
//!
//! 三种碰撞机理可独立开关并求和，再乘以液膜排液效率：
//!
//! ```text
//! θ_T = C1 π/4 (d_i + d_j)² ε^(1/3) sqrt(d_i^(2/3) + d_j^(2/3))    (turbulence)
//! θ_B = π/4 (d_i + d_j)² |u_t,i - u_t,j|                           (buoyancy)
//! θ_S = 1/6 (d_i + d_j)³ G                                          (laminarShear)
//!
//! r_ij = d_i d_j / (d_i + d_j)
//! t_ij = sqrt(r_ij³ ρ_c / (16 σ)) ln(h0 / hf)
//! τ_ij = r_ij^(2/3) / ε^(1/3)
//! rate = (θ_T + θ_B + θ_S) exp(-t_ij / τ_ij)
//! ```

use pb_config::ModelEntry;
use pb_foundation::{PbError, PbResult};
use serde::Deserialize;
use std::f64::consts::PI;

use super::{terminal_velocity, CoalescenceModel};
use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

/// Prince-Blanch 聚并
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrinceBlanch {
    /// 湍流碰撞系数
    #[serde(rename = "C1")]
    pub c1: f64,
    /// 初始液膜厚度 [m]
    pub h0: f64,
    /// 破裂液膜厚度 [m]
    pub hf: f64,
    /// 湍流碰撞
    pub turbulence: bool,
    /// 浮力碰撞
    pub buoyancy: bool,
    /// 层流剪切碰撞
    #[serde(rename = "laminarShear")]
    pub laminar_shear: bool,
}

impl Default for PrinceBlanch {
    fn default() -> Self {
        Self {
            c1: 0.356,
            h0: 1e-4,
            hf: 1e-8,
            turbulence: true,
            buoyancy: true,
            laminar_shear: false,
        }
    }
}

impl PrinceBlanch {
    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry) -> PbResult<Self> {
        let model: Self = entry.parse_coeffs()?;
        if !(model.h0 > model.hf && model.hf > 0.0) {
            return Err(PbError::invalid_config(
                "PrinceBlanch.h0/hf",
                format!("{}/{}", model.h0, model.hf),
                "需要 h0 > hf > 0",
            ));
        }
        Ok(model)
    }
}

impl CoalescenceModel for PrinceBlanch {
    fn name(&self) -> &'static str {
        "PrinceBlanch"
    }

    fn add_to_coalescence_rate(
        &self,
        rate: &mut ScalarField,
        i: usize,
        j: usize,
        ctx: &KernelContext,
        _cache: &KernelCache,
    ) -> PbResult<()> {
        let turb = ctx.turbulence()?;
        let shear = if self.laminar_shear {
            Some(turb.shear_rate.as_ref().ok_or_else(|| {
                PbError::missing_config("PrinceBlanch.laminarShear 需要湍流场提供 shearRate")
            })?)
        } else {
            None
        };
        let cont = ctx.continuous();
        let sigma = ctx.sigma(i);
        let g = ctx.gravity().length();
        let ln_h = (self.h0 / self.hf).ln();
        let model = self.clone();

        rate.map_inplace(|c, r| {
            let (di, dj) = (ctx.d(i, c), ctx.d(j, c));
            let dsum = di + dj;
            let eps = turb.epsilon[c].max(0.0);
            let rho_c = cont.rho[c];

            let mut theta = 0.0;
            if model.turbulence {
                theta += model.c1 * PI / 4.0 * dsum * dsum * eps.cbrt()
                    * (di.powf(2.0 / 3.0) + dj.powf(2.0 / 3.0)).sqrt();
            }
            if model.buoyancy {
                let ut_i = terminal_velocity(di, sigma, rho_c, g);
                let ut_j = terminal_velocity(dj, sigma, rho_c, g);
                theta += PI / 4.0 * dsum * dsum * (ut_i - ut_j).abs();
            }
            if let Some(shear) = shear {
                theta += dsum.powi(3) * shear[c] / 6.0;
            }

            let rij = di * dj / dsum;
            let tij = (rij.powi(3) * rho_c / (16.0 * sigma)).sqrt() * ln_h;
            let tauij = rij.powf(2.0 / 3.0) / eps.cbrt();
            r + theta * (-tij / tauij).exp()
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coalescence::test_support::*;

    fn eval(model: &PrinceBlanch, i: usize, j: usize) -> f64 {
        let system = air_water(0.5);
        let (groups, shapes) = groups();
        let ctx = KernelContext::new(&system, &groups, &shapes, "water", &phases()).unwrap();
        let mut rate = ScalarField::zeros(3);
        model.add_to_coalescence_rate(&mut rate, i, j, &ctx, &KernelCache::new()).unwrap();
        rate[2]
    }

    #[test]
    fn test_mechanisms_are_additive() {
        let base = PrinceBlanch { turbulence: false, buoyancy: false, laminar_shear: false, ..Default::default() };
        let t = PrinceBlanch { turbulence: true, ..base.clone() };
        let b = PrinceBlanch { buoyancy: true, ..base.clone() };
        let s = PrinceBlanch { laminar_shear: true, ..base.clone() };
        let all = PrinceBlanch { turbulence: true, buoyancy: true, laminar_shear: true, ..base.clone() };
        assert_eq!(eval(&base, 3, 1), 0.0);
        let sum = eval(&t, 3, 1) + eval(&b, 3, 1) + eval(&s, 3, 1);
        approx::assert_relative_eq!(eval(&all, 3, 1), sum, max_relative = 1e-12);
    }

    #[test]
    fn test_equal_sizes_have_no_buoyancy_collisions() {
        let b = PrinceBlanch { turbulence: false, buoyancy: true, ..Default::default() };
        assert_eq!(eval(&b, 2, 2), 0.0);
    }

    #[test]
    fn test_invalid_film_thickness() {
        let entry = ModelEntry::new("PrinceBlanch").with("h0", 1e-9);
        assert!(PrinceBlanch::from_entry(&entry).unwrap_err().is_config_error());
    }
}
