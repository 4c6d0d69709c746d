// crates/pb_physics/src/coalescence/luo.rs

//! Luo (1993) 聚并模型
//!
//! ```text
//! u_ij = sqrt(β) ε^(1/3) sqrt(d_i^(2/3) + d_j^(2/3))
//! We   = ρ_c d_i u_ij² / σ,   ξ = d_i / d_j
//! rate = π/4 (d_i + d_j)² u_ij
//!        · exp(-C1 sqrt(0.75 (1 + ξ²)(1 + ξ³)) / (sqrt(ρ_d/ρ_c + C_vm) (1 + ξ)³) · sqrt(We))
//! ```

use pb_config::ModelEntry;
use pb_foundation::PbResult;
use serde::Deserialize;
use std::f64::consts::PI;

use super::CoalescenceModel;
use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

/// Luo 聚并
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Luo {
    /// 湍流速度系数
    pub beta: f64,
    /// 效率系数
    #[serde(rename = "C1")]
    pub c1: f64,
    /// 虚拟质量系数
    #[serde(rename = "Cvm")]
    pub c_vm: f64,
}

impl Default for Luo {
    fn default() -> Self {
        Self {
            beta: 2.05,
            c1: 1.0,
            c_vm: 0.5,
        }
    }
}

impl Luo {
    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry) -> PbResult<Self> {
        Ok(entry.parse_coeffs()?)
    }
}

impl CoalescenceModel for Luo {
    fn name(&self) -> &'static str {
        "Luo"
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
        let cont = ctx.continuous();
        let disp = ctx.phase_of(i);
        let sigma = ctx.sigma(i);
        let sqrt_beta = self.beta.sqrt();
        let (c1, c_vm) = (self.c1, self.c_vm);

        rate.map_inplace(|c, r| {
            let (di, dj) = (ctx.d(i, c), ctx.d(j, c));
            let xi = di / dj;
            let uij = sqrt_beta
                * turb.epsilon[c].max(0.0).cbrt()
                * (di.powf(2.0 / 3.0) + dj.powf(2.0 / 3.0)).sqrt();
            let we = cont.rho[c] * di * uij * uij / sigma;
            let efficiency = (-c1 * (0.75 * (1.0 + xi * xi) * (1.0 + xi.powi(3))).sqrt()
                / ((disp.rho[c] / cont.rho[c] + c_vm).sqrt() * (1.0 + xi).powi(3))
                * we.sqrt())
            .exp();
            r + PI / 4.0 * (di + dj).powi(2) * uij * efficiency
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coalescence::test_support::*;

    #[test]
    fn test_rate_grows_with_dissipation_then_efficiency_limits() {
        let (groups, shapes) = groups();
        let model = Luo::default();
        let eval = |eps: f64| {
            let system = air_water(eps);
            let ctx = KernelContext::new(&system, &groups, &shapes, "water", &phases()).unwrap();
            let mut rate = ScalarField::zeros(3);
            model.add_to_coalescence_rate(&mut rate, 1, 1, &ctx, &KernelCache::new()).unwrap();
            rate[0]
        };
        assert_eq!(eval(0.0), 0.0);
        assert!(eval(0.01) > 0.0);
        // 效率随 We 指数衰减
        assert!(eval(1e4) < eval(1.0));
    }
}
