// crates/pb_physics/src/coalescence/coulaloglou_tavlarides.rs

//! Coulaloglou & Tavlarides (1977) 聚并模型（体积形式）
//!
//! ```text
//! β = C1 (x_i^(2/3) + x_j^(2/3)) sqrt(x_i^(2/9) + x_j^(2/9)) ε^(1/3) / (1 + α_s)^(1/3)
//!     · exp(-C2 μ_c ρ_c ε / σ² / (1 + α_s)³ · (x_i^(1/3) x_j^(1/3) / (x_i^(1/3) + x_j^(1/3)))⁴)
//! ```

use pb_config::ModelEntry;
use pb_foundation::PbResult;
use serde::Deserialize;

use super::CoalescenceModel;
use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

/// Coulaloglou-Tavlarides 聚并
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoulaloglouTavlarides {
    /// 碰撞频率系数
    #[serde(rename = "C1")]
    pub c1: f64,
    /// 聚并效率系数 [1/m²]
    #[serde(rename = "C2")]
    pub c2: f64,
}

impl Default for CoulaloglouTavlarides {
    fn default() -> Self {
        Self { c1: 2.8, c2: 1.83e9 }
    }
}

impl CoulaloglouTavlarides {
    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry) -> PbResult<Self> {
        Ok(entry.parse_coeffs()?)
    }
}

impl CoalescenceModel for CoulaloglouTavlarides {
    fn name(&self) -> &'static str {
        "CoulaloglouTavlarides"
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
        let alphas = ctx.alphas();
        let (xi, xj) = (ctx.x(i), ctx.x(j));
        let sigma = ctx.sigma(i);
        let (c1, c2) = (self.c1, self.c2);

        let collision_shape = (xi.powf(2.0 / 3.0) + xj.powf(2.0 / 3.0)) * (xi.powf(2.0 / 9.0) + xj.powf(2.0 / 9.0)).sqrt();
        let film = (xi.cbrt() * xj.cbrt() / (xi.cbrt() + xj.cbrt())).powi(4);

        rate.map_inplace(|c, r| {
            let eps = turb.epsilon[c].max(0.0);
            let one_alpha = 1.0 + alphas[c];
            r + c1 * collision_shape * eps.cbrt() / one_alpha.cbrt()
                * (-c2 * cont.mu[c] * cont.rho[c] * eps / (sigma * sigma) / one_alpha.powi(3) * film).exp()
        });
        Ok(())
    }
}
