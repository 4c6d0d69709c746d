// crates/pb_physics/src/binary_breakup/luo_svendsen.rs

//! Luo & Svendsen (1996) 二元破碎
//!
//! 母粒子 d_j 被尺寸为 ξ d_j 的涡撞击，破碎出体积分数 f = x_i/x_j 的碎片：
//!
//! ```text
//! c_f  = f^(2/3) + (1 - f)^(2/3) - 1
//! Ω_ij = 0.923 (1 - α_d) (ε / d_j²)^(1/3) / x_j
//!        · ∫_{ξ_min}^1 (1 + ξ)² / ξ^(11/3)
//!              · exp(-12 c_f σ / (β ρ_c ε^(2/3) d_j^(5/3) ξ^(11/3))) dξ
//! ξ_min = 11.4 η / d_j,   η = (ν³/ε)^(1/4)
//! ```
//!
//! ξ_min >= 1 时母粒子小于能破碎它的最小涡，速率为零。

use pb_config::ModelEntry;
use pb_foundation::PbResult;
use serde::Deserialize;

use super::{check_pair, BinaryBreakupModel};
use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;
use crate::quadrature::GaussLegendre;

/// 积分区间几何细分段数
const SEGMENTS: usize = 8;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct Coeffs {
    beta: f64,
    #[serde(rename = "minEddyRatio")]
    min_eddy_ratio: f64,
}

impl Default for Coeffs {
    fn default() -> Self {
        Self {
            beta: 2.05,
            min_eddy_ratio: 11.4,
        }
    }
}

/// Luo-Svendsen 二元破碎
#[derive(Debug, Clone)]
pub struct LuoSvendsen {
    /// 湍流速度系数
    pub beta: f64,
    /// ξ_min 与 Kolmogorov 尺度之比
    pub min_eddy_ratio: f64,
    rule: GaussLegendre,
}

impl Default for LuoSvendsen {
    fn default() -> Self {
        let Coeffs { beta, min_eddy_ratio } = Coeffs::default();
        Self {
            beta,
            min_eddy_ratio,
            rule: GaussLegendre::default(),
        }
    }
}

impl LuoSvendsen {
    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry) -> PbResult<Self> {
        let Coeffs { beta, min_eddy_ratio } = entry.parse_coeffs()?;
        Ok(Self {
            beta,
            min_eddy_ratio,
            ..Default::default()
        })
    }

    /// ∫_{ξ_min}^1 (1+ξ)²/ξ^(11/3) exp(-b/ξ^(11/3)) dξ，区间按几何级数细分
    fn eddy_integral(&self, xi_min: f64, b: f64) -> f64 {
        let ratio = (1.0 / xi_min).powf(1.0 / SEGMENTS as f64);
        let integrand = |xi: f64| {
            let p = xi.powf(11.0 / 3.0);
            (1.0 + xi).powi(2) / p * (-b / p).exp()
        };
        let mut lo = xi_min;
        let mut total = 0.0;
        for s in 0..SEGMENTS {
            let hi = if s + 1 == SEGMENTS { 1.0 } else { lo * ratio };
            total += self.rule.integrate(lo, hi, &integrand);
            lo = hi;
        }
        total
    }
}

impl BinaryBreakupModel for LuoSvendsen {
    fn name(&self) -> &'static str {
        "LuoSvendsen"
    }

    fn add_to_binary_breakup_rate(
        &self,
        rate: &mut ScalarField,
        i: usize,
        j: usize,
        ctx: &KernelContext,
        _cache: &KernelCache,
    ) -> PbResult<()> {
        check_pair(self.name(), i, j)?;
        let turb = ctx.turbulence()?;
        let cont = ctx.continuous();
        let disp = ctx.phase_of(j);
        let sigma = ctx.sigma(j);
        let x_j = ctx.x(j);
        let f = ctx.x(i) / x_j;
        let c_f = f.powf(2.0 / 3.0) + (1.0 - f).powf(2.0 / 3.0) - 1.0;

        rate.map_inplace(|c, r| {
            let eps = turb.epsilon[c];
            if eps <= 0.0 {
                return r;
            }
            let d_j = ctx.d(j, c);
            let nu = cont.nu(c);
            let kolmogorov = (nu.powi(3) / eps).powf(0.25);
            let xi_min = self.min_eddy_ratio * kolmogorov / d_j;
            if xi_min >= 1.0 {
                return r;
            }
            let rho_c = cont.rho[c];
            let b = 12.0 * c_f * sigma
                / (self.beta * rho_c * eps.powf(2.0 / 3.0) * d_j.powf(5.0 / 3.0));
            r + 0.923 * (1.0 - disp.alpha[c]) * (eps / (d_j * d_j)).cbrt()
                * self.eddy_integral(xi_min, b)
                / x_j
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coalescence::test_support::*;
    use approx::assert_relative_eq;

    fn eval(model: &LuoSvendsen, eps: f64, i: usize, j: usize) -> f64 {
        let system = air_water(eps);
        let (groups, shapes) = groups();
        let ctx = KernelContext::new(&system, &groups, &shapes, "water", &phases()).unwrap();
        let mut rate = ScalarField::zeros(3);
        model
            .add_to_binary_breakup_rate(&mut rate, i, j, &ctx, &KernelCache::new())
            .unwrap();
        rate[2]
    }

    #[test]
    fn test_eddy_integral_without_surface_energy() {
        // b = 0 时解析积分 ∫ (1+ξ)² ξ^(-11/3) dξ
        let model = LuoSvendsen::default();
        let antideriv = |x: f64| {
            -3.0 / 8.0 * x.powf(-8.0 / 3.0) - 6.0 / 5.0 * x.powf(-5.0 / 3.0) - 1.5 * x.powf(-2.0 / 3.0)
        };
        let exact = antideriv(1.0) - antideriv(0.05);
        assert_relative_eq!(model.eddy_integral(0.05, 0.0), exact, max_relative = 1e-8);
    }

    #[test]
    fn test_rate_positive_and_grows_with_dissipation() {
        let model = LuoSvendsen::default();
        let low = eval(&model, 0.1, 1, 3);
        let high = eval(&model, 2.0, 1, 3);
        assert!(low > 0.0);
        assert!(high > low);
    }

    #[test]
    fn test_fragment_complement_symmetry() {
        // 体积为 1:3 和 3:1 的碎片 c_f 相同
        let model = LuoSvendsen::default();
        let system = air_water(1.0);
        let groups = vec![
            crate::group::SizeGroup::new(0, "air", 0, crate::group::sphere_diameter(1e-9), ScalarField::uniform(3, 0.25)),
            crate::group::SizeGroup::new(1, "air", 0, crate::group::sphere_diameter(3e-9), ScalarField::uniform(3, 0.25)),
            crate::group::SizeGroup::new(2, "air", 0, crate::group::sphere_diameter(4e-9), ScalarField::uniform(3, 0.5)),
        ];
        let shapes: Vec<Box<dyn crate::shape::ShapeModel>> = vec![Box::new(crate::shape::SphericalShape)];
        let ctx = KernelContext::new(&system, &groups, &shapes, "water", &phases()).unwrap();
        let cache = KernelCache::new();
        let mut a = ScalarField::zeros(3);
        let mut b = ScalarField::zeros(3);
        model.add_to_binary_breakup_rate(&mut a, 0, 2, &ctx, &cache).unwrap();
        model.add_to_binary_breakup_rate(&mut b, 1, 2, &ctx, &cache).unwrap();
        assert_relative_eq!(a[0], b[0], max_relative = 1e-10);
    }

    #[test]
    fn test_small_parent_below_kolmogorov_scale() {
        let model = LuoSvendsen {
            min_eddy_ratio: 1e6,
            ..Default::default()
        };
        assert_eq!(eval(&model, 0.1, 0, 2), 0.0);
        assert_eq!(eval(&model, 0.0, 0, 2), 0.0);
    }
}
