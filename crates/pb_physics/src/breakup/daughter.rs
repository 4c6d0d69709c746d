// crates/pb_physics/src/breakup/daughter.rs

//! 子粒径分布
//!
//! 母粒子体积 x_k 破碎后，子粒子数密度分布 β(v, x_k) 满足
//! ∫_0^{x_k} v β dv = x_k。离散到组上时用帽形权函数积分：
//!
//! ```text
//! nik = ∫_{x_{i-1}}^{x_i} (v - x_{i-1})/(x_i - x_{i-1}) β dv
//!     + ∫_{x_i}^{x_{i+1}} (x_{i+1} - v)/(x_{i+1} - x_i) β dv
//! ```
//!
//! 上限截断于 x_k；第 0 组的左半部分取 [0, x_0] 上的 v/x_0 权，
//! 于是 Σ_i x_i nik = x_k 精确成立。`nik` 与场状态无关，构造时一次成表。

use pb_config::ModelEntry;
use pb_foundation::PbResult;
use puruspe::ln_gamma;
use serde::Deserialize;
use std::fmt::Debug;

use crate::allocation::AllocationEngine;
use crate::quadrature::GaussLegendre;

/// 子粒径分布模型族名
pub const FAMILY: &str = "daughterSizeDistribution";

/// 子粒径分布接口
pub trait DaughterSizeDistribution: Send + Sync + Debug {
    /// 模型类型名
    fn name(&self) -> &'static str;

    /// 数密度分布 β(v, x_k) [1/m³]
    fn density(&self, v: f64, x_k: f64) -> f64;

    /// 母组 k 破碎落入第 i 组的子粒子数（i <= k）
    fn nik(&self, i: usize, k: usize, engine: &AllocationEngine) -> f64 {
        integrate_nik(self, i, k, engine, &GaussLegendre::default())
    }
}

/// 对任意分布做帽形权函数积分
pub fn integrate_nik<D: DaughterSizeDistribution + ?Sized>(
    dist: &D,
    i: usize,
    k: usize,
    engine: &AllocationEngine,
    rule: &GaussLegendre,
) -> f64 {
    if i > k {
        return 0.0;
    }
    if k == 0 {
        return 1.0;
    }
    let x_k = engine.x(k);
    let x_i = engine.x(i);
    let beta = |v: f64| dist.density(v, x_k);

    let left = if i == 0 {
        rule.integrate(0.0, x_i, |v| v / x_i * beta(v))
    } else {
        let x_lo = engine.x(i - 1);
        rule.integrate(x_lo, x_i, |v| (v - x_lo) / (x_i - x_lo) * beta(v))
    };
    let right = if i < k {
        let x_hi = engine.x(i + 1);
        rule.integrate(x_i, x_hi.min(x_k), |v| (x_hi - v) / (x_hi - x_i) * beta(v))
    } else {
        0.0
    };
    left + right
}

/// 构建 nik 表：`table[k][i]`，i = 0..=k
pub fn nik_table(dist: &dyn DaughterSizeDistribution, engine: &AllocationEngine) -> Vec<Vec<f64>> {
    (0..engine.n_groups())
        .map(|k| (0..=k).map(|i| dist.nik(i, k, engine)).collect())
        .collect()
}

/// 均匀二元破碎：β = 2/x_k
#[derive(Debug, Clone, Default)]
pub struct UniformBinary;

impl UniformBinary {
    pub fn from_entry(_entry: &ModelEntry) -> PbResult<Self> {
        Ok(Self)
    }
}

impl DaughterSizeDistribution for UniformBinary {
    fn name(&self) -> &'static str {
        "uniformBinary"
    }

    fn density(&self, v: f64, x_k: f64) -> f64 {
        if v > 0.0 && v <= x_k {
            2.0 / x_k
        } else {
            0.0
        }
    }

    /// 闭式解
    fn nik(&self, i: usize, k: usize, engine: &AllocationEngine) -> f64 {
        if i > k {
            return 0.0;
        }
        if k == 0 {
            return 1.0;
        }
        let x_k = engine.x(k);
        if i == 0 {
            engine.x(1) / x_k
        } else if i == k {
            (x_k - engine.x(k - 1)) / x_k
        } else {
            (engine.x(i + 1) - engine.x(i - 1)) / x_k
        }
    }
}

/// Laakkonen 等人的 β 型子粒径分布
///
/// β(v, x') = (2/x') u^p (1-u)^p / B(p+1, p+1)，u = v/x'，p = C4
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LaakkonenDaughter {
    #[serde(rename = "C4")]
    pub c4: f64,
    #[serde(skip)]
    ln_beta: f64,
}

impl Default for LaakkonenDaughter {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl LaakkonenDaughter {
    pub fn new(c4: f64) -> Self {
        let p1 = c4 + 1.0;
        Self {
            c4,
            ln_beta: 2.0 * ln_gamma(p1) - ln_gamma(2.0 * p1),
        }
    }

    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry) -> PbResult<Self> {
        let parsed: Self = entry.parse_coeffs()?;
        Ok(Self::new(parsed.c4))
    }
}

impl DaughterSizeDistribution for LaakkonenDaughter {
    fn name(&self) -> &'static str {
        "Laakkonen"
    }

    fn density(&self, v: f64, x_k: f64) -> f64 {
        if !(v > 0.0 && v < x_k) {
            return 0.0;
        }
        let u = v / x_k;
        2.0 / x_k * (self.c4 * (u * (1.0 - u)).ln() - self.ln_beta).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn engine() -> AllocationEngine {
        AllocationEngine::new(&[1.0, 2.0, 4.0, 8.0, 16.0]).unwrap()
    }

    fn check_volume(dist: &dyn DaughterSizeDistribution) {
        let e = engine();
        let table = nik_table(dist, &e);
        for (k, row) in table.iter().enumerate() {
            let volume: f64 = row.iter().enumerate().map(|(i, n)| e.x(i) * n).sum();
            assert_relative_eq!(volume, e.x(k), max_relative = 1e-10);
        }
    }

    #[test]
    fn test_uniform_binary_conserves_volume() {
        check_volume(&UniformBinary);
    }

    #[test]
    fn test_uniform_binary_closed_form_matches_quadrature() {
        let e = engine();
        let rule = GaussLegendre::default();
        for k in 1..5 {
            for i in 0..=k {
                assert_relative_eq!(
                    UniformBinary.nik(i, k, &e),
                    integrate_nik(&UniformBinary, i, k, &e, &rule),
                    max_relative = 1e-12
                );
            }
        }
        assert_eq!(UniformBinary.nik(0, 0, &e), 1.0);
    }

    #[test]
    fn test_laakkonen_density_normalised() {
        let d = LaakkonenDaughter::default();
        let rule = GaussLegendre::default();
        // 两个子粒子，总体积为母粒子体积
        assert_relative_eq!(rule.integrate(0.0, 3.0, |v| d.density(v, 3.0)), 2.0, max_relative = 1e-10);
        assert_relative_eq!(
            rule.integrate(0.0, 3.0, |v| v * d.density(v, 3.0)),
            3.0,
            max_relative = 1e-10
        );
    }

    #[test]
    fn test_laakkonen_conserves_volume() {
        check_volume(&LaakkonenDaughter::default());
        check_volume(&LaakkonenDaughter::new(4.0));
    }

    #[test]
    fn test_laakkonen_from_entry() {
        let d = LaakkonenDaughter::from_entry(&ModelEntry::new("Laakkonen").with("C4", 3.0)).unwrap();
        assert_eq!(d.c4, 3.0);
        assert!(d.density(0.5, 1.0) > d.density(0.1, 1.0));
    }
}
