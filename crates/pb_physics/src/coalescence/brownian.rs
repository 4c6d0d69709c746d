// crates/pb_physics/src/coalescence/brownian.rs

//! 布朗运动聚并核
//!
//! β = 2 k_B T / (3 μ_c) · (1/d_i + 1/d_j)(d_i + d_j)

use pb_config::ModelEntry;
use pb_foundation::PbResult;

use super::CoalescenceModel;
use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

/// 玻尔兹曼常数 [J/K]
pub const BOLTZMANN: f64 = 1.380649e-23;

/// 布朗运动聚并
#[derive(Debug, Clone, Default)]
pub struct BrownianCollisions;

impl BrownianCollisions {
    /// 由配置条目构建（无系数）
    pub fn from_entry(_entry: &ModelEntry) -> PbResult<Self> {
        Ok(Self)
    }
}

impl CoalescenceModel for BrownianCollisions {
    fn name(&self) -> &'static str {
        "BrownianCollisions"
    }

    fn add_to_coalescence_rate(
        &self,
        rate: &mut ScalarField,
        i: usize,
        j: usize,
        ctx: &KernelContext,
        _cache: &KernelCache,
    ) -> PbResult<()> {
        let temperature = ctx.temperature()?;
        let mu = &ctx.continuous().mu;
        rate.map_inplace(|c, r| {
            let (di, dj) = (ctx.d(i, c), ctx.d(j, c));
            r + 2.0 * BOLTZMANN * temperature[c] / (3.0 * mu[c]) * (1.0 / di + 1.0 / dj) * (di + dj)
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coalescence::test_support::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_equal_sizes_give_size_independent_kernel() {
        let system = air_water(0.1);
        let (groups, shapes) = groups();
        let ctx = KernelContext::new(&system, &groups, &shapes, "water", &phases()).unwrap();
        let cache = KernelCache::new();
        let mut r00 = ScalarField::zeros(3);
        let mut r44 = ScalarField::zeros(3);
        BrownianCollisions.add_to_coalescence_rate(&mut r00, 0, 0, &ctx, &cache).unwrap();
        BrownianCollisions.add_to_coalescence_rate(&mut r44, 4, 4, &ctx, &cache).unwrap();
        let expected = 8.0 * BOLTZMANN * 300.0 / (3.0 * 8.9e-4);
        assert_relative_eq!(r00[1], expected, max_relative = 1e-12);
        assert_relative_eq!(r44[1], expected, max_relative = 1e-12);
    }
}
