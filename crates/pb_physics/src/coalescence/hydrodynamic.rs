// crates/pb_physics/src/coalescence/hydrodynamic.rs

use pb_config::ModelEntry;
use pb_foundation::PbResult;
use serde::Deserialize;

use super::CoalescenceModel;
use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

/// 流体动力聚并核 C (d_i + d_j)³
#[derive(Debug, Clone, Deserialize)]
pub struct Hydrodynamic {
    /// 系数 [1/s]
    #[serde(rename = "C")]
    pub c: f64,
}

impl Hydrodynamic {
    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry) -> PbResult<Self> {
        Ok(entry.parse_coeffs()?)
    }
}

impl CoalescenceModel for Hydrodynamic {
    fn name(&self) -> &'static str {
        "hydrodynamic"
    }

    fn add_to_coalescence_rate(
        &self,
        rate: &mut ScalarField,
        i: usize,
        j: usize,
        ctx: &KernelContext,
        _cache: &KernelCache,
    ) -> PbResult<()> {
        let c = self.c;
        rate.map_inplace(|cell, r| r + c * (ctx.d(i, cell) + ctx.d(j, cell)).powi(3));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coalescence::test_support::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cubic_in_diameter_sum() {
        let system = air_water(0.1);
        let (groups, shapes) = groups();
        let ctx = KernelContext::new(&system, &groups, &shapes, "water", &phases()).unwrap();
        let model = Hydrodynamic::from_entry(&ModelEntry::new("hydrodynamic").with("C", 2.0)).unwrap();
        let mut rate = ScalarField::zeros(3);
        model
            .add_to_coalescence_rate(&mut rate, 0, 1, &ctx, &KernelCache::new())
            .unwrap();
        assert_relative_eq!(rate[0], 2.0 * (3e-3f64).powi(3), max_relative = 1e-12);
    }
}
