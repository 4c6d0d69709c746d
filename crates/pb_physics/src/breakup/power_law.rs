// crates/pb_physics/src/breakup/power_law.rs

//! 幂律破碎频率 g = C x^power

use pb_config::ModelEntry;
use pb_foundation::PbResult;
use serde::Deserialize;

use super::{BreakupModel, DaughterSizeDistribution};
use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

#[derive(Debug, Clone, Deserialize)]
struct Coeffs {
    #[serde(rename = "C")]
    c: f64,
    power: f64,
}

/// 幂律破碎
#[derive(Debug)]
pub struct PowerLaw {
    pub c: f64,
    pub power: f64,
    daughter: Box<dyn DaughterSizeDistribution>,
}

impl PowerLaw {
    pub fn new(c: f64, power: f64, daughter: Box<dyn DaughterSizeDistribution>) -> Self {
        Self { c, power, daughter }
    }

    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry, daughter: Box<dyn DaughterSizeDistribution>) -> PbResult<Self> {
        let Coeffs { c, power } = entry.parse_coeffs()?;
        Ok(Self::new(c, power, daughter))
    }
}

impl BreakupModel for PowerLaw {
    fn name(&self) -> &'static str {
        "powerLaw"
    }

    fn add_to_breakup_rate(
        &self,
        rate: &mut ScalarField,
        i: usize,
        ctx: &KernelContext,
        _cache: &KernelCache,
    ) -> PbResult<()> {
        let g = self.c * ctx.x(i).powf(self.power);
        rate.map_inplace(|_, r| r + g);
        Ok(())
    }

    fn daughter(&self) -> &dyn DaughterSizeDistribution {
        self.daughter.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakup::LaakkonenDaughter;
    use crate::coalescence::test_support::*;

    #[test]
    fn test_rate_scales_with_volume() {
        let model = PowerLaw::new(0.5, 1.0, Box::new(LaakkonenDaughter::default()));
        let system = air_water(0.1);
        let (groups, shapes) = groups();
        let ctx = KernelContext::new(&system, &groups, &shapes, "water", &phases()).unwrap();
        let eval = |i| {
            let mut rate = ScalarField::zeros(3);
            model.add_to_breakup_rate(&mut rate, i, &ctx, &KernelCache::new()).unwrap();
            rate[1]
        };
        approx::assert_relative_eq!(eval(3) / eval(1), groups[3].x / groups[1].x, max_relative = 1e-12);
    }
}
