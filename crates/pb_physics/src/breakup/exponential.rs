// crates/pb_physics/src/breakup/exponential.rs

//! 指数破碎频率 g = C exp(exponent · x)

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
    exponent: f64,
}

/// 指数破碎
#[derive(Debug)]
pub struct Exponential {
    /// 系数 [1/s]
    pub c: f64,
    /// 指数 [1/m³]
    pub exponent: f64,
    daughter: Box<dyn DaughterSizeDistribution>,
}

impl Exponential {
    pub fn new(c: f64, exponent: f64, daughter: Box<dyn DaughterSizeDistribution>) -> Self {
        Self { c, exponent, daughter }
    }

    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry, daughter: Box<dyn DaughterSizeDistribution>) -> PbResult<Self> {
        let Coeffs { c, exponent } = entry.parse_coeffs()?;
        Ok(Self::new(c, exponent, daughter))
    }
}

impl BreakupModel for Exponential {
    fn name(&self) -> &'static str {
        "exponential"
    }

    fn add_to_breakup_rate(
        &self,
        rate: &mut ScalarField,
        i: usize,
        ctx: &KernelContext,
        _cache: &KernelCache,
    ) -> PbResult<()> {
        let g = self.c * (self.exponent * ctx.x(i)).exp();
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
    use crate::breakup::UniformBinary;
    use crate::coalescence::test_support::*;

    #[test]
    fn test_rate_and_required_coefficients() {
        let entry = ModelEntry::new("exponential").with("C", 2.0).with("exponent", 1e6);
        let model = Exponential::from_entry(&entry, Box::new(UniformBinary)).unwrap();
        let system = air_water(0.1);
        let (groups, shapes) = groups();
        let ctx = KernelContext::new(&system, &groups, &shapes, "water", &phases()).unwrap();
        let mut rate = ScalarField::zeros(3);
        model.add_to_breakup_rate(&mut rate, 2, &ctx, &KernelCache::new()).unwrap();
        approx::assert_relative_eq!(rate[0], 2.0 * (1e6 * groups[2].x).exp());
        assert_eq!(model.daughter().name(), "uniformBinary");

        let missing = ModelEntry::new("exponential").with("C", 2.0);
        let err = Exponential::from_entry(&missing, Box::new(UniformBinary)).unwrap_err();
        assert!(err.to_string().contains("exponential"));
    }
}
