// crates/pb_physics/src/coalescence/constant.rs

use pb_config::ModelEntry;
use pb_foundation::PbResult;
use serde::Deserialize;

use super::CoalescenceModel;
use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

/// 常数聚并核：对所有组对返回同一速率
#[derive(Debug, Clone, Deserialize)]
pub struct ConstantCoalescence {
    /// 聚并核 [m³/s]
    pub rate: f64,
}

impl ConstantCoalescence {
    /// 指定速率
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry) -> PbResult<Self> {
        Ok(entry.parse_coeffs()?)
    }
}

impl CoalescenceModel for ConstantCoalescence {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn add_to_coalescence_rate(
        &self,
        rate: &mut ScalarField,
        _i: usize,
        _j: usize,
        _ctx: &KernelContext,
        _cache: &KernelCache,
    ) -> PbResult<()> {
        let c = self.rate;
        rate.map_inplace(|_, r| r + c);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_rate_is_config_error() {
        let err = ConstantCoalescence::from_entry(&ModelEntry::new("constant")).unwrap_err();
        assert!(err.to_string().contains("constant"));
        let ok = ConstantCoalescence::from_entry(&ModelEntry::new("constant").with("rate", 2.0));
        assert_eq!(ok.unwrap().rate, 2.0);
    }
}
