// crates/pb_physics/src/binary_breakup/power_law_uniform_binary.rs

//! 幂律频率 + 均匀二元碎片：Ω_ij = C x_j^power · 2/x_j

use pb_config::ModelEntry;
use pb_foundation::PbResult;
use serde::Deserialize;

use super::{check_pair, BinaryBreakupModel};
use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

/// 幂律均匀二元破碎
#[derive(Debug, Clone, Deserialize)]
pub struct PowerLawUniformBinary {
    #[serde(rename = "C")]
    pub c: f64,
    pub power: f64,
}

impl PowerLawUniformBinary {
    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry) -> PbResult<Self> {
        Ok(entry.parse_coeffs()?)
    }
}

impl BinaryBreakupModel for PowerLawUniformBinary {
    fn name(&self) -> &'static str {
        "powerLawUniformBinary"
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
        let x_j = ctx.x(j);
        let omega = self.c * x_j.powf(self.power) * 2.0 / x_j;
        rate.map_inplace(|_, r| r + omega);
        Ok(())
    }
}
