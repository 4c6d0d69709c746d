// crates/pb_physics/src/binary_breakup/mod.rs

//! 二元破碎子模型
//!
//! 模型直接给出组对 (i, j)（i < j）的速率 Ω_ij [1/(m³ s)]：第 j 组粒子
//! 破碎成一个第 i 组大小的碎片和体积为 x_j - x_i 的互补碎片。
//! 出生/死亡按对直接计算，不经过子粒径分布积分；碎片类宽度在母体一半
//! 处截断（[`crate::allocation::AllocationEngine::pair_delta`]）。

mod luo_svendsen;
mod power_law_uniform_binary;

pub use luo_svendsen::LuoSvendsen;
pub use power_law_uniform_binary::PowerLawUniformBinary;

use pb_foundation::{PbError, PbResult};

use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

/// 二元破碎模型族名
pub const FAMILY: &str = "binaryBreakup";

/// 二元破碎模型接口
pub trait BinaryBreakupModel: Send + Sync {
    /// 模型类型名
    fn name(&self) -> &'static str;

    /// 刷新开始时缓存与粒径无关的中间量
    fn precompute(&self, _ctx: &KernelContext, _cache: &mut KernelCache) -> PbResult<()> {
        Ok(())
    }

    /// 把组对 (i, j) 的二元破碎速率累加到 `rate`，要求 i < j
    fn add_to_binary_breakup_rate(
        &self,
        rate: &mut ScalarField,
        i: usize,
        j: usize,
        ctx: &KernelContext,
        cache: &KernelCache,
    ) -> PbResult<()>;
}

/// 组对必须满足 i < j，否则为配对表构建错误
pub fn check_pair(model: &str, i: usize, j: usize) -> PbResult<()> {
    if i < j {
        Ok(())
    } else {
        Err(PbError::internal(format!(
            "二元破碎模型 '{}' 收到无效组对 ({}, {})：碎片组必须小于母组",
            model, i, j
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_pair() {
        assert!(check_pair("LuoSvendsen", 1, 3).is_ok());
        let err = check_pair("LuoSvendsen", 3, 3).unwrap_err();
        assert!(!err.is_config_error());
        assert!(err.to_string().contains("(3, 3)"));
    }
}
