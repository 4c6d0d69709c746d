// crates/pb_physics/src/breakup/mod.rs

//! 破碎子模型（总破碎频率 + 子粒径分布）
//!
//! 模型给出第 k 组的总破碎频率 g_k [1/s]，配合与场状态无关的子粒径
//! 分布 `nik` 表计算出生项。子粒径分布由条目中的
//! `daughterSizeDistributionModel` 选择，缺省为 `uniformBinary`。

mod daughter;
mod exponential;
mod laakkonen;
mod power_law;

pub use daughter::{
    integrate_nik, nik_table, DaughterSizeDistribution, LaakkonenDaughter, UniformBinary,
    FAMILY as DAUGHTER_FAMILY,
};
pub use exponential::Exponential;
pub use laakkonen::Laakkonen;
pub use power_law::PowerLaw;

use pb_foundation::PbResult;

use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

/// 破碎模型族名
pub const FAMILY: &str = "breakup";

/// 子粒径分布在破碎条目中的键
pub const DAUGHTER_KEY: &str = "daughterSizeDistributionModel";

/// 破碎模型接口
pub trait BreakupModel: Send + Sync {
    /// 模型类型名
    fn name(&self) -> &'static str;

    /// 刷新开始时缓存与粒径无关的中间量
    fn precompute(&self, _ctx: &KernelContext, _cache: &mut KernelCache) -> PbResult<()> {
        Ok(())
    }

    /// 把第 i 组的总破碎频率累加到 `rate` [1/s]
    fn add_to_breakup_rate(
        &self,
        rate: &mut ScalarField,
        i: usize,
        ctx: &KernelContext,
        cache: &KernelCache,
    ) -> PbResult<()>;

    /// 子粒径分布
    fn daughter(&self) -> &dyn DaughterSizeDistribution;
}
