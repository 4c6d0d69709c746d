// crates/pb_physics/src/coalescence/mod.rs

//! 聚并子模型
//!
//! 每个模型把组对 (i, j) 的聚并核 [m³/s] 逐单元累加到共享的速率场中，
//! 多个模型（或同一模型的多个机理开关）的贡献直接求和，零为中性元。
//!
//! | 类型名 | 模型 |
//! |--------|------|
//! | `constant` | 常数核 |
//! | `hydrodynamic` | C (d_i + d_j)³ |
//! | `CoulaloglouTavlarides` | 湍流碰撞 + 液膜排液效率 |
//! | `Luo` | 湍流碰撞 + Luo 效率 |
//! | `PrinceBlanch` | 湍流/浮力/层流剪切碰撞 + 液膜排液效率 |
//! | `Liao` | 多机理碰撞 + 范德华捕获 + 堆积修正 |
//! | `BrownianCollisions` | 布朗运动 |

mod brownian;
mod constant;
mod coulaloglou_tavlarides;
mod hydrodynamic;
mod liao;
mod luo;
mod prince_blanch;

pub use brownian::BrownianCollisions;
pub use constant::ConstantCoalescence;
pub use coulaloglou_tavlarides::CoulaloglouTavlarides;
pub use hydrodynamic::Hydrodynamic;
pub use liao::Liao;
pub use luo::Luo;
pub use prince_blanch::PrinceBlanch;

use pb_foundation::float::safe_sqrt;
use pb_foundation::PbResult;

use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

/// 聚并模型族名
pub const FAMILY: &str = "coalescence";

/// 聚并模型接口
pub trait CoalescenceModel: Send + Sync {
    /// 模型类型名
    fn name(&self) -> &'static str;

    /// 刷新开始时缓存与粒径无关的中间量
    fn precompute(&self, _ctx: &KernelContext, _cache: &mut KernelCache) -> PbResult<()> {
        Ok(())
    }

    /// 把组对 (i, j) 的聚并核累加到 `rate` [m³/s]
    fn add_to_coalescence_rate(
        &self,
        rate: &mut ScalarField,
        i: usize,
        j: usize,
        ctx: &KernelContext,
        cache: &KernelCache,
    ) -> PbResult<()>;
}

/// 气泡终端速度 [m/s]
///
/// u_t = sqrt(2.14 σ / (ρ_c d) + 0.505 g d)
#[inline]
pub fn terminal_velocity(d: f64, sigma: f64, rho_c: f64, g: f64) -> f64 {
    safe_sqrt(2.14 * sigma / (rho_c * d) + 0.505 * g * d)
}

/// 湍流惯性区的特征相对速度 sqrt(2) ε^(1/3) sqrt(d_i^(2/3) + d_j^(2/3))
#[inline]
pub fn turbulent_velocity(epsilon: f64, d_i: f64, d_j: f64) -> f64 {
    std::f64::consts::SQRT_2 * epsilon.max(0.0).cbrt() * safe_sqrt(d_i.powf(2.0 / 3.0) + d_j.powf(2.0 / 3.0))
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_terminal_velocity_of_mm_bubble() {
        // 2 mm 气泡约 0.2~0.3 m/s
        let ut = terminal_velocity(2e-3, 0.072, 997.0, 9.81);
        assert!(ut > 0.2 && ut < 0.35, "ut = {}", ut);
    }

    #[test]
    fn test_turbulent_velocity_symmetric() {
        assert_relative_eq!(
            turbulent_velocity(0.5, 1e-3, 3e-3),
            turbulent_velocity(0.5, 3e-3, 1e-3)
        );
        assert_eq!(turbulent_velocity(0.0, 1e-3, 1e-3), 0.0);
    }
}
