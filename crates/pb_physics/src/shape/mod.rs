// crates/pb_physics/src/shape/mod.rs

//! 形状模型
//!
//! 把组的代表体积映射为碰撞直径与表面积。每个分散相持有一个形状模型，
//! 通过全局组序号访问其所辖组。
//!
//! - [`SphericalShape`]: 球形，`d = d_sph`，`a = πd²`
//! - [`FractalShape`]: 分形聚集体，逐组输运面积体积比 κ

mod fractal;
mod spherical;

pub use fractal::FractalShape;
pub use spherical::SphericalShape;

use pb_config::ShapeModelConfig;

use crate::field::ScalarField;
use crate::group::{SizeGroup, VelocityGroup};

/// 形状模型接口
pub trait ShapeModel: Send + Sync + std::fmt::Debug {
    /// 模型名称
    fn name(&self) -> &'static str;

    /// 碰撞直径 [m]
    fn d(&self, group: &SizeGroup, cell: usize) -> f64;

    /// 单个粒子表面积 [m²]
    fn a(&self, group: &SizeGroup, cell: usize) -> f64;

    /// 面积体积比 κ = a/x [1/m]
    fn kappa(&self, group: &SizeGroup, cell: usize) -> f64 {
        self.a(group, cell) / group.x
    }

    /// 是否需要面积源项
    fn tracks_area(&self) -> bool {
        false
    }

    /// 新时间步开始时保存旧时间层状态
    fn store_old_time(&mut self) {}

    /// 用本次求解累积的面积源更新形状状态
    ///
    /// 从旧时间层出发积分，同一时间步内多次调用只保留最后一次的结果。
    /// `kappa_sources[i]` 为 Σ Su_birth·(κ_birth − κ_i)，按全局组序号索引；
    /// `alpha` 为所属相体积分数。
    fn update_area(
        &mut self,
        _groups: &[SizeGroup],
        _kappa_sources: &[ScalarField],
        _alpha: &ScalarField,
        _dt: f64,
    ) {
    }

    /// 时间步末校正（烧结松弛等）
    fn correct(&mut self, _groups: &[SizeGroup], _dt: f64) {}
}

/// 按配置为一个速度组构建形状模型
pub fn build_shape(
    config: &ShapeModelConfig,
    velocity_group: &VelocityGroup,
    groups: &[SizeGroup],
    n_cells: usize,
) -> Box<dyn ShapeModel> {
    match config {
        ShapeModelConfig::Spherical => Box::new(SphericalShape),
        ShapeModelConfig::Fractal { df, alpha_c, sintering } => Box::new(FractalShape::new(
            velocity_group.groups.clone(),
            groups,
            n_cells,
            *df,
            *alpha_c,
            sintering.clone(),
        )),
    }
}
