// crates/pb_physics/src/group.rs

//! 尺寸组
//!
//! 连续粒径分布离散为 N 个尺寸组，每组具有固定的代表体积 `x_i` 与
//! 球当量直径，以及逐单元的组分数场 `f_i`（所属相体积中该组所占份额）。
//!
//! 每个分散相拥有一段连续的组（速度组）。全部组跨相按体积严格递增，
//! 该不变量在构造时检查一次，分配系数的二分查找依赖它。

use pb_config::PopulationBalanceConfig;
use pb_foundation::{PbError, PbResult};
use std::f64::consts::PI;
use std::ops::Range;

use crate::field::ScalarField;

/// 球体积 πd³/6
#[inline]
pub fn sphere_volume(d: f64) -> f64 {
    PI * d * d * d / 6.0
}

/// 由体积求球直径
#[inline]
pub fn sphere_diameter(x: f64) -> f64 {
    (6.0 * x / PI).cbrt()
}

/// 尺寸组
#[derive(Debug, Clone)]
pub struct SizeGroup {
    /// 全局组序号
    pub index: usize,
    /// 所属相名称
    pub phase: String,
    /// 所属相在群体平衡中的序号
    pub phase_index: usize,
    /// 代表体积 [m³]
    pub x: f64,
    /// 球当量直径 [m]
    pub d_sph: f64,
    /// 组分数
    pub f: ScalarField,
    /// 本时间步开始时的组分数
    pub f0: ScalarField,
}

impl SizeGroup {
    /// 创建尺寸组
    pub fn new(index: usize, phase: &str, phase_index: usize, d_sph: f64, f: ScalarField) -> Self {
        Self {
            index,
            phase: phase.to_string(),
            phase_index,
            x: sphere_volume(d_sph),
            d_sph,
            f0: f.clone(),
            f,
        }
    }

    /// 场名 `f.<phase>.group<i>`
    pub fn field_name(&self) -> String {
        format!("f.{}.group{}", self.phase, self.index)
    }
}

/// 速度组：一个分散相及其拥有的组区间
#[derive(Debug, Clone)]
pub struct VelocityGroup {
    /// 相名称
    pub phase: String,
    /// 相序号
    pub phase_index: usize,
    /// 组区间（全局序号）
    pub groups: Range<usize>,
}

impl VelocityGroup {
    /// 组数
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// 是否没有组
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// 是否包含全局组序号
    pub fn contains(&self, i: usize) -> bool {
        self.groups.contains(&i)
    }
}

/// 由配置构建全部尺寸组与速度组
pub fn build_groups(
    config: &PopulationBalanceConfig,
    n_cells: usize,
) -> PbResult<(Vec<SizeGroup>, Vec<VelocityGroup>)> {
    let mut groups = Vec::with_capacity(config.n_groups());
    let mut velocity_groups = Vec::with_capacity(config.phases.len());

    for (phase_index, phase) in config.phases.iter().enumerate() {
        let diameters = phase.spherical_diameters.diameters()?;
        let fractions = phase.normalised_initial_fractions();
        PbError::check_size(
            &format!("phases.{}.initialFractions", phase.name),
            diameters.len(),
            fractions.len(),
        )?;

        let start = groups.len();
        for (d, f) in diameters.iter().zip(&fractions) {
            let index = groups.len();
            groups.push(SizeGroup::new(
                index,
                &phase.name,
                phase_index,
                *d,
                ScalarField::uniform(n_cells, *f),
            ));
        }
        velocity_groups.push(VelocityGroup {
            phase: phase.name.clone(),
            phase_index,
            groups: start..groups.len(),
        });
    }

    check_ascending(&groups)?;
    Ok((groups, velocity_groups))
}

/// 检查组体积跨相严格递增
pub fn check_ascending(groups: &[SizeGroup]) -> PbResult<()> {
    for pair in groups.windows(2) {
        if !(pair[1].x > pair[0].x) {
            return Err(PbError::invalid_config(
                format!("phases.{}.sphericalDiameters", pair[1].phase),
                format!("d{}={:e}, d{}={:e}", pair[0].index, pair[0].d_sph, pair[1].index, pair[1].d_sph),
                "尺寸组体积必须跨相严格递增",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pb_config::{DiameterSpec, DispersedPhaseConfig, ShapeModelConfig};

    fn phase(name: &str, values: Vec<f64>) -> DispersedPhaseConfig {
        DispersedPhaseConfig {
            name: name.into(),
            spherical_diameters: DiameterSpec::List { values },
            shape_model: ShapeModelConfig::Spherical,
            initial_fractions: None,
        }
    }

    fn config(phases: Vec<DispersedPhaseConfig>) -> PopulationBalanceConfig {
        PopulationBalanceConfig {
            name: "bubbles".into(),
            continuous_phase: "water".into(),
            phases,
            coalescence_models: vec![],
            breakup_models: vec![],
            binary_breakup_models: vec![],
            model_sources: vec![],
            solver_dict: Default::default(),
        }
    }

    #[test]
    fn test_sphere_volume_round_trip() {
        let d = 2e-3;
        assert_relative_eq!(sphere_diameter(sphere_volume(d)), d, epsilon = 1e-15);
    }

    #[test]
    fn test_build_two_velocity_groups() {
        let cfg = config(vec![
            phase("air1", vec![1e-3, 2e-3]),
            phase("air2", vec![3e-3, 4e-3, 5e-3]),
        ]);
        let (groups, vgs) = build_groups(&cfg, 4).unwrap();
        assert_eq!(groups.len(), 5);
        assert_eq!(vgs[1].groups, 2..5);
        assert_eq!(groups[3].phase, "air2");
        assert_eq!(groups[3].field_name(), "f.air2.group3");
        // 默认全部位于第一组
        assert_eq!(groups[0].f[0], 1.0);
        assert_eq!(groups[2].f[3], 1.0);
        assert_eq!(groups[4].f[0], 0.0);
    }

    #[test]
    fn test_overlapping_phases_rejected() {
        let cfg = config(vec![
            phase("air1", vec![1e-3, 3e-3]),
            phase("air2", vec![2e-3, 4e-3]),
        ]);
        let err = build_groups(&cfg, 1).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("air2"));
    }
}
