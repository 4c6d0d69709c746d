// crates/pb_physics/tests/common/mod.rs

//! 集成测试共用算例

#![allow(dead_code)]

use pb_config::{
    DiameterSpec, DispersedPhaseConfig, ModelEntry, PopulationBalanceConfig, ShapeModelConfig,
    SolverDict,
};
use pb_physics::group::sphere_diameter;
use pb_physics::{FluidSystem, PhaseFields, PhaseSystem, PopulationBalanceModel, TurbulenceFields};

/// 分散相体积分数
pub const ALPHA_AIR: f64 = 0.1;

/// 水-空气，`n` 个单元
pub fn fluid(n: usize) -> PhaseSystem {
    let mut system = PhaseSystem::new(n, 1.0);
    system
        .add_phase(PhaseFields::uniform("water", n, 1.0 - ALPHA_AIR, 1000.0, 1e-3).with_temperature(300.0))
        .unwrap();
    system
        .add_phase(PhaseFields::uniform("air", n, ALPHA_AIR, 1.0, 1.8e-5))
        .unwrap();
    system.set_turbulence("water", TurbulenceFields::uniform(n, 0.1, 0.01));
    system.set_sigma("air", "water", 0.072);
    system.set_delta_t(0.1);
    system
}

/// 组体积为 `volumes`、组分数均匀的单相配置
pub fn config(volumes: &[f64]) -> PopulationBalanceConfig {
    PopulationBalanceConfig {
        name: "bubbles".into(),
        continuous_phase: "water".into(),
        phases: vec![DispersedPhaseConfig {
            name: "air".into(),
            spherical_diameters: DiameterSpec::List {
                values: volumes.iter().map(|&v| sphere_diameter(v)).collect(),
            },
            shape_model: ShapeModelConfig::Spherical,
            initial_fractions: Some(vec![1.0; volumes.len()]),
        }],
        coalescence_models: vec![],
        breakup_models: vec![],
        binary_breakup_models: vec![],
        model_sources: vec![],
        solver_dict: SolverDict::default(),
    }
}

/// 常数聚并核
pub fn constant_kernel(rate: f64) -> ModelEntry {
    ModelEntry::new("constant").with("rate", rate)
}

/// v = 1, 2, 4, 8, 16
pub const DOUBLING: [f64; 5] = [1.0, 2.0, 4.0, 8.0, 16.0];

/// 每个组的分数之和（第 0 个单元）
pub fn fraction_sum(pbm: &PopulationBalanceModel) -> f64 {
    pbm.groups().iter().map(|g| g.f[0]).sum()
}

/// 第 0 个单元的粒子数密度 Σ α f / x
pub fn number_density(pbm: &PopulationBalanceModel, fluid: &dyn FluidSystem) -> f64 {
    let alpha = fluid.phase("air").unwrap().alpha[0];
    pbm.groups().iter().map(|g| alpha * g.f[0] / g.x).sum()
}
