// crates/pb_physics/tests/conservation.rs

//! 守恒性测试
//! 显式步下各机理的体积守恒与数目变化

mod common;

use approx::assert_relative_eq;
use common::*;
use pb_config::ModelEntry;
use pb_physics::{
    AllocationEngine, IntegrationMethod, LocalImplicitSolver, PopulationBalanceModel, ScalarField,
};

fn explicit() -> LocalImplicitSolver {
    LocalImplicitSolver::new(IntegrationMethod::Explicit)
}

/// 分配系数在网格内守恒数目与体积，网格外守恒体积
#[test]
fn test_allocation_moments_over_sweep() {
    let engine = AllocationEngine::new(&DOUBLING).unwrap();
    for k in 0..=200 {
        let v = 0.25 + 0.1 * k as f64;
        let bracket = engine.bracket(v);
        let number: f64 = bracket.targets().map(|(_, eta)| eta).sum();
        let volume: f64 = bracket.targets().map(|(i, eta)| eta * engine.x(i)).sum();
        assert_relative_eq!(volume, v, max_relative = 1e-12);
        if v >= 1.0 && v <= 16.0 {
            assert_relative_eq!(number, 1.0, max_relative = 1e-12);
        }
    }
}

/// 常数核、五组、一步显式：体积守恒，数目减少，最小组按解析式衰减
#[test]
fn test_constant_kernel_single_explicit_step() {
    let fluid = fluid(2);
    let mut cfg = config(&DOUBLING);
    cfg.coalescence_models = vec![constant_kernel(1.0)];
    let mut pbm = PopulationBalanceModel::new(&cfg, &fluid).unwrap();
    let n_before = number_density(&pbm, &fluid);

    let stats = pbm.solve(&fluid, &explicit()).unwrap();
    assert!(stats.refreshed);
    assert_eq!(pbm.coalescence_pairs().len(), 15);

    assert_relative_eq!(fraction_sum(&pbm), 1.0, max_relative = 1e-12);
    assert!(number_density(&pbm, &fluid) < n_before);

    // f_0 = 0.2 (1 - Δt r Σ n_k)，n_k = α f / x_k
    let sum_n: f64 = DOUBLING.iter().map(|x| ALPHA_AIR * 0.2 / x).sum();
    assert_relative_eq!(pbm.group(0).f[0], 0.2 * (1.0 - 0.1 * sum_n), max_relative = 1e-9);
    // 最大组只有出生
    assert!(pbm.group(4).f[1] > 0.2);
}

#[test]
fn test_breakup_conserves_volume_and_creates_particles() {
    let fluid = fluid(1);
    let mut cfg = config(&DOUBLING);
    cfg.breakup_models = vec![ModelEntry::new("powerLaw").with("C", 0.5).with("power", 0.0)];
    let mut pbm = PopulationBalanceModel::new(&cfg, &fluid).unwrap();
    let n_before = number_density(&pbm, &fluid);

    pbm.solve(&fluid, &explicit()).unwrap();
    assert_eq!(pbm.breakup_groups(0), vec![1, 2, 3, 4]);
    assert_relative_eq!(fraction_sum(&pbm), 1.0, max_relative = 1e-8);
    assert!(number_density(&pbm, &fluid) > n_before);
    // 最小组不破碎，只接收子粒子
    assert!(pbm.group(0).f[0] > 0.2);
}

#[test]
fn test_binary_breakup_conserves_volume() {
    let fluid = fluid(1);
    let mut cfg = config(&DOUBLING);
    cfg.binary_breakup_models =
        vec![ModelEntry::new("powerLawUniformBinary").with("C", 0.1).with("power", 0.0)];
    let mut pbm = PopulationBalanceModel::new(&cfg, &fluid).unwrap();

    pbm.solve(&fluid, &explicit()).unwrap();
    // 碎片不大于母体一半：x_1/2 不超过 v_0，第 1 组没有组对
    assert_eq!(
        pbm.binary_breakup_pairs(),
        &[(0, 2), (1, 2), (0, 3), (1, 3), (2, 3), (0, 4), (1, 4), (2, 4), (3, 4)]
    );
    assert_relative_eq!(fraction_sum(&pbm), 1.0, max_relative = 1e-12);
}

/// 同一破碎频率下，二元破碎与“总破碎 + 均匀二元子分布”的母组死亡率一致，
/// 差别只来自网格下端 [0, x_0] 内丢失的碎片
#[test]
fn test_binary_and_total_breakup_death_rates_agree() {
    let fluid = fluid(1);
    let volumes: Vec<f64> = (1..=40).map(f64::from).collect();
    let top = volumes.len() - 1;

    let mut total_cfg = config(&volumes);
    total_cfg.breakup_models = vec![ModelEntry::new("powerLaw").with("C", 1.0).with("power", 0.0)];
    let mut total = PopulationBalanceModel::new(&total_cfg, &fluid).unwrap();
    total.refresh_rates(&fluid).unwrap();
    total.assemble_sources(&fluid).unwrap();

    let mut binary_cfg = config(&volumes);
    binary_cfg.binary_breakup_models =
        vec![ModelEntry::new("powerLawUniformBinary").with("C", 1.0).with("power", 0.0)];
    let mut binary = PopulationBalanceModel::new(&binary_cfg, &fluid).unwrap();
    binary.refresh_rates(&fluid).unwrap();
    binary.assemble_sources(&fluid).unwrap();

    let total_death = total.sources().sp(top)[0] / ALPHA_AIR;
    let binary_death = binary.sources().sp(top)[0] / ALPHA_AIR;
    assert_relative_eq!(total_death, 1.0, max_relative = 1e-12);
    assert!(binary_death <= total_death);
    let lost = 2.0 * volumes[0] / volumes[top];
    assert_relative_eq!(binary_death, total_death * (1.0 - lost), max_relative = 1e-10);
}

/// 密度下降使粒子整体向大组漂移，相内体积守恒
#[test]
fn test_expansion_drifts_upwards() {
    let mut fluid = fluid(1);
    // 旧时间层质量 α0 ρ0 与当前 α ρ 一致
    let air = fluid.phase_mut("air").unwrap();
    air.rho0 = ScalarField::uniform(1, 1.1);
    air.alpha0 = ScalarField::uniform(1, ALPHA_AIR / 1.1);
    let mut pbm = PopulationBalanceModel::new(&config(&DOUBLING), &fluid).unwrap();

    pbm.solve(&fluid, &explicit()).unwrap();
    assert!(pbm.group(0).f[0] < 0.2);
    assert!(pbm.group(4).f[0] > 0.2);
    assert_relative_eq!(fraction_sum(&pbm), 1.0, max_relative = 1e-12);
    assert!(pbm.expansion_dmdtfs().is_empty());
}

#[test]
fn test_uniform_shrinkage_source() {
    let fluid = fluid(1);
    let mut cfg = config(&DOUBLING);
    cfg.model_sources = vec![ModelEntry::new("uniformGrowth").with("phase", "air").with("rate", -0.5)];
    let mut pbm = PopulationBalanceModel::new(&cfg, &fluid).unwrap();

    pbm.solve(&fluid, &explicit()).unwrap();
    assert!(pbm.group(0).f[0] > 0.2);
    assert!(pbm.group(4).f[0] < 0.2);
    assert_relative_eq!(fraction_sum(&pbm), 1.0, max_relative = 1e-12);
}

/// 注入：组分数增加，质量从连续相记入分散相
#[test]
fn test_group_injection_books_mass() {
    let fluid = fluid(1);
    let mut cfg = config(&DOUBLING);
    cfg.model_sources = vec![ModelEntry::new("groupInjection").with("group", 2).with("rate", 0.01)];
    let mut pbm = PopulationBalanceModel::new(&cfg, &fluid).unwrap();

    pbm.solve(&fluid, &explicit()).unwrap();
    // Δf = Δt Su / α
    assert_relative_eq!(pbm.group(2).f[0], 0.2 + 0.1 * 0.01 / ALPHA_AIR, max_relative = 1e-12);
    assert_relative_eq!(pbm.net_mass_transfer_into("air")[0], 0.01, max_relative = 1e-12);
    assert_relative_eq!(pbm.net_mass_transfer_into("water")[0], -0.01, max_relative = 1e-12);
}

/// 小粒子相聚并生成大粒子相的组：质量从源相记入目标相
#[test]
fn test_cross_phase_coalescence_transfers_mass() {
    use pb_config::{DiameterSpec, DispersedPhaseConfig, ShapeModelConfig};
    use pb_physics::group::sphere_diameter;
    use pb_physics::PhaseFields;

    let mut fluid = fluid(1);
    fluid.phase_mut("air").unwrap().alpha = ScalarField::uniform(1, 0.05);
    fluid
        .add_phase(PhaseFields::uniform("large", 1, 0.05, 1.0, 1.8e-5))
        .unwrap();
    fluid.set_sigma("large", "water", 0.072);

    let phase = |name: &str, volumes: &[f64]| DispersedPhaseConfig {
        name: name.into(),
        spherical_diameters: DiameterSpec::List {
            values: volumes.iter().map(|&v| sphere_diameter(v)).collect(),
        },
        shape_model: ShapeModelConfig::Spherical,
        initial_fractions: Some(vec![1.0; volumes.len()]),
    };
    let mut cfg = config(&DOUBLING);
    cfg.phases = vec![phase("air", &[1.0, 2.0]), phase("large", &[4.0, 8.0])];
    cfg.coalescence_models = vec![constant_kernel(1.0)];
    let mut pbm = PopulationBalanceModel::new(&cfg, &fluid).unwrap();

    pbm.refresh_rates(&fluid).unwrap();
    pbm.assemble_sources(&fluid).unwrap();
    let into_large = pbm.dmdtfs().net_into("large")[0];
    assert!(into_large > 0.0);
    assert_relative_eq!(pbm.dmdtfs().net_into("air")[0], -into_large, max_relative = 1e-12);
}
