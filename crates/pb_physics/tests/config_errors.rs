// crates/pb_physics/tests/config_errors.rs

//! 配置错误测试
//! 从文件读入的配置在构建模型时给出可定位的错误

mod common;

use common::*;
use pb_config::{ModelEntry, PopulationBalanceConfig};
use pb_foundation::PbError;
use pb_physics::PopulationBalanceModel;

fn load(json: &str) -> PopulationBalanceConfig {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("populationBalance.json");
    std::fs::write(&path, json).unwrap();
    PopulationBalanceConfig::from_file(&path).unwrap()
}

#[test]
fn test_unknown_model_from_file() {
    let cfg = load(
        r#"{
            "continuousPhase": "water",
            "phases": [{
                "name": "air",
                "sphericalDiameters": { "type": "uniform", "min": 1e-3, "max": 5e-3, "n": 5 }
            }],
            "coalescenceModels": [{ "type": "Kusters", "C": 1.0 }]
        }"#,
    );
    let err = PopulationBalanceModel::new(&cfg, &fluid(1)).err().unwrap();
    assert!(err.is_config_error());
    let msg = err.to_string();
    assert!(msg.contains("Kusters") && msg.contains("Luo"), "{}", msg);
}

#[test]
fn test_model_in_wrong_family() {
    let mut cfg = config(&DOUBLING);
    cfg.breakup_models = vec![ModelEntry::new("LuoSvendsen")];
    let err = PopulationBalanceModel::new(&cfg, &fluid(1)).err().unwrap();
    assert!(matches!(err, PbError::WrongModelFamily { .. }), "{}", err);
}

#[test]
fn test_missing_coefficient() {
    let mut cfg = config(&DOUBLING);
    cfg.breakup_models = vec![ModelEntry::new("powerLaw").with("C", 1.0)];
    let err = PopulationBalanceModel::new(&cfg, &fluid(1)).err().unwrap();
    assert!(err.is_config_error());
    assert!(err.to_string().contains("power"), "{}", err);
}

#[test]
fn test_unknown_dispersed_phase() {
    let mut cfg = config(&DOUBLING);
    cfg.phases[0].name = "oil".into();
    assert!(PopulationBalanceModel::new(&cfg, &fluid(1)).is_err());

    let mut cfg = config(&DOUBLING);
    cfg.model_sources = vec![ModelEntry::new("uniformGrowth").with("phase", "oil").with("rate", 1.0)];
    let err = PopulationBalanceModel::new(&cfg, &fluid(1)).err().unwrap();
    assert!(err.to_string().contains("oil"));
}

#[test]
fn test_injection_into_missing_group() {
    let mut cfg = config(&DOUBLING);
    cfg.model_sources = vec![ModelEntry::new("groupInjection").with("group", 7).with("rate", 1.0)];
    let err = PopulationBalanceModel::new(&cfg, &fluid(1)).err().unwrap();
    assert!(err.is_config_error());
}

#[test]
fn test_non_ascending_groups_across_phases() {
    let mut cfg = config(&[4.0, 8.0]);
    let mut second = cfg.phases[0].clone();
    second.name = "small".into();
    second.spherical_diameters = pb_config::DiameterSpec::List { values: vec![1e-3] };
    cfg.phases.push(second);

    let mut fluid = fluid(1);
    fluid
        .add_phase(pb_physics::PhaseFields::uniform("small", 1, 0.0, 1.0, 1e-5))
        .unwrap();
    assert!(PopulationBalanceModel::new(&cfg, &fluid).is_err());
}

#[test]
fn test_malformed_json_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"continuousPhase\": ").unwrap();
    assert!(PopulationBalanceConfig::from_file(&path).is_err());
}
