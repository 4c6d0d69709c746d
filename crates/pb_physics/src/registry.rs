// crates/pb_physics/src/registry.rs

//! 子模型注册中心
//!
//! 按类型名把配置条目映射到各模型族的构造函数。同一个名字只属于一个族；
//! 在错误的族中请求它会报告其实际所属的族，未知名字则列出该族全部可选项。

use pb_config::ModelEntry;
use pb_foundation::{PbError, PbResult};
use std::collections::BTreeMap;

use crate::binary_breakup::{self, BinaryBreakupModel, LuoSvendsen, PowerLawUniformBinary};
use crate::breakup::{
    self, BreakupModel, DaughterSizeDistribution, Exponential, Laakkonen, LaakkonenDaughter,
    PowerLaw, UniformBinary, DAUGHTER_FAMILY, DAUGHTER_KEY,
};
use crate::coalescence::{
    self, BrownianCollisions, CoalescenceModel, ConstantCoalescence, CoulaloglouTavlarides,
    Hydrodynamic, Liao, Luo, PrinceBlanch,
};
use crate::sources::{self, GroupInjection, ModelSource, UniformGrowth};

type CoalescenceCtor = fn(&ModelEntry) -> PbResult<Box<dyn CoalescenceModel>>;
type BreakupCtor = fn(&ModelEntry, Box<dyn DaughterSizeDistribution>) -> PbResult<Box<dyn BreakupModel>>;
type BinaryBreakupCtor = fn(&ModelEntry) -> PbResult<Box<dyn BinaryBreakupModel>>;
type ModelSourceCtor = fn(&ModelEntry) -> PbResult<Box<dyn ModelSource>>;
type DaughterCtor = fn(&ModelEntry) -> PbResult<Box<dyn DaughterSizeDistribution>>;

/// 子模型注册中心
#[derive(Default)]
pub struct ModelRegistry {
    coalescence: BTreeMap<String, CoalescenceCtor>,
    breakup: BTreeMap<String, BreakupCtor>,
    binary_breakup: BTreeMap<String, BinaryBreakupCtor>,
    model_sources: BTreeMap<String, ModelSourceCtor>,
    daughters: BTreeMap<String, DaughterCtor>,
}

impl ModelRegistry {
    /// 空注册中心
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册全部内置模型
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();

        reg.register_coalescence("constant", |e| Ok(Box::new(ConstantCoalescence::from_entry(e)?)));
        reg.register_coalescence("hydrodynamic", |e| Ok(Box::new(Hydrodynamic::from_entry(e)?)));
        reg.register_coalescence("CoulaloglouTavlarides", |e| {
            Ok(Box::new(CoulaloglouTavlarides::from_entry(e)?))
        });
        reg.register_coalescence("Luo", |e| Ok(Box::new(Luo::from_entry(e)?)));
        reg.register_coalescence("PrinceBlanch", |e| Ok(Box::new(PrinceBlanch::from_entry(e)?)));
        reg.register_coalescence("Liao", |e| Ok(Box::new(Liao::from_entry(e)?)));
        reg.register_coalescence("BrownianCollisions", |e| {
            Ok(Box::new(BrownianCollisions::from_entry(e)?))
        });

        reg.register_breakup("exponential", |e, d| Ok(Box::new(Exponential::from_entry(e, d)?)));
        reg.register_breakup("powerLaw", |e, d| Ok(Box::new(PowerLaw::from_entry(e, d)?)));
        reg.register_breakup("Laakkonen", |e, d| Ok(Box::new(Laakkonen::from_entry(e, d)?)));

        reg.register_binary_breakup("powerLawUniformBinary", |e| {
            Ok(Box::new(PowerLawUniformBinary::from_entry(e)?))
        });
        reg.register_binary_breakup("LuoSvendsen", |e| Ok(Box::new(LuoSvendsen::from_entry(e)?)));

        reg.register_model_source("uniformGrowth", |e| Ok(Box::new(UniformGrowth::from_entry(e)?)));
        reg.register_model_source("groupInjection", |e| Ok(Box::new(GroupInjection::from_entry(e)?)));

        reg.register_daughter("uniformBinary", |e| Ok(Box::new(UniformBinary::from_entry(e)?)));
        reg.register_daughter("Laakkonen", |e| Ok(Box::new(LaakkonenDaughter::from_entry(e)?)));

        reg
    }

    pub fn register_coalescence(&mut self, name: &str, ctor: CoalescenceCtor) {
        self.coalescence.insert(name.to_string(), ctor);
    }

    pub fn register_breakup(&mut self, name: &str, ctor: BreakupCtor) {
        self.breakup.insert(name.to_string(), ctor);
    }

    pub fn register_binary_breakup(&mut self, name: &str, ctor: BinaryBreakupCtor) {
        self.binary_breakup.insert(name.to_string(), ctor);
    }

    pub fn register_model_source(&mut self, name: &str, ctor: ModelSourceCtor) {
        self.model_sources.insert(name.to_string(), ctor);
    }

    pub fn register_daughter(&mut self, name: &str, ctor: DaughterCtor) {
        self.daughters.insert(name.to_string(), ctor);
    }

    /// 全部模型族名
    pub fn families() -> [&'static str; 5] {
        [
            coalescence::FAMILY,
            breakup::FAMILY,
            binary_breakup::FAMILY,
            sources::FAMILY,
            DAUGHTER_FAMILY,
        ]
    }

    /// 某族已注册的名字（按字母序）
    pub fn names(&self, family: &str) -> Vec<String> {
        match family {
            f if f == coalescence::FAMILY => self.coalescence.keys().cloned().collect(),
            f if f == breakup::FAMILY => self.breakup.keys().cloned().collect(),
            f if f == binary_breakup::FAMILY => self.binary_breakup.keys().cloned().collect(),
            f if f == sources::FAMILY => self.model_sources.keys().cloned().collect(),
            f if f == DAUGHTER_FAMILY => self.daughters.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// 名字不在 `family` 中时构造错误
    fn lookup_error(&self, family: &str, name: &str) -> PbError {
        let valid = self.names(family);
        // 子粒径分布与破碎模型可以同名，不视为族错误
        let owner = Self::families()
            .into_iter()
            .filter(|f| *f != family && *f != DAUGHTER_FAMILY)
            .find(|f| self.names(f).iter().any(|n| n == name));
        match owner {
            Some(actual) => PbError::wrong_model_family(name, family, actual, valid),
            None => PbError::unknown_model(family, name, valid),
        }
    }

    /// 构建聚并模型
    pub fn coalescence(&self, entry: &ModelEntry) -> PbResult<Box<dyn CoalescenceModel>> {
        let ctor = self
            .coalescence
            .get(&entry.model_type)
            .ok_or_else(|| self.lookup_error(coalescence::FAMILY, &entry.model_type))?;
        ctor(entry)
    }

    /// 构建破碎模型（连同其子粒径分布）
    pub fn breakup(&self, entry: &ModelEntry) -> PbResult<Box<dyn BreakupModel>> {
        let ctor = self
            .breakup
            .get(&entry.model_type)
            .ok_or_else(|| self.lookup_error(breakup::FAMILY, &entry.model_type))?;
        let daughter = match entry.coeffs.get(DAUGHTER_KEY) {
            Some(value) => {
                let daughter_entry: ModelEntry = serde_json::from_value(value.clone()).map_err(|e| {
                    PbError::invalid_config(
                        format!("{}.{}", entry.model_type, DAUGHTER_KEY),
                        value.to_string(),
                        e.to_string(),
                    )
                })?;
                self.daughter(&daughter_entry)?
            }
            None => Box::new(UniformBinary),
        };
        ctor(entry, daughter)
    }

    /// 构建二元破碎模型
    pub fn binary_breakup(&self, entry: &ModelEntry) -> PbResult<Box<dyn BinaryBreakupModel>> {
        let ctor = self
            .binary_breakup
            .get(&entry.model_type)
            .ok_or_else(|| self.lookup_error(binary_breakup::FAMILY, &entry.model_type))?;
        ctor(entry)
    }

    /// 构建模型源
    pub fn model_source(&self, entry: &ModelEntry) -> PbResult<Box<dyn ModelSource>> {
        let ctor = self
            .model_sources
            .get(&entry.model_type)
            .ok_or_else(|| self.lookup_error(sources::FAMILY, &entry.model_type))?;
        ctor(entry)
    }

    /// 构建子粒径分布
    pub fn daughter(&self, entry: &ModelEntry) -> PbResult<Box<dyn DaughterSizeDistribution>> {
        let ctor = self
            .daughters
            .get(&entry.model_type)
            .ok_or_else(|| self.lookup_error(DAUGHTER_FAMILY, &entry.model_type))?;
        ctor(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_cover_every_family() {
        let reg = ModelRegistry::with_defaults();
        assert_eq!(reg.names("coalescence").len(), 7);
        assert_eq!(reg.names("breakup"), vec!["Laakkonen", "exponential", "powerLaw"]);
        assert_eq!(reg.names("binaryBreakup").len(), 2);
        assert_eq!(reg.names("modelSource").len(), 2);
        assert!(reg.names("shape").is_empty());
    }

    #[test]
    fn test_unknown_model_lists_alternatives() {
        let reg = ModelRegistry::with_defaults();
        let err = reg.coalescence(&ModelEntry::new("Kusters")).err().unwrap();
        let msg = err.to_string();
        assert!(err.is_config_error());
        assert!(msg.contains("Kusters") && msg.contains("PrinceBlanch"), "{}", msg);
    }

    #[test]
    fn test_wrong_family_names_owner() {
        let reg = ModelRegistry::with_defaults();
        let err = reg.breakup(&ModelEntry::new("LuoSvendsen")).err().unwrap();
        assert!(matches!(err, PbError::WrongModelFamily { .. }));
        assert!(err.to_string().contains("binaryBreakup"));

        let err = reg.binary_breakup(&ModelEntry::new("powerLaw")).err().unwrap();
        assert!(err.to_string().contains("LuoSvendsen"));
    }

    #[test]
    fn test_breakup_with_daughter() {
        let reg = ModelRegistry::with_defaults();
        let entry: ModelEntry = serde_json::from_value(json!({
            "type": "powerLaw",
            "C": 0.5,
            "power": 1.0,
            "daughterSizeDistributionModel": { "type": "Laakkonen", "C4": 3.0 }
        }))
        .unwrap();
        assert_eq!(reg.breakup(&entry).unwrap().daughter().name(), "Laakkonen");

        let plain = ModelEntry::new("powerLaw").with("C", 0.5).with("power", 1.0);
        assert_eq!(reg.breakup(&plain).unwrap().daughter().name(), "uniformBinary");

        let bad = ModelEntry::new("powerLaw")
            .with("C", 0.5)
            .with("power", 1.0)
            .with("daughterSizeDistributionModel", json!({ "type": "LuoSvendsen" }));
        assert!(matches!(reg.breakup(&bad).err().unwrap(), PbError::WrongModelFamily { .. }));
    }
}
