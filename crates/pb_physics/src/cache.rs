// crates/pb_physics/src/cache.rs

//! 核函数预计算缓存
//!
//! 每次速率表刷新开始时清空，由各子模型的 `precompute` 填充，在随后的
//! 速率计算中只读访问。键的格式为 `<family>.<model>.<quantity>[.<group>]`。

use pb_foundation::{PbError, PbResult};
use std::collections::HashMap;

use crate::field::ScalarField;

/// 核函数缓存
#[derive(Debug, Default, Clone)]
pub struct KernelCache {
    fields: HashMap<String, ScalarField>,
    scalars: HashMap<String, f64>,
}

impl KernelCache {
    /// 空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 构造缓存键
    pub fn key(family: &str, model: &str, quantity: &str, group: Option<usize>) -> String {
        match group {
            Some(i) => format!("{}.{}.{}.{}", family, model, quantity, i),
            None => format!("{}.{}.{}", family, model, quantity),
        }
    }

    /// 清空（刷新开始时调用）
    pub fn clear(&mut self) {
        self.fields.clear();
        self.scalars.clear();
    }

    /// 条目总数
    pub fn len(&self) -> usize {
        self.fields.len() + self.scalars.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 是否存在
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key) || self.scalars.contains_key(key)
    }

    /// 写入场
    pub fn insert_field(&mut self, key: String, field: ScalarField) {
        self.fields.insert(key, field);
    }

    /// 写入标量
    pub fn insert_scalar(&mut self, key: String, value: f64) {
        self.scalars.insert(key, value);
    }

    /// 读取场
    pub fn field(&self, key: &str) -> PbResult<&ScalarField> {
        self.fields
            .get(key)
            .ok_or_else(|| PbError::internal(format!("核函数缓存缺少条目 '{}'", key)))
    }

    /// 读取标量
    pub fn scalar(&self, key: &str) -> PbResult<f64> {
        self.scalars
            .get(key)
            .copied()
            .ok_or_else(|| PbError::internal(format!("核函数缓存缺少条目 '{}'", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_clear() {
        let mut cache = KernelCache::new();
        let key = KernelCache::key("coalescence", "Liao", "uTerminal", Some(3));
        assert_eq!(key, "coalescence.Liao.uTerminal.3");
        cache.insert_field(key.clone(), ScalarField::uniform(2, 0.2));
        cache.insert_scalar("breakup.powerLaw.C".into(), 1.5);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.field(&key).unwrap()[1], 0.2);
        assert_eq!(cache.scalar("breakup.powerLaw.C").unwrap(), 1.5);

        cache.clear();
        assert!(cache.is_empty());
        let err = cache.field(&key).unwrap_err();
        assert!(err.to_string().contains("uTerminal"));
    }
}
