// crates/pb_config/src/population_balance.rs

//! PopulationBalanceConfig - 群体平衡配置
//!
//! 一个群体平衡由连续相、若干分散相（每个分散相拥有一段连续的尺寸组）、
//! 四个子模型列表以及 `solverDict` 组成：
//!
//! ```json
//! {
//!   "name": "bubbles",
//!   "continuousPhase": "water",
//!   "phases": [
//!     { "name": "air",
//!       "sphericalDiameters": { "type": "uniform", "min": 1e-3, "max": 5e-3, "n": 5 } }
//!   ],
//!   "coalescenceModels": [ { "type": "constant", "rate": 1e-9 } ],
//!   "breakupModels": [],
//!   "binaryBreakupModels": [],
//!   "solverDict": { "sourceUpdateInterval": 1 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

use crate::error::ConfigError;

/// 群体平衡配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationBalanceConfig {
    /// 群体平衡名称
    #[serde(default = "default_name")]
    pub name: String,

    /// 连续相名称
    pub continuous_phase: String,

    /// 分散相（按体积递增顺序排列）
    pub phases: Vec<DispersedPhaseConfig>,

    /// 聚并模型列表
    #[serde(default)]
    pub coalescence_models: Vec<ModelEntry>,

    /// 破碎模型列表（总破碎频率 + 子粒径分布）
    #[serde(default)]
    pub breakup_models: Vec<ModelEntry>,

    /// 二元破碎模型列表
    #[serde(default)]
    pub binary_breakup_models: Vec<ModelEntry>,

    /// 外部模型源项
    #[serde(default)]
    pub model_sources: Vec<ModelEntry>,

    /// 求解控制
    #[serde(default)]
    pub solver_dict: SolverDict,
}

fn default_name() -> String {
    "populationBalance".to_string()
}

/// 分散相配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispersedPhaseConfig {
    /// 相名称
    pub name: String,

    /// 球当量直径生成器
    pub spherical_diameters: DiameterSpec,

    /// 形状模型
    #[serde(default)]
    pub shape_model: ShapeModelConfig,

    /// 初始组分数（缺省时全部位于第一组）
    #[serde(default)]
    pub initial_fractions: Option<Vec<f64>>,
}

/// 直径生成器
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiameterSpec {
    /// 在 [min, max] 内生成 n 个直径
    Uniform {
        /// 最小直径 [m]
        min: f64,
        /// 最大直径 [m]
        max: f64,
        /// 组数
        n: usize,
        /// 间距方式
        #[serde(default)]
        spacing: Spacing,
    },
    /// 显式列表
    List {
        /// 直径 [m]
        values: Vec<f64>,
    },
}

/// 直径间距方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    /// 直径等差
    #[default]
    Linear,
    /// 直径等比
    Geometric,
}

impl DiameterSpec {
    /// 生成直径序列
    pub fn diameters(&self) -> Result<Vec<f64>, ConfigError> {
        match self {
            Self::Uniform { min, max, n, spacing } => {
                if *n == 0 {
                    return Err(ConfigError::invalid("sphericalDiameters.n", n, "至少需要一个组"));
                }
                if !(*min > 0.0) || !(*max >= *min) {
                    return Err(ConfigError::invalid(
                        "sphericalDiameters",
                        format!("[{}, {}]", min, max),
                        "需要 0 < min <= max",
                    ));
                }
                if *n == 1 {
                    return Ok(vec![*min]);
                }
                let last = (*n - 1) as f64;
                let values = (0..*n)
                    .map(|i| {
                        let s = i as f64 / last;
                        match spacing {
                            Spacing::Linear => min + s * (max - min),
                            Spacing::Geometric => min * (max / min).powf(s),
                        }
                    })
                    .collect();
                Ok(values)
            }
            Self::List { values } => {
                if values.is_empty() {
                    return Err(ConfigError::invalid("sphericalDiameters.values", "[]", "至少需要一个组"));
                }
                Ok(values.clone())
            }
        }
    }

    /// 组数
    pub fn len(&self) -> usize {
        match self {
            Self::Uniform { n, .. } => *n,
            Self::List { values } => values.len(),
        }
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 形状模型配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShapeModelConfig {
    /// 球形
    #[default]
    Spherical,
    /// 分形聚集体
    Fractal {
        /// 分形维数
        #[serde(rename = "Df")]
        df: f64,
        /// 分形前因子
        #[serde(rename = "alphaC")]
        alpha_c: f64,
        /// 烧结模型
        #[serde(default, rename = "sinteringModel")]
        sintering: SinteringConfig,
    },
}

/// 烧结模型配置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SinteringConfig {
    /// 无烧结
    #[default]
    None,
    /// 常特征时间松弛
    Constant {
        /// 特征时间 [s]
        tau: f64,
    },
}

/// 子模型条目：`type` 加上任意系数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelEntry {
    /// 模型类型名
    #[serde(rename = "type")]
    pub model_type: String,

    /// 模型系数（原样保存）
    #[serde(flatten)]
    pub coeffs: Map<String, Value>,
}

impl ModelEntry {
    /// 创建不带系数的条目
    pub fn new(model_type: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
            coeffs: Map::new(),
        }
    }

    /// 添加一个系数
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.coeffs.insert(key.into(), value.into());
        self
    }

    /// 系数对象
    pub fn coeffs_value(&self) -> Value {
        Value::Object(self.coeffs.clone())
    }

    /// 解析系数到具体类型
    pub fn parse_coeffs<T: serde::de::DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_json::from_value(self.coeffs_value()).map_err(|e| {
            ConfigError::Parse(format!("模型 '{}' 的系数无效: {}", self.model_type, e))
        })
    }
}

/// 求解控制
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverDict {
    /// 速率表刷新间隔（solve 调用次数）
    #[serde(default = "default_source_update_interval")]
    pub source_update_interval: usize,

    /// 仅在外迭代最后一次时求解
    #[serde(default)]
    pub solve_on_final_iter_only: bool,

    /// 校正次数
    #[serde(default = "default_n_corr")]
    pub n_corr: usize,

    /// 残差容差
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_source_update_interval() -> usize { 1 }
fn default_n_corr() -> usize { 1 }
fn default_tolerance() -> f64 { 1e-6 }

impl Default for SolverDict {
    fn default() -> Self {
        Self {
            source_update_interval: default_source_update_interval(),
            solve_on_final_iter_only: false,
            n_corr: default_n_corr(),
            tolerance: default_tolerance(),
        }
    }
}

impl PopulationBalanceConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        let config: PopulationBalanceConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 总组数
    pub fn n_groups(&self) -> usize {
        self.phases.iter().map(|p| p.spherical_diameters.len()).sum()
    }

    /// 验证配置有效性
    ///
    /// 跨相的尺寸组升序检查在构建模型时进行。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.continuous_phase.is_empty() {
            return Err(ConfigError::Missing("continuousPhase".to_string()));
        }
        if self.phases.is_empty() {
            return Err(ConfigError::Missing("phases".to_string()));
        }

        let mut names = HashSet::new();
        for phase in &self.phases {
            if phase.name == self.continuous_phase {
                return Err(ConfigError::invalid(
                    "continuousPhase",
                    &self.continuous_phase,
                    "连续相不能同时作为分散相",
                ));
            }
            if !names.insert(phase.name.as_str()) {
                return Err(ConfigError::invalid("phases", &phase.name, "相名称重复"));
            }
            phase.validate()?;
        }

        let dict = &self.solver_dict;
        if dict.source_update_interval < 1 {
            return Err(ConfigError::invalid(
                "solverDict.sourceUpdateInterval",
                dict.source_update_interval,
                "必须至少为 1",
            ));
        }
        if dict.n_corr < 1 {
            return Err(ConfigError::invalid("solverDict.nCorr", dict.n_corr, "必须至少为 1"));
        }
        if !(dict.tolerance >= 0.0) {
            return Err(ConfigError::invalid("solverDict.tolerance", dict.tolerance, "不能为负"));
        }

        for (key, list) in [
            ("coalescenceModels", &self.coalescence_models),
            ("breakupModels", &self.breakup_models),
            ("binaryBreakupModels", &self.binary_breakup_models),
            ("modelSources", &self.model_sources),
        ] {
            if let Some(entry) = list.iter().find(|e| e.model_type.is_empty()) {
                return Err(ConfigError::invalid(key, entry.coeffs_value(), "缺少 'type'"));
            }
        }

        Ok(())
    }
}

impl DispersedPhaseConfig {
    /// 验证单个分散相
    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = format!("phases.{}", self.name);
        let diameters = self.spherical_diameters.diameters()?;
        if let Some(d) = diameters.iter().find(|d| !(**d > 0.0) || !d.is_finite()) {
            return Err(ConfigError::invalid(format!("{}.sphericalDiameters", key), d, "直径必须为正"));
        }
        if diameters.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ConfigError::invalid(
                format!("{}.sphericalDiameters", key),
                format!("{:?}", diameters),
                "直径必须严格递增",
            ));
        }

        if let Some(fractions) = &self.initial_fractions {
            if fractions.len() != diameters.len() {
                return Err(ConfigError::invalid(
                    format!("{}.initialFractions", key),
                    fractions.len(),
                    format!("长度必须等于组数 {}", diameters.len()),
                ));
            }
            if fractions.iter().any(|f| !(*f >= 0.0)) || fractions.iter().sum::<f64>() <= 0.0 {
                return Err(ConfigError::invalid(
                    format!("{}.initialFractions", key),
                    format!("{:?}", fractions),
                    "分数必须非负且和为正",
                ));
            }
        }

        if let ShapeModelConfig::Fractal { df, alpha_c, sintering } = &self.shape_model {
            if !(*df > 0.0 && *df <= 3.0) {
                return Err(ConfigError::invalid(format!("{}.shapeModel.Df", key), df, "必须在 (0, 3] 内"));
            }
            if !(*alpha_c > 0.0) {
                return Err(ConfigError::invalid(format!("{}.shapeModel.alphaC", key), alpha_c, "必须为正"));
            }
            if let SinteringConfig::Constant { tau } = sintering {
                if !(*tau > 0.0) {
                    return Err(ConfigError::invalid(
                        format!("{}.shapeModel.sinteringModel.tau", key),
                        tau,
                        "必须为正",
                    ));
                }
            }
        }

        Ok(())
    }

    /// 归一化后的初始分数
    pub fn normalised_initial_fractions(&self) -> Vec<f64> {
        let n = self.spherical_diameters.len();
        match &self.initial_fractions {
            Some(f) => {
                let total: f64 = f.iter().sum();
                f.iter().map(|v| v / total).collect()
            }
            None => {
                let mut f = vec![0.0; n];
                if let Some(first) = f.first_mut() {
                    *first = 1.0;
                }
                f
            }
        }
    }
}
