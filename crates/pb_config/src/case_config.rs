// crates/pb_config/src/case_config.rs

//! CaseConfig - 0 维算例配置
//!
//! 描述一个均匀混合的多单元盒子：单元数与体积、各相的初始状态、
//! 湍流量、表面张力、时间控制与输出。命令行工具据此构建相系统并推进
//! 群体平衡模型。

use pb_foundation::validation::{
    check_finite_field, check_range, ValidationError, ValidationReport, ValidationWarning,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::population_balance::PopulationBalanceConfig;

/// 算例配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseConfig {
    /// 单元数
    #[serde(default = "default_n_cells")]
    pub n_cells: usize,

    /// 单元体积 [m³]
    #[serde(default = "default_cell_volume")]
    pub cell_volume: f64,

    /// 时间步长 [s]
    #[serde(default = "default_delta_t")]
    pub delta_t: f64,

    /// 结束时间 [s]
    #[serde(default = "default_end_time")]
    pub end_time: f64,

    /// 外迭代次数（每个时间步）
    #[serde(default = "default_outer_correctors")]
    pub outer_correctors: usize,

    /// 隐式欧拉积分（否则显式）
    #[serde(default = "default_implicit")]
    pub implicit: bool,

    /// 重力加速度 [m/s²]
    #[serde(default = "default_gravity")]
    pub gravity: [f64; 3],

    /// 表面张力 [N/m]
    #[serde(default = "default_sigma")]
    pub sigma: f64,

    /// 温度 [K]
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// 连续相
    pub continuous_phase: PhaseConfig,

    /// 分散相
    pub dispersed_phases: Vec<PhaseConfig>,

    /// 湍流量（作用于连续相）
    #[serde(default)]
    pub turbulence: TurbulenceConfig,

    /// 群体平衡
    pub population_balance: PopulationBalanceConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_n_cells() -> usize { 1 }
fn default_cell_volume() -> f64 { 1e-3 }
fn default_delta_t() -> f64 { 1e-3 }
fn default_end_time() -> f64 { 0.1 }
fn default_outer_correctors() -> usize { 1 }
fn default_implicit() -> bool { true }
fn default_gravity() -> [f64; 3] { [0.0, -9.81, 0.0] }
fn default_sigma() -> f64 { 0.07 }
fn default_temperature() -> f64 { 300.0 }

/// 相初始状态
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseConfig {
    /// 相名称
    pub name: String,

    /// 体积分数（连续相忽略此值，取 1 - Σ分散相）
    #[serde(default)]
    pub alpha: f64,

    /// 密度 [kg/m³]
    pub rho: f64,

    /// 动力粘度 [Pa·s]
    pub mu: f64,

    /// 速度 [m/s]
    #[serde(default)]
    pub velocity: [f64; 3],

    /// 密度变化率 [kg/m³/s]
    #[serde(default)]
    pub rho_rate: f64,

    /// 相变质量源 [kg/m³/s]
    #[serde(default)]
    pub dmdt: f64,

    /// 残余体积分数
    #[serde(default = "default_residual_alpha")]
    pub residual_alpha: f64,
}

fn default_residual_alpha() -> f64 { 1e-6 }

/// 湍流量
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurbulenceConfig {
    /// 耗散率 [m²/s³]
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// 湍动能 [m²/s²]
    #[serde(default = "default_k")]
    pub k: f64,

    /// 层流剪切率 [1/s]
    #[serde(default)]
    pub shear_rate: Option<f64>,
}

fn default_epsilon() -> f64 { 0.1 }
fn default_k() -> f64 { 0.01 }

impl Default for TurbulenceConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            k: default_k(),
            shear_rate: None,
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// 输出间隔 [s]
    #[serde(default = "default_output_interval")]
    pub interval: f64,
}

fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_output_interval() -> f64 { 0.05 }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            interval: default_output_interval(),
        }
    }
}

impl CaseConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        let config: CaseConfig =
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

    /// 分散相体积分数之和
    pub fn dispersed_alpha(&self) -> f64 {
        self.dispersed_phases.iter().map(|p| p.alpha).sum()
    }

    /// 验证配置，遇到第一个错误即返回
    pub fn validate(&self) -> Result<(), ConfigError> {
        let report = self.validation_report();
        if let Some(err) = report.errors.first() {
            return Err(ConfigError::Build(err.to_string()));
        }
        self.population_balance.validate()
    }

    /// 收集所有问题的验证报告
    pub fn validation_report(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let mut error = |key: &str, message: String| {
            report.add_error(ValidationError::Config {
                key: key.to_string(),
                message,
            })
        };

        if self.n_cells == 0 {
            error("nCells", "至少需要一个单元".into());
        }
        if !(self.cell_volume > 0.0) {
            error("cellVolume", format!("{} 必须为正", self.cell_volume));
        }
        if !(self.delta_t > 0.0) {
            error("deltaT", format!("{} 必须为正", self.delta_t));
        }
        if self.end_time < 0.0 {
            error("endTime", format!("{} 不能为负", self.end_time));
        }
        if self.outer_correctors == 0 {
            error("outerCorrectors", "至少为 1".into());
        }
        if !(self.sigma >= 0.0) {
            error("sigma", format!("{} 不能为负", self.sigma));
        }
        if !(self.temperature > 0.0) {
            error("temperature", format!("{} 必须为正", self.temperature));
        }
        if self.turbulence.epsilon < 0.0 || self.turbulence.k < 0.0 {
            error("turbulence", "epsilon 与 k 不能为负".into());
        }

        for phase in std::iter::once(&self.continuous_phase).chain(&self.dispersed_phases) {
            if !(phase.rho > 0.0) {
                error(&format!("{}.rho", phase.name), format!("{} 必须为正", phase.rho));
            }
            if !(phase.mu > 0.0) {
                error(&format!("{}.mu", phase.name), format!("{} 必须为正", phase.mu));
            }
        }
        let dispersed = self.dispersed_alpha();
        if dispersed >= 1.0 {
            error("dispersedPhases", format!("分散相体积分数之和 {} 必须小于 1", dispersed));
        }

        let pb = &self.population_balance;
        if pb.continuous_phase != self.continuous_phase.name {
            error(
                "populationBalance.continuousPhase",
                format!("'{}' 与算例连续相 '{}' 不一致", pb.continuous_phase, self.continuous_phase.name),
            );
        }
        for phase in &pb.phases {
            if !self.dispersed_phases.iter().any(|p| p.name == phase.name) {
                error(
                    "populationBalance.phases",
                    format!("相 '{}' 未在 dispersedPhases 中定义", phase.name),
                );
            }
        }
        if let Err(e) = pb.validate() {
            error("populationBalance", e.to_string());
        }

        for phase in &self.dispersed_phases {
            let field = format!("alpha.{}", phase.name);
            if check_finite_field(&mut report, &field, &[phase.alpha]) == 0 {
                check_range(&mut report, &field, 0, phase.alpha, 0.0, 1.0);
            }
        }

        if self.output.interval < self.delta_t {
            report.add_warning(ValidationWarning::Custom {
                message: format!(
                    "输出间隔 {} 小于时间步长 {}，每步都将输出",
                    self.output.interval, self.delta_t
                ),
            });
        }
        for phase in &self.dispersed_phases {
            if phase.alpha < phase.residual_alpha {
                report.add_warning(ValidationWarning::LowValue {
                    field: format!("alpha.{}", phase.name),
                    cell_id: 0,
                    value: phase.alpha,
                    threshold: phase.residual_alpha,
                });
            }
        }

        report
    }
}
