// crates/pb_config/src/lib.rs

//! PolyBal Config Layer (Layer 2)
//!
//! 配置层，描述一个群体平衡模型及驱动它的 0 维算例。
//!
//! # 模块概览
//!
//! - [`population_balance`]: `PopulationBalanceConfig`，尺寸组、子模型列表、`solverDict`
//! - [`case_config`]: `CaseConfig`，0 维（均匀混合、多单元）算例
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: pb_cli      ─> uses CaseConfig
//! Layer 3: pb_physics  ─> consumes PopulationBalanceConfig
//! Layer 2: pb_config   ─> (本层)
//! Layer 1: pb_foundation
//! ```
//!
//! 所有配置均为 JSON，键名采用 camelCase。子模型系数以原始 JSON 对象
//! 保存在 [`ModelEntry`] 中，由各子模型自行解析。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod case_config;
pub mod error;
pub mod population_balance;

// 重导出核心类型
pub use case_config::{CaseConfig, OutputConfig, PhaseConfig, TurbulenceConfig};
pub use error::ConfigError;
pub use population_balance::{
    DiameterSpec, DispersedPhaseConfig, ModelEntry, PopulationBalanceConfig, ShapeModelConfig,
    SinteringConfig, SolverDict, Spacing,
};
