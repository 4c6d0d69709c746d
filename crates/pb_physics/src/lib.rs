// crates/pb_physics/src/lib.rs

//! PolyBal Physics Layer (Layer 3)
//!
//! 固定节点（fixed pivot）群体平衡求解核心。分散相按球当量体积离散为
//! 若干尺寸组，每组求解一个组分数 f_i，聚并、破碎、二元破碎、膨胀与
//! 模型源项以 Su/Sp 形式装配，出生项按分配系数 η 分给相邻节点，
//! 同时保持粒子数与体积守恒。
//!
//! # 模块概览
//!
//! - [`field`]: 逐单元标量场
//! - [`system`]: 相系统接口 `FluidSystem`、质量传递表、内置 0 维 `PhaseSystem`
//! - [`group`]: 尺寸组与速度组
//! - [`allocation`]: 分配系数 η 与组宽 Δ
//! - [`shape`]: 球形/分形形状模型
//! - [`context`], [`cache`]: 核函数上下文与预计算缓存
//! - [`coalescence`], [`breakup`], [`binary_breakup`]: 子模型族
//! - [`sources`], [`expansion`]: 模型源项与漂移
//! - [`transport`]: 组分数方程的单元局部积分
//! - [`registry`]: 按名字构建子模型
//! - [`population_balance`]: 驱动以上各部分的 `PopulationBalanceModel`
//! - [`io`]: 组分数场读写
//!
//! # 使用
//!
//! ```text
//! let mut pbm = PopulationBalanceModel::new(&config, &fluid)?;
//! loop {
//!     fluid.advance_time();
//!     pbm.solve(&fluid, &LocalImplicitSolver::default())?;
//!     pbm.correct(&fluid)?;
//! }
//! ```

#![warn(clippy::all)]

pub mod allocation;
pub mod binary_breakup;
pub mod breakup;
pub mod cache;
pub mod coalescence;
pub mod context;
pub mod expansion;
pub mod field;
pub mod group;
pub mod io;
pub mod population_balance;
pub mod quadrature;
pub mod registry;
pub mod shape;
pub mod sources;
pub mod system;
pub mod transport;

// 重导出常用类型
pub use allocation::{AllocationEngine, Bracket};
pub use binary_breakup::BinaryBreakupModel;
pub use breakup::{BreakupModel, DaughterSizeDistribution};
pub use cache::KernelCache;
pub use coalescence::CoalescenceModel;
pub use context::KernelContext;
pub use field::ScalarField;
pub use group::{SizeGroup, VelocityGroup};
pub use population_balance::{PopulationBalanceModel, RateState, SolveStats};
pub use registry::ModelRegistry;
pub use shape::ShapeModel;
pub use sources::{ModelSource, SourceAccumulator};
pub use system::{FluidSystem, MassTransferTable, PhaseFields, PhaseSystem, TurbulenceFields};
pub use transport::{GroupEquation, GroupFractionSolver, IntegrationMethod, LocalImplicitSolver};
