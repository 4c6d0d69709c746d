// crates/pb_foundation/src/lib.rs

//! PolyBal Foundation Layer
//!
//! 基础层，提供整个群体平衡工作区共用的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`float`]: 安全浮点运算、正负部分、Kahan 求和
//! - [`validation`]: 配置/状态验证报告
//!
//! # 示例
//!
//! ```
//! use pb_foundation::{PbError, PbResult};
//! use pb_foundation::float::KahanSum;
//!
//! fn total(values: &[f64]) -> PbResult<f64> {
//!     if values.is_empty() {
//!         return Err(PbError::invalid_input("空数组"));
//!     }
//!     Ok(KahanSum::sum_iter(values.iter().copied()))
//! }
//!
//! assert_eq!(total(&[1.0, 2.0]).unwrap(), 3.0);
//! assert!(total(&[]).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod float;
pub mod validation;

// 重导出常用类型
pub use error::{PbError, PbResult};
pub use float::KahanSum;
