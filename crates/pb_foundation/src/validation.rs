// crates/pb_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 提供验证报告和错误/警告类型，用于配置检查与场数据诊断。
//!
//! # 示例
//!
//! ```
//! use pb_foundation::validation::{ValidationReport, ValidationError};
//!
//! let some_value = -1.0f64;
//! let mut report = ValidationReport::new();
//! if some_value < 0.0 {
//!     report.add_error(ValidationError::OutOfRange {
//!         field: "f.air.group0".into(),
//!         cell_id: 0,
//!         value: some_value,
//!         min: 0.0,
//!         max: 1.0,
//!     });
//! }
//! assert!(report.has_errors());
//! ```

use std::fmt;

/// 验证报告
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告:")?;
        writeln!(f, "  错误: {} 个", self.error_count())?;
        writeln!(f, "  警告: {} 个", self.warning_count())?;

        if self.has_errors() {
            writeln!(f, "\n错误详情:")?;
            for (i, err) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, err)?;
            }
        }

        if self.has_warnings() {
            writeln!(f, "\n警告详情:")?;
            for (i, warn) in self.warnings.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, warn)?;
            }
        }

        Ok(())
    }
}

/// 验证错误类型
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// 非有限值
    NonFinite {
        /// 字段名称
        field: String,
        /// 所在单元 ID
        cell_id: usize,
        /// 非有限的数值
        value: f64,
    },
    /// 数据超出范围
    OutOfRange {
        /// 字段名称
        field: String,
        /// 所在单元 ID
        cell_id: usize,
        /// 实际值
        value: f64,
        /// 下界
        min: f64,
        /// 上界
        max: f64,
    },
    /// 配置项错误
    Config {
        /// 配置键
        key: String,
        /// 错误描述
        message: String,
    },
    /// 一致性错误
    Consistency {
        /// 错误描述
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite {
                field,
                cell_id,
                value,
            } => {
                write!(f, "单元{}: 字段{}={} (非有限值)", cell_id, field, value)
            }
            Self::OutOfRange {
                field,
                cell_id,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "单元{}: 字段{}={} 超出范围[{}, {}]",
                    cell_id, field, value, min, max
                )
            }
            Self::Config { key, message } => write!(f, "配置项 {}: {}", key, message),
            Self::Consistency { message } => write!(f, "一致性错误: {}", message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// 验证警告类型
#[derive(Debug, Clone)]
pub enum ValidationWarning {
    /// 低数值
    LowValue {
        /// 字段名称
        field: String,
        /// 单元 ID
        cell_id: usize,
        /// 实际值
        value: f64,
        /// 阈值
        threshold: f64,
    },
    /// 自定义警告
    Custom {
        /// 自定义消息
        message: String,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowValue {
                field,
                cell_id,
                value,
                threshold,
            } => {
                write!(
                    f,
                    "单元{}: 字段{}={} 低于阈值{}",
                    cell_id, field, value, threshold
                )
            }
            Self::Custom { message } => write!(f, "{}", message),
        }
    }
}

// ============================================================================
// 验证辅助函数
// ============================================================================

/// 检查场中所有值是否有限，返回非有限值个数
pub fn check_finite_field(report: &mut ValidationReport, field: &str, values: &[f64]) -> usize {
    let mut count = 0;
    for (cell_id, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            report.add_error(ValidationError::NonFinite {
                field: field.to_string(),
                cell_id,
                value,
            });
            count += 1;
        }
    }
    count
}

/// 检查值是否在范围内
pub fn check_range(
    report: &mut ValidationReport,
    field: &str,
    cell_id: usize,
    value: f64,
    min: f64,
    max: f64,
) -> bool {
    if value < min || value > max {
        report.add_error(ValidationError::OutOfRange {
            field: field.to_string(),
            cell_id,
            value,
            min,
            max,
        });
        false
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = ValidationReport::new();
        assert!(report.is_valid());
        report.add_warning(ValidationWarning::Custom {
            message: "w".into(),
        });
        assert!(report.is_valid());
        assert!(report.has_warnings());
        report.add_error(ValidationError::Consistency {
            message: "e".into(),
        });
        assert!(!report.is_valid());
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_check_finite_field() {
        let mut report = ValidationReport::new();
        let n = check_finite_field(&mut report, "f", &[0.0, f64::NAN, 1.0, f64::INFINITY]);
        assert_eq!(n, 2);
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn test_check_range() {
        let mut report = ValidationReport::new();
        assert!(check_range(&mut report, "x", 0, 0.5, 0.0, 1.0));
        assert!(!check_range(&mut report, "x", 1, 1.5, 0.0, 1.0));
        assert_eq!(report.error_count(), 1);
        assert!(report.to_string().contains("验证报告"));
    }
}
