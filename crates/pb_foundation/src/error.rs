// crates/pb_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `PbError` 枚举和 `PbResult` 类型别名，用于整个工作区的错误处理。
//!
//! # 错误分类
//!
//! 1. **配置错误**: 未知子模型、缺少配置项、组/相数量不匹配。构造期致命。
//! 2. **逻辑错误**: 例如对 `i >= j` 请求二元破碎贡献，说明配对列表构造有缺陷。
//! 3. **IO 错误**: 场文件读写失败。
//!
//! 单元级数值边界情况不产生错误，直接作为场值传播。
//!
//! # 示例
//!
//! ```
//! use pb_foundation::error::{PbError, PbResult};
//!
//! fn lookup(name: &str) -> PbResult<()> {
//!     Err(PbError::unknown_model("coalescence", name, vec!["constant".into(), "Luo".into()]))
//! }
//!
//! let err = lookup("Lou").unwrap_err();
//! assert!(err.to_string().contains("Lou"));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type PbResult<T> = Result<T, PbError>;

/// PolyBal 错误类型
#[derive(Error, Debug)]
pub enum PbError {
    // ========================================================================
    // IO 相关错误
    // ========================================================================

    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },

    // ========================================================================
    // 输入与尺寸
    // ========================================================================

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: String,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    // ========================================================================
    // 配置错误
    // ========================================================================

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 缺少配置项
    #[error("缺少必需的配置项: {key}")]
    MissingConfig {
        /// 配置键名
        key: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    /// 未知子模型类型
    #[error("未知的{family}模型类型 '{name}' (可选: {valid:?})")]
    UnknownModel {
        /// 模型族（coalescence/breakup/...）
        family: String,
        /// 配置中的类型名
        name: String,
        /// 该族已注册的类型名
        valid: Vec<String>,
    },

    /// 子模型被放在了错误的模型族下
    #[error("模型 '{name}' 属于{actual}模型族，不能用作{requested}模型 (可选: {valid:?})")]
    WrongModelFamily {
        /// 模型类型名
        name: String,
        /// 请求的模型族
        requested: String,
        /// 实际注册的模型族
        actual: String,
        /// 请求族已注册的类型名
        valid: Vec<String>,
    },

    /// 相不存在
    #[error("相 '{name}' 不存在 (已知相: {known:?})")]
    UnknownPhase {
        /// 相名称
        name: String,
        /// 已知相名称
        known: Vec<String>,
    },

    // ========================================================================
    // 运行期错误
    // ========================================================================

    /// 资源未找到
    #[error("资源未找到: {resource}")]
    NotFound {
        /// 资源名称
        resource: String,
    },

    /// 内部错误（逻辑缺陷）
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl PbError {
    /// 从IO错误创建（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 缺少配置
    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfig { key: key.into() }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 未知子模型
    pub fn unknown_model(
        family: impl Into<String>,
        name: impl Into<String>,
        valid: Vec<String>,
    ) -> Self {
        Self::UnknownModel {
            family: family.into(),
            name: name.into(),
            valid,
        }
    }

    /// 模型族错误
    pub fn wrong_model_family(
        name: impl Into<String>,
        requested: impl Into<String>,
        actual: impl Into<String>,
        valid: Vec<String>,
    ) -> Self {
        Self::WrongModelFamily {
            name: name.into(),
            requested: requested.into(),
            actual: actual.into(),
            valid,
        }
    }

    /// 相不存在
    pub fn unknown_phase(name: impl Into<String>, known: Vec<String>) -> Self {
        Self::UnknownPhase {
            name: name.into(),
            known,
        }
    }

    /// 资源未找到
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 是否为构造期配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::MissingConfig { .. }
                | Self::InvalidConfig { .. }
                | Self::UnknownModel { .. }
                | Self::WrongModelFamily { .. }
                | Self::UnknownPhase { .. }
        )
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl PbError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &str, expected: usize, actual: usize) -> PbResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for PbError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 测试
// ========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PbError::config("测试配置错误");
        assert!(err.to_string().contains("配置错误"));
    }

    #[test]
    fn test_unknown_model_lists_alternatives() {
        let err = PbError::unknown_model("coalescence", "Lou", vec!["Luo".into(), "Liao".into()]);
        let msg = err.to_string();
        assert!(msg.contains("Lou"));
        assert!(msg.contains("Luo"));
        assert!(msg.contains("Liao"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_wrong_family() {
        let err = PbError::wrong_model_family("LuoSvendsen", "breakup", "binaryBreakup", vec![]);
        let msg = err.to_string();
        assert!(msg.contains("LuoSvendsen"));
        assert!(msg.contains("binaryBreakup"));
    }

    #[test]
    fn test_internal_is_not_config() {
        assert!(!PbError::internal("pair (3, 2)").is_config_error());
    }

    #[test]
    fn test_check_size() {
        assert!(PbError::check_size("test", 10, 10).is_ok());
        assert!(PbError::check_size("test", 10, 5).is_err());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: PbError = io_err.into();
        assert!(matches!(err, PbError::Io { .. }));
    }
}
