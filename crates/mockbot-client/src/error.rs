//! 命令门面错误类型
//!
//! 错误消息直接面向操作员（HTTP 层原样放入 `detail` 字段）。

use thiserror::Error;

/// 开关被拒绝
pub const SWITCH_REJECTED: &str = "Robot cannot be switched on/off from current state";
/// 复位被拒绝
pub const RESET_REJECTED: &str = "Robot cannot be reset from current state";
/// 风扇转速超出范围
pub const FAN_SPEED_OUT_OF_RANGE: &str = "Fan speed out of range (0-100)";
/// 固定模式缺少转速
pub const FAN_SPEED_REQUIRED: &str = "Fan speed is required for static mode";

/// 命令错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// 当前状态不允许该命令（状态未改变，只追加 WARN 日志）
    #[error("{detail}")]
    InvalidTransition { detail: String },

    /// 参数非法（在任何变更之前拒绝）
    #[error("{detail}")]
    InvalidArgument { detail: String },
}

impl ServiceError {
    pub(crate) fn transition(detail: impl Into<String>) -> Self {
        Self::InvalidTransition {
            detail: detail.into(),
        }
    }

    pub(crate) fn argument(detail: impl Into<String>) -> Self {
        Self::InvalidArgument {
            detail: detail.into(),
        }
    }

    /// 面向操作员的消息
    pub fn detail(&self) -> &str {
        match self {
            Self::InvalidTransition { detail } | Self::InvalidArgument { detail } => detail,
        }
    }

    pub fn is_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}
