//! 客户端接口模块
//!
//! 本模块提供模拟机器人的命令门面：
//! - 读取状态快照
//! - 开关机、复位（非法迁移返回 `InvalidTransition`）
//! - 风扇模式（非法参数返回 `InvalidArgument`，不改变状态）
//!
//! # 使用场景
//!
//! HTTP 等传输层只依赖 [`RobotService`]；引擎的构造和关闭见 `mockbot-driver`。

mod error;
mod service;

pub use error::{
    FAN_SPEED_OUT_OF_RANGE, FAN_SPEED_REQUIRED, RESET_REJECTED, SWITCH_REJECTED, ServiceError,
};
pub use service::RobotService;
