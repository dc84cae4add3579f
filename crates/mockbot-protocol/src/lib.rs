//! # Mockbot Protocol
//!
//! 模拟机器人的数据模型定义（无线程、无随机数依赖）
//!
//! ## 模块
//!
//! - `status`: 运行状态枚举（Idle / Running / Offline / Error）
//! - `fan`: 风扇模式与经过校验的风扇转速
//! - `state`: 对外遥测记录 `RobotState`
//! - `config`: 模拟参数 `SimulationConfig`
//!
//! 上层（driver / client / api）只通过这里的类型交换数据，
//! 校验规则（风扇转速 0-100、配置区间）也集中在本 crate。

pub mod config;
pub mod fan;
pub mod state;
pub mod status;

// 重新导出常用类型
pub use config::*;
pub use fan::*;
pub use state::*;
pub use status::*;

use thiserror::Error;

/// 协议类型解析/校验错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 风扇转速超出 0-100 区间
    #[error("Fan speed out of range (0-100): {value}")]
    FanSpeedOutOfRange { value: i64 },

    /// 无法识别的枚举值（状态名、风扇模式名）
    #[error("Invalid value for field {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },
}
