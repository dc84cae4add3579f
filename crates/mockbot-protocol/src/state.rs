//! 对外遥测记录

use crate::{FanSpeed, RobotStatus};
use std::fmt;
use std::time::Duration;

/// 日志级别（只有两种条目会进入 `RobotState::logs`）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Warn,
    Error,
}

impl LogSeverity {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// 格式化为日志条目，例如 `"WARN: Robot is offline"`
    pub fn entry(self, message: impl fmt::Display) -> String {
        format!("{}: {}", self.prefix(), message)
    }
}

/// 机器人遥测快照
///
/// 更新频率：`refresh_rate_hz`（默认 10Hz）
/// 同步机制：由 `StateStore` 在每次变更完成后整体发布，读者拿到的永远是完整一帧
///
/// **注意**：`fan_mode` 与 `previous_status` 属于引擎内部字段，不在这里。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotState {
    /// 运行状态
    pub status: RobotStatus,
    /// 温度（°C），离线时为 0
    pub temperature: f32,
    /// 功耗（W），总在当前状态的功耗区间内
    pub power_consumption: f32,
    /// 风扇转速（%）
    pub fan_speed: FanSpeed,
    /// 自上次 reset 以来的累计运行时间（离线时冻结）
    pub uptime: Duration,
    /// `WARN:` / `ERROR:` 日志，按时间顺序
    pub logs: Vec<String>,
}

impl RobotState {
    /// 引擎启动时的初始记录：Idle、遥测归零、无日志
    pub fn initial() -> Self {
        Self {
            status: RobotStatus::Idle,
            temperature: 0.0,
            power_consumption: 0.0,
            fan_speed: FanSpeed::MIN,
            uptime: Duration::ZERO,
            logs: Vec::new(),
        }
    }
}

impl Default for RobotState {
    fn default() -> Self {
        Self::initial()
    }
}
