//! 机器人运行状态

use std::fmt;

/// 机器人运行状态
///
/// 所有下游计算（功耗区间、温度区间、风扇转速）都由当前状态决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RobotStatus {
    /// 待机（初始状态）
    #[default]
    Idle,
    /// 运行中
    Running,
    /// 离线（遥测归零，运行时间冻结）
    Offline,
    /// 故障（过热后进入，只能通过 reset 恢复）
    Error,
}

impl RobotStatus {
    /// 全部状态（用于遍历测试）
    pub const ALL: [RobotStatus; 4] = [Self::Idle, Self::Running, Self::Offline, Self::Error];

    /// 对外展示的小写名称
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Offline => "offline",
            Self::Error => "error",
        }
    }

    pub fn is_offline(self) -> bool {
        self == Self::Offline
    }

    /// 是否允许 `switch` 命令（Idle ↔ Running）
    pub fn can_switch(self) -> bool {
        matches!(self, Self::Idle | Self::Running)
    }

    /// 是否允许 `reset` 命令
    pub fn can_reset(self) -> bool {
        matches!(self, Self::Idle | Self::Error)
    }
}

impl fmt::Display for RobotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
