//! 风扇模式与风扇转速

use crate::ProtocolError;
use std::fmt;
use std::str::FromStr;

/// 风扇工作模式
///
/// 不出现在对外遥测中，但决定每个 tick 如何计算 `fan_speed`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FanMode {
    /// 转速跟随功耗：`power / max_power * 100`
    #[default]
    Proportional,
    /// 转速固定为操作员设置的值
    Static,
}

impl FanMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proportional => "proportional",
            Self::Static => "static",
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FanMode {
    type Err = ProtocolError;

    /// 只接受小写名称，与对外接口保持一致
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proportional" => Ok(Self::Proportional),
            "static" => Ok(Self::Static),
            _ => Err(ProtocolError::InvalidValue {
                field: "FanMode",
                value: s.to_string(),
            }),
        }
    }
}

/// 风扇转速百分比（0-100，构造时校验）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64", into = "u8"))]
pub struct FanSpeed(u8);

impl FanSpeed {
    pub const MIN: FanSpeed = FanSpeed(0);
    pub const MAX: FanSpeed = FanSpeed(100);

    /// 由浮点百分比构造（截断小数，并夹紧到 0-100）
    ///
    /// NaN 视为 0。
    pub fn saturating_from_percent(percent: f64) -> Self {
        if percent.is_nan() {
            return Self::MIN;
        }
        Self(percent.clamp(0.0, 100.0) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for FanSpeed {
    type Error = ProtocolError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..=100).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ProtocolError::FanSpeedOutOfRange { value })
        }
    }
}

impl From<FanSpeed> for u8 {
    fn from(speed: FanSpeed) -> u8 {
        speed.0
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// 风扇控制命令
///
/// `Static` 携带已校验的转速，因此状态机无需再做区间检查。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanCommand {
    /// 切回比例模式
    Proportional,
    /// 固定转速
    Static(FanSpeed),
}

impl FanCommand {
    pub fn mode(self) -> FanMode {
        match self {
            Self::Proportional => FanMode::Proportional,
            Self::Static(_) => FanMode::Static,
        }
    }
}
