//! 模拟参数
//!
//! 引擎实例生命周期内不可变。由外部配置加载器（`apps/api`）填充，
//! 在启动引擎前调用 [`SimulationConfig::validate`]。

use crate::RobotStatus;
use std::time::Duration;
use thiserror::Error;

/// 配置校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("refresh rate must be greater than 0 Hz")]
    ZeroRefreshRate,

    #[error("invalid {field} range: {lo} > {hi}")]
    InvertedRange {
        field: &'static str,
        lo: i64,
        hi: i64,
    },

    #[error("max power must be positive, got {0}")]
    NonPositiveMaxPower(i64),

    #[error("power range for {status} exceeds max power {max_power}: ({lo}, {hi})")]
    PowerAboveMax {
        status: RobotStatus,
        lo: i64,
        hi: i64,
        max_power: i64,
    },

    #[error("temperature band for {status} is empty: [{lo}, {hi}]")]
    EmptyTemperatureBand {
        status: RobotStatus,
        lo: i64,
        hi: i64,
    },

    #[error("{field} must be a probability in [0, 1], got {value}")]
    InvalidProbability { field: &'static str, value: f64 },

    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidNumber { field: &'static str, value: f64 },

    #[error("log capacity must be at least 1")]
    ZeroLogCapacity,
}

/// 闭区间 `[lo, hi]`（整数）
///
/// 配置文件中写作二元数组，例如 `temperature_range = [20, 50]`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "(i64, i64)", into = "(i64, i64)"))]
pub struct InclusiveRange {
    pub lo: i64,
    pub hi: i64,
}

impl InclusiveRange {
    pub const fn new(lo: i64, hi: i64) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo as f64 && value <= self.hi as f64
    }

    pub fn is_inverted(&self) -> bool {
        self.lo > self.hi
    }
}

impl From<(i64, i64)> for InclusiveRange {
    fn from((lo, hi): (i64, i64)) -> Self {
        Self { lo, hi }
    }
}

impl From<InclusiveRange> for (i64, i64) {
    fn from(range: InclusiveRange) -> Self {
        (range.lo, range.hi)
    }
}

/// 各状态的功耗区间（W）
///
/// Offline 固定为 `[0, 0]`，不可配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PowerRanges {
    pub idle: InclusiveRange,
    pub running: InclusiveRange,
    pub error: InclusiveRange,
}

impl Default for PowerRanges {
    fn default() -> Self {
        Self {
            idle: InclusiveRange::new(7, 10),
            running: InclusiveRange::new(15, 20),
            error: InclusiveRange::new(7, 10),
        }
    }
}

impl PowerRanges {
    pub const OFFLINE: InclusiveRange = InclusiveRange::new(0, 0);

    pub fn for_status(&self, status: RobotStatus) -> InclusiveRange {
        match status {
            RobotStatus::Idle => self.idle,
            RobotStatus::Running => self.running,
            RobotStatus::Offline => Self::OFFLINE,
            RobotStatus::Error => self.error,
        }
    }
}

/// 模拟参数
///
/// # Example
///
/// ```
/// use mockbot_protocol::SimulationConfig;
///
/// let config = SimulationConfig {
///     refresh_rate_hz: 20,
///     ..SimulationConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.tick_interval().as_millis(), 50);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// tick 频率（Hz）
    pub refresh_rate_hz: u32,
    /// 全局温度区间（°C），上界同时是过热判定点
    pub temperature_range: InclusiveRange,
    /// 温度告警阈值（°C），达到即追加 WARN 日志
    pub temperature_threshold: f64,
    /// 每个 tick 进入 Offline 的概率
    pub offline_chance: f64,
    /// Offline 时每个 tick 恢复的概率
    pub recovery_chance: f64,
    /// 风扇 100% 时的最大降温（°C）
    pub max_fan_cooling: f64,
    /// 最大功耗（W），比例风扇模式以此为 100%
    pub max_power: i64,
    /// 各状态功耗区间
    pub power_ranges: PowerRanges,
    /// 日志保留条数上限（`None` 表示不限，直到 reset）
    pub log_capacity: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 10,
            temperature_range: InclusiveRange::new(20, 50),
            temperature_threshold: 45.0,
            offline_chance: 0.01,
            recovery_chance: 0.3,
            max_fan_cooling: 10.0,
            max_power: 20,
            power_ranges: PowerRanges::default(),
            log_capacity: None,
        }
    }
}

impl SimulationConfig {
    /// tick 间隔 = `1 / refresh_rate_hz`
    ///
    /// 频率为 0 时返回 1 秒（`validate` 会拒绝这种配置）。
    pub fn tick_interval(&self) -> Duration {
        if self.refresh_rate_hz == 0 {
            return Duration::from_secs(1);
        }
        Duration::from_secs_f64(1.0 / f64::from(self.refresh_rate_hz))
    }

    /// 某状态在给定功耗下的温度采样区间
    ///
    /// - 下界：`min(t_lo, floor(p_lo / max_power * power + t_lo))`
    /// - 上界：`ceil(t_hi * p_hi / max_power)`
    ///
    /// 上界随状态的功耗上限缩放，所以 Idle/Error 明显低于 Running。
    pub fn temperature_band(&self, status: RobotStatus, power: i64) -> InclusiveRange {
        let power_range = self.power_ranges.for_status(status);
        let max_power = self.max_power as f64;
        let t_lo = self.temperature_range.lo;
        let t_hi = self.temperature_range.hi as f64;

        let scaled_lo = (power_range.lo as f64 / max_power * power as f64 + t_lo as f64).floor();
        let lo = t_lo.min(scaled_lo as i64);
        let hi = (t_hi * power_range.hi as f64 / max_power).ceil() as i64;
        InclusiveRange::new(lo, hi)
    }

    /// 校验参数，保证模拟过程中不会出现空区间或非有限数
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_rate_hz == 0 {
            return Err(ConfigError::ZeroRefreshRate);
        }
        if self.temperature_range.is_inverted() {
            return Err(ConfigError::InvertedRange {
                field: "temperature",
                lo: self.temperature_range.lo,
                hi: self.temperature_range.hi,
            });
        }
        if self.max_power <= 0 {
            return Err(ConfigError::NonPositiveMaxPower(self.max_power));
        }

        for status in [RobotStatus::Idle, RobotStatus::Running, RobotStatus::Error] {
            let range = self.power_ranges.for_status(status);
            if range.is_inverted() {
                return Err(ConfigError::InvertedRange {
                    field: "power",
                    lo: range.lo,
                    hi: range.hi,
                });
            }
            if range.lo < 0 || range.hi > self.max_power {
                return Err(ConfigError::PowerAboveMax {
                    status,
                    lo: range.lo,
                    hi: range.hi,
                    max_power: self.max_power,
                });
            }
            let band = self.temperature_band(status, range.hi);
            if band.is_inverted() {
                return Err(ConfigError::EmptyTemperatureBand {
                    status,
                    lo: band.lo,
                    hi: band.hi,
                });
            }
        }

        for (field, value) in [
            ("offline_chance", self.offline_chance),
            ("recovery_chance", self.recovery_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { field, value });
            }
        }

        if !self.max_fan_cooling.is_finite() || self.max_fan_cooling < 0.0 {
            return Err(ConfigError::InvalidNumber {
                field: "max_fan_cooling",
                value: self.max_fan_cooling,
            });
        }
        if !self.temperature_threshold.is_finite() {
            return Err(ConfigError::InvalidNumber {
                field: "temperature_threshold",
                value: self.temperature_threshold,
            });
        }

        if self.log_capacity == Some(0) {
            return Err(ConfigError::ZeroLogCapacity);
        }

        Ok(())
    }
}
