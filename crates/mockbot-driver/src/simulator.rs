//! 遥测模拟器
//!
//! 每个 tick 执行一次的纯计算：输入当前状态机、tick 时钟和随机源，
//! 输出一帧完整的替换遥测（[`TelemetryUpdate`]）。不持有任何共享状态，
//! 同一随机序列下结果完全确定。
//!
//! 计算顺序（随机数消耗顺序也固定，便于脚本化测试）：
//!
//! 1. 状态迁移：1 次 `unit()`
//! 2. 功耗：1 次 `int_inclusive()`（按迁移后的状态取区间）
//! 3. 风扇：比例模式由功耗推导，固定模式保持不变
//! 4. 温度：非离线时 1 次 `int_inclusive()`，再减去风扇降温
//! 5. 运行时间增量

use crate::error::SimulationError;
use crate::machine::RobotStateMachine;
use crate::random::RandomSource;
use mockbot_protocol::{FanMode, FanSpeed, LogSeverity, RobotStatus, SimulationConfig};
use std::time::{Duration, Instant};

/// 离线事件日志
pub const OFFLINE_MESSAGE: &str = "Robot is offline";
/// 过热事件日志
pub const OVERHEAT_MESSAGE: &str = "Robot overheated";
/// 温度临界告警日志
pub const CRITICAL_TEMPERATURE_MESSAGE: &str =
    "Temperature reaching critical level! Increase fan speed to avoid overheating";

/// tick 时钟
///
/// 由调度器在每个 tick 开始时测量，测试中可手工构造。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickClock {
    /// 本 tick 的时间点
    pub now: Instant,
    /// 距上一个 tick 的实际耗时
    pub since_last_tick: Duration,
}

impl TickClock {
    pub fn new(now: Instant, since_last_tick: Duration) -> Self {
        Self {
            now,
            since_last_tick,
        }
    }
}

/// 一个 tick 的模拟结果
///
/// 由 [`RobotStateMachine::apply_tick`] 整体合并。
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryUpdate {
    /// 迁移后的状态
    pub status: RobotStatus,
    /// 本 tick 进入 Offline 时记录的原状态（用于之后恢复）
    pub entered_offline_from: Option<RobotStatus>,
    /// 温度（°C）
    pub temperature: f32,
    /// 功耗（W）
    pub power_consumption: f32,
    /// 风扇转速
    pub fan_speed: FanSpeed,
    /// 运行时间增量
    pub uptime_delta: Duration,
    /// 新增日志（级别 + 消息）
    pub logs: Vec<(LogSeverity, String)>,
}

/// 遥测模拟器
#[derive(Debug, Clone)]
pub struct TelemetrySimulator {
    config: SimulationConfig,
}

impl TelemetrySimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// 计算下一帧遥测
    ///
    /// # 错误
    /// - `SimulationError::EmptyRange`: 功耗或温度采样区间为空
    /// - `SimulationError::NonFinite`: 温度计算结果为 NaN/inf
    ///
    /// 出错时不产生任何部分结果，调用方直接跳过本 tick。
    pub fn step<R: RandomSource + ?Sized>(
        &self,
        machine: &RobotStateMachine,
        clock: TickClock,
        rng: &mut R,
    ) -> Result<TelemetryUpdate, SimulationError> {
        let state = machine.state();
        let config = &self.config;
        let mut logs = Vec::new();

        // 1. 状态迁移
        let mut status = state.status;
        let mut entered_offline_from = None;
        let roll = rng.unit();
        if status.is_offline() {
            if roll > 1.0 - config.recovery_chance {
                status = machine.previous_status();
            }
        } else if roll < config.offline_chance {
            entered_offline_from = Some(status);
            status = RobotStatus::Offline;
            logs.push((LogSeverity::Error, OFFLINE_MESSAGE.to_string()));
        } else if matches!(status, RobotStatus::Idle | RobotStatus::Running)
            && f64::from(state.temperature) >= config.temperature_range.hi as f64
        {
            status = RobotStatus::Error;
            logs.push((LogSeverity::Error, OVERHEAT_MESSAGE.to_string()));
        }

        // 2. 功耗
        let power_range = config.power_ranges.for_status(status);
        if power_range.is_inverted() {
            return Err(SimulationError::EmptyRange {
                quantity: "power",
                status,
                lo: power_range.lo,
                hi: power_range.hi,
            });
        }
        let power = rng.int_inclusive(power_range.lo, power_range.hi);

        // 3. 风扇（降温计算使用未截断的百分比）
        let fan_percent = match machine.fan_mode() {
            FanMode::Proportional => {
                (power as f64 / config.max_power as f64 * 100.0).clamp(0.0, 100.0)
            },
            FanMode::Static => f64::from(state.fan_speed.get()),
        };
        let fan_speed = match machine.fan_mode() {
            FanMode::Proportional => FanSpeed::saturating_from_percent(fan_percent),
            FanMode::Static => state.fan_speed,
        };

        // 4. 温度
        let temperature = if status.is_offline() {
            0.0
        } else {
            let band = config.temperature_band(status, power);
            if band.is_inverted() {
                return Err(SimulationError::EmptyRange {
                    quantity: "temperature",
                    status,
                    lo: band.lo,
                    hi: band.hi,
                });
            }
            let sampled = rng.int_inclusive(band.lo, band.hi) as f64;
            let temperature = sampled - config.max_fan_cooling * fan_percent / 100.0;
            if !temperature.is_finite() {
                return Err(SimulationError::NonFinite {
                    quantity: "temperature",
                    status,
                    value: temperature,
                });
            }
            if temperature >= config.temperature_threshold {
                logs.push((LogSeverity::Warn, CRITICAL_TEMPERATURE_MESSAGE.to_string()));
            }
            temperature
        };

        // 5. 运行时间：按 tick 开始时的状态判断是否冻结；
        //    运行时间为 0（启动或 reset 后的第一个 tick）时以重置时间点为基准
        let uptime_delta = if state.status.is_offline() {
            Duration::ZERO
        } else if state.uptime.is_zero() {
            clock.now.saturating_duration_since(machine.uptime_anchor())
        } else {
            clock.since_last_tick
        };

        Ok(TelemetryUpdate {
            status,
            entered_offline_from,
            temperature: temperature as f32,
            power_consumption: power as f32,
            fan_speed,
            uptime_delta,
            logs,
        })
    }
}
