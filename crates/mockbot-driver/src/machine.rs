//! 机器人状态机
//!
//! 持有唯一的 `RobotState` 记录以及不对外暴露的字段（风扇模式、
//! 离线前状态、运行时间基准点），并编码每个操作员命令的合法性。
//!
//! ```text
//! Idle --switch--> Running --switch--> Idle
//! Idle  --reset--> Idle
//! Error --reset--> Idle
//! (非离线) --tick 随机--> Offline --tick 随机--> previous_status
//! (Idle|Running) --tick 温度达到上界--> Error
//! ```
//!
//! 状态机本身不做同步，所有调用都经过 [`StateStore::mutate`](crate::StateStore::mutate)。

use crate::simulator::TelemetryUpdate;
use mockbot_protocol::{FanCommand, FanMode, LogSeverity, RobotState, RobotStatus};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// 固定风扇转速的风险提示
pub const STATIC_FAN_WARNING: &str =
    "Static fan speed has been set, the robot may overheat if set too low";

/// 机器人状态机
#[derive(Debug, Clone)]
pub struct RobotStateMachine {
    state: RobotState,
    fan_mode: FanMode,
    /// 最近一次进入 Offline 之前的状态
    previous_status: RobotStatus,
    /// 运行时间基准点（启动或 reset 时刻）
    uptime_anchor: Instant,
    /// 日志保留上限，`None` 表示不限
    log_capacity: Option<usize>,
}

impl RobotStateMachine {
    /// 创建初始状态机：Idle、遥测归零、比例风扇
    pub fn new(log_capacity: Option<usize>) -> Self {
        Self {
            state: RobotState::initial(),
            fan_mode: FanMode::Proportional,
            previous_status: RobotStatus::Idle,
            uptime_anchor: Instant::now(),
            log_capacity,
        }
    }

    pub fn state(&self) -> &RobotState {
        &self.state
    }

    pub fn status(&self) -> RobotStatus {
        self.state.status
    }

    pub fn fan_mode(&self) -> FanMode {
        self.fan_mode
    }

    pub fn previous_status(&self) -> RobotStatus {
        self.previous_status
    }

    pub fn uptime_anchor(&self) -> Instant {
        self.uptime_anchor
    }

    /// Idle ↔ Running
    ///
    /// 其他状态返回 `false`，只追加一条 WARN 日志。
    pub fn switch(&mut self) -> bool {
        let status = self.state.status;
        if !status.can_switch() {
            self.push_log(
                LogSeverity::Warn,
                format!("Unable to switch with current state: '{status}'"),
            );
            return false;
        }

        self.state.status = match status {
            RobotStatus::Idle => RobotStatus::Running,
            _ => RobotStatus::Idle,
        };
        true
    }

    /// 复位（仅 Idle / Error 允许）
    pub fn reset(&mut self) -> bool {
        self.reset_at(Instant::now())
    }

    /// 以指定时刻作为新的运行时间基准点复位
    ///
    /// 成功时：状态回到 Idle，运行时间清零，日志清空；温度/功耗/风扇保持连续。
    pub fn reset_at(&mut self, now: Instant) -> bool {
        let status = self.state.status;
        if !status.can_reset() {
            self.push_log(
                LogSeverity::Warn,
                format!("Unable to reset with current state: '{status}'"),
            );
            return false;
        }

        self.state.status = RobotStatus::Idle;
        self.state.uptime = Duration::ZERO;
        self.state.logs.clear();
        self.uptime_anchor = now;
        true
    }

    /// 切换风扇模式
    ///
    /// `Static` 立即生效并追加风险提示；`Proportional` 在下一个 tick 重新计算转速。
    pub fn set_fan_mode(&mut self, command: FanCommand) {
        self.fan_mode = command.mode();
        if let FanCommand::Static(speed) = command {
            self.state.fan_speed = speed;
            self.push_log(LogSeverity::Warn, STATIC_FAN_WARNING);
        }
    }

    /// 合并一帧模拟结果
    ///
    /// `previous_status` 只在从非离线状态进入 Offline 时更新，离线期间的 tick 不会覆盖它。
    pub fn apply_tick(&mut self, update: TelemetryUpdate) {
        if let Some(previous) = update.entered_offline_from
            && !previous.is_offline()
            && !self.state.status.is_offline()
        {
            self.previous_status = previous;
        }

        self.state.status = update.status;
        self.state.temperature = update.temperature;
        self.state.power_consumption = update.power_consumption;
        self.state.fan_speed = update.fan_speed;
        self.state.uptime = self.state.uptime.saturating_add(update.uptime_delta);

        for (severity, message) in update.logs {
            self.push_log(severity, message);
        }
    }

    fn push_log(&mut self, severity: LogSeverity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            LogSeverity::Warn => warn!("{}", message),
            LogSeverity::Error => error!("{}", message),
        }
        self.state.logs.push(severity.entry(&message));

        if let Some(capacity) = self.log_capacity
            && self.state.logs.len() > capacity
        {
            let excess = self.state.logs.len() - capacity;
            self.state.logs.drain(..excess);
            info!("Log capacity {} reached, dropped {} oldest entries", capacity, excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockbot_protocol::FanSpeed;

    fn tick_into(machine: &mut RobotStateMachine, status: RobotStatus) {
        machine.apply_tick(TelemetryUpdate {
            status,
            entered_offline_from: status.is_offline().then_some(machine.status()),
            temperature: if status.is_offline() { 0.0 } else { 30.0 },
            power_consumption: 0.0,
            fan_speed: machine.state().fan_speed,
            uptime_delta: Duration::from_secs(3),
            logs: Vec::new(),
        });
    }

    #[test]
    fn test_switch_toggles_idle_running() {
        let mut machine = RobotStateMachine::new(None);
        assert!(machine.switch());
        assert_eq!(machine.status(), RobotStatus::Running);
        assert!(machine.switch());
        assert_eq!(machine.status(), RobotStatus::Idle);
        assert!(machine.state().logs.is_empty());
    }

    #[test]
    fn test_switch_rejected_from_offline_and_error() {
        for status in [RobotStatus::Offline, RobotStatus::Error] {
            let mut machine = RobotStateMachine::new(None);
            tick_into(&mut machine, status);
            let before = machine.state().clone();

            assert!(!machine.switch());
            assert_eq!(machine.status(), status);
            assert_eq!(machine.state().temperature, before.temperature);
            assert_eq!(machine.state().uptime, before.uptime);
            assert_eq!(
                machine.state().logs.last().unwrap(),
                &format!("WARN: Unable to switch with current state: '{status}'")
            );
        }
    }

    #[test]
    fn test_reset_from_idle_and_error() {
        for status in [RobotStatus::Idle, RobotStatus::Error] {
            let mut machine = RobotStateMachine::new(None);
            tick_into(&mut machine, status);
            machine.set_fan_mode(FanCommand::Static(FanSpeed::try_from(40i64).unwrap()));
            assert!(!machine.state().logs.is_empty());

            let now = Instant::now();
            assert!(machine.reset_at(now));
            assert_eq!(machine.status(), RobotStatus::Idle);
            assert_eq!(machine.state().uptime, Duration::ZERO);
            assert!(machine.state().logs.is_empty());
            assert_eq!(machine.uptime_anchor(), now);
            // 遥测保持连续
            assert_eq!(machine.state().temperature, 30.0);
            assert_eq!(machine.state().fan_speed.get(), 40);
        }
    }

    #[test]
    fn test_reset_rejected_from_running_and_offline() {
        for status in [RobotStatus::Running, RobotStatus::Offline] {
            let mut machine = RobotStateMachine::new(None);
            tick_into(&mut machine, status);
            let anchor = machine.uptime_anchor();

            assert!(!machine.reset());
            assert_eq!(machine.status(), status);
            assert_eq!(machine.state().uptime, Duration::from_secs(3));
            assert_eq!(machine.uptime_anchor(), anchor);
            assert_eq!(
                machine.state().logs,
                vec![format!("WARN: Unable to reset with current state: '{status}'")]
            );
        }
    }

    #[test]
    fn test_static_fan_applies_immediately_and_warns() {
        let mut machine = RobotStateMachine::new(None);
        machine.set_fan_mode(FanCommand::Static(FanSpeed::try_from(50i64).unwrap()));

        assert_eq!(machine.fan_mode(), FanMode::Static);
        assert_eq!(machine.state().fan_speed.get(), 50);
        assert_eq!(
            machine.state().logs,
            vec![format!("WARN: {STATIC_FAN_WARNING}")]
        );

        machine.set_fan_mode(FanCommand::Proportional);
        assert_eq!(machine.fan_mode(), FanMode::Proportional);
        assert_eq!(machine.state().fan_speed.get(), 50);
        assert_eq!(machine.state().logs.len(), 1);
    }

    #[test]
    fn test_apply_tick_tracks_previous_status() {
        let mut machine = RobotStateMachine::new(None);
        assert!(machine.switch());
        tick_into(&mut machine, RobotStatus::Offline);
        assert_eq!(machine.status(), RobotStatus::Offline);
        assert_eq!(machine.previous_status(), RobotStatus::Running);

        // 离线期间的 tick 不覆盖 previous_status
        tick_into(&mut machine, RobotStatus::Offline);
        assert_eq!(machine.previous_status(), RobotStatus::Running);
    }

    #[test]
    fn test_apply_tick_accumulates_uptime_and_logs() {
        let mut machine = RobotStateMachine::new(None);
        machine.apply_tick(TelemetryUpdate {
            status: RobotStatus::Idle,
            entered_offline_from: None,
            temperature: 21.5,
            power_consumption: 8.0,
            fan_speed: FanSpeed::try_from(40i64).unwrap(),
            uptime_delta: Duration::from_millis(100),
            logs: vec![(LogSeverity::Warn, "hot".to_string())],
        });
        tick_into(&mut machine, RobotStatus::Idle);

        assert_eq!(machine.state().uptime, Duration::from_millis(3100));
        assert_eq!(machine.state().logs, vec!["WARN: hot".to_string()]);
    }

    #[test]
    fn test_log_capacity_drops_oldest() {
        let mut machine = RobotStateMachine::new(Some(2));
        tick_into(&mut machine, RobotStatus::Error);
        for _ in 0..3 {
            assert!(!machine.switch());
        }
        assert!(machine.reset());
        assert!(machine.state().logs.is_empty());

        machine.set_fan_mode(FanCommand::Static(FanSpeed::MAX));
        tick_into(&mut machine, RobotStatus::Offline);
        assert!(!machine.switch());
        assert!(!machine.reset());

        assert_eq!(
            machine.state().logs,
            vec![
                "WARN: Unable to switch with current state: 'offline'".to_string(),
                "WARN: Unable to reset with current state: 'offline'".to_string(),
            ]
        );
    }
}
