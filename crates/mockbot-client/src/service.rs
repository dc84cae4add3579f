//! RobotService - 命令门面
//!
//! 传输层唯一应该调用的接口。每个命令都在状态存储的一次 `mutate` 内完成，
//! 参数校验在获取锁之前进行，所以非法参数不会造成任何状态变化。
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use mockbot_client::RobotService;
//! use mockbot_driver::EngineBuilder;
//!
//! let engine = EngineBuilder::new().build().unwrap();
//! let service = RobotService::from_engine(&engine);
//!
//! service.switch().unwrap();
//! service.set_fan_mode("static", Some(60)).unwrap();
//! println!("fan: {}", service.get_state().fan_speed);
//!
//! engine.shutdown().unwrap();
//! ```

use crate::error::{
    FAN_SPEED_OUT_OF_RANGE, FAN_SPEED_REQUIRED, RESET_REJECTED, SWITCH_REJECTED, ServiceError,
};
use mockbot_driver::{EngineMetrics, MetricsSnapshot, RobotEngine, StateStore};
use mockbot_protocol::{FanCommand, FanMode, FanSpeed, RobotState};
use std::sync::Arc;
use tracing::{error, info};

/// 命令门面（可克隆，克隆共享同一个状态存储）
#[derive(Debug, Clone)]
pub struct RobotService {
    store: Arc<StateStore>,
    metrics: Arc<EngineMetrics>,
}

impl RobotService {
    pub fn new(store: Arc<StateStore>, metrics: Arc<EngineMetrics>) -> Self {
        Self { store, metrics }
    }

    /// 绑定到引擎的状态存储和指标
    pub fn from_engine(engine: &RobotEngine) -> Self {
        Self::new(engine.store(), engine.metrics())
    }

    /// 当前状态快照
    pub fn get_state(&self) -> Arc<RobotState> {
        info!("Obtaining robot state");
        self.store.read()
    }

    /// 引擎指标快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// 开关机（Idle ↔ Running）
    ///
    /// # 错误
    /// - `ServiceError::InvalidTransition`: 当前状态为 Offline 或 Error
    pub fn switch(&self) -> Result<(), ServiceError> {
        info!("Switching robot mode");
        let switched = self.store.mutate(|machine| machine.switch());
        self.metrics.record_command(switched);
        if switched {
            Ok(())
        } else {
            Err(ServiceError::transition(SWITCH_REJECTED))
        }
    }

    /// 复位（Idle / Error → Idle，清空运行时间和日志）
    ///
    /// # 错误
    /// - `ServiceError::InvalidTransition`: 当前状态为 Running 或 Offline
    pub fn reset(&self) -> Result<(), ServiceError> {
        info!("Resetting robot");
        let reset = self.store.mutate(|machine| machine.reset());
        self.metrics.record_command(reset);
        if reset {
            Ok(())
        } else {
            Err(ServiceError::transition(RESET_REJECTED))
        }
    }

    /// 设置风扇模式
    ///
    /// `mode` 必须是 `"proportional"` 或 `"static"`；`static` 需要 `0..=100` 的 `value`。
    /// 比例模式忽略 `value`。
    ///
    /// # 错误
    /// - `ServiceError::InvalidArgument`: 模式未知、缺少转速或转速越界
    pub fn set_fan_mode(&self, mode: &str, value: Option<i64>) -> Result<(), ServiceError> {
        info!("Setting fan configuration");
        let command = match Self::parse_fan_command(mode, value) {
            Ok(command) => command,
            Err(e) => {
                error!("{}", e);
                self.metrics.record_command(false);
                return Err(e);
            },
        };

        self.store.mutate(|machine| machine.set_fan_mode(command));
        self.metrics.record_command(true);
        match command {
            FanCommand::Proportional => info!("Fan operation is set to auto"),
            FanCommand::Static(speed) => {
                info!("Fan operation is set to static speed at {}", speed)
            },
        }
        Ok(())
    }

    fn parse_fan_command(mode: &str, value: Option<i64>) -> Result<FanCommand, ServiceError> {
        let mode: FanMode = mode.parse().map_err(|_| {
            ServiceError::argument(format!("Incorrect fan operation mode: '{mode}'"))
        })?;

        match mode {
            FanMode::Proportional => Ok(FanCommand::Proportional),
            FanMode::Static => {
                let value = value.ok_or_else(|| ServiceError::argument(FAN_SPEED_REQUIRED))?;
                let speed = FanSpeed::try_from(value)
                    .map_err(|_| ServiceError::argument(FAN_SPEED_OUT_OF_RANGE))?;
                Ok(FanCommand::Static(speed))
            },
        }
    }
}
