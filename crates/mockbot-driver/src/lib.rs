//! 驱动层模块
//!
//! 本模块提供模拟机器人的状态引擎，包括：
//! - 遥测模拟（纯函数 + 可注入随机源）
//! - 状态机（命令合法性、tick 合并）
//! - 状态同步（Mutex 串行化变更，ArcSwap 无锁读取快照）
//! - 后台调度线程（固定频率 tick，可取消）
//!
//! # 使用场景
//!
//! 传输层（HTTP 等）应通过 `mockbot-client` 的 `RobotService` 调用，
//! 这里的类型主要供门面层和测试使用。

mod builder;
mod engine;
mod error;
pub mod machine;
pub mod metrics;
pub mod random;
pub mod scheduler;
pub mod simulator;
pub mod store;

pub use builder::EngineBuilder;
pub use engine::RobotEngine;
pub use error::{DriverError, SimulationError};
pub use machine::{RobotStateMachine, STATIC_FAN_WARNING};
pub use metrics::{EngineMetrics, MetricsSnapshot};
#[cfg(any(test, feature = "mock"))]
pub use random::ScriptedRandom;
pub use random::RandomSource;
pub use scheduler::{SchedulerHandle, UpdateScheduler};
pub use simulator::{
    CRITICAL_TEMPERATURE_MESSAGE, OFFLINE_MESSAGE, OVERHEAT_MESSAGE, TelemetrySimulator,
    TelemetryUpdate, TickClock,
};
pub use store::StateStore;
