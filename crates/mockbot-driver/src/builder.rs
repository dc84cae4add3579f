//! Builder 模式实现
//!
//! 提供链式构造 `RobotEngine` 的便捷方式。

use crate::engine::RobotEngine;
use crate::error::DriverError;
use crate::machine::RobotStateMachine;
use crate::metrics::EngineMetrics;
use crate::scheduler::{DEFAULT_JOIN_TIMEOUT, UpdateScheduler};
use crate::simulator::TelemetrySimulator;
use crate::store::StateStore;
use mockbot_protocol::SimulationConfig;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// RobotEngine Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use mockbot_driver::EngineBuilder;
/// use mockbot_protocol::SimulationConfig;
///
/// let engine = EngineBuilder::new()
///     .config(SimulationConfig { refresh_rate_hz: 20, ..SimulationConfig::default() })
///     .seed(42)
///     .build()
///     .unwrap();
///
/// println!("status: {}", engine.state().status);
/// engine.shutdown().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    config: SimulationConfig,
    /// 随机种子（不设置则使用系统熵）
    seed: Option<u64>,
    /// 是否启动后台调度线程
    spawn_scheduler: bool,
    join_timeout: Duration,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
            seed: None,
            spawn_scheduler: true,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }

    /// 设置模拟参数（`build` 时校验）
    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// 固定随机种子，使遥测序列可复现
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 不启动后台线程（只提供状态存储和命令，遥测保持初始值）
    pub fn without_scheduler(mut self) -> Self {
        self.spawn_scheduler = false;
        self
    }

    /// 关闭时等待后台线程退出的最长时间（默认 2s）
    pub fn join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// 校验配置并启动引擎
    ///
    /// # 错误
    /// - `DriverError::Config`: 配置无效
    /// - `DriverError::Spawn`: 后台线程创建失败
    pub fn build(self) -> Result<RobotEngine, DriverError> {
        self.config.validate()?;

        let machine = RobotStateMachine::new(self.config.log_capacity);
        let store = Arc::new(StateStore::new(machine));
        let metrics = Arc::new(EngineMetrics::new());

        let scheduler = if self.spawn_scheduler {
            let rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let scheduler = UpdateScheduler::new(
                store.clone(),
                TelemetrySimulator::new(self.config.clone()),
                rng,
                metrics.clone(),
            );
            Some(scheduler.spawn()?)
        } else {
            None
        };

        info!(
            "Robot engine started: {} Hz, scheduler {}",
            self.config.refresh_rate_hz,
            if scheduler.is_some() { "running" } else { "disabled" }
        );

        Ok(RobotEngine::new(
            store,
            metrics,
            self.config,
            scheduler,
            self.join_timeout,
        ))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
