//! 引擎（对外 API）
//!
//! `RobotEngine` 持有共享状态存储、后台调度线程和运行指标。
//! 生命周期显式：[`EngineBuilder::build`](crate::EngineBuilder::build) 启动，
//! [`RobotEngine::shutdown`] 关闭；忘记关闭时 Drop 兜底。

use crate::error::DriverError;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::scheduler::SchedulerHandle;
use crate::store::StateStore;
use mockbot_protocol::{RobotState, SimulationConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 模拟机器人引擎
pub struct RobotEngine {
    store: Arc<StateStore>,
    metrics: Arc<EngineMetrics>,
    config: SimulationConfig,
    scheduler: Option<SchedulerHandle>,
    join_timeout: Duration,
}

impl RobotEngine {
    pub(crate) fn new(
        store: Arc<StateStore>,
        metrics: Arc<EngineMetrics>,
        config: SimulationConfig,
        scheduler: Option<SchedulerHandle>,
        join_timeout: Duration,
    ) -> Self {
        Self {
            store,
            metrics,
            config,
            scheduler,
            join_timeout,
        }
    }

    /// 使用给定配置和系统熵启动引擎
    pub fn start(config: SimulationConfig) -> Result<Self, DriverError> {
        crate::EngineBuilder::new().config(config).build()
    }

    /// 共享状态存储（注入到命令门面）
    pub fn store(&self) -> Arc<StateStore> {
        self.store.clone()
    }

    pub fn metrics(&self) -> Arc<EngineMetrics> {
        self.metrics.clone()
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// 当前快照
    pub fn state(&self) -> Arc<RobotState> {
        self.store.read()
    }

    /// 后台调度线程是否在运行（手动模式下恒为 false）
    pub fn is_running(&self) -> bool {
        self.scheduler.as_ref().is_some_and(SchedulerHandle::is_running)
    }

    /// 停止后台线程并等待退出
    pub fn shutdown(mut self) -> Result<(), DriverError> {
        self.stop_scheduler()
    }

    fn stop_scheduler(&mut self) -> Result<(), DriverError> {
        match self.scheduler.take() {
            Some(scheduler) => {
                scheduler.stop(self.join_timeout)?;
                info!("Robot engine stopped");
                Ok(())
            },
            None => Ok(()),
        }
    }
}

impl Drop for RobotEngine {
    fn drop(&mut self) {
        // SchedulerHandle 自身的 Drop 负责发送停止信号与 join
        self.scheduler.take();
    }
}

impl std::fmt::Debug for RobotEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotEngine")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}
