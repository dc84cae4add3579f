//! 后台更新调度器
//!
//! 独立线程按 `refresh_rate_hz` 周期执行 tick：
//!
//! ```text
//! loop {
//!     stop_rx.recv_timeout(距下一个 tick 的剩余时间)
//!         ├─ 收到停止信号 / 通道断开 → 退出（不再变更状态）
//!         └─ 超时 → tick：simulator.step → machine.apply_tick（整体在 mutate 内）
//! }
//! ```
//!
//! 停止通道同时充当 tick 之间的休眠，所以取消在下一个挂起点立即生效，
//! 不会留下只执行了一半的 tick。

use crate::error::{DriverError, SimulationError};
use crate::metrics::EngineMetrics;
use crate::random::RandomSource;
use crate::simulator::{TelemetrySimulator, TickClock};
use crate::store::StateStore;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{error, info, trace, warn};

/// 默认线程退出等待时间
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// 带超时的线程 join
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> Result<(), DriverError>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> Result<(), DriverError> {
        let (tx, rx) = crossbeam_channel::bounded(1);

        // 看门狗线程负责真正的 join，主线程只等待有限时间
        thread::spawn(move || {
            let _ = tx.send(self.join().is_ok());
        });

        match rx.recv_timeout(timeout) {
            Ok(true) => Ok(()),
            Ok(false) | Err(RecvTimeoutError::Disconnected) => Err(DriverError::ThreadPanicked),
            Err(RecvTimeoutError::Timeout) => Err(DriverError::JoinTimeout(timeout)),
        }
    }
}

/// 后台更新调度器（尚未启动）
///
/// 可以直接调用 [`tick`](Self::tick) 手动推进（测试），
/// 或调用 [`spawn`](Self::spawn) 启动后台线程。
pub struct UpdateScheduler<R> {
    store: Arc<StateStore>,
    simulator: TelemetrySimulator,
    rng: R,
    metrics: Arc<EngineMetrics>,
    interval: Duration,
}

impl<R: RandomSource + Send + 'static> UpdateScheduler<R> {
    pub fn new(
        store: Arc<StateStore>,
        simulator: TelemetrySimulator,
        rng: R,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        let interval = simulator.config().tick_interval();
        Self {
            store,
            simulator,
            rng,
            metrics,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 执行一个 tick
    ///
    /// 模拟与合并在同一个 `mutate` 内完成；模拟失败时状态保持不变。
    pub fn tick(&mut self, clock: TickClock) -> Result<(), SimulationError> {
        let simulator = &self.simulator;
        let rng = &mut self.rng;
        let result = self.store.mutate(|machine| -> Result<(), SimulationError> {
            let update = simulator.step(machine, clock, rng)?;
            trace!(
                "Tick: status={} temperature={:.1} power={} fan={}",
                update.status, update.temperature, update.power_consumption, update.fan_speed
            );
            machine.apply_tick(update);
            Ok(())
        });

        match &result {
            Ok(()) => self.metrics.ticks_total.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.metrics.ticks_skipped.fetch_add(1, Ordering::Relaxed),
        };
        result
    }

    /// 启动后台线程
    ///
    /// # 错误
    /// - `DriverError::Spawn`: 操作系统拒绝创建线程
    pub fn spawn(self) -> Result<SchedulerHandle, DriverError> {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let is_running = Arc::new(AtomicBool::new(true));
        let is_running_clone = is_running.clone();

        let thread = thread::Builder::new()
            .name("mockbot-updater".to_string())
            .spawn(move || {
                self.run(stop_rx);
                is_running_clone.store(false, Ordering::Release);
            })
            .map_err(DriverError::Spawn)?;

        Ok(SchedulerHandle {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
            is_running,
        })
    }

    fn run(mut self, stop_rx: Receiver<()>) {
        info!("Updater thread started, tick interval {:?}", self.interval);

        let mut last_tick = Instant::now();
        // 启动后立即执行第一个 tick
        let mut next_deadline = last_tick;

        loop {
            let wait = next_deadline.saturating_duration_since(Instant::now());
            match stop_rx.recv_timeout(wait) {
                Ok(()) => {
                    trace!("Updater thread: stop signal received");
                    break;
                },
                Err(RecvTimeoutError::Disconnected) => {
                    trace!("Updater thread: stop channel disconnected");
                    break;
                },
                Err(RecvTimeoutError::Timeout) => {},
            }

            let now = Instant::now();
            let clock = TickClock::new(now, now.saturating_duration_since(last_tick));
            last_tick = now;

            if let Err(e) = self.tick(clock) {
                error!("Tick skipped: {}", e);
            }

            next_deadline += self.interval;
            let finished = Instant::now();
            if next_deadline < finished {
                self.metrics.tick_overruns.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Tick overran its interval by {:?}, re-anchoring schedule",
                    finished - next_deadline
                );
                next_deadline = finished;
            }
        }

        info!("Updater thread stopped");
    }
}

/// 后台线程句柄
///
/// 显式调用 [`stop`](Self::stop) 关闭；Drop 时也会发送停止信号并等待线程退出。
pub struct SchedulerHandle {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
    is_running: Arc<AtomicBool>,
}

impl SchedulerHandle {
    /// 后台线程是否仍在运行
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }

    /// 停止后台线程并等待其退出
    ///
    /// # 错误
    /// - `DriverError::JoinTimeout`: 线程未在 `timeout` 内退出
    /// - `DriverError::ThreadPanicked`: 线程 panic
    pub fn stop(mut self, timeout: Duration) -> Result<(), DriverError> {
        self.shutdown(timeout)
    }

    fn shutdown(&mut self, timeout: Duration) -> Result<(), DriverError> {
        if let Some(stop_tx) = self.stop_tx.take() {
            // 通道已满或已断开都说明线程已在退出
            let _ = stop_tx.try_send(());
        }
        match self.thread.take() {
            Some(thread) => thread.join_timeout(timeout),
            None => Ok(()),
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown(DEFAULT_JOIN_TIMEOUT) {
            error!("Failed to stop updater thread: {}", e);
        }
    }
}
