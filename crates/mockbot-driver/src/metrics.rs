//! 引擎运行指标
//!
//! 原子计数器，可以在任何线程读取，不参与状态锁。

use std::sync::atomic::{AtomicU64, Ordering};

/// 引擎实时指标
///
/// # 使用示例
///
/// ```rust
/// use mockbot_driver::EngineMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = EngineMetrics::new();
/// metrics.ticks_total.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.ticks_total, 1);
/// ```
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// 成功合并的 tick 数
    pub ticks_total: AtomicU64,

    /// 因模拟错误被跳过的 tick 数
    pub ticks_skipped: AtomicU64,

    /// tick 结束时已错过下一个截止时间的次数
    ///
    /// 持续增长说明 refresh rate 过高或状态锁竞争严重。
    pub tick_overruns: AtomicU64,

    /// 成功执行的命令数（switch / reset / fan）
    pub commands_accepted: AtomicU64,

    /// 被拒绝的命令数（非法迁移或非法参数）
    pub commands_rejected: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_command(&self, accepted: bool) {
        if accepted {
            self.commands_accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.commands_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks_total: self.ticks_total.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            tick_overruns: self.tick_overruns.load(Ordering::Relaxed),
            commands_accepted: self.commands_accepted.load(Ordering::Relaxed),
            commands_rejected: self.commands_rejected.load(Ordering::Relaxed),
        }
    }
}

/// 指标快照（不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub ticks_total: u64,
    pub ticks_skipped: u64,
    pub tick_overruns: u64,
    pub commands_accepted: u64,
    pub commands_rejected: u64,
}

impl MetricsSnapshot {
    /// 被跳过的 tick 占比（百分比）
    ///
    /// 没有任何 tick 时返回 0.0。
    pub fn skip_rate(&self) -> f64 {
        let attempted = self.ticks_total + self.ticks_skipped;
        if attempted == 0 {
            return 0.0;
        }
        (self.ticks_skipped as f64 / attempted as f64) * 100.0
    }
}
