//! 共享状态存储
//!
//! 同步机制：
//! - 写：`parking_lot::Mutex` 保证同一时刻只有一个变更者（tick 或命令），
//!   所有变更形成全序
//! - 读：`ArcSwap` 发布不可变快照，读者无锁、无等待，
//!   永远不会看到进行中的变更（不会出现 tick N 的状态配 tick N-1 的温度）
//!
//! 快照在持锁期间发布，因此快照的发布顺序与变更顺序一致。

use crate::machine::RobotStateMachine;
use arc_swap::ArcSwap;
use mockbot_protocol::RobotState;
use parking_lot::Mutex;
use std::sync::Arc;

/// 状态存储（唯一持有 `RobotStateMachine`）
pub struct StateStore {
    machine: Mutex<RobotStateMachine>,
    published: ArcSwap<RobotState>,
}

impl StateStore {
    pub fn new(machine: RobotStateMachine) -> Self {
        let published = ArcSwap::from_pointee(machine.state().clone());
        Self {
            machine: Mutex::new(machine),
            published,
        }
    }

    /// 读取最近一次完成的变更后的快照（无锁）
    pub fn read(&self) -> Arc<RobotState> {
        self.published.load_full()
    }

    /// 读取快照的独立副本
    pub fn snapshot(&self) -> RobotState {
        RobotState::clone(&self.published.load())
    }

    /// 在独占访问下执行变更，返回闭包结果
    ///
    /// 闭包返回后立即发布新快照，然后才释放锁。
    pub fn mutate<T>(&self, f: impl FnOnce(&mut RobotStateMachine) -> T) -> T {
        let mut machine = self.machine.lock();
        let result = f(&mut machine);
        self.published.store(Arc::new(machine.state().clone()));
        result
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("published", &self.read())
            .finish_non_exhaustive()
    }
}
