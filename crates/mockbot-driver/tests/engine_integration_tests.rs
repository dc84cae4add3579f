//! 引擎集成测试
//!
//! 通过公开 API 驱动状态存储、调度器和引擎生命周期。

use mockbot_driver::{
    EngineBuilder, EngineMetrics, OFFLINE_MESSAGE, RandomSource, RobotEngine, RobotStateMachine,
    StateStore, TelemetrySimulator, TickClock, UpdateScheduler,
};
use mockbot_protocol::{FanCommand, FanSpeed, RobotStatus, SimulationConfig};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// 固定序列随机源：`unit` 按队列返回（耗尽后 0.5），`int_inclusive` 总是取下界
struct FixedRandom {
    units: VecDeque<f64>,
}

impl FixedRandom {
    fn new(units: impl IntoIterator<Item = f64>) -> Self {
        Self {
            units: units.into_iter().collect(),
        }
    }
}

impl RandomSource for FixedRandom {
    fn unit(&mut self) -> f64 {
        self.units.pop_front().unwrap_or(0.5)
    }

    fn int_inclusive(&mut self, lo: i64, _hi: i64) -> i64 {
        lo
    }
}

fn manual_scheduler(
    units: impl IntoIterator<Item = f64>,
) -> (UpdateScheduler<FixedRandom>, Arc<StateStore>) {
    let store = Arc::new(StateStore::new(RobotStateMachine::new(None)));
    let scheduler = UpdateScheduler::new(
        store.clone(),
        TelemetrySimulator::new(SimulationConfig::default()),
        FixedRandom::new(units),
        Arc::new(EngineMetrics::new()),
    );
    (scheduler, store)
}

fn tick(scheduler: &mut UpdateScheduler<FixedRandom>) {
    scheduler
        .tick(TickClock::new(Instant::now(), Duration::from_millis(100)))
        .unwrap();
}

#[test]
fn test_offline_round_trip_restores_previous_status() {
    // 0.0 → 离线；0.5 → 保持离线；0.9 → 恢复
    let (mut scheduler, store) = manual_scheduler([0.5, 0.0, 0.5, 0.9]);
    store.mutate(|m| m.switch());

    tick(&mut scheduler);
    assert_eq!(store.read().status, RobotStatus::Running);
    let uptime_before = store.read().uptime;

    tick(&mut scheduler);
    let offline = store.read();
    assert_eq!(offline.status, RobotStatus::Offline);
    assert_eq!(offline.temperature, 0.0);
    assert_eq!(offline.power_consumption, 0.0);
    assert_eq!(offline.fan_speed, FanSpeed::MIN);
    assert_eq!(offline.logs.last().unwrap(), &format!("ERROR: {OFFLINE_MESSAGE}"));

    // 离线期间命令被拒绝且运行时间冻结
    assert!(!store.mutate(|m| m.switch()));
    assert!(!store.mutate(|m| m.reset()));
    tick(&mut scheduler);
    assert_eq!(store.read().status, RobotStatus::Offline);

    tick(&mut scheduler);
    let recovered = store.read();
    assert_eq!(recovered.status, RobotStatus::Running);
    // 进入离线那一帧仍按 Running 计时，之后两帧冻结
    assert_eq!(recovered.uptime, uptime_before + Duration::from_millis(100));
    assert!(recovered.temperature > 0.0);
}

#[test]
fn test_static_fan_survives_ticks() {
    let (mut scheduler, store) = manual_scheduler([]);
    store.mutate(|m| m.set_fan_mode(FanCommand::Static(FanSpeed::try_from(70_i64).unwrap())));

    for _ in 0..5 {
        tick(&mut scheduler);
        assert_eq!(store.read().fan_speed.get(), 70);
    }

    store.mutate(|m| m.set_fan_mode(FanCommand::Proportional));
    tick(&mut scheduler);
    // Idle 功耗下界 7W / 20W = 35%
    assert_eq!(store.read().fan_speed.get(), 35);
}

/// 读者永远只能看到完整发布的快照：
/// 离线帧的温度、功耗、风扇必须同时为 0
#[test]
fn test_readers_never_observe_torn_snapshots() {
    let config = SimulationConfig {
        refresh_rate_hz: 1000,
        offline_chance: 0.3,
        recovery_chance: 0.5,
        ..SimulationConfig::default()
    };
    let started = Instant::now();
    let engine = EngineBuilder::new().config(config).seed(7).build().unwrap();
    let store = engine.store();

    let commander = {
        let store = store.clone();
        thread::spawn(move || {
            for i in 0..500 {
                store.mutate(|m| {
                    if i % 3 == 0 {
                        m.reset();
                    } else {
                        m.switch();
                    }
                });
                thread::yield_now();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..2000 {
                    let state = store.read();
                    if state.status == RobotStatus::Offline {
                        assert_eq!(state.temperature, 0.0);
                        assert_eq!(state.power_consumption, 0.0);
                        assert_eq!(state.fan_speed, FanSpeed::MIN);
                    }
                    assert!(state.fan_speed <= FanSpeed::MAX);
                    assert!(state.uptime <= started.elapsed());
                    thread::yield_now();
                }
            })
        })
        .collect();

    commander.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    engine.shutdown().unwrap();
}

/// tick 与命令交错执行时不丢更新：
/// 结果等价于把所有 tick 和所有 switch 按某个顺序串行执行
#[test]
fn test_ticks_and_commands_interleave_without_lost_updates() {
    const TICKS: u32 = 400;
    const SWITCH_THREADS: usize = 4;
    const SWITCHES_PER_THREAD: usize = 251;
    const DELTA: Duration = Duration::from_millis(100);

    let config = SimulationConfig {
        offline_chance: 0.0,
        ..SimulationConfig::default()
    };
    let store = Arc::new(StateStore::new(RobotStateMachine::new(None)));
    let metrics = Arc::new(EngineMetrics::new());
    let mut scheduler = UpdateScheduler::new(
        store.clone(),
        TelemetrySimulator::new(config),
        FixedRandom::new([]),
        metrics.clone(),
    );
    let anchor = store.mutate(|m| m.uptime_anchor());

    let ticker = thread::spawn(move || {
        for i in 1..=TICKS {
            // 第一个 tick 以基准点计时，之后按 since_last_tick 累加
            let clock = TickClock::new(anchor + DELTA * i, DELTA);
            scheduler.tick(clock).unwrap();
            thread::yield_now();
        }
    });

    let switchers: Vec<_> = (0..SWITCH_THREADS)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..SWITCHES_PER_THREAD {
                    assert!(store.mutate(|m| m.switch()));
                    thread::yield_now();
                }
            })
        })
        .collect();

    ticker.join().unwrap();
    for switcher in switchers {
        switcher.join().unwrap();
    }

    let state = store.read();
    assert_eq!(metrics.snapshot().ticks_total, u64::from(TICKS));
    assert_eq!(metrics.snapshot().ticks_skipped, 0);

    let switches = SWITCH_THREADS * SWITCHES_PER_THREAD;
    let expected = if switches % 2 == 1 {
        RobotStatus::Running
    } else {
        RobotStatus::Idle
    };
    assert_eq!(state.status, expected);
    assert_eq!(state.uptime, DELTA * TICKS);
    assert!(state.logs.is_empty());
}

#[test]
fn test_engine_start_and_shutdown() {
    let config = SimulationConfig {
        refresh_rate_hz: 100,
        offline_chance: 0.0,
        ..SimulationConfig::default()
    };
    let engine = RobotEngine::start(config).unwrap();
    assert!(engine.is_running());

    thread::sleep(Duration::from_millis(80));
    let state = engine.state();
    assert_eq!(state.status, RobotStatus::Idle);
    assert!(state.power_consumption >= 7.0 && state.power_consumption <= 10.0);
    assert!(engine.metrics_snapshot().ticks_total >= 1);

    engine.shutdown().unwrap();
}

#[test]
fn test_engine_rejects_invalid_config() {
    let config = SimulationConfig {
        refresh_rate_hz: 0,
        ..SimulationConfig::default()
    };
    assert!(EngineBuilder::new().config(config).build().is_err());
}

#[test]
fn test_engine_without_scheduler_keeps_initial_telemetry() {
    let engine = EngineBuilder::new().without_scheduler().build().unwrap();
    assert!(!engine.is_running());

    thread::sleep(Duration::from_millis(30));
    let state = engine.state();
    assert_eq!(state.temperature, 0.0);
    assert_eq!(state.uptime, Duration::ZERO);

    assert!(engine.store().mutate(|m| m.switch()));
    assert_eq!(engine.state().status, RobotStatus::Running);
    engine.shutdown().unwrap();
}

#[test]
fn test_dropping_engine_stops_updates() {
    let config = SimulationConfig {
        refresh_rate_hz: 200,
        offline_chance: 0.0,
        ..SimulationConfig::default()
    };
    let engine = EngineBuilder::new().config(config).build().unwrap();
    let store = engine.store();
    thread::sleep(Duration::from_millis(30));
    drop(engine);

    let frozen = store.snapshot();
    thread::sleep(Duration::from_millis(40));
    assert_eq!(store.snapshot(), frozen);
}
