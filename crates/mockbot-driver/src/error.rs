//! 驱动层错误类型定义

use mockbot_protocol::{ConfigError, RobotStatus};
use thiserror::Error;

/// 单个 tick 的模拟错误
///
/// 配置经过校验后不应出现；一旦出现，调度器跳过该 tick 并记录日志，
/// 不会终止后台线程。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// 采样区间为空（下界大于上界）
    #[error("Empty {quantity} sampling range for {status}: [{lo}, {hi}]")]
    EmptyRange {
        quantity: &'static str,
        status: RobotStatus,
        lo: i64,
        hi: i64,
    },

    /// 计算结果不是有限数
    #[error("Non-finite {quantity} computed for {status}: {value}")]
    NonFinite {
        quantity: &'static str,
        status: RobotStatus,
        value: f64,
    },
}

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 模拟参数无效
    #[error("Invalid simulation config: {0}")]
    Config(#[from] ConfigError),

    /// 后台更新线程启动失败
    #[error("Failed to spawn updater thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// 后台更新线程 panic
    #[error("Updater thread panicked")]
    ThreadPanicked,

    /// 等待后台线程退出超时
    #[error("Updater thread did not stop within {0:?}")]
    JoinTimeout(std::time::Duration),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_simulation_error_display() {
        let err = SimulationError::EmptyRange {
            quantity: "temperature",
            status: RobotStatus::Idle,
            lo: 30,
            hi: 25,
        };
        assert_eq!(
            err.to_string(),
            "Empty temperature sampling range for idle: [30, 25]"
        );

        let err = SimulationError::NonFinite {
            quantity: "temperature",
            status: RobotStatus::Running,
            value: f64::INFINITY,
        };
        assert!(err.to_string().contains("Non-finite temperature"));
    }

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::from(ConfigError::ZeroRefreshRate);
        assert_eq!(
            err.to_string(),
            "Invalid simulation config: refresh rate must be greater than 0 Hz"
        );

        let err = DriverError::JoinTimeout(Duration::from_secs(2));
        assert_eq!(err.to_string(), "Updater thread did not stop within 2s");

        assert_eq!(
            DriverError::ThreadPanicked.to_string(),
            "Updater thread panicked"
        );
    }

    #[test]
    fn test_from_config_error() {
        let err: DriverError = ConfigError::ZeroLogCapacity.into();
        assert!(matches!(err, DriverError::Config(ConfigError::ZeroLogCapacity)));
    }
}
