//! 服务配置
//!
//! 分层加载：默认值 → TOML 文件（`--config`）→ 命令行参数 / `ROBOT_API_*` 环境变量。
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 5487
//! log_level = "debug"
//! allowed_origins = ["http://localhost:3000"]
//!
//! [simulation]
//! refresh_rate_hz = 20
//! temperature_range = [20, 50]
//!
//! [simulation.power_ranges]
//! running = [15, 20]
//! ```

use anyhow::{Context, Result, bail};
use clap::Args;
use mockbot_protocol::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing_subscriber::filter::LevelFilter;

/// 完整服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// `critical` / `error` / `warning` / `info` / `debug` / `trace`
    pub log_level: String,
    /// CORS 白名单
    pub allowed_origins: Vec<String>,
    pub simulation: SimulationConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5487,
            log_level: "info".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://0.0.0.0:3000".to_string(),
            ],
            simulation: SimulationConfig::default(),
        }
    }
}

/// 命令行 / 环境变量覆盖项（未给出的保持文件或默认值）
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// 监听地址
    #[arg(long, env = "ROBOT_API_HOST")]
    pub host: Option<String>,

    /// 监听端口
    #[arg(long, env = "ROBOT_API_PORT")]
    pub port: Option<u16>,

    /// 日志级别
    #[arg(long, env = "ROBOT_API_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// CORS 白名单（逗号分隔）
    #[arg(long, env = "ROBOT_API_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Option<Vec<String>>,

    /// tick 频率（Hz）
    #[arg(long, env = "ROBOT_API_REFRESH_RATE")]
    pub refresh_rate: Option<u32>,

    /// 风扇 100% 时的最大降温（°C）
    #[arg(long, env = "ROBOT_API_MOCK_MAX_FAN_COOLING")]
    pub mock_max_fan_cooling: Option<f64>,

    /// 温度告警阈值（°C）
    #[arg(long, env = "ROBOT_API_MOCK_TEMPERATURE_THRESHOLD")]
    pub mock_temperature_threshold: Option<f64>,

    /// 每个 tick 进入离线的概率
    #[arg(long, env = "ROBOT_API_MOCK_OFFLINE_CHANCE_THRESHOLD")]
    pub mock_offline_chance_threshold: Option<f64>,
}

impl ApiConfig {
    /// 解析 TOML 文本（缺省字段取默认值）
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("解析配置文件失败")
    }

    /// 读取 TOML 文件；`path` 为 `None` 时返回默认配置
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
        if let Some(origins) = overrides.allowed_origins {
            self.allowed_origins = origins;
        }
        if let Some(rate) = overrides.refresh_rate {
            self.simulation.refresh_rate_hz = rate;
        }
        if let Some(cooling) = overrides.mock_max_fan_cooling {
            self.simulation.max_fan_cooling = cooling;
        }
        if let Some(threshold) = overrides.mock_temperature_threshold {
            self.simulation.temperature_threshold = threshold;
        }
        if let Some(chance) = overrides.mock_offline_chance_threshold {
            self.simulation.offline_chance = chance;
        }
    }

    /// 日志级别映射到 tracing 过滤级别
    pub fn level_filter(&self) -> Result<LevelFilter> {
        let level = match self.log_level.to_ascii_lowercase().as_str() {
            "critical" | "error" => LevelFilter::ERROR,
            "warning" | "warn" => LevelFilter::WARN,
            "info" => LevelFilter::INFO,
            "debug" => LevelFilter::DEBUG,
            "trace" => LevelFilter::TRACE,
            other => bail!("未知日志级别: '{}'", other),
        };
        Ok(level)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            bail!("监听地址不能为空");
        }
        self.level_filter()?;
        self.simulation.validate().context("模拟参数无效")?;
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
