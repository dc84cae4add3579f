//! # Mockbot API
//!
//! 模拟机器人的 HTTP 适配层：把 [`RobotService`](mockbot_client::RobotService)
//! 的四个操作映射为 REST 路由，并提供 CORS 与配置加载。

pub mod config;
pub mod cors;
pub mod routes;
pub mod uptime;

pub use config::{ApiConfig, ConfigOverrides};
pub use cors::CorsPolicy;
pub use routes::{FanRequest, MetricsResponse, RobotStateResponse, build_app};
pub use uptime::format_uptime;
