//! HTTP 路由
//!
//! | 方法 | 路径 | 成功 | 失败 |
//! |---|---|---|---|
//! | GET | `/robot` | 200 状态快照 | - |
//! | POST | `/robot/switch` | 200 `null` | 403 `{detail}` |
//! | POST | `/robot/reset` | 200 `null` | 403 `{detail}` |
//! | POST | `/robot/fan` | 200 `null` | 400 `{detail}` |
//! | GET | `/robot/metrics` | 200 引擎指标 | - |

use crate::cors::{CorsPolicy, cors_middleware};
use crate::uptime::format_uptime;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use mockbot_client::{RobotService, ServiceError};
use mockbot_protocol::{RobotState, RobotStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AppState {
    pub service: RobotService,
}

/// `GET /robot` 响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotStateResponse {
    /// 温度（°C）
    pub current_temperature: f64,
    /// 功耗（W）
    pub current_power_consumption: f64,
    pub status: RobotStatus,
    /// 风扇转速（%）
    pub fan_speed: u8,
    pub uptime: String,
    pub logs: Vec<String>,
}

impl From<&RobotState> for RobotStateResponse {
    fn from(state: &RobotState) -> Self {
        Self {
            current_temperature: f64::from(state.temperature),
            current_power_consumption: f64::from(state.power_consumption),
            status: state.status,
            fan_speed: state.fan_speed.get(),
            uptime: format_uptime(state.uptime),
            logs: state.logs.clone(),
        }
    }
}

/// `POST /robot/fan` 请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanRequest {
    /// `"proportional"` 或 `"static"`
    pub mode: String,
    /// 固定模式下的转速（%）
    #[serde(default)]
    pub value: Option<i64>,
}

/// `GET /robot/metrics` 响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub ticks_total: u64,
    pub ticks_skipped: u64,
    pub tick_overruns: u64,
    pub commands_accepted: u64,
    pub commands_rejected: u64,
    /// 跳过的 tick 占比（%）
    pub skip_rate: f64,
}

/// 错误响应：`{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, err: ServiceError) -> Self {
        Self {
            status,
            detail: err.detail().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

pub fn build_app(service: RobotService, cors: CorsPolicy) -> Router {
    Router::new()
        .route("/robot", get(get_robot_state))
        .route("/robot/switch", post(switch_robot))
        .route("/robot/reset", post(reset_robot))
        .route("/robot/fan", post(set_fan))
        .route("/robot/metrics", get(get_metrics))
        .layer(middleware::from_fn_with_state(cors, cors_middleware))
        .with_state(AppState { service })
}

async fn get_robot_state(State(state): State<AppState>) -> Json<RobotStateResponse> {
    Json(RobotStateResponse::from(state.service.get_state().as_ref()))
}

async fn switch_robot(State(state): State<AppState>) -> Result<Json<()>, ApiError> {
    state
        .service
        .switch()
        .map_err(|e| ApiError::new(StatusCode::FORBIDDEN, e))?;
    Ok(Json(()))
}

async fn reset_robot(State(state): State<AppState>) -> Result<Json<()>, ApiError> {
    state
        .service
        .reset()
        .map_err(|e| ApiError::new(StatusCode::FORBIDDEN, e))?;
    Ok(Json(()))
}

async fn set_fan(
    State(state): State<AppState>,
    Json(req): Json<FanRequest>,
) -> Result<Json<()>, ApiError> {
    state
        .service
        .set_fan_mode(&req.mode, req.value)
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?;
    Ok(Json(()))
}

async fn get_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let snapshot = state.service.metrics();
    Json(MetricsResponse {
        ticks_total: snapshot.ticks_total,
        ticks_skipped: snapshot.ticks_skipped,
        tick_overruns: snapshot.tick_overruns,
        commands_accepted: snapshot.commands_accepted,
        commands_rejected: snapshot.commands_rejected,
        skip_rate: snapshot.skip_rate(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockbot_protocol::FanSpeed;
    use std::time::Duration;

    #[test]
    fn test_state_response_fields() {
        let state = RobotState {
            status: RobotStatus::Running,
            temperature: 31.5,
            power_consumption: 17.0,
            fan_speed: FanSpeed::try_from(85_i64).unwrap(),
            uptime: Duration::from_secs(61),
            logs: vec!["WARN: x".to_string()],
        };
        let body = serde_json::to_value(RobotStateResponse::from(&state)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "current_temperature": 31.5,
                "current_power_consumption": 17.0,
                "status": "running",
                "fan_speed": 85,
                "uptime": "0:01:01",
                "logs": ["WARN: x"],
            })
        );
    }

    #[test]
    fn test_fan_request_value_optional() {
        let req: FanRequest = serde_json::from_str(r#"{"mode": "proportional"}"#).unwrap();
        assert_eq!(req.value, None);
        let req: FanRequest = serde_json::from_str(r#"{"mode": "static", "value": 40}"#).unwrap();
        assert_eq!(req.value, Some(40));
    }
}
