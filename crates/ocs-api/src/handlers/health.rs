//! Health, info and status handlers

use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use ocs_core::AiConfig;
use serde::Serialize;
use std::sync::Arc;

/// Configured upstream model and endpoint
#[derive(Serialize)]
pub struct EndpointInfo {
    pub model: String,
    pub endpoint: String,
}

impl From<&AiConfig> for EndpointInfo {
    fn from(ai: &AiConfig) -> Self {
        Self {
            model: ai.model.trim().to_string(),
            endpoint: ai.base_url.trim().to_string(),
        }
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub mode: String,
    pub ai: EndpointInfo,
}

/// Liveness probe
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        mode: "ai".to_string(),
        ai: EndpointInfo::from(&state.config.ai),
    })
}

#[derive(Serialize)]
pub struct InfoResponse {
    pub code: i32,
    pub message: String,
    pub data: EndpointInfo,
}

pub async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(InfoResponse {
        code: 1,
        message: "AI模式".to_string(),
        data: EndpointInfo::from(&state.config.ai),
    })
}

#[derive(Serialize)]
pub struct RootResponse {
    pub status: String,
    pub name: String,
}

pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        status: "running".to_string(),
        name: "AI答题本地服务".to_string(),
    })
}
