use crate::errors::AppError;
use crate::models::{Dashboard, PlatformUsageResponse};
use crate::normalize::{
    normalize_behavior, normalize_dashboard, normalize_platform, normalize_sessions,
    normalize_time_series, normalize_top_entities,
};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    TopEntities,
    TimeSeries,
    Behavior,
    Platform,
    Sessions,
}

impl FromStr for Section {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "1" | "top-entities" => Ok(Self::TopEntities),
            "2" | "time-series" => Ok(Self::TimeSeries),
            "3" | "behavior" => Ok(Self::Behavior),
            "4" | "platform" => Ok(Self::Platform),
            "5" | "sessions" => Ok(Self::Sessions),
            other => Err(AppError::not_found(format!("unknown section '{other}'"))),
        }
    }
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<Dashboard> {
    Json(normalize_dashboard(&state.document))
}

pub async fn get_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> Result<Response, AppError> {
    let doc = &state.document;
    let response = match section.parse::<Section>()? {
        Section::TopEntities => Json(normalize_top_entities(doc)).into_response(),
        Section::TimeSeries => Json(normalize_time_series(doc)).into_response(),
        Section::Behavior => Json(normalize_behavior(doc)).into_response(),
        Section::Platform => Json(normalize_platform(doc)).into_response(),
        Section::Sessions => Json(normalize_sessions(doc)).into_response(),
    };
    Ok(response)
}

pub async fn get_platform_usage(State(state): State<AppState>) -> Response {
    let platform = normalize_platform(&state.document);
    let body = PlatformUsageResponse {
        platforms: platform.platform_keys(),
        records: platform
            .platform_usage_over_time
            .iter()
            .map(|point| point.to_flat_record())
            .collect(),
    };
    Json(body).into_response()
}
