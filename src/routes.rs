use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::{
    ai::AiAssistant,
    documents::DocumentPipeline,
    errors::AppError,
    models::{
        ImproveProjectRequest, ImproveProjectResponse, ImproveSummaryRequest, ImproveSummaryResponse,
        RenderRequest, SuggestSkillsRequest, SuggestSkillsResponse,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentPipeline,
    pub assistant: Arc<AiAssistant>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate", post(generate_pdf))
        .route("/preview", post(preview_html))
        .route("/api/ai/improve-summary", post(improve_summary))
        .route("/api/ai/suggest-skills", post(suggest_skills))
        .route("/api/ai/improve-project", post(improve_project))
        .with_state(state)
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-forge",
        "exporter": state.documents.exporter_name(),
        "templates": state.documents.template_ids(),
    }))
}

/// Unreadable bodies become a `{detail, code}` 400 instead of axum's plain-text rejection.
fn read_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

pub async fn generate_pdf(
    State(state): State<AppState>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = read_body(payload)?;
    let span = info_span!("generate", request_id = %Uuid::new_v4(), template_id = body.template_id);

    async move {
        info!("📄 PDF requested");
        let pdf = state.documents.generate(body.template_id, &body.data).await?;
        let filename = format!("resume_{}.pdf", Utc::now().timestamp());
        info!("✅ Sending {} ({} bytes)", filename, pdf.len());

        let headers = [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ];
        Ok((StatusCode::OK, headers, Bytes::from(pdf)).into_response())
    }
    .instrument(span)
    .await
}

pub async fn preview_html(
    State(state): State<AppState>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = read_body(payload)?;
    let span = info_span!("preview", request_id = %Uuid::new_v4(), template_id = body.template_id);

    let html = span.in_scope(|| state.documents.preview(body.template_id, &body.data))?;
    let headers = [
        (header::CONTENT_TYPE, "text/html; charset=utf-8"),
        (header::CACHE_CONTROL, "no-store"),
    ];
    Ok((StatusCode::OK, headers, html).into_response())
}

pub async fn improve_summary(
    State(state): State<AppState>,
    payload: Result<Json<ImproveSummaryRequest>, JsonRejection>,
) -> Result<Json<ImproveSummaryResponse>, AppError> {
    let body = read_body(payload)?;
    let response = match state.assistant.improve_summary(&body.summary).await {
        Ok(text) => ImproveSummaryResponse { improved_summary: text, error: None },
        Err(e) => ImproveSummaryResponse { improved_summary: body.summary, error: Some(e.to_string()) },
    };
    Ok(Json(response))
}

pub async fn suggest_skills(
    State(state): State<AppState>,
    payload: Result<Json<SuggestSkillsRequest>, JsonRejection>,
) -> Result<Json<SuggestSkillsResponse>, AppError> {
    let body = read_body(payload)?;
    let suggested_skills = state.assistant.suggest_skills(&body.skills).await;
    Ok(Json(SuggestSkillsResponse { suggested_skills }))
}

pub async fn improve_project(
    State(state): State<AppState>,
    payload: Result<Json<ImproveProjectRequest>, JsonRejection>,
) -> Result<Json<ImproveProjectResponse>, AppError> {
    let body = read_body(payload)?;
    let response = match state.assistant.improve_project(&body.project_description).await {
        Ok(text) => ImproveProjectResponse { improved_project: text, error: None },
        Err(e) => ImproveProjectResponse {
            improved_project: body.project_description,
            error: Some(e.to_string()),
        },
    };
    Ok(Json(response))
}
