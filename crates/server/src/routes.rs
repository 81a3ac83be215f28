use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use banchi_core::UploadType;

use crate::error::ApiError;
use crate::services::uploads::RegisterUpload;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/uploads", post(create_upload).get(list_uploads))
        .route("/api/uploads/{upload_id}", get(get_upload))
        .route("/api/uploads/{upload_id}/extract", post(extract_transactions))
        .route("/api/uploads/{upload_id}/classify", post(classify_upload))
        .route("/api/uploads/{upload_id}/classifications", get(list_classifications))
        .route("/api/reports/summary", post(generate_summary))
        .route("/api/reports/pnl", post(generate_pnl))
        .route("/api/reports/{report_type}/snapshot", get(get_snapshot))
        .route("/api/reconciliation/run", post(run_reconciliation))
        .route("/api/reconciliation/runs/{run_id}", get(get_run))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListUploadsQuery {
    upload_type: Option<UploadType>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeriodParams {
    period_start: String,
    period_end: String,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> ApiError {
    ApiError::not_found("NOT_FOUND", "Route not found")
}

// ── Uploads ───────────────────────────────────────────────────────────────────

async fn create_upload(
    State(state): State<AppState>,
    Json(body): Json<RegisterUpload>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.uploads.create(body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_uploads(
    State(state): State<AppState>,
    Query(query): Query<ListUploadsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state
        .uploads
        .list(query.upload_type, query.limit.unwrap_or(50), query.offset.unwrap_or(0))
        .await?;
    Ok(Json(rows))
}

async fn get_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.uploads.get(upload_id).await?))
}

// ── Extraction & classification ───────────────────────────────────────────────

async fn extract_transactions(
    State(state): State<AppState>,
    Path(upload_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.extraction.extract_transactions(upload_id).await?))
}

async fn classify_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.classification.classify_upload(upload_id).await?))
}

async fn list_classifications(
    State(state): State<AppState>,
    Path(upload_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.classification.list_by_upload(upload_id).await?))
}

// ── Reports ───────────────────────────────────────────────────────────────────

async fn generate_summary(
    State(state): State<AppState>,
    Json(body): Json<PeriodParams>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = state
        .reports
        .generate_summary(&body.period_start, &body.period_end)
        .await?;
    Ok((StatusCode::CREATED, Json(payload)))
}

async fn generate_pnl(
    State(state): State<AppState>,
    Json(body): Json<PeriodParams>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = state
        .reports
        .generate_pnl(&body.period_start, &body.period_end)
        .await?;
    Ok((StatusCode::CREATED, Json(payload)))
}

async fn get_snapshot(
    State(state): State<AppState>,
    Path(report_type): Path<String>,
    Query(query): Query<PeriodParams>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state
        .reports
        .get_snapshot(&report_type, &query.period_start, &query.period_end)
        .await?;
    Ok(Json(snapshot))
}

// ── Reconciliation ────────────────────────────────────────────────────────────

async fn run_reconciliation(
    State(state): State<AppState>,
    Json(body): Json<PeriodParams>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .reconciliation
        .run(&body.period_start, &body.period_end)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_run(
    State(state): State<AppState>,
    Path(run_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.reconciliation.get_run(run_id).await?))
}
