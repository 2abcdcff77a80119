use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower_sessions::Session;
use crate::errors::{AppError, AppResult};
use crate::models::{AnalysisRecord, DeleteRecordsForm, HistoryQuery};
use crate::services::{crop, filter_newest_first, remove_by_ids};
use crate::state::AppState;
use super::workspace::{commit_history, load_workspace};

pub async fn list_history(
    session: Session,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<AnalysisRecord>>> {
    let workspace = load_workspace(&session).await?;
    let records: Vec<AnalysisRecord> = filter_newest_first(&workspace.history, query.status)
        .into_iter()
        .cloned()
        .collect();

    tracing::debug!(
        "Listing {} of {} records for {} ({:?})",
        records.len(),
        workspace.history.len(),
        workspace.profile.username,
        query.status
    );
    Ok(Json(records))
}

fn find_record(records: &[AnalysisRecord], record_id: &str) -> AppResult<AnalysisRecord> {
    records
        .iter()
        .find(|record| record.id == record_id)
        .cloned()
        .ok_or_else(|| {
            tracing::warn!("Record not found: {}", record_id);
            AppError::NotFound(format!("Record {} not found", record_id))
        })
}

pub async fn get_record(
    session: Session,
    Path(record_id): Path<String>,
) -> AppResult<Json<AnalysisRecord>> {
    let workspace = load_workspace(&session).await?;
    Ok(Json(find_record(&workspace.history, &record_id)?))
}

pub async fn get_record_image(
    session: Session,
    Path(record_id): Path<String>,
) -> AppResult<Response> {
    let workspace = load_workspace(&session).await?;
    let record = find_record(&workspace.history, &record_id)?;

    let (mime, bytes) = crop::decode_image_payload(&record.image)?;
    let content_type = mime
        .or_else(|| image::guess_format(&bytes).ok().map(|f| f.to_mime_type().to_string()))
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        bytes,
    )
        .into_response())
}

pub async fn delete_records(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<DeleteRecordsForm>,
) -> AppResult<Json<serde_json::Value>> {
    let mut workspace = load_workspace(&session).await?;
    let deleted = commit_history(&state, &session, &mut workspace, |history| {
        remove_by_ids(history, &form.ids)
    })
    .await?;

    tracing::info!("Deleted {} records for {}", deleted, workspace.profile.username);
    Ok(Json(json!({ "deleted": deleted, "remaining": workspace.history.len() })))
}

pub async fn clear_history(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<StatusCode> {
    let mut workspace = load_workspace(&session).await?;
    commit_history(&state, &session, &mut workspace, |history| history.clear()).await?;

    tracing::info!("Cleared history for {}", workspace.profile.username);
    Ok(StatusCode::NO_CONTENT)
}
