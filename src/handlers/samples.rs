use axum::{
    extract::{Multipart, Path, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower_sessions::Session;
use crate::errors::{AppError, AppResult};
use crate::models::{AnalysisRecord, AnalyzeForm, CapturedSample, CropForm, SampleSummary, SelectionForm, Workspace};
use crate::services::{analyze_batch, crop};
use crate::state::AppState;
use super::workspace::{commit_history, load_workspace, store_workspace};

fn summaries(workspace: &Workspace) -> Vec<SampleSummary> {
    workspace.samples.iter().map(CapturedSample::summary).collect()
}

pub async fn list_samples(
    session: Session,
) -> AppResult<Json<Vec<SampleSummary>>> {
    let workspace = load_workspace(&session).await?;
    Ok(Json(summaries(&workspace)))
}

pub async fn upload_samples(
    session: Session,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut workspace = load_workspace(&session).await?;
    let username = workspace.profile.username.clone();
    tracing::debug!("Processing sample upload for user: {}", username);

    let mut added = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to get next field from multipart form: {}", e);
        AppError::Validation(format!("Failed to process form field: {}", e))
    })? {
        match field.name().unwrap_or("") {
            "image" => {
                let sample = CapturedSample::new(read_image_field(field).await?);
                added.push(sample.summary());
                workspace.samples.push(sample);
            }
            field_name => {
                tracing::warn!("Unexpected form field: {}", field_name);
            }
        }
    }

    if added.is_empty() {
        tracing::error!("No image was uploaded");
        return Err(AppError::Validation("No image uploaded".into()));
    }

    store_workspace(&session, &workspace).await?;
    tracing::info!("Added {} samples to working set of {}", added.len(), username);
    Ok((StatusCode::CREATED, Json(added)).into_response())
}

// Reads one uploaded image and turns it into a data URL. The bytes must
// be a format the crop tool can open.
async fn read_image_field(field: Field<'_>) -> AppResult<String> {
    let declared = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(|e| {
        tracing::error!("Failed to read image field: {}", e);
        AppError::Validation(format!("Failed to read image: {}", e))
    })?;

    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded image is empty".into()));
    }

    let format = image::guess_format(&bytes).map_err(|_| {
        AppError::Validation("Unsupported image format; upload a PNG or JPEG".into())
    })?;
    let mime = declared
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or_else(|| format.to_mime_type().to_string());

    Ok(crop::encode_data_url(&mime, &bytes))
}

pub async fn clear_samples(
    session: Session,
) -> AppResult<StatusCode> {
    let mut workspace = load_workspace(&session).await?;
    workspace.samples.clear();
    store_workspace(&session, &workspace).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn select_all_samples(
    session: Session,
    Json(form): Json<SelectionForm>,
) -> AppResult<Json<Vec<SampleSummary>>> {
    let mut workspace = load_workspace(&session).await?;
    workspace.select_all(form.selected);
    store_workspace(&session, &workspace).await?;
    Ok(Json(summaries(&workspace)))
}

pub async fn delete_selected_samples(
    session: Session,
) -> AppResult<Json<serde_json::Value>> {
    let mut workspace = load_workspace(&session).await?;
    let deleted = workspace.remove_selected_samples();
    store_workspace(&session, &workspace).await?;
    Ok(Json(json!({ "deleted": deleted, "remaining": workspace.samples.len() })))
}

pub async fn toggle_sample(
    session: Session,
    Path(sample_id): Path<String>,
) -> AppResult<Json<SampleSummary>> {
    let mut workspace = load_workspace(&session).await?;
    let sample = workspace
        .sample_mut(&sample_id)
        .ok_or_else(|| AppError::NotFound(format!("Sample {} not found", sample_id)))?;
    sample.selected = !sample.selected;
    let summary = sample.summary();

    store_workspace(&session, &workspace).await?;
    Ok(Json(summary))
}

pub async fn delete_sample(
    session: Session,
    Path(sample_id): Path<String>,
) -> AppResult<StatusCode> {
    let mut workspace = load_workspace(&session).await?;
    if !workspace.remove_sample(&sample_id) {
        return Err(AppError::NotFound(format!("Sample {} not found", sample_id)));
    }
    store_workspace(&session, &workspace).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn crop_sample(
    State(state): State<AppState>,
    session: Session,
    Path(sample_id): Path<String>,
    Json(form): Json<CropForm>,
) -> AppResult<Json<SampleSummary>> {
    let mut workspace = load_workspace(&session).await?;
    let min_size = state.config.crop.min_size;

    let sample = workspace
        .sample_mut(&sample_id)
        .ok_or_else(|| AppError::NotFound(format!("Sample {} not found", sample_id)))?;

    // On rejection the sample keeps its original image
    sample.image = crop::crop_encoded_image(&sample.image, &form, min_size)?;
    let summary = sample.summary();

    store_workspace(&session, &workspace).await?;
    tracing::info!("Cropped sample {}", sample_id);
    Ok(Json(summary))
}

pub async fn analyze_samples(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<AnalyzeForm>,
) -> AppResult<Json<Vec<AnalysisRecord>>> {
    let mut workspace = load_workspace(&session).await?;

    let batch = workspace.samples_for_analysis(form.all);
    if batch.is_empty() {
        return Err(AppError::Validation("No samples selected for analysis".into()));
    }

    let images: Vec<String> = batch.iter().map(|sample| sample.image.clone()).collect();
    let records = analyze_batch(state.analyzer.as_ref(), &images).await?;

    let analyzed: Vec<String> = batch.into_iter().map(|sample| sample.id).collect();
    workspace.drop_samples(&analyzed);
    let appended = records.clone();
    commit_history(&state, &session, &mut workspace, |history| history.extend(appended)).await?;

    tracing::info!(
        "Appended {} records to history of {}",
        records.len(),
        workspace.profile.username
    );
    Ok(Json(records))
}
