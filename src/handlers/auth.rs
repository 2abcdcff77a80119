use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower_sessions::Session;
use crate::errors::AppResult;
use crate::models::{LoginForm, RegisterForm, UserProfile, Workspace, USER_SESSION_KEY, WORKSPACE_KEY};
use crate::state::AppState;
use super::workspace::{load_workspace, store_workspace};

pub async fn handle_register(
    State(state): State<AppState>,
    Form(register_form): Form<RegisterForm>,
) -> AppResult<Response> {
    tracing::info!("Registration attempt for user: {}", register_form.username);

    let profile = state.directory.register(&register_form).await?;
    let usage = state.directory.usage().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Account created successfully! Please log in.",
            "user": profile,
            "directory": usage,
        })),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(login_form): Form<LoginForm>,
) -> AppResult<Json<UserProfile>> {
    tracing::info!("Login attempt for user: {}", login_form.username);

    let profile = state
        .directory
        .authenticate(&login_form.username, &login_form.password)
        .await?;

    let history = state.history.load(&profile.username).await?;
    tracing::debug!("Loaded {} history records for {}", history.len(), profile.username);

    // A fresh id per login; any previous user's state in this session is replaced
    session.cycle_id().await?;
    session.insert(USER_SESSION_KEY, &profile.username).await?;
    store_workspace(&session, &Workspace::new(profile.clone(), history)).await?;

    Ok(Json(profile))
}

pub async fn handle_logout(
    session: Session,
) -> AppResult<Json<serde_json::Value>> {
    // Only the session goes; the persisted history stays
    if let Some(username) = session.remove::<String>(USER_SESSION_KEY).await? {
        tracing::info!("User {} signed out", username);
    }
    session.remove::<Workspace>(WORKSPACE_KEY).await?;

    Ok(Json(json!({ "message": "Signed out" })))
}

pub async fn directory_usage(
    State(state): State<AppState>,
) -> AppResult<Response> {
    let usage = state.directory.usage().await?;
    Ok(Json(usage).into_response())
}

pub async fn serve_profile(
    session: Session,
) -> AppResult<Json<UserProfile>> {
    let workspace = load_workspace(&session).await?;
    Ok(Json(workspace.profile))
}
