use tower_sessions::Session;
use crate::errors::{AppError, AppResult};
use crate::models::{AnalysisRecord, Workspace, WORKSPACE_KEY};
use crate::state::AppState;

pub async fn load_workspace(session: &Session) -> AppResult<Workspace> {
    session
        .get::<Workspace>(WORKSPACE_KEY)
        .await?
        .ok_or_else(|| AppError::Auth("Not authenticated".into()))
}

pub async fn store_workspace(session: &Session, workspace: &Workspace) -> AppResult<()> {
    session.insert(WORKSPACE_KEY, workspace).await?;
    Ok(())
}

/// Applies `apply` to the user's stored history under the per-user lock and
/// refreshes the session view from the result. When the store refuses the
/// write the session still keeps the change.
pub async fn commit_history<T, F>(
    state: &AppState,
    session: &Session,
    workspace: &mut Workspace,
    apply: F,
) -> AppResult<T>
where
    F: FnOnce(&mut Vec<AnalysisRecord>) -> T,
{
    let username = workspace.profile.username.clone();
    let update = state.history.modify(&username, apply).await?;

    workspace.history = update.records;
    store_workspace(session, workspace).await?;

    match update.saved {
        Ok(()) => Ok(update.outcome),
        Err(e) => {
            tracing::error!("Failed to persist history for {}: {}", username, e);
            // Server errors skip the session layer's own save
            session.save().await?;
            Err(AppError::Storage(e))
        }
    }
}
