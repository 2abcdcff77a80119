use axum::{
    middleware::Next,
    response::{IntoResponse, Response},
    extract::Request,
    body::Body,
};
use tower_sessions::Session;
use crate::errors::AppError;
use crate::models::USER_SESSION_KEY;

const PUBLIC_PATHS: [&str; 4] = ["/login", "/register", "/logout", "/directory"];

pub async fn require_auth(
    session: Session,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if PUBLIC_PATHS.contains(&path) {
        return next.run(req).await;
    }

    match session.get::<String>(USER_SESSION_KEY).await {
        Ok(Some(_)) => next.run(req).await,
        Ok(None) => AppError::Auth("Not authenticated".into()).into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}
