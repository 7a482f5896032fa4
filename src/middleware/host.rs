// src/middleware/host.rs

use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState};

// Recusa requisições cujo Host não está em ALLOWED_HOSTS.
pub async fn host_guard(State(app_state): State<AppState>, request: Request, next: Next) -> Result<Response, AppError> {
    // HTTP/2 traz o host na URI, não no cabeçalho
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default();

    if !app_state.settings.host_allowed(host) {
        tracing::warn!("Host não permitido: '{}'", host);
        return Err(AppError::BadRequest("Host não permitido.".to_string()));
    }
    Ok(next.run(request).await)
}
