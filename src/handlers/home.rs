// src/handlers/home.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser, models::dashboard::HomeResumo,
};

#[utoipa::path(
    get,
    path = "/home/",
    tag = "Home",
    responses(
        (status = 200, description = "Contadores, último cadastro e agendamentos recentes", body = HomeResumo),
        (status = 401, description = "Sem sessão")
    )
)]
pub async fn home(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
) -> Result<Json<HomeResumo>, AppError> {
    let resumo = app_state.dashboard_service.home(&usuario).await?;
    Ok(Json(resumo))
}
