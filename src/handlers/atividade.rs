// src/handlers/atividade.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::atividade::{AtividadeQuery, AtividadesResponse},
};

#[utoipa::path(
    get,
    path = "/atividades/minhasatividades",
    tag = "Atividades",
    params(AtividadeQuery),
    responses(
        (status = 200, description = "Feed de cadastros, agendamentos, atendimentos e anotações", body = AtividadesResponse),
        (status = 400, description = "Tipo de atividade ou datas inválidas")
    )
)]
pub async fn minhas_atividades(
    State(app_state): State<AppState>,
    Query(query): Query<AtividadeQuery>,
) -> Result<Json<AtividadesResponse>, AppError> {
    Ok(Json(app_state.atividade_service.feed(&query).await?))
}
