// src/handlers/anotacao.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::JsonBody,
    middleware::auth::AuthenticatedUser,
    models::lembrete::{AnotacaoEdicao, AnotacaoQuery, Lembrete, LembretePayload},
};

#[utoipa::path(
    get,
    path = "/anotacoes/editar/",
    tag = "Anotações",
    params(AnotacaoQuery),
    responses(
        (status = 200, description = "Anotação mais recente do cadastro (ou nenhuma)", body = AnotacaoEdicao),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn carregar(
    State(app_state): State<AppState>,
    Query(query): Query<AnotacaoQuery>,
) -> Result<Json<AnotacaoEdicao>, AppError> {
    Ok(Json(app_state.anotacao_service.carregar(query.cadastro_id).await?))
}

// 201 quando a anotação nasce agora, 200 quando a corrente é atualizada
#[utoipa::path(
    post,
    path = "/anotacoes/editar/",
    tag = "Anotações",
    params(AnotacaoQuery),
    request_body = LembretePayload,
    responses(
        (status = 201, description = "Anotação criada", body = Lembrete),
        (status = 200, description = "Anotação corrente atualizada", body = Lembrete),
        (status = 400, description = "Erros de validação por campo"),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn salvar(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Query(query): Query<AnotacaoQuery>,
    WithRejection(Json(payload), _): JsonBody<LembretePayload>,
) -> Result<(StatusCode, Json<Lembrete>), AppError> {
    let (lembrete, criada) = app_state.anotacao_service.salvar(query.cadastro_id, payload, usuario.id).await?;
    let status = if criada { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(lembrete)))
}
