// src/handlers/atendimento.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    common::{error::AppError, redirect::DEFAULT_REDIRECT},
    config::AppState,
    handlers::JsonBody,
    middleware::auth::AuthenticatedUser,
    models::atendimento::{Atendimento, AtendimentoDashboard, AtendimentoFiltro, AtendimentoLinha, AtendimentoPayload},
};

#[utoipa::path(
    get,
    path = "/home/atendimentos",
    tag = "Atendimentos",
    params(AtendimentoFiltro),
    responses(
        (status = 200, description = "Atendimentos filtrados, mais recentes primeiro", body = AtendimentoDashboard),
        (status = 400, description = "Data ou status inválidos")
    )
)]
pub async fn listar(
    State(app_state): State<AppState>,
    Query(filtro): Query<AtendimentoFiltro>,
) -> Result<Json<AtendimentoDashboard>, AppError> {
    Ok(Json(app_state.atendimento_service.listar(&filtro).await?))
}

#[utoipa::path(
    post,
    path = "/home/atendimentos/adicionar",
    tag = "Atendimentos",
    request_body = AtendimentoPayload,
    responses(
        (status = 201, description = "Atendimento registrado; o responsável é o usuário logado", body = Atendimento),
        (status = 400, description = "Erros de validação por campo")
    )
)]
pub async fn criar(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    WithRejection(Json(payload), _): JsonBody<AtendimentoPayload>,
) -> Result<(StatusCode, Json<Atendimento>), AppError> {
    let atendimento = app_state.atendimento_service.criar(payload, &usuario.username).await?;
    Ok((StatusCode::CREATED, Json(atendimento)))
}

#[utoipa::path(
    get,
    path = "/atendimentos/{id}/ver",
    tag = "Atendimentos",
    params(("id" = Uuid, Path, description = "ID do atendimento")),
    responses(
        (status = 200, description = "Atendimento com o cadastro vinculado", body = AtendimentoLinha),
        (status = 404, description = "Atendimento não encontrado")
    )
)]
pub async fn ver(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<AtendimentoLinha>, AppError> {
    Ok(Json(app_state.atendimento_service.detalhe(id).await?))
}

#[utoipa::path(
    post,
    path = "/atendimentos/{id}/editar",
    tag = "Atendimentos",
    params(("id" = Uuid, Path, description = "ID do atendimento")),
    request_body = AtendimentoPayload,
    responses(
        (status = 200, description = "Atendimento atualizado (responsável mantido)", body = Atendimento),
        (status = 400, description = "Erros de validação por campo"),
        (status = 404, description = "Atendimento não encontrado")
    )
)]
pub async fn editar(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(payload), _): JsonBody<AtendimentoPayload>,
) -> Result<Json<Atendimento>, AppError> {
    Ok(Json(app_state.atendimento_service.atualizar(id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/atendimentos/{id}/excluir",
    tag = "Atendimentos",
    params(("id" = Uuid, Path, description = "ID do atendimento")),
    responses(
        (status = 303, description = "Excluído; volta para a home"),
        (status = 404, description = "Atendimento não encontrado")
    )
)]
pub async fn excluir(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect, AppError> {
    app_state.atendimento_service.excluir(id).await?;
    Ok(Redirect::to(DEFAULT_REDIRECT))
}

#[utoipa::path(
    post,
    path = "/atendimentos/{id}/realizar",
    tag = "Atendimentos",
    params(("id" = Uuid, Path, description = "ID do atendimento")),
    responses(
        (status = 303, description = "Marcado como realizado; volta para os detalhes"),
        (status = 404, description = "Atendimento não encontrado")
    )
)]
pub async fn realizar(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect, AppError> {
    app_state.atendimento_service.marcar_realizado(id).await?;
    Ok(Redirect::to(&format!("/atendimentos/{id}/ver")))
}
