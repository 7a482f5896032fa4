// src/handlers/agendamento.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::JsonBody,
    models::{
        agendamento::{Agendamento, AgendamentoDashboard, AgendamentoFiltro, AgendamentoLinha, AgendamentoPayload},
        cadastro::{AutocompleteResponse, BuscaQuery},
    },
};

const DASHBOARD_PATH: &str = "/agendamentos";

#[utoipa::path(
    get,
    path = "/agendamentos",
    tag = "Agendamentos",
    params(AgendamentoFiltro),
    responses(
        (status = 200, description = "Agendamentos filtrados, mais recentes primeiro", body = AgendamentoDashboard),
        (status = 400, description = "Data inválida")
    )
)]
pub async fn listar(
    State(app_state): State<AppState>,
    Query(filtro): Query<AgendamentoFiltro>,
) -> Result<Json<AgendamentoDashboard>, AppError> {
    Ok(Json(app_state.agendamento_service.listar(&filtro).await?))
}

// Autocomplete do formulário: cadastros ativos, no máximo 10
#[utoipa::path(
    get,
    path = "/agendamentos/buscar",
    tag = "Agendamentos",
    params(BuscaQuery),
    responses((status = 200, description = "Cadastros ativos que casam com o termo (mín. 2 letras)", body = AutocompleteResponse))
)]
pub async fn buscar_cadastros(
    State(app_state): State<AppState>,
    Query(query): Query<BuscaQuery>,
) -> Result<Json<AutocompleteResponse>, AppError> {
    Ok(Json(app_state.cadastro_service.autocomplete(query.q.as_deref()).await?))
}

#[utoipa::path(
    post,
    path = "/home/agendamentos/adicionar",
    tag = "Agendamentos",
    request_body = AgendamentoPayload,
    responses(
        (status = 201, description = "Agendamento criado", body = Agendamento),
        (status = 400, description = "Erros de validação por campo")
    )
)]
pub async fn criar(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<AgendamentoPayload>,
) -> Result<(StatusCode, Json<Agendamento>), AppError> {
    let agendamento = app_state.agendamento_service.criar(payload).await?;
    Ok((StatusCode::CREATED, Json(agendamento)))
}

#[utoipa::path(
    get,
    path = "/agendamentos/{id}/ver",
    tag = "Agendamentos",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Agendamento com o cadastro vinculado", body = AgendamentoLinha),
        (status = 404, description = "Agendamento não encontrado")
    )
)]
pub async fn ver(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<AgendamentoLinha>, AppError> {
    Ok(Json(app_state.agendamento_service.detalhe(id).await?))
}

#[utoipa::path(
    post,
    path = "/agendamentos/{id}/editar",
    tag = "Agendamentos",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    request_body = AgendamentoPayload,
    responses(
        (status = 200, description = "Agendamento atualizado", body = Agendamento),
        (status = 400, description = "Erros de validação por campo"),
        (status = 404, description = "Agendamento não encontrado")
    )
)]
pub async fn editar(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(payload), _): JsonBody<AgendamentoPayload>,
) -> Result<Json<Agendamento>, AppError> {
    Ok(Json(app_state.agendamento_service.atualizar(id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/agendamentos/{id}/excluir",
    tag = "Agendamentos",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 303, description = "Excluído; volta para os agendamentos"),
        (status = 404, description = "Agendamento não encontrado")
    )
)]
pub async fn excluir(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect, AppError> {
    app_state.agendamento_service.excluir(id).await?;
    Ok(Redirect::to(DASHBOARD_PATH))
}
