// src/handlers/cadastro.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Redirect, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{foto, JsonBody},
    models::{
        agendamento::HistoricoAgendamentos,
        atendimento::HistoricoAtendimentos,
        cadastro::{BuscaQuery, Cadastro, CadastroDashboard, CadastroListaResponse, CadastroPayload, CadastroStatus},
        foto::FotoResponse,
    },
};

const LISTA_PATH: &str = "/home/cadastros";

#[utoipa::path(
    post,
    path = "/home/cadastro/adicionar",
    tag = "Cadastros",
    request_body = CadastroPayload,
    responses(
        (status = 201, description = "Cadastro criado", body = Cadastro),
        (status = 400, description = "Erros de validação por campo")
    )
)]
pub async fn criar(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<CadastroPayload>,
) -> Result<(StatusCode, Json<Cadastro>), AppError> {
    let cadastro = app_state.cadastro_service.criar(payload).await?;
    Ok((StatusCode::CREATED, Json(cadastro)))
}

#[utoipa::path(
    get,
    path = "/home/cadastros",
    tag = "Cadastros",
    responses((status = 200, description = "Todos os cadastros", body = CadastroListaResponse))
)]
pub async fn listar(State(app_state): State<AppState>) -> Result<Json<CadastroListaResponse>, AppError> {
    Ok(Json(app_state.cadastro_service.listar(None).await?))
}

#[utoipa::path(
    get,
    path = "/home/cadastros/{filtro}",
    tag = "Cadastros",
    params(("filtro" = String, Path, description = "todos | ativos | arquivados | familiares")),
    responses(
        (status = 200, description = "Cadastros do filtro", body = CadastroListaResponse),
        (status = 404, description = "Filtro desconhecido")
    )
)]
pub async fn listar_filtrado(
    State(app_state): State<AppState>,
    Path(filtro): Path<String>,
) -> Result<Json<CadastroListaResponse>, AppError> {
    Ok(Json(app_state.cadastro_service.listar(Some(&filtro)).await?))
}

#[utoipa::path(
    get,
    path = "/cadastro",
    tag = "Cadastros",
    params(BuscaQuery),
    responses((status = 200, description = "Ativos e arquivados que casam com a busca", body = CadastroDashboard))
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    Query(query): Query<BuscaQuery>,
) -> Result<Json<CadastroDashboard>, AppError> {
    Ok(Json(app_state.cadastro_service.dashboard(query.q.as_deref()).await?))
}

#[utoipa::path(
    get,
    path = "/cadastro/perfil/{id}",
    tag = "Cadastros",
    params(("id" = Uuid, Path, description = "ID do cadastro")),
    responses(
        (status = 200, description = "Perfil do reeducando", body = Cadastro),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn perfil(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Cadastro>, AppError> {
    Ok(Json(app_state.cadastro_service.detalhe(id).await?))
}

#[utoipa::path(
    get,
    path = "/home/cadastros/{id}/ver",
    tag = "Cadastros",
    params(("id" = Uuid, Path, description = "ID do cadastro")),
    responses(
        (status = 200, description = "Detalhes do cadastro", body = Cadastro),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn ver(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Cadastro>, AppError> {
    Ok(Json(app_state.cadastro_service.detalhe(id).await?))
}

#[utoipa::path(
    post,
    path = "/home/cadastros/{id}/editar",
    tag = "Cadastros",
    params(("id" = Uuid, Path, description = "ID do cadastro")),
    request_body = CadastroPayload,
    responses(
        (status = 200, description = "Cadastro atualizado", body = Cadastro),
        (status = 400, description = "Erros de validação por campo"),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn editar(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(payload), _): JsonBody<CadastroPayload>,
) -> Result<Json<Cadastro>, AppError> {
    Ok(Json(app_state.cadastro_service.atualizar(id, payload).await?))
}

// Exclui junto familiares e anotações; atendimentos e agendamentos perdem o vínculo
#[utoipa::path(
    post,
    path = "/home/cadastros/{id}/excluir",
    tag = "Cadastros",
    params(("id" = Uuid, Path, description = "ID do cadastro")),
    responses(
        (status = 303, description = "Excluído; volta para a lista"),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn excluir(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect, AppError> {
    app_state.cadastro_service.excluir(id).await?;
    Ok(Redirect::to(LISTA_PATH))
}

#[utoipa::path(
    post,
    path = "/home/cadastros/{id}/arquivar",
    tag = "Cadastros",
    params(("id" = Uuid, Path, description = "ID do cadastro")),
    responses(
        (status = 303, description = "Arquivado; volta para os detalhes"),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn arquivar(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect, AppError> {
    app_state.cadastro_service.alterar_status(id, CadastroStatus::Arquivado).await?;
    Ok(Redirect::to(&format!("{LISTA_PATH}/{id}/ver")))
}

#[utoipa::path(
    post,
    path = "/home/cadastros/{id}/reativar",
    tag = "Cadastros",
    params(("id" = Uuid, Path, description = "ID do cadastro")),
    responses(
        (status = 303, description = "Reativado; volta para os detalhes"),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn reativar(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect, AppError> {
    app_state.cadastro_service.alterar_status(id, CadastroStatus::Ativo).await?;
    Ok(Redirect::to(&format!("{LISTA_PATH}/{id}/ver")))
}

// --- HISTÓRICOS ---

#[utoipa::path(
    get,
    path = "/cadastro/atendimentos/{id}",
    tag = "Cadastros",
    params(("id" = Uuid, Path, description = "ID do cadastro")),
    responses(
        (status = 200, description = "Atendimentos do reeducando, mais recentes primeiro", body = HistoricoAtendimentos),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn historico_atendimentos(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoricoAtendimentos>, AppError> {
    let (cadastro, atendimentos) = app_state.cadastro_service.historico_atendimentos(id).await?;
    Ok(Json(HistoricoAtendimentos { cadastro, atendimentos }))
}

#[utoipa::path(
    get,
    path = "/cadastro/agendamentos/{id}",
    tag = "Cadastros",
    params(("id" = Uuid, Path, description = "ID do cadastro")),
    responses(
        (status = 200, description = "Agendamentos do reeducando, mais recentes primeiro", body = HistoricoAgendamentos),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn historico_agendamentos(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoricoAgendamentos>, AppError> {
    let (cadastro, agendamentos) = app_state.cadastro_service.historico_agendamentos(id).await?;
    Ok(Json(HistoricoAgendamentos { cadastro, agendamentos }))
}

// --- FOTO ---

#[utoipa::path(
    post,
    path = "/cadastro/{id}/foto",
    tag = "Cadastros",
    params(("id" = Uuid, Path, description = "ID do cadastro")),
    request_body(content = foto::FotoUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Foto salva", body = FotoResponse),
        (status = 400, description = "Sem arquivo ou formato diferente de PNG/JPEG", body = FotoResponse),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn enviar_foto(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Some((nome, conteudo)) = foto::ler_campo_foto(multipart).await else {
        return Ok(foto::sem_foto());
    };
    foto::responder(app_state.cadastro_service.salvar_foto(id, &nome, &conteudo).await)
}
