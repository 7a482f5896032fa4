// src/handlers/familiar.rs

use axum::{
    extract::{Multipart, Path, State},
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
        familiar::{Familiar, FamiliarDetalhe, FamiliarPayload, FamiliaresDoCadastro},
        foto::FotoResponse,
    },
};

#[utoipa::path(
    get,
    path = "/cadastro/familiares/{cadastro_id}",
    tag = "Familiares",
    params(("cadastro_id" = Uuid, Path, description = "ID do cadastro")),
    responses(
        (status = 200, description = "Familiares do reeducando", body = FamiliaresDoCadastro),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn listar_do_cadastro(
    State(app_state): State<AppState>,
    Path(cadastro_id): Path<Uuid>,
) -> Result<Json<FamiliaresDoCadastro>, AppError> {
    Ok(Json(app_state.familiar_service.listar_do_cadastro(cadastro_id).await?))
}

#[utoipa::path(
    post,
    path = "/cadastro/familiares/{cadastro_id}",
    tag = "Familiares",
    params(("cadastro_id" = Uuid, Path, description = "ID do cadastro")),
    request_body = FamiliarPayload,
    responses(
        (status = 201, description = "Familiar adicionado ao cadastro", body = Familiar),
        (status = 400, description = "Erros de validação por campo"),
        (status = 404, description = "Cadastro não encontrado")
    )
)]
pub async fn criar_no_cadastro(
    State(app_state): State<AppState>,
    Path(cadastro_id): Path<Uuid>,
    WithRejection(Json(payload), _): JsonBody<FamiliarPayload>,
) -> Result<(StatusCode, Json<Familiar>), AppError> {
    let familiar = app_state.familiar_service.criar_no_cadastro(cadastro_id, payload).await?;
    Ok((StatusCode::CREATED, Json(familiar)))
}

// Familiar sem cadastro: exige o nome do interno e um único perfil de referência
#[utoipa::path(
    post,
    path = "/familiares/avulso",
    tag = "Familiares",
    request_body = FamiliarPayload,
    responses(
        (status = 201, description = "Familiar avulso criado", body = Familiar),
        (status = 400, description = "Erros de validação por campo")
    )
)]
pub async fn criar_avulso(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<FamiliarPayload>,
) -> Result<(StatusCode, Json<Familiar>), AppError> {
    let familiar = app_state.familiar_service.criar_avulso(payload).await?;
    Ok((StatusCode::CREATED, Json(familiar)))
}

#[utoipa::path(
    get,
    path = "/cadastro/familiares/ver/{id}",
    tag = "Familiares",
    params(("id" = Uuid, Path, description = "ID do familiar")),
    responses(
        (status = 200, description = "Familiar com os rótulos dos documentos", body = FamiliarDetalhe),
        (status = 404, description = "Familiar não encontrado")
    )
)]
pub async fn ver(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<FamiliarDetalhe>, AppError> {
    Ok(Json(app_state.familiar_service.detalhe(id).await?))
}

#[utoipa::path(
    post,
    path = "/cadastro/familiares/editar/{id}",
    tag = "Familiares",
    params(("id" = Uuid, Path, description = "ID do familiar")),
    request_body = FamiliarPayload,
    responses(
        (status = 200, description = "Familiar atualizado", body = Familiar),
        (status = 400, description = "Erros de validação por campo"),
        (status = 404, description = "Familiar não encontrado")
    )
)]
pub async fn editar(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(payload), _): JsonBody<FamiliarPayload>,
) -> Result<Json<Familiar>, AppError> {
    Ok(Json(app_state.familiar_service.atualizar(id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/cadastro/familiares/excluir/{id}",
    tag = "Familiares",
    params(("id" = Uuid, Path, description = "ID do familiar")),
    responses(
        (status = 303, description = "Excluído; volta para os familiares do cadastro"),
        (status = 404, description = "Familiar não encontrado")
    )
)]
pub async fn excluir(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect, AppError> {
    let familiar = app_state.familiar_service.excluir(id).await?;
    let destino = match familiar.cadastro_id {
        Some(cadastro_id) => format!("/cadastro/familiares/{cadastro_id}"),
        None => "/home/cadastros/familiares".to_string(),
    };
    Ok(Redirect::to(&destino))
}

#[utoipa::path(
    post,
    path = "/cadastro/familiares/{id}/foto",
    tag = "Familiares",
    params(("id" = Uuid, Path, description = "ID do familiar")),
    request_body(content = foto::FotoUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Foto salva", body = FotoResponse),
        (status = 400, description = "Sem arquivo ou formato diferente de PNG/JPEG", body = FotoResponse),
        (status = 404, description = "Familiar não encontrado")
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
    foto::responder(app_state.familiar_service.salvar_foto(id, &nome, &conteudo).await)
}
