// src/handlers/admin.rs

use axum::{
    extract::{Path, State},
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
    middleware::auth::AuthenticatedUser,
    models::auth::{NovoUsuarioPayload, UsuarioComPerfil},
};

const LISTA_PATH: &str = "/administrar/usuarios";

#[utoipa::path(
    get,
    path = "/administrar/usuarios",
    tag = "Administração",
    responses(
        (status = 200, description = "Contas com o cargo", body = Vec<UsuarioComPerfil>),
        (status = 303, description = "Não é staff; redireciona para /home/")
    )
)]
pub async fn listar(State(app_state): State<AppState>) -> Result<Json<Vec<UsuarioComPerfil>>, AppError> {
    Ok(Json(app_state.usuario_service.listar().await?))
}

#[utoipa::path(
    post,
    path = "/administrar/adicionarUsuario",
    tag = "Administração",
    request_body = NovoUsuarioPayload,
    responses(
        (status = 201, description = "Conta criada; a gerência recebe acesso de staff", body = UsuarioComPerfil),
        (status = 400, description = "Erros de validação por campo (inclusive username repetido)")
    )
)]
pub async fn criar(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<NovoUsuarioPayload>,
) -> Result<(StatusCode, Json<UsuarioComPerfil>), AppError> {
    let usuario = app_state.usuario_service.criar(payload).await?;
    Ok((StatusCode::CREATED, Json(usuario)))
}

#[utoipa::path(
    get,
    path = "/administrar/usuarios/{id}/detalhes",
    tag = "Administração",
    params(("id" = Uuid, Path, description = "ID da conta")),
    responses(
        (status = 200, description = "Conta com o cargo", body = UsuarioComPerfil),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn detalhes(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UsuarioComPerfil>, AppError> {
    Ok(Json(app_state.usuario_service.detalhe(id).await?))
}

#[utoipa::path(
    post,
    path = "/administrar/usuarios/{id}/toggle",
    tag = "Administração",
    params(("id" = Uuid, Path, description = "ID da conta")),
    responses(
        (status = 303, description = "Conta ativada/desativada; volta para a lista"),
        (status = 403, description = "Tentativa de desativar a própria conta"),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn alternar_ativo(
    State(app_state): State<AppState>,
    AuthenticatedUser(atual): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    app_state.usuario_service.alternar_ativo(&atual, id).await?;
    Ok(Redirect::to(LISTA_PATH))
}

#[utoipa::path(
    post,
    path = "/administrar/usuarios/{id}/excluir",
    tag = "Administração",
    params(("id" = Uuid, Path, description = "ID da conta")),
    responses(
        (status = 303, description = "Conta excluída; volta para a lista"),
        (status = 403, description = "Tentativa de excluir a própria conta"),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn excluir(
    State(app_state): State<AppState>,
    AuthenticatedUser(atual): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    app_state.usuario_service.excluir(&atual, id).await?;
    Ok(Redirect::to(LISTA_PATH))
}
