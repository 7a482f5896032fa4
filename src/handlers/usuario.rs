// src/handlers/usuario.rs

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    common::{error::AppError, redirect::DEFAULT_REDIRECT},
    config::AppState,
    handlers::JsonBody,
    middleware::auth::AuthenticatedUser,
    models::auth::{MensagemResponse, PerfilUpdatePayload, TrocarSenhaPayload, UsuarioComPerfil},
    services::usuario_service::pode_acessar_perfil,
};

const MSG_SENHA_ALTERADA: &str = "Senha alterada com sucesso.";

// Perfil de outra pessoa: quem não é superusuário volta para a home
#[utoipa::path(
    get,
    path = "/usuario/perfil/{username}",
    tag = "Perfil",
    params(("username" = String, Path, description = "Username do perfil")),
    responses(
        (status = 200, description = "Dados do perfil", body = UsuarioComPerfil),
        (status = 303, description = "Sem permissão; redireciona para /home/"),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn perfil(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    if !pode_acessar_perfil(&usuario, &username) {
        return Ok(Redirect::to(DEFAULT_REDIRECT).into_response());
    }
    let perfil = app_state.usuario_service.perfil(&username).await?;
    Ok(Json(perfil).into_response())
}

#[utoipa::path(
    post,
    path = "/usuario/perfil/{username}/editar",
    tag = "Perfil",
    params(("username" = String, Path, description = "Username do perfil")),
    request_body = PerfilUpdatePayload,
    responses(
        (status = 303, description = "Atualizado; redireciona para a edição com o novo username"),
        (status = 400, description = "Username vazio ou já em uso"),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn editar(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Path(username): Path<String>,
    WithRejection(Json(payload), _): JsonBody<PerfilUpdatePayload>,
) -> Result<Redirect, AppError> {
    if !pode_acessar_perfil(&usuario, &username) {
        return Ok(Redirect::to(DEFAULT_REDIRECT));
    }
    let atualizado = app_state.usuario_service.atualizar_perfil(&username, payload).await?;
    Ok(Redirect::to(&format!("/usuario/perfil/{}/editar", atualizado.username)))
}

#[utoipa::path(
    post,
    path = "/usuario/perfil/{username}/trocarsenha",
    tag = "Perfil",
    params(("username" = String, Path, description = "Username do perfil")),
    request_body = TrocarSenhaPayload,
    responses(
        (status = 200, description = "Senha alterada", body = MensagemResponse),
        (status = 303, description = "Sem permissão; redireciona para /home/"),
        (status = 400, description = "Senha atual incorreta ou confirmação diferente")
    )
)]
pub async fn trocar_senha(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Path(username): Path<String>,
    WithRejection(Json(payload), _): JsonBody<TrocarSenhaPayload>,
) -> Result<Response, AppError> {
    if !pode_acessar_perfil(&usuario, &username) {
        return Ok(Redirect::to(DEFAULT_REDIRECT).into_response());
    }
    app_state.usuario_service.trocar_senha(&usuario, &username, payload).await?;
    Ok(Json(MensagemResponse { message: MSG_SENHA_ALTERADA }).into_response())
}
