// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::{error::AppError, redirect::DEFAULT_REDIRECT},
    config::AppState,
    models::auth::Usuario,
};

// Nome do cookie que carrega o token da sessão
pub const SESSION_COOKIE: &str = "reeduc_session";

/// O navegador manda o cookie; clientes de API mandam `Authorization: Bearer`.
pub fn session_token(jar: &CookieJar, bearer: Option<&Authorization<Bearer>>) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| bearer.map(|auth| auth.token().to_string()))
}

/// Usuário da sessão atual, se houver uma sessão válida.
pub async fn usuario_da_sessao(
    app_state: &AppState,
    jar: &CookieJar,
    bearer: Option<&Authorization<Bearer>>,
) -> Option<Usuario> {
    let token = session_token(jar, bearer)?;
    app_state.auth_service.validate_token(&token).await.ok()
}

// Exige sessão válida e deixa o usuário nas extensions da requisição
pub async fn auth_guard(
    State(app_state): State<AppState>,
    jar: CookieJar,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(&jar, bearer.as_ref().map(|TypedHeader(auth)| auth)).ok_or(AppError::InvalidToken)?;
    let usuario = app_state.auth_service.validate_token(&token).await?;

    request.extensions_mut().insert(usuario);
    Ok(next.run(request).await)
}

// Área administrativa: quem não é staff volta para a home.
// Roda depois do auth_guard.
pub async fn staff_guard(request: Request, next: Next) -> Result<Response, AppError> {
    let usuario = request.extensions().get::<Usuario>().ok_or(AppError::InvalidToken)?;

    if !usuario.is_staff {
        tracing::warn!("⛔ '{}' tentou acessar a administração sem ser staff", usuario.username);
        return Ok(Redirect::to(DEFAULT_REDIRECT).into_response());
    }
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub Usuario);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Usuario>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn cookie_wins_over_bearer() {
        let bearer = Authorization::bearer("do-header").unwrap();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "do-cookie"));
        assert_eq!(session_token(&jar, Some(&bearer)).as_deref(), Some("do-cookie"));

        let vazio = CookieJar::new();
        assert_eq!(session_token(&vazio, Some(&bearer)).as_deref(), Some("do-header"));
        assert_eq!(session_token(&vazio, None), None);
    }
}
