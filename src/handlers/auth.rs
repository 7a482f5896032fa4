// src/handlers/auth.rs

use axum::{
    extract::{Form, Query, State},
    response::Redirect,
    Json,
};
use axum_extra::{
    extract::{
        cookie::{Cookie, SameSite},
        CookieJar, WithRejection,
    },
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::{
        error::AppError,
        redirect::{safe_redirect, DEFAULT_REDIRECT},
    },
    config::AppState,
    handlers::FormBody,
    middleware::auth::{usuario_da_sessao, SESSION_COOKIE},
    models::auth::{LoginForm, LoginPage, LoginQuery},
};

pub const LOGIN_PATH: &str = "/autenticar/entrar";

// "/" leva para a home (com sessão) ou para o login
#[utoipa::path(
    get,
    path = "/",
    tag = "Auth",
    responses((status = 303, description = "Redireciona para /home/ ou para o login")),
    security(())
)]
pub async fn raiz(
    State(app_state): State<AppState>,
    jar: CookieJar,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Redirect {
    let bearer = bearer.as_ref().map(|TypedHeader(auth)| auth);
    match usuario_da_sessao(&app_state, &jar, bearer).await {
        Some(_) => Redirect::to(DEFAULT_REDIRECT),
        None => Redirect::to("/autenticar/entrar?redirect=%2Fhome%2F"),
    }
}

// Tela de login: só devolve o destino já saneado
#[utoipa::path(
    get,
    path = "/autenticar/entrar",
    tag = "Auth",
    params(LoginQuery),
    responses((status = 200, description = "Destino após o login", body = LoginPage)),
    security(())
)]
pub async fn login_page(Query(query): Query<LoginQuery>) -> Json<LoginPage> {
    Json(LoginPage { redirect: safe_redirect(query.redirect.as_deref()) })
}

#[utoipa::path(
    post,
    path = "/autenticar/entrar",
    tag = "Auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Sessão criada; redireciona para o destino"),
        (status = 401, description = "Usuário ou senha inválidos")
    ),
    security(())
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    WithRejection(Form(form), _): FormBody<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let (token, _) = app_state.auth_service.login(&form.username, &form.password).await?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(app_state.settings.session_cookie_secure);

    let destino = safe_redirect(form.redirect.as_deref());
    Ok((jar.add(cookie), Redirect::to(&destino)))
}

#[utoipa::path(
    get,
    path = "/sair",
    tag = "Auth",
    responses((status = 303, description = "Sessão encerrada; redireciona para o login")),
    security(())
)]
pub async fn sair(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to(LOGIN_PATH))
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Auth",
    responses((status = 200, description = "Servidor no ar", body = String)),
    security(())
)]
pub async fn health() -> &'static str {
    "OK"
}
