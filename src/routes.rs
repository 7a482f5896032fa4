// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers::{admin, agendamento, anotacao, atendimento, atividade, auth, cadastro, familiar, home, usuario},
    middleware::{
        auth::{auth_guard, staff_guard},
        host::host_guard,
    },
};

// Fotos de celular passam fácil do limite padrão de 2 MB
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas (login, logout, health)
    let public_routes = Router::new()
        .route("/", get(auth::raiz))
        .route("/api/health", get(auth::health))
        .route("/autenticar/entrar", get(auth::login_page).post(auth::login))
        .route("/sair", get(auth::sair));

    // O matchit exige o mesmo nome de parâmetro na mesma posição,
    // por isso o filtro da lista também se chama {id}.
    let cadastro_routes = Router::new()
        .route("/home/cadastro/adicionar", post(cadastro::criar))
        .route("/home/cadastros", get(cadastro::listar))
        .route("/home/cadastros/{id}", get(cadastro::listar_filtrado))
        .route("/home/cadastros/{id}/ver", get(cadastro::ver))
        .route("/home/cadastros/{id}/editar", post(cadastro::editar))
        .route("/home/cadastros/{id}/excluir", post(cadastro::excluir))
        .route("/home/cadastros/{id}/arquivar", post(cadastro::arquivar))
        .route("/home/cadastros/{id}/reativar", post(cadastro::reativar))
        .route("/cadastro", get(cadastro::dashboard))
        .route("/cadastro/perfil/{id}", get(cadastro::perfil))
        .route("/cadastro/atendimentos/{id}", get(cadastro::historico_atendimentos))
        .route("/cadastro/agendamentos/{id}", get(cadastro::historico_agendamentos))
        .route("/cadastro/{id}/foto", post(cadastro::enviar_foto))
        // Familiares
        .route(
            "/cadastro/familiares/{id}",
            get(familiar::listar_do_cadastro).post(familiar::criar_no_cadastro),
        )
        .route("/cadastro/familiares/{id}/foto", post(familiar::enviar_foto))
        .route("/cadastro/familiares/ver/{id}", get(familiar::ver))
        .route("/cadastro/familiares/editar/{id}", post(familiar::editar))
        .route("/cadastro/familiares/excluir/{id}", post(familiar::excluir))
        .route("/familiares/avulso", post(familiar::criar_avulso))
        .route("/anotacoes/editar/", get(anotacao::carregar).post(anotacao::salvar));

    let atendimento_routes = Router::new()
        .route("/home/atendimentos", get(atendimento::listar))
        .route("/home/atendimentos/adicionar", post(atendimento::criar))
        .route("/atendimentos/{id}/ver", get(atendimento::ver))
        .route("/atendimentos/{id}/editar", post(atendimento::editar))
        .route("/atendimentos/{id}/excluir", post(atendimento::excluir))
        .route("/atendimentos/{id}/realizar", post(atendimento::realizar))
        // Agendamentos
        .route("/agendamentos", get(agendamento::listar))
        .route("/agendamentos/buscar", get(agendamento::buscar_cadastros))
        .route("/home/agendamentos/adicionar", post(agendamento::criar))
        .route("/agendamentos/{id}/ver", get(agendamento::ver))
        .route("/agendamentos/{id}/editar", post(agendamento::editar))
        .route("/agendamentos/{id}/excluir", post(agendamento::excluir));

    let user_routes = Router::new()
        .route("/home/", get(home::home))
        .route("/atividades/minhasatividades", get(atividade::minhas_atividades))
        .route("/usuario/perfil/{username}", get(usuario::perfil))
        .route("/usuario/perfil/{username}/editar", post(usuario::editar))
        .route("/usuario/perfil/{username}/trocarsenha", post(usuario::trocar_senha));

    // Tudo acima exige sessão
    let protected_routes = Router::new()
        .merge(cadastro_routes)
        .merge(atendimento_routes)
        .merge(user_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Área administrativa: sessão + staff (o último layer roda primeiro)
    let admin_routes = Router::new()
        .route("/administrar/usuarios", get(admin::listar))
        .route("/administrar/adicionarUsuario", post(admin::criar))
        .route("/administrar/usuarios/{id}/detalhes", get(admin::detalhes))
        .route("/administrar/usuarios/{id}/toggle", post(admin::alternar_ativo))
        .route("/administrar/usuarios/{id}/excluir", post(admin::excluir))
        .layer(axum_middleware::from_fn(staff_guard))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let mut app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Em desenvolvimento o próprio servidor entrega as fotos enviadas
    if app_state.settings.debug {
        let prefixo = app_state.settings.media_url.trim_end_matches('/');
        if !prefixo.is_empty() {
            app = app.nest_service(prefixo, ServeDir::new(&app_state.settings.media_root));
        }
    }

    app.layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), host_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
