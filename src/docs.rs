// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::middleware::auth::SESSION_COOKIE;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::raiz,
        handlers::auth::health,
        handlers::auth::login_page,
        handlers::auth::login,
        handlers::auth::sair,

        // --- Home ---
        handlers::home::home,

        // --- Cadastros ---
        handlers::cadastro::criar,
        handlers::cadastro::listar,
        handlers::cadastro::listar_filtrado,
        handlers::cadastro::dashboard,
        handlers::cadastro::perfil,
        handlers::cadastro::ver,
        handlers::cadastro::editar,
        handlers::cadastro::excluir,
        handlers::cadastro::arquivar,
        handlers::cadastro::reativar,
        handlers::cadastro::historico_atendimentos,
        handlers::cadastro::historico_agendamentos,
        handlers::cadastro::enviar_foto,

        // --- Familiares ---
        handlers::familiar::listar_do_cadastro,
        handlers::familiar::criar_no_cadastro,
        handlers::familiar::criar_avulso,
        handlers::familiar::ver,
        handlers::familiar::editar,
        handlers::familiar::excluir,
        handlers::familiar::enviar_foto,

        // --- Anotações ---
        handlers::anotacao::carregar,
        handlers::anotacao::salvar,

        // --- Atendimentos ---
        handlers::atendimento::listar,
        handlers::atendimento::criar,
        handlers::atendimento::ver,
        handlers::atendimento::editar,
        handlers::atendimento::excluir,
        handlers::atendimento::realizar,

        // --- Agendamentos ---
        handlers::agendamento::listar,
        handlers::agendamento::buscar_cadastros,
        handlers::agendamento::criar,
        handlers::agendamento::ver,
        handlers::agendamento::editar,
        handlers::agendamento::excluir,

        // --- Atividades ---
        handlers::atividade::minhas_atividades,

        // --- Perfil ---
        handlers::usuario::perfil,
        handlers::usuario::editar,
        handlers::usuario::trocar_senha,

        // --- Administração ---
        handlers::admin::listar,
        handlers::admin::criar,
        handlers::admin::detalhes,
        handlers::admin::alternar_ativo,
        handlers::admin::excluir,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Cargo,
            models::auth::Usuario,
            models::auth::UsuarioComPerfil,
            models::auth::LoginForm,
            models::auth::LoginPage,
            models::auth::NovoUsuarioPayload,
            models::auth::PerfilUpdatePayload,
            models::auth::TrocarSenhaPayload,
            models::auth::MensagemResponse,

            // --- Cadastros ---
            models::cadastro::Cadastro,
            models::cadastro::CadastroResumo,
            models::cadastro::CadastroPayload,
            models::cadastro::CadastroStatus,
            models::cadastro::CadastroListaResponse,
            models::cadastro::CadastroDashboard,
            models::cadastro::AutocompleteResponse,
            models::cadastro::AutocompleteItem,
            models::cadastro::VinculoCadastro,
            models::documento::Documento,
            models::documento::DocumentoAusente,
            models::documento::DocumentoItem,
            models::foto::FotoResponse,
            handlers::foto::FotoUpload,

            // --- Familiares ---
            models::familiar::Familiar,
            models::familiar::FamiliarPayload,
            models::familiar::FamiliarDetalhe,
            models::familiar::FamiliaresDoCadastro,

            // --- Anotações ---
            models::lembrete::Lembrete,
            models::lembrete::LembretePayload,
            models::lembrete::Urgencia,
            models::lembrete::AnotacaoEdicao,

            // --- Atendimentos ---
            models::atendimento::Atendimento,
            models::atendimento::AtendimentoLinha,
            models::atendimento::AtendimentoPayload,
            models::atendimento::AtendimentoDashboard,
            models::atendimento::HistoricoAtendimentos,

            // --- Agendamentos ---
            models::agendamento::Agendamento,
            models::agendamento::AgendamentoLinha,
            models::agendamento::AgendamentoPayload,
            models::agendamento::AgendamentoDashboard,
            models::agendamento::HistoricoAgendamentos,
            models::agendamento::Horario,

            // --- Painel e atividades ---
            models::dashboard::HomeResumo,
            models::dashboard::Totais,
            models::atividade::Atividade,
            models::atividade::AtividadesResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout e health check"),
        (name = "Home", description = "Painel inicial"),
        (name = "Cadastros", description = "Reeducandos, históricos e fotos"),
        (name = "Familiares", description = "Familiares vinculados ou avulsos"),
        (name = "Anotações", description = "Lembretes por cadastro"),
        (name = "Atendimentos", description = "Registro de atendimentos"),
        (name = "Agendamentos", description = "Agenda de atendimentos"),
        (name = "Atividades", description = "Feed de atividades recentes"),
        (name = "Perfil", description = "Dados e senha do próprio usuário"),
        (name = "Administração", description = "Gestão de contas (somente staff)")
    ),
    security(("session_cookie" = []), ("api_jwt" = [])),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
        // O navegador usa o cookie de sessão
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
    }
}
