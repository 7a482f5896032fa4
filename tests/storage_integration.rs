/// Testes contra um PostgreSQL de verdade. Rodam com:
///   TEST_DATABASE_URL=postgres://... cargo test -- --ignored
/// Cada teste usa nomes únicos, então podem rodar no mesmo banco.
use chrono::NaiveDate;
use reeduc::{
    common::{error::AppError, validation::Campo},
    config::{AppState, Settings},
    models::{
        atendimento::AtendimentoPayload,
        auth::{Cargo, NovoUsuarioPayload, Usuario},
        cadastro::{CadastroPayload, CadastroStatus},
        familiar::FamiliarPayload,
        lembrete::LembretePayload,
    },
};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

async fn state() -> AppState {
    let url = std::env::var("TEST_DATABASE_URL").expect("defina TEST_DATABASE_URL");
    let pool = PgPoolOptions::new().max_connections(5).connect(&url).await.expect("conexão");
    sqlx::migrate!().run(&pool).await.expect("migrações");

    let settings = Settings::from_lookup(|key| match key {
        "SECRET_KEY" => Some("segredo-dos-testes".to_string()),
        "DATABASE_URL" => Some(url.clone()),
        "MEDIA_ROOT" => Some(std::env::temp_dir().join("reeduc-media").display().to_string()),
        _ => None,
    })
    .expect("configuração");
    AppState::with_pool(pool, settings)
}

fn tag() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

async fn cadastro(app: &AppState, nome: &str) -> Uuid {
    let payload = CadastroPayload { nome: nome.to_string(), ..Default::default() };
    app.cadastro_service.criar(payload).await.expect("cadastro").id
}

async fn tecnico(app: &AppState, cargo: Cargo) -> Usuario {
    let payload = NovoUsuarioPayload {
        nome_completo: "Técnico de Teste".into(),
        username: format!("tecnico.{}", tag()),
        senha: "segredo123".into(),
        senha_confirmacao: "segredo123".into(),
        email: "tecnico@example.com".into(),
        cargo_es: Campo::Valor(cargo),
    };
    app.usuario_service.criar(payload).await.expect("usuário").usuario
}

fn atendimento(nome: &str, cadastro_id: Option<Uuid>) -> AtendimentoPayload {
    AtendimentoPayload {
        cadastro_id,
        nome_pessoa_atendida: nome.to_string(),
        data_atendimento: NaiveDate::from_ymd_opt(2024, 5, 10).into(),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore]
async fn deleting_a_cadastro_cascades_and_unlinks() {
    let app = state().await;
    let autor = tecnico(&app, Cargo::AssistenteTecnicoPsicologo).await;
    let id = cadastro(&app, &format!("Cascata {}", tag())).await;

    let familiar = app
        .familiar_service
        .criar_no_cadastro(id, FamiliarPayload { nome: "Irmã".into(), ..Default::default() })
        .await
        .unwrap();
    let payload = LembretePayload { titulo: "Retorno".into(), ..Default::default() };
    let (lembrete, criada) = app.anotacao_service.salvar(Some(id), payload, autor.id).await.unwrap();
    assert!(criada);
    let vinculado = app.atendimento_service.criar(atendimento("Cascata", Some(id)), &autor.username).await.unwrap();

    app.cadastro_service.excluir(id).await.unwrap();

    assert!(matches!(app.familiar_service.detalhe(familiar.id).await, Err(AppError::NotFound(_))));
    let restantes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lembretes WHERE id = $1")
        .bind(lembrete.id)
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(restantes, 0);

    // O atendimento continua, só perde o vínculo
    let linha = app.atendimento_service.detalhe(vinculado.id).await.unwrap();
    assert_eq!(linha.atendimento.cadastro_id, None);
}

#[tokio::test]
#[ignore]
async fn second_save_updates_the_current_note() {
    let app = state().await;
    let autor = tecnico(&app, Cargo::ApoioAdmEstagiario).await;
    let editor = tecnico(&app, Cargo::ApoioAdmEstagiario).await;
    let id = cadastro(&app, &format!("Anotação {}", tag())).await;

    let primeira = LembretePayload { titulo: "Primeira".into(), ..Default::default() };
    let (criada, nova) = app.anotacao_service.salvar(Some(id), primeira, autor.id).await.unwrap();
    assert!(nova);

    let segunda = LembretePayload { titulo: "Revisada".into(), ..Default::default() };
    let (revisada, nova) = app.anotacao_service.salvar(Some(id), segunda, editor.id).await.unwrap();
    assert!(!nova);
    assert_eq!(revisada.id, criada.id);
    assert_eq!(revisada.titulo, "Revisada");
    assert_eq!(revisada.criado_por, Some(autor.id));
    assert_eq!(revisada.atualizado_por, Some(editor.id));
}

#[tokio::test]
#[ignore]
async fn deleting_a_staff_account_keeps_notes_without_author() {
    let app = state().await;
    let admin = tecnico(&app, Cargo::GerenciaAdministracao).await;
    let autor = tecnico(&app, Cargo::AssistenteTecnicoDireito).await;
    let id = cadastro(&app, &format!("Autor {}", tag())).await;

    let payload = LembretePayload { titulo: "Documentos".into(), ..Default::default() };
    app.anotacao_service.salvar(Some(id), payload, autor.id).await.unwrap();

    app.usuario_service.excluir(&admin, autor.id).await.unwrap();

    let edicao = app.anotacao_service.carregar(Some(id)).await.unwrap();
    let lembrete = edicao.lembrete.expect("anotação continua");
    assert_eq!(lembrete.criado_por, None);
    assert_eq!(lembrete.atualizado_por, None);
}

#[tokio::test]
#[ignore]
async fn history_matches_unlinked_rows_by_name_ignoring_case() {
    let app = state().await;
    let sufixo = tag();
    let id = cadastro(&app, &format!("Maria Silva {sufixo}")).await;

    let por_nome = app
        .atendimento_service
        .criar(atendimento(&format!("maria silva {sufixo}"), None), "tecnico")
        .await
        .unwrap();
    let por_chave = app.atendimento_service.criar(atendimento("Outro Nome", Some(id)), "tecnico").await.unwrap();
    let alheio = app
        .atendimento_service
        .criar(atendimento(&format!("Maria Souza {sufixo}"), None), "tecnico")
        .await
        .unwrap();

    let (_, historico) = app.cadastro_service.historico_atendimentos(id).await.unwrap();
    let ids: Vec<Uuid> = historico.iter().map(|a| a.id).collect();
    assert!(ids.contains(&por_nome.id));
    assert!(ids.contains(&por_chave.id));
    assert!(!ids.contains(&alheio.id));
}

#[tokio::test]
#[ignore]
async fn autocomplete_needs_two_chars_and_caps_at_ten_active() {
    let app = state().await;
    let prefixo = tag();
    for i in 0..12 {
        cadastro(&app, &format!("{prefixo} Pessoa {i:02}")).await;
    }
    let arquivado = cadastro(&app, &format!("{prefixo} Arquivada")).await;
    app.cadastro_service.alterar_status(arquivado, CadastroStatus::Arquivado).await.unwrap();

    let resposta = app.cadastro_service.autocomplete(Some(&prefixo)).await.unwrap();
    assert_eq!(resposta.results.len(), 10);
    assert!(resposta.results.iter().all(|item| item.id != arquivado));

    let curta = app.cadastro_service.autocomplete(Some(&prefixo[..1])).await.unwrap();
    assert!(curta.results.is_empty());
}

#[tokio::test]
#[ignore]
async fn only_management_accounts_become_staff() {
    let app = state().await;
    let gerente = tecnico(&app, Cargo::GerenciaAdministracao).await;
    let estagiario = tecnico(&app, Cargo::TjApoioAdmEstagiario).await;

    assert!(gerente.is_staff);
    assert!(!gerente.is_superuser);
    assert!(!estagiario.is_staff);
}

#[tokio::test]
#[ignore]
async fn usernames_are_unique_ignoring_case() {
    let app = state().await;
    let existente = tecnico(&app, Cargo::ApoioAdmEstagiario).await;

    let payload = NovoUsuarioPayload {
        nome_completo: "Outra Pessoa".into(),
        username: existente.username.to_uppercase(),
        senha: "segredo123".into(),
        senha_confirmacao: "segredo123".into(),
        email: "outra@example.com".into(),
        cargo_es: Campo::Valor(Cargo::ApoioAdmEstagiario),
    };

    match app.usuario_service.criar(payload).await {
        Err(AppError::ValidationError(errors)) => assert!(errors.field_errors().contains_key("username")),
        other => panic!("esperava erro de validação, veio {other:?}"),
    }
}

#[tokio::test]
#[ignore]
async fn self_deactivation_is_forbidden() {
    let app = state().await;
    let admin = tecnico(&app, Cargo::GerenciaAdministracao).await;

    let resultado = app.usuario_service.alternar_ativo(&admin, admin.id).await;
    assert!(matches!(resultado, Err(AppError::Forbidden(_))));
}
