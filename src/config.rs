// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context};
use chrono::FixedOffset;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AgendamentoRepository, AtendimentoRepository, AtividadeRepository, CadastroRepository,
        DashboardRepository, FamiliarRepository, LembreteRepository, UserRepository,
    },
    services::{
        agendamento_service::AgendamentoService, anotacao_service::AnotacaoService,
        atendimento_service::AtendimentoService, atividade_service::AtividadeService, auth::AuthService,
        cadastro_service::CadastroService, dashboard_service::DashboardService,
        familiar_service::FamiliarService, media::MediaStore, usuario_service::UsuarioService,
    },
};

// Só vale com APP_DEBUG ligado.
const DEV_SECRET_KEY: &str = "reeduc-dev-secret-nao-usar-em-producao";
// Uma sessão dura no máximo um ano
const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

/// Credenciais do administrador criado automaticamente em desenvolvimento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultAdmin {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub secret_key: String,
    pub debug: bool,
    pub allowed_hosts: Vec<String>,
    pub bind_addr: String,
    pub media_root: PathBuf,
    pub media_url: String,
    pub utc_offset: FixedOffset,
    pub session_ttl_hours: i64,
    pub session_cookie_secure: bool,
    pub default_admin: Option<DefaultAdmin>,
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// "-03:00" / "+05:30" -> FixedOffset.
pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    let (sinal, resto) = match raw.split_at_checked(1)? {
        ("+", resto) => (1, resto),
        ("-", resto) => (-1, resto),
        _ => return None,
    };
    let (horas, minutos) = resto.split_once(':')?;
    let horas: i32 = horas.parse().ok()?;
    let minutos: i32 = minutos.parse().ok()?;
    if !(0..60).contains(&minutos) {
        return None;
    }
    FixedOffset::east_opt(sinal * (horas * 3600 + minutos * 60))
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de busca (o ambiente,
    /// ou um mapa nos testes).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let debug = get("APP_DEBUG").is_some_and(|v| parse_bool(&v));

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => {
                let password = get("DB_PASSWORD").unwrap_or_default();
                let credenciais = if password.is_empty() {
                    get_or("DB_USER", "sejus")
                } else {
                    format!("{}:{}", get_or("DB_USER", "sejus"), password)
                };
                format!(
                    "postgres://{}@{}:{}/{}",
                    credenciais,
                    get_or("DB_HOST", "localhost"),
                    get_or("DB_PORT", "5432"),
                    get_or("DB_NAME", "reeducdb"),
                )
            }
        };

        let secret_key = match get("SECRET_KEY") {
            Some(key) => key,
            None if debug => DEV_SECRET_KEY.to_string(),
            None => return Err(anyhow!("SECRET_KEY deve ser definida quando APP_DEBUG está desligado")),
        };

        let allowed_hosts = get_or("ALLOWED_HOSTS", "127.0.0.1,localhost")
            .split(',')
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();

        let offset_raw = get_or("APP_UTC_OFFSET", "-03:00");
        let utc_offset =
            parse_offset(&offset_raw).ok_or_else(|| anyhow!("APP_UTC_OFFSET inválido: {offset_raw}"))?;

        let session_ttl_hours = get_or("SESSION_TTL_HOURS", "168")
            .parse::<i64>()
            .context("SESSION_TTL_HOURS deve ser um número de horas")?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
            bail!("SESSION_TTL_HOURS deve estar entre 1 e {MAX_SESSION_TTL_HOURS}: {session_ttl_hours}");
        }

        let mut media_url = get_or("MEDIA_URL", "/media/");
        if !media_url.starts_with('/') {
            media_url.insert(0, '/');
        }
        if !media_url.ends_with('/') {
            media_url.push('/');
        }

        let default_admin = match (get("DEFAULT_ADMIN_USERNAME"), get("DEFAULT_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(DefaultAdmin {
                username,
                password,
                email: get_or("DEFAULT_ADMIN_EMAIL", "admin@example.com"),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            secret_key,
            debug,
            allowed_hosts,
            bind_addr: get_or("BIND_ADDR", "0.0.0.0:3000"),
            media_root: PathBuf::from(get_or("MEDIA_ROOT", "media")),
            media_url,
            utc_offset,
            session_ttl_hours,
            session_cookie_secure: get("SESSION_COOKIE_SECURE").is_some_and(|v| parse_bool(&v)),
            default_admin,
        })
    }

    /// Aceita o Host com ou sem porta; `*` libera qualquer host.
    pub fn host_allowed(&self, host: &str) -> bool {
        let host = host.trim().to_ascii_lowercase();
        let sem_porta = match host.rfind(':') {
            // "[::1]" tem ':' dentro dos colchetes
            Some(i) if !host[i..].contains(']') => &host[..i],
            _ => host.as_str(),
        };
        self.allowed_hosts.iter().any(|h| h == "*" || h == sem_porta)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Arc<Settings>,
    pub auth_service: AuthService,
    pub cadastro_service: CadastroService,
    pub familiar_service: FamiliarService,
    pub atendimento_service: AtendimentoService,
    pub agendamento_service: AgendamentoService,
    pub anotacao_service: AnotacaoService,
    pub atividade_service: AtividadeService,
    pub dashboard_service: DashboardService,
    pub usuario_service: UsuarioService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, settings))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn with_pool(db_pool: PgPool, settings: Settings) -> Self {
        let settings = Arc::new(settings);
        let offset = settings.utc_offset;

        let user_repo = UserRepository::new(db_pool.clone());
        let cadastro_repo = CadastroRepository::new(db_pool.clone());
        let familiar_repo = FamiliarRepository::new(db_pool.clone());
        let atendimento_repo = AtendimentoRepository::new(db_pool.clone());
        let agendamento_repo = AgendamentoRepository::new(db_pool.clone());
        let lembrete_repo = LembreteRepository::new(db_pool.clone());

        let media = MediaStore::new(settings.media_root.clone(), settings.media_url.clone());

        let auth_service = AuthService::new(user_repo.clone(), settings.clone());
        let cadastro_service = CadastroService::new(
            cadastro_repo.clone(),
            familiar_repo.clone(),
            atendimento_repo.clone(),
            agendamento_repo.clone(),
            media.clone(),
            db_pool.clone(),
            offset,
        );
        let familiar_service =
            FamiliarService::new(familiar_repo, cadastro_repo.clone(), media, db_pool.clone());
        let atendimento_service =
            AtendimentoService::new(atendimento_repo, cadastro_repo.clone(), db_pool.clone());
        let agendamento_service =
            AgendamentoService::new(agendamento_repo.clone(), cadastro_repo.clone(), db_pool.clone());
        let anotacao_service = AnotacaoService::new(lembrete_repo, cadastro_repo.clone(), db_pool.clone());
        let atividade_service = AtividadeService::new(AtividadeRepository::new(), db_pool.clone(), offset);
        let dashboard_service = DashboardService::new(DashboardRepository::new(), agendamento_repo, db_pool.clone());
        let usuario_service = UsuarioService::new(user_repo, db_pool.clone());

        Self {
            db_pool,
            settings,
            auth_service,
            cadastro_service,
            familiar_service,
            atendimento_service,
            agendamento_service,
            anotacao_service,
            atividade_service,
            dashboard_service,
            usuario_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_in_debug() {
        let s = settings(&[("APP_DEBUG", "true")]).unwrap();
        assert!(s.debug);
        assert_eq!(s.database_url, "postgres://sejus@localhost:5432/reeducdb");
        assert_eq!(s.secret_key, DEV_SECRET_KEY);
        assert_eq!(s.allowed_hosts, vec!["127.0.0.1", "localhost"]);
        assert_eq!(s.utc_offset, FixedOffset::west_opt(3 * 3600).unwrap());
        assert_eq!(s.session_ttl_hours, 168);
        assert_eq!(s.media_url, "/media/");
        assert!(s.default_admin.is_none());
    }

    #[test]
    fn session_ttl_must_be_positive_and_bounded() {
        let s = settings(&[("APP_DEBUG", "1"), ("SESSION_TTL_HOURS", "12")]).unwrap();
        assert_eq!(s.session_ttl_hours, 12);

        for ruim in ["0", "-5", "8785", "9223372036854775807", "dois"] {
            assert!(settings(&[("APP_DEBUG", "1"), ("SESSION_TTL_HOURS", ruim)]).is_err(), "{ruim}");
        }
        assert!(settings(&[("APP_DEBUG", "1"), ("SESSION_TTL_HOURS", "8784")]).is_ok());
    }

    #[test]
    fn secret_key_is_required_outside_debug() {
        assert!(settings(&[]).is_err());
        assert!(settings(&[("SECRET_KEY", "s3cr3t")]).is_ok());
    }

    #[test]
    fn database_url_is_composed_from_parts() {
        let s = settings(&[
            ("SECRET_KEY", "x"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "pw"),
            ("DB_HOST", "db"),
            ("DB_NAME", "reeduc"),
        ])
        .unwrap();
        assert_eq!(s.database_url, "postgres://app:pw@db:5432/reeduc");
    }

    #[test]
    fn default_admin_needs_username_and_password() {
        let s = settings(&[("APP_DEBUG", "1"), ("DEFAULT_ADMIN_USERNAME", "admin")]).unwrap();
        assert!(s.default_admin.is_none());

        let s = settings(&[
            ("APP_DEBUG", "1"),
            ("DEFAULT_ADMIN_USERNAME", "admin"),
            ("DEFAULT_ADMIN_PASSWORD", "admin123"),
        ])
        .unwrap();
        let admin = s.default_admin.unwrap();
        assert_eq!(admin.email, "admin@example.com");
    }

    #[test]
    fn offsets() {
        assert_eq!(parse_offset("+05:30"), FixedOffset::east_opt(5 * 3600 + 1800));
        assert_eq!(parse_offset("-03:00"), FixedOffset::west_opt(3 * 3600));
        assert_eq!(parse_offset("03:00"), None);
        assert_eq!(parse_offset("-03:75"), None);
    }

    #[test]
    fn hosts_are_checked_without_port() {
        let s = settings(&[("APP_DEBUG", "1"), ("ALLOWED_HOSTS", "reeduc.local, 10.0.125.4")]).unwrap();
        assert!(s.host_allowed("reeduc.local"));
        assert!(s.host_allowed("10.0.125.4:8000"));
        assert!(!s.host_allowed("evil.example"));
    }
}
