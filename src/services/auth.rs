// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::Settings,
    db::{user_repo::NovoUsuario, UserRepository},
    models::auth::{Claims, Usuario},
};

/// bcrypt é caro: roda fora do executor assíncrono.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    settings: Arc<Settings>,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, settings: Arc<Settings>) -> Self {
        Self { user_repo, settings }
    }

    /// Confere usuário e senha e devolve o token da sessão.
    /// Contas desativadas não entram.
    pub async fn login(&self, username: &str, password: &str) -> Result<(String, Usuario), AppError> {
        let username = username.trim();

        let usuario = match self.authenticate(username, password).await? {
            Some(usuario) => usuario,
            // Em desenvolvimento, as credenciais do admin padrão criam a conta na hora.
            None if self.is_default_admin(username, password) => {
                self.ensure_default_admin().await?;
                self.authenticate(username, password)
                    .await?
                    .ok_or(AppError::InvalidCredentials)?
            }
            None => {
                tracing::warn!("Login recusado para '{}'", username);
                return Err(AppError::InvalidCredentials);
            }
        };

        self.user_repo.touch_last_login(usuario.id).await?;
        tracing::info!("🔑 Login de '{}'", usuario.username);

        let token = self.create_token(usuario.id)?;
        Ok((token, usuario))
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<Usuario>, AppError> {
        let Some(usuario) = self.user_repo.find_by_username(username).await? else {
            return Ok(None);
        };
        if !usuario.is_active || !verify_password(password, &usuario.password_hash).await? {
            return Ok(None);
        }
        Ok(Some(usuario))
    }

    fn is_default_admin(&self, username: &str, password: &str) -> bool {
        self.settings.debug
            && self
                .settings
                .default_admin
                .as_ref()
                .is_some_and(|admin| admin.username == username && admin.password == password)
    }

    /// Cria o administrador padrão (só em debug e com as credenciais no
    /// ambiente). Se o username já existe, nada muda.
    pub async fn ensure_default_admin(&self) -> Result<Option<Usuario>, AppError> {
        if !self.settings.debug {
            return Ok(None);
        }
        let Some(admin) = self.settings.default_admin.as_ref() else {
            return Ok(None);
        };
        if self.user_repo.find_by_username(&admin.username).await?.is_some() {
            return Ok(None);
        }

        let password_hash = hash_password(&admin.password).await?;
        let usuario = self
            .user_repo
            .create(
                self.user_repo.pool(),
                &NovoUsuario {
                    username: &admin.username,
                    email: &admin.email,
                    first_name: "",
                    last_name: "",
                    password_hash: &password_hash,
                    is_staff: true,
                    is_superuser: true,
                },
            )
            .await?;

        tracing::info!("👤 Administrador padrão '{}' criado", usuario.username);
        Ok(Some(usuario))
    }

    /// Valida o token e carrega a conta, que precisa estar ativa.
    pub async fn validate_token(&self, token: &str) -> Result<Usuario, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.secret_key.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .filter(|usuario| usuario.is_active)
            .ok_or(AppError::InvalidToken)
    }

    pub fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = chrono::Duration::try_hours(self.settings.session_ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| anyhow::anyhow!("SESSION_TTL_HOURS fora da faixa"))?;

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.secret_key.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultAdmin;
    use sqlx::postgres::PgPoolOptions;

    fn service(debug: bool) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/reeduc_unused")
            .unwrap();
        let mut settings = Settings::from_lookup(|key| match key {
            "APP_DEBUG" => Some("1".into()),
            _ => None,
        })
        .unwrap();
        settings.debug = debug;
        settings.default_admin = Some(DefaultAdmin {
            username: "admin".into(),
            password: "admin123".into(),
            email: "admin@example.com".into(),
        });
        AuthService::new(UserRepository::new(pool), Arc::new(settings))
    }

    #[tokio::test]
    async fn token_round_trip_keeps_the_subject() {
        let service = service(true);
        let id = Uuid::new_v4();
        let token = service.create_token(id).unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(service.settings.secret_key.as_ref()),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, id);
        assert_eq!(data.claims.exp - data.claims.iat, 168 * 3600);
    }

    #[tokio::test]
    async fn forged_token_is_rejected_before_touching_the_database() {
        let service = service(true);
        let err = service.validate_token("nao.e.jwt").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn default_admin_only_in_debug() {
        assert!(service(true).is_default_admin("admin", "admin123"));
        assert!(!service(true).is_default_admin("admin", "outra"));
        assert!(!service(false).is_default_admin("admin", "admin123"));
        assert!(service(false).ensure_default_admin().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hashed = hash_password("segredo").await.unwrap();
        assert!(verify_password("segredo", &hashed).await.unwrap());
        assert!(!verify_password("errada", &hashed).await.unwrap());
    }
}
