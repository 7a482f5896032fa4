// src/services/usuario_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{
    common::{
        error::AppError,
        validation::{collect, field_error, finish, is_blank},
    },
    db::{user_repo::NovoUsuario, UserRepository},
    models::auth::{
        split_full_name, NovoUsuarioPayload, PerfilUpdatePayload, TrocarSenhaPayload, Usuario, UsuarioComPerfil,
        MSG_USERNAME_EM_USO, MSG_USERNAME_EXISTE,
    },
    services::auth::{hash_password, verify_password},
};

pub const MSG_SENHA_ATUAL_INCORRETA: &str = "Senha atual incorreta.";
pub const MSG_AUTO_DESATIVAR: &str = "Você não pode desativar a sua própria conta.";
pub const MSG_AUTO_EXCLUIR: &str = "Você não pode excluir a sua própria conta.";

/// O perfil só é acessível pelo dono ou por um superusuário.
pub fn pode_acessar_perfil(atual: &Usuario, username: &str) -> bool {
    atual.is_superuser || atual.username == username
}

#[derive(Clone)]
pub struct UsuarioService {
    user_repo: UserRepository,
    pool: PgPool,
}

impl UsuarioService {
    pub fn new(user_repo: UserRepository, pool: PgPool) -> Self {
        Self { user_repo, pool }
    }

    // --- ADMINISTRAÇÃO (somente staff) ---

    pub async fn listar(&self) -> Result<Vec<UsuarioComPerfil>, AppError> {
        self.user_repo.list_com_perfil().await
    }

    pub async fn detalhe(&self, id: Uuid) -> Result<UsuarioComPerfil, AppError> {
        self.user_repo.find_com_perfil(id).await?.ok_or(AppError::NotFound("Usuário"))
    }

    /// Cria a conta e o perfil. A gerência recebe acesso de staff.
    pub async fn criar(&self, mut payload: NovoUsuarioPayload) -> Result<UsuarioComPerfil, AppError> {
        let resultado = payload.validate_all();
        let duplicado = !is_blank(&payload.username)
            && self.user_repo.username_taken(&self.pool, &payload.username, None).await?;

        let cargo = match (resultado, duplicado) {
            (Ok(cargo), false) => cargo,
            (resultado, duplicado) => {
                let mut errors = resultado.err().unwrap_or_default();
                if duplicado {
                    errors.add("username", field_error("unique", MSG_USERNAME_EXISTE));
                }
                return Err(errors.into());
            }
        };

        let (first_name, last_name) = split_full_name(&payload.nome_completo);
        let password_hash = hash_password(&payload.senha).await?;

        let mut tx = self.pool.begin().await?;
        // Corrida com outro cadastro do mesmo username cai no índice único
        let usuario = self
            .user_repo
            .create(
                &mut *tx,
                &NovoUsuario {
                    username: &payload.username,
                    email: payload.email.trim(),
                    first_name: &first_name,
                    last_name: &last_name,
                    password_hash: &password_hash,
                    is_staff: cargo.eleva_staff(),
                    is_superuser: false,
                },
            )
            .await?;
        let perfil = self.user_repo.create_perfil(&mut *tx, usuario.id, Some(cargo)).await?;
        tx.commit().await?;

        tracing::info!("👤 Usuário '{}' criado ({})", usuario.username, cargo.label());
        Ok(UsuarioComPerfil { usuario, cargo_es: perfil.cargo_es })
    }

    pub async fn alternar_ativo(&self, atual: &Usuario, id: Uuid) -> Result<Usuario, AppError> {
        if atual.id == id {
            tracing::warn!("'{}' tentou desativar a própria conta", atual.username);
            return Err(AppError::Forbidden(MSG_AUTO_DESATIVAR.into()));
        }
        let usuario = self
            .user_repo
            .toggle_active(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;
        tracing::info!("Usuário '{}' ativo = {}", usuario.username, usuario.is_active);
        Ok(usuario)
    }

    pub async fn excluir(&self, atual: &Usuario, id: Uuid) -> Result<(), AppError> {
        if atual.id == id {
            tracing::warn!("'{}' tentou excluir a própria conta", atual.username);
            return Err(AppError::Forbidden(MSG_AUTO_EXCLUIR.into()));
        }
        if !self.user_repo.delete(&self.pool, id).await? {
            return Err(AppError::NotFound("Usuário"));
        }
        tracing::info!("🗑️ Usuário {} excluído por '{}'", id, atual.username);
        Ok(())
    }

    // --- PERFIL ---

    pub async fn perfil(&self, username: &str) -> Result<UsuarioComPerfil, AppError> {
        self.user_repo
            .find_com_perfil_by_username(username)
            .await?
            .ok_or(AppError::NotFound("Usuário"))
    }

    /// Troca username e nome. Nome vazio limpa nome e sobrenome.
    pub async fn atualizar_perfil(&self, username: &str, mut payload: PerfilUpdatePayload) -> Result<Usuario, AppError> {
        let alvo = self.perfil(username).await?.usuario;

        payload.validate_all()?;
        if self.user_repo.username_taken(&self.pool, &payload.username, Some(alvo.id)).await? {
            let mut errors = ValidationErrors::new();
            errors.add("username", field_error("unique", MSG_USERNAME_EM_USO));
            return Err(errors.into());
        }

        let (first_name, last_name) = split_full_name(&payload.full_name);
        self.user_repo
            .update_identity(&self.pool, alvo.id, &payload.username, &first_name, &last_name, MSG_USERNAME_EM_USO)
            .await?
            .ok_or(AppError::NotFound("Usuário"))
    }

    /// A senha atual conferida é a de quem está logado; a senha trocada é a
    /// da conta do perfil (as duas coincidem, exceto para superusuários).
    pub async fn trocar_senha(&self, atual: &Usuario, username: &str, payload: TrocarSenhaPayload) -> Result<(), AppError> {
        let alvo = self.perfil(username).await?.usuario;

        let mut errors = collect(payload.validate_new());
        if !verify_password(&payload.current_password, &atual.password_hash).await? {
            errors.add("current_password", field_error("senha", MSG_SENHA_ATUAL_INCORRETA));
        }
        finish(errors)?;

        let password_hash = hash_password(&payload.new_password).await?;
        self.user_repo.set_password(&self.pool, alvo.id, &password_hash).await?;
        tracing::info!("🔒 Senha de '{}' alterada", alvo.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn usuario(username: &str, superuser: bool) -> Usuario {
        Usuario {
            id: Uuid::new_v4(),
            username: username.into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: String::new(),
            is_staff: superuser,
            is_superuser: superuser,
            is_active: true,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn profile_access_is_owner_or_superuser() {
        let maria = usuario("maria", false);
        assert!(pode_acessar_perfil(&maria, "maria"));
        assert!(!pode_acessar_perfil(&maria, "joao"));
        assert!(pode_acessar_perfil(&usuario("admin", true), "joao"));
    }
}
