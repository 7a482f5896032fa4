// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::single},
    models::auth::{Cargo, PerfilUsuario, Usuario, UsuarioComPerfil, MSG_USERNAME_EXISTE},
};

// Índice único criado na migration (LOWER(username))
const USERNAME_UNIQUE: &str = "usuarios_username_lower_key";

const SELECT_COM_PERFIL: &str = r#"
    SELECT u.*, p.cargo_es
    FROM usuarios u
    LEFT JOIN perfis_usuario p ON p.user_id = u.id
"#;

// Dados de uma conta nova, já com a senha em hash.
pub struct NovoUsuario<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
    pub is_staff: bool,
    pub is_superuser: bool,
}

// Traduz a violação do índice de username em erro de campo.
fn map_username_conflict(e: sqlx::Error, message: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(USERNAME_UNIQUE) | None => {
                    AppError::ValidationError(single("username", "unique", message))
                }
                Some(other) => AppError::UniqueConstraintViolation(other.to_string()),
            };
        }
    }
    e.into()
}

// Responsável pelas tabelas 'usuarios' e 'perfis_usuario'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(usuario)
    }

    /// Login: o username é comparado exatamente como digitado.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(usuario)
    }

    pub async fn create<'e, E>(&self, executor: E, novo: &NovoUsuario<'_>) -> Result<Usuario, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Usuario>(
            r#"
            INSERT INTO usuarios (username, email, first_name, last_name, password_hash, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(novo.username)
        .bind(novo.email)
        .bind(novo.first_name)
        .bind(novo.last_name)
        .bind(novo.password_hash)
        .bind(novo.is_staff)
        .bind(novo.is_superuser)
        .fetch_one(executor)
        .await
        .map_err(|e| map_username_conflict(e, MSG_USERNAME_EXISTE))
    }

    pub async fn create_perfil<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        cargo: Option<Cargo>,
    ) -> Result<PerfilUsuario, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let perfil = sqlx::query_as::<_, PerfilUsuario>(
            r#"
            INSERT INTO perfis_usuario (user_id, cargo_es)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET cargo_es = EXCLUDED.cargo_es
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(cargo)
        .fetch_one(executor)
        .await?;
        Ok(perfil)
    }

    /// Existe outra conta com esse username (sem diferenciar maiúsculas)?
    pub async fn username_taken<'e, E>(
        &self,
        executor: E,
        username: &str,
        exceto: Option<Uuid>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM usuarios
                WHERE LOWER(username) = LOWER($1)
                  AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(username)
        .bind(exceto)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    pub async fn update_identity<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        username: &str,
        first_name: &str,
        last_name: &str,
        conflito: &'static str,
    ) -> Result<Option<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Usuario>(
            r#"
            UPDATE usuarios SET username = $2, first_name = $3, last_name = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_username_conflict(e, conflito))
    }

    pub async fn set_password<'e, E>(&self, executor: E, id: Uuid, password_hash: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE usuarios SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn touch_last_login(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE usuarios SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn toggle_active<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuario = sqlx::query_as::<_, Usuario>(
            "UPDATE usuarios SET is_active = NOT is_active WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(usuario)
    }

    /// Perfil vai junto (CASCADE); anotações ficam com autor/editor nulos.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_com_perfil(&self) -> Result<Vec<UsuarioComPerfil>, AppError> {
        let sql = format!("{SELECT_COM_PERFIL} ORDER BY u.username ASC");
        let usuarios = sqlx::query_as::<_, UsuarioComPerfil>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(usuarios)
    }

    pub async fn find_com_perfil(&self, id: Uuid) -> Result<Option<UsuarioComPerfil>, AppError> {
        let sql = format!("{SELECT_COM_PERFIL} WHERE u.id = $1");
        let usuario = sqlx::query_as::<_, UsuarioComPerfil>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(usuario)
    }

    pub async fn find_com_perfil_by_username(&self, username: &str) -> Result<Option<UsuarioComPerfil>, AppError> {
        let sql = format!("{SELECT_COM_PERFIL} WHERE u.username = $1");
        let usuario = sqlx::query_as::<_, UsuarioComPerfil>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(usuario)
    }
}
