// src/db/lembrete_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lembrete::{Lembrete, LembretePayload},
};

#[derive(Clone)]
pub struct LembreteRepository {
    pool: PgPool,
}

impl LembreteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Anotação editada por último no cadastro.
    pub async fn latest_by_cadastro<'e, E>(&self, executor: E, cadastro_id: Uuid) -> Result<Option<Lembrete>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lembrete = sqlx::query_as::<_, Lembrete>(
            r#"
            SELECT * FROM lembretes
            WHERE cadastro_id = $1
            ORDER BY data_atualizacao DESC
            LIMIT 1
            "#,
        )
        .bind(cadastro_id)
        .fetch_optional(executor)
        .await?;
        Ok(lembrete)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        cadastro_id: Option<Uuid>,
        p: &LembretePayload,
        autor: Uuid,
    ) -> Result<Lembrete, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lembrete = sqlx::query_as::<_, Lembrete>(
            r#"
            INSERT INTO lembretes (cadastro_id, titulo, anotacao, urgencia, criado_por, atualizado_por)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(cadastro_id)
        .bind(p.titulo.trim())
        .bind(p.anotacao.as_str())
        .bind(p.urgencia())
        .bind(autor)
        .fetch_one(executor)
        .await?;
        Ok(lembrete)
    }

    /// `criado_por` só é preenchido se estiver vazio; `atualizado_por` sempre muda.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        p: &LembretePayload,
        editor: Uuid,
    ) -> Result<Option<Lembrete>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lembrete = sqlx::query_as::<_, Lembrete>(
            r#"
            UPDATE lembretes SET
                titulo = $2, anotacao = $3, urgencia = $4,
                criado_por = COALESCE(criado_por, $5),
                atualizado_por = $5,
                data_atualizacao = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(p.titulo.trim())
        .bind(p.anotacao.as_str())
        .bind(p.urgencia())
        .bind(editor)
        .fetch_optional(executor)
        .await?;
        Ok(lembrete)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Lembrete>, AppError> {
        let lembrete = sqlx::query_as::<_, Lembrete>("SELECT * FROM lembretes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lembrete)
    }
}
