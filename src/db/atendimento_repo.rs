// src/db/atendimento_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::like_pattern},
    models::atendimento::{Atendimento, AtendimentoLinha, AtendimentoPayload, AtendimentoStatus},
};

// Atendimento + cadastro vinculado (chave explícita; sem ela, o cadastro
// mais antigo com o mesmo nome). `vinculo_ambiguo` marca homônimos.
const SELECT_LINHA: &str = r#"
    SELECT a.*,
           v.id AS vinculo_id,
           v.nome AS vinculo_nome,
           (a.cadastro_id IS NULL AND h.total > 1) AS vinculo_ambiguo
    FROM atendimentos a
    LEFT JOIN LATERAL (
        SELECT c.id, c.nome FROM cadastros c
        WHERE (a.cadastro_id IS NOT NULL AND c.id = a.cadastro_id)
           OR (a.cadastro_id IS NULL AND LOWER(c.nome) = LOWER(a.nome_pessoa_atendida))
        ORDER BY c.created_at ASC
        LIMIT 1
    ) v ON TRUE
    CROSS JOIN LATERAL (
        SELECT COUNT(*) AS total FROM cadastros c
        WHERE LOWER(c.nome) = LOWER(a.nome_pessoa_atendida)
    ) h
"#;

#[derive(Clone)]
pub struct AtendimentoRepository {
    pool: PgPool,
}

impl AtendimentoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        p: &AtendimentoPayload,
        data_atendimento: NaiveDate,
        profissional_responsavel: &str,
    ) -> Result<Atendimento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let atendimento = sqlx::query_as::<_, Atendimento>(
            r#"
            INSERT INTO atendimentos (
                cadastro_id, nome_pessoa_atendida, data_atendimento, local_atendimento,
                tipo_atendimento, perfil_pessoa_atendida, motivo_procura, objetivo_atendimento,
                profissional_responsavel, outras_pessoas_participantes, descricao_atendimento
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(p.cadastro_id)
        .bind(p.nome_pessoa_atendida.trim())
        .bind(data_atendimento)
        .bind(p.local_atendimento.valor())
        .bind(p.tipo_atendimento.valor())
        .bind(p.perfil_pessoa_atendida.valor())
        .bind(p.motivo_procura.valor())
        .bind(p.objetivo_atendimento.trim())
        .bind(profissional_responsavel)
        .bind(p.outras_pessoas_participantes.trim())
        .bind(p.descricao_atendimento.as_str())
        .fetch_one(executor)
        .await?;

        Ok(atendimento)
    }

    /// Edição: `profissional_responsavel` e `status` ficam como estão.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        p: &AtendimentoPayload,
        data_atendimento: NaiveDate,
    ) -> Result<Option<Atendimento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let atendimento = sqlx::query_as::<_, Atendimento>(
            r#"
            UPDATE atendimentos SET
                cadastro_id = $2, nome_pessoa_atendida = $3, data_atendimento = $4,
                local_atendimento = $5, tipo_atendimento = $6, perfil_pessoa_atendida = $7,
                motivo_procura = $8, objetivo_atendimento = $9,
                outras_pessoas_participantes = $10, descricao_atendimento = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(p.cadastro_id)
        .bind(p.nome_pessoa_atendida.trim())
        .bind(data_atendimento)
        .bind(p.local_atendimento.valor())
        .bind(p.tipo_atendimento.valor())
        .bind(p.perfil_pessoa_atendida.valor())
        .bind(p.motivo_procura.valor())
        .bind(p.objetivo_atendimento.trim())
        .bind(p.outras_pessoas_participantes.trim())
        .bind(p.descricao_atendimento.as_str())
        .fetch_optional(executor)
        .await?;

        Ok(atendimento)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: AtendimentoStatus,
    ) -> Result<Option<Atendimento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let atendimento =
            sqlx::query_as::<_, Atendimento>("UPDATE atendimentos SET status = $2 WHERE id = $1 RETURNING *")
                .bind(id)
                .bind(status)
                .fetch_optional(executor)
                .await?;
        Ok(atendimento)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM atendimentos WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_linha(&self, id: Uuid) -> Result<Option<AtendimentoLinha>, AppError> {
        let sql = format!("{SELECT_LINHA} WHERE a.id = $1");
        let linha = sqlx::query_as::<_, AtendimentoLinha>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(linha)
    }

    /// Painel de atendimentos: trecho do nome, data exata e status, mais recentes primeiro.
    pub async fn list(
        &self,
        busca: Option<&str>,
        data: Option<NaiveDate>,
        status: Option<AtendimentoStatus>,
    ) -> Result<Vec<AtendimentoLinha>, AppError> {
        let sql = format!(
            "{SELECT_LINHA}
            WHERE ($1::text IS NULL OR a.nome_pessoa_atendida ILIKE $1)
              AND ($2::date IS NULL OR a.data_atendimento = $2)
              AND ($3::atendimento_status IS NULL OR a.status = $3)
            ORDER BY a.data_atendimento DESC, a.created_at DESC"
        );
        let linhas = sqlx::query_as::<_, AtendimentoLinha>(&sql)
            .bind(busca.map(like_pattern))
            .bind(data)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(linhas)
    }

    /// Histórico do cadastro: vinculados pela chave, mais os sem vínculo
    /// cujo nome é igual ao do cadastro (sem diferenciar maiúsculas).
    pub async fn historico(&self, cadastro_id: Uuid, nome: &str) -> Result<Vec<Atendimento>, AppError> {
        let atendimentos = sqlx::query_as::<_, Atendimento>(
            r#"
            SELECT * FROM atendimentos
            WHERE cadastro_id = $1
               OR (cadastro_id IS NULL AND LOWER(nome_pessoa_atendida) = LOWER($2))
            ORDER BY data_atendimento DESC, created_at DESC
            "#,
        )
        .bind(cadastro_id)
        .bind(nome.trim())
        .fetch_all(&self.pool)
        .await?;
        Ok(atendimentos)
    }
}
