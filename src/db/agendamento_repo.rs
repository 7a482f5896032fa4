// src/db/agendamento_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::like_pattern},
    models::agendamento::{Agendamento, AgendamentoLinha, AgendamentoPayload},
};

// Mesmo critério de vínculo dos atendimentos.
const SELECT_LINHA: &str = r#"
    SELECT g.*,
           v.id AS vinculo_id,
           v.nome AS vinculo_nome,
           (g.cadastro_id IS NULL AND h.total > 1) AS vinculo_ambiguo
    FROM agendamentos g
    LEFT JOIN LATERAL (
        SELECT c.id, c.nome FROM cadastros c
        WHERE (g.cadastro_id IS NOT NULL AND c.id = g.cadastro_id)
           OR (g.cadastro_id IS NULL AND LOWER(c.nome) = LOWER(g.nome_atendido))
        ORDER BY c.created_at ASC
        LIMIT 1
    ) v ON TRUE
    CROSS JOIN LATERAL (
        SELECT COUNT(*) AS total FROM cadastros c
        WHERE LOWER(c.nome) = LOWER(g.nome_atendido)
    ) h
"#;

#[derive(Clone)]
pub struct AgendamentoRepository {
    pool: PgPool,
}

impl AgendamentoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        p: &AgendamentoPayload,
        data_agendamento: NaiveDate,
    ) -> Result<Agendamento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let agendamento = sqlx::query_as::<_, Agendamento>(
            r#"
            INSERT INTO agendamentos (
                cadastro_id, nome_atendido, tipo_agendamento, data_agendamento,
                horario_atendimento, observacoes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(p.cadastro_id)
        .bind(p.nome_atendido.trim())
        .bind(p.tipo_agendamento.valor())
        .bind(data_agendamento)
        .bind(p.horario_atendimento.valor())
        .bind(p.observacoes.as_str())
        .fetch_one(executor)
        .await?;

        Ok(agendamento)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        p: &AgendamentoPayload,
        data_agendamento: NaiveDate,
    ) -> Result<Option<Agendamento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let agendamento = sqlx::query_as::<_, Agendamento>(
            r#"
            UPDATE agendamentos SET
                cadastro_id = $2, nome_atendido = $3, tipo_agendamento = $4,
                data_agendamento = $5, horario_atendimento = $6, observacoes = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(p.cadastro_id)
        .bind(p.nome_atendido.trim())
        .bind(p.tipo_agendamento.valor())
        .bind(data_agendamento)
        .bind(p.horario_atendimento.valor())
        .bind(p.observacoes.as_str())
        .fetch_optional(executor)
        .await?;

        Ok(agendamento)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM agendamentos WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_linha(&self, id: Uuid) -> Result<Option<AgendamentoLinha>, AppError> {
        let sql = format!("{SELECT_LINHA} WHERE g.id = $1");
        let linha = sqlx::query_as::<_, AgendamentoLinha>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(linha)
    }

    pub async fn list(&self, busca: Option<&str>, data: Option<NaiveDate>) -> Result<Vec<AgendamentoLinha>, AppError> {
        let sql = format!(
            "{SELECT_LINHA}
            WHERE ($1::text IS NULL OR g.nome_atendido ILIKE $1)
              AND ($2::date IS NULL OR g.data_agendamento = $2)
            ORDER BY g.data_agendamento DESC, g.horario_atendimento DESC NULLS LAST, g.created_at DESC"
        );
        let linhas = sqlx::query_as::<_, AgendamentoLinha>(&sql)
            .bind(busca.map(like_pattern))
            .bind(data)
            .fetch_all(&self.pool)
            .await?;
        Ok(linhas)
    }

    /// Os `limite` agendamentos de data mais recente, já com o vínculo.
    pub async fn recentes<'e, E>(&self, executor: E, limite: i64) -> Result<Vec<AgendamentoLinha>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{SELECT_LINHA} ORDER BY g.data_agendamento DESC, g.created_at DESC LIMIT $1");
        let linhas = sqlx::query_as::<_, AgendamentoLinha>(&sql)
            .bind(limite)
            .fetch_all(executor)
            .await?;
        Ok(linhas)
    }

    pub async fn historico(&self, cadastro_id: Uuid, nome: &str) -> Result<Vec<Agendamento>, AppError> {
        let agendamentos = sqlx::query_as::<_, Agendamento>(
            r#"
            SELECT * FROM agendamentos
            WHERE cadastro_id = $1
               OR (cadastro_id IS NULL AND LOWER(nome_atendido) = LOWER($2))
            ORDER BY data_agendamento DESC, created_at DESC
            "#,
        )
        .bind(cadastro_id)
        .bind(nome.trim())
        .fetch_all(&self.pool)
        .await?;
        Ok(agendamentos)
    }
}
