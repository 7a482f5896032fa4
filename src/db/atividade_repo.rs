// src/db/atividade_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::atividade::{AgendamentoAtividade, AnotacaoAtividade, AtendimentoAtividade, CadastroAtividade},
};

// Leituras do feed de atividades. Datas são inclusivas nas duas pontas;
// anotações usam o intervalo [desde, ate) já convertido para UTC.
#[derive(Clone, Default)]
pub struct AtividadeRepository;

impl AtividadeRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn cadastros<'e, E>(
        &self,
        executor: E,
        inicio: Option<NaiveDate>,
        fim: Option<NaiveDate>,
    ) -> Result<Vec<CadastroAtividade>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, CadastroAtividade>(
            r#"
            SELECT id, nome, data_cadastro FROM cadastros
            WHERE ($1::date IS NULL OR data_cadastro >= $1)
              AND ($2::date IS NULL OR data_cadastro <= $2)
            ORDER BY data_cadastro DESC, created_at DESC
            "#,
        )
        .bind(inicio)
        .bind(fim)
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }

    pub async fn agendamentos<'e, E>(
        &self,
        executor: E,
        inicio: Option<NaiveDate>,
        fim: Option<NaiveDate>,
    ) -> Result<Vec<AgendamentoAtividade>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, AgendamentoAtividade>(
            r#"
            SELECT id, nome_atendido, data_agendamento FROM agendamentos
            WHERE ($1::date IS NULL OR data_agendamento >= $1)
              AND ($2::date IS NULL OR data_agendamento <= $2)
            ORDER BY data_agendamento DESC, created_at DESC
            "#,
        )
        .bind(inicio)
        .bind(fim)
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }

    pub async fn atendimentos<'e, E>(
        &self,
        executor: E,
        inicio: Option<NaiveDate>,
        fim: Option<NaiveDate>,
    ) -> Result<Vec<AtendimentoAtividade>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, AtendimentoAtividade>(
            r#"
            SELECT id, nome_pessoa_atendida, data_atendimento, profissional_responsavel
            FROM atendimentos
            WHERE ($1::date IS NULL OR data_atendimento >= $1)
              AND ($2::date IS NULL OR data_atendimento <= $2)
            ORDER BY data_atendimento DESC, created_at DESC
            "#,
        )
        .bind(inicio)
        .bind(fim)
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }

    pub async fn anotacoes<'e, E>(
        &self,
        executor: E,
        desde: Option<DateTime<Utc>>,
        ate: Option<DateTime<Utc>>,
    ) -> Result<Vec<AnotacaoAtividade>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, AnotacaoAtividade>(
            r#"
            SELECT l.id, l.cadastro_id, c.nome AS cadastro_nome, l.data_criacao,
                   u.username AS autor
            FROM lembretes l
            LEFT JOIN cadastros c ON c.id = l.cadastro_id
            LEFT JOIN usuarios u ON u.id = l.criado_por
            WHERE ($1::timestamptz IS NULL OR l.data_criacao >= $1)
              AND ($2::timestamptz IS NULL OR l.data_criacao < $2)
            ORDER BY l.data_criacao DESC
            "#,
        )
        .bind(desde)
        .bind(ate)
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }
}
