// src/db/dashboard_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::{cadastro::CadastroResumo, dashboard::Totais},
};

// Consultas agregadas da página inicial. O serviço roda tudo numa
// transação para ter um retrato consistente.
#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn totais<'e, E>(&self, executor: E) -> Result<Totais, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totais = sqlx::query_as::<_, Totais>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM cadastros) AS total_cadastros,
                (SELECT COUNT(*) FROM cadastros WHERE status = 'ativo') AS cadastros_ativos,
                (SELECT COUNT(*) FROM cadastros WHERE status = 'arquivado') AS cadastros_arquivados,
                (SELECT COUNT(*) FROM agendamentos) AS total_agendamentos,
                (SELECT COUNT(*) FROM atendimentos) AS total_atendimentos
            "#,
        )
        .fetch_one(executor)
        .await?;
        Ok(totais)
    }

    pub async fn ultimo_cadastro<'e, E>(&self, executor: E) -> Result<Option<CadastroResumo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let resumo = sqlx::query_as::<_, CadastroResumo>(
            r#"
            SELECT id, nome, status, data_cadastro FROM cadastros
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(executor)
        .await?;
        Ok(resumo)
    }
}
