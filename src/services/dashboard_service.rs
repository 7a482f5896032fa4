// src/services/dashboard_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{AgendamentoRepository, DashboardRepository},
    models::{auth::Usuario, dashboard::HomeResumo},
};

const AGENDAMENTOS_RECENTES: i64 = 10;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    agendamento_repo: AgendamentoRepository,
    pool: PgPool,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, agendamento_repo: AgendamentoRepository, pool: PgPool) -> Self {
        Self { repo, agendamento_repo, pool }
    }

    pub async fn home(&self, usuario: &Usuario) -> Result<HomeResumo, AppError> {
        // Snapshot consistente dos contadores e das listas
        let mut tx = self.pool.begin().await?;

        let totais = self.repo.totais(&mut *tx).await?;
        let ultimo_cadastro = self.repo.ultimo_cadastro(&mut *tx).await?;
        let agendamentos_recentes = self.agendamento_repo.recentes(&mut *tx, AGENDAMENTOS_RECENTES).await?;

        tx.commit().await?;

        Ok(HomeResumo {
            user_name: usuario.username.clone(),
            totais,
            ultimo_cadastro,
            agendamentos_recentes,
        })
    }
}
