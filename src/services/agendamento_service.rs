// src/services/agendamento_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::with_link_check},
    db::{AgendamentoRepository, CadastroRepository},
    models::agendamento::{Agendamento, AgendamentoDashboard, AgendamentoFiltro, AgendamentoLinha, AgendamentoPayload},
};

#[derive(Clone)]
pub struct AgendamentoService {
    agendamento_repo: AgendamentoRepository,
    cadastro_repo: CadastroRepository,
    pool: PgPool,
}

impl AgendamentoService {
    pub fn new(agendamento_repo: AgendamentoRepository, cadastro_repo: CadastroRepository, pool: PgPool) -> Self {
        Self { agendamento_repo, cadastro_repo, pool }
    }

    pub async fn listar(&self, filtro: &AgendamentoFiltro) -> Result<AgendamentoDashboard, AppError> {
        let (busca, data) = filtro.parse()?;
        let agendamentos = self.agendamento_repo.list(busca, data).await?;

        Ok(AgendamentoDashboard {
            query: busca.unwrap_or_default().to_string(),
            data: data.map(|d| d.to_string()).unwrap_or_default(),
            total: agendamentos.len(),
            agendamentos,
        })
    }

    pub async fn criar(&self, payload: AgendamentoPayload) -> Result<Agendamento, AppError> {
        let mut tx = self.pool.begin().await?;
        let vinculo_ok = match payload.cadastro_id {
            Some(id) => self.cadastro_repo.exists(&mut *tx, id).await?,
            None => true,
        };
        let data = with_link_check(payload.validate_all(), vinculo_ok)?;

        let agendamento = self.agendamento_repo.create(&mut *tx, &payload, data).await?;
        tx.commit().await?;

        tracing::info!("📅 Agendamento {} para {} em {}", agendamento.id, agendamento.nome_atendido, data);
        Ok(agendamento)
    }

    pub async fn detalhe(&self, id: Uuid) -> Result<AgendamentoLinha, AppError> {
        self.agendamento_repo.find_linha(id).await?.ok_or(AppError::NotFound("Agendamento"))
    }

    pub async fn atualizar(&self, id: Uuid, payload: AgendamentoPayload) -> Result<Agendamento, AppError> {
        let mut tx = self.pool.begin().await?;
        let vinculo_ok = match payload.cadastro_id {
            Some(cadastro_id) => self.cadastro_repo.exists(&mut *tx, cadastro_id).await?,
            None => true,
        };
        let data = with_link_check(payload.validate_all(), vinculo_ok)?;

        let agendamento = self
            .agendamento_repo
            .update(&mut *tx, id, &payload, data)
            .await?
            .ok_or(AppError::NotFound("Agendamento"))?;
        tx.commit().await?;
        Ok(agendamento)
    }

    pub async fn excluir(&self, id: Uuid) -> Result<(), AppError> {
        if !self.agendamento_repo.delete(&self.pool, id).await? {
            return Err(AppError::NotFound("Agendamento"));
        }
        tracing::info!("🗑️ Agendamento {} excluído", id);
        Ok(())
    }
}
