// src/services/atendimento_service.rs

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::with_link_check},
    db::{AtendimentoRepository, CadastroRepository},
    models::atendimento::{
        Atendimento, AtendimentoDashboard, AtendimentoFiltro, AtendimentoLinha, AtendimentoPayload,
        AtendimentoStatus,
    },
};

#[derive(Clone)]
pub struct AtendimentoService {
    atendimento_repo: AtendimentoRepository,
    cadastro_repo: CadastroRepository,
    pool: PgPool,
}

impl AtendimentoService {
    pub fn new(atendimento_repo: AtendimentoRepository, cadastro_repo: CadastroRepository, pool: PgPool) -> Self {
        Self { atendimento_repo, cadastro_repo, pool }
    }

    async fn vinculo_existe(&self, tx: &mut Transaction<'_, Postgres>, p: &AtendimentoPayload) -> Result<bool, AppError> {
        match p.cadastro_id {
            Some(id) => self.cadastro_repo.exists(&mut **tx, id).await,
            None => Ok(true),
        }
    }

    pub async fn listar(&self, filtro: &AtendimentoFiltro) -> Result<AtendimentoDashboard, AppError> {
        let (busca, data, status) = filtro.parse()?;
        let atendimentos = self.atendimento_repo.list(busca, data, status).await?;

        Ok(AtendimentoDashboard {
            query: busca.unwrap_or_default().to_string(),
            data: data.map(|d| d.to_string()).unwrap_or_default(),
            status: filtro.status.as_deref().map(str::trim).unwrap_or_default().to_string(),
            total: atendimentos.len(),
            atendimentos,
        })
    }

    /// O responsável é sempre quem está logado.
    pub async fn criar(&self, payload: AtendimentoPayload, responsavel: &str) -> Result<Atendimento, AppError> {
        let mut tx = self.pool.begin().await?;
        let vinculo_ok = self.vinculo_existe(&mut tx, &payload).await?;
        let data = with_link_check(payload.validate_all(), vinculo_ok)?;

        let atendimento = self.atendimento_repo.create(&mut *tx, &payload, data, responsavel).await?;
        tx.commit().await?;

        tracing::info!("📋 Atendimento {} registrado por {}", atendimento.id, responsavel);
        Ok(atendimento)
    }

    pub async fn detalhe(&self, id: Uuid) -> Result<AtendimentoLinha, AppError> {
        self.atendimento_repo.find_linha(id).await?.ok_or(AppError::NotFound("Atendimento"))
    }

    pub async fn atualizar(&self, id: Uuid, payload: AtendimentoPayload) -> Result<Atendimento, AppError> {
        let mut tx = self.pool.begin().await?;
        let vinculo_ok = self.vinculo_existe(&mut tx, &payload).await?;
        let data = with_link_check(payload.validate_all(), vinculo_ok)?;

        let atendimento = self
            .atendimento_repo
            .update(&mut *tx, id, &payload, data)
            .await?
            .ok_or(AppError::NotFound("Atendimento"))?;
        tx.commit().await?;
        Ok(atendimento)
    }

    pub async fn marcar_realizado(&self, id: Uuid) -> Result<Atendimento, AppError> {
        self.atendimento_repo
            .set_status(&self.pool, id, AtendimentoStatus::Realizado)
            .await?
            .ok_or(AppError::NotFound("Atendimento"))
    }

    pub async fn excluir(&self, id: Uuid) -> Result<(), AppError> {
        if !self.atendimento_repo.delete(&self.pool, id).await? {
            return Err(AppError::NotFound("Atendimento"));
        }
        tracing::info!("🗑️ Atendimento {} excluído", id);
        Ok(())
    }
}
