// src/services/atividade_service.rs

use chrono::FixedOffset;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::AtividadeRepository,
    models::atividade::{
        limites_utc, montar_feed, AtividadeQuery, AtividadesResponse, FontesAtividade, TipoAtividade,
    },
};

#[derive(Clone)]
pub struct AtividadeService {
    atividade_repo: AtividadeRepository,
    pool: PgPool,
    offset: FixedOffset,
}

impl AtividadeService {
    pub fn new(atividade_repo: AtividadeRepository, pool: PgPool, offset: FixedOffset) -> Self {
        Self { atividade_repo, pool, offset }
    }

    /// Feed "minhas atividades": só consulta as fontes pedidas no filtro.
    pub async fn feed(&self, query: &AtividadeQuery) -> Result<AtividadesResponse, AppError> {
        let filtro = query.parse()?;
        let (desde, ate) = limites_utc(&filtro, self.offset);

        // Mesma transação para as quatro leituras
        let mut tx = self.pool.begin().await?;
        let mut fontes = FontesAtividade::default();

        if filtro.tipo.inclui(TipoAtividade::Cadastros) {
            fontes.cadastros = self.atividade_repo.cadastros(&mut *tx, filtro.inicio, filtro.fim).await?;
        }
        if filtro.tipo.inclui(TipoAtividade::Agendamentos) {
            fontes.agendamentos = self.atividade_repo.agendamentos(&mut *tx, filtro.inicio, filtro.fim).await?;
        }
        if filtro.tipo.inclui(TipoAtividade::Atendimentos) {
            fontes.atendimentos = self.atividade_repo.atendimentos(&mut *tx, filtro.inicio, filtro.fim).await?;
        }
        if filtro.tipo.inclui(TipoAtividade::Anotacoes) {
            fontes.anotacoes = self.atividade_repo.anotacoes(&mut *tx, desde, ate).await?;
        }
        tx.commit().await?;

        let atividades = montar_feed(fontes, self.offset);
        let texto = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_string();

        Ok(AtividadesResponse {
            total_atividades: atividades.len(),
            atividades,
            filtro_tipo: texto(&query.tipo_atividade),
            data_inicio: texto(&query.data_inicio),
            data_fim: texto(&query.data_fim),
        })
    }
}
