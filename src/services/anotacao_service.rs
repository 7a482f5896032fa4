// src/services/anotacao_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CadastroRepository, LembreteRepository},
    models::lembrete::{AnotacaoEdicao, Lembrete, LembretePayload},
};

// Anotações (lembretes). Cada cadastro tem uma anotação "corrente": a
// editada por último. Sem cadastro, cada envio cria uma anotação avulsa.
#[derive(Clone)]
pub struct AnotacaoService {
    lembrete_repo: LembreteRepository,
    cadastro_repo: CadastroRepository,
    pool: PgPool,
}

impl AnotacaoService {
    pub fn new(lembrete_repo: LembreteRepository, cadastro_repo: CadastroRepository, pool: PgPool) -> Self {
        Self { lembrete_repo, cadastro_repo, pool }
    }

    pub async fn carregar(&self, cadastro_id: Option<Uuid>) -> Result<AnotacaoEdicao, AppError> {
        let Some(cadastro_id) = cadastro_id else {
            return Ok(AnotacaoEdicao { cadastro: None, lembrete: None });
        };

        let cadastro = self
            .cadastro_repo
            .find_resumo(&self.pool, cadastro_id)
            .await?
            .ok_or(AppError::NotFound("Cadastro"))?;
        let lembrete = self.lembrete_repo.latest_by_cadastro(&self.pool, cadastro_id).await?;

        Ok(AnotacaoEdicao { cadastro: Some(cadastro), lembrete })
    }

    /// Cria ou atualiza a anotação corrente. `criado_por` é gravado uma vez;
    /// `atualizado_por` sempre recebe quem salvou.
    /// Devolve a anotação e se ela foi criada agora.
    pub async fn salvar(
        &self,
        cadastro_id: Option<Uuid>,
        payload: LembretePayload,
        autor: Uuid,
    ) -> Result<(Lembrete, bool), AppError> {
        payload.validate_all()?;

        let mut tx = self.pool.begin().await?;

        let existente = match cadastro_id {
            Some(id) => {
                if !self.cadastro_repo.exists(&mut *tx, id).await? {
                    return Err(AppError::NotFound("Cadastro"));
                }
                self.lembrete_repo.latest_by_cadastro(&mut *tx, id).await?
            }
            None => None,
        };

        let resultado = match existente {
            Some(atual) => {
                let lembrete = self
                    .lembrete_repo
                    .update(&mut *tx, atual.id, &payload, autor)
                    .await?
                    .ok_or(AppError::NotFound("Anotação"))?;
                (lembrete, false)
            }
            None => (self.lembrete_repo.create(&mut *tx, cadastro_id, &payload, autor).await?, true),
        };

        tx.commit().await?;
        tracing::info!("🗒️ Anotação {} salva por {}", resultado.0.id, autor);
        Ok(resultado)
    }
}
