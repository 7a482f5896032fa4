// src/services/familiar_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CadastroRepository, FamiliarRepository},
    models::familiar::{Familiar, FamiliarDetalhe, FamiliarPayload, FamiliaresDoCadastro},
    services::media::MediaStore,
};

#[derive(Clone)]
pub struct FamiliarService {
    familiar_repo: FamiliarRepository,
    cadastro_repo: CadastroRepository,
    media: MediaStore,
    pool: PgPool,
}

impl FamiliarService {
    pub fn new(
        familiar_repo: FamiliarRepository,
        cadastro_repo: CadastroRepository,
        media: MediaStore,
        pool: PgPool,
    ) -> Self {
        Self { familiar_repo, cadastro_repo, media, pool }
    }

    pub async fn listar_do_cadastro(&self, cadastro_id: Uuid) -> Result<FamiliaresDoCadastro, AppError> {
        let cadastro = self.cadastro_repo.find_by_id(cadastro_id).await?.ok_or(AppError::NotFound("Cadastro"))?;
        let familiares = self.familiar_repo.list_by_cadastro(cadastro.id).await?;
        Ok(FamiliaresDoCadastro { cadastro_id: cadastro.id, cadastro_nome: cadastro.nome, familiares })
    }

    /// Familiar ligado a um cadastro: as regras de avulso não se aplicam.
    pub async fn criar_no_cadastro(&self, cadastro_id: Uuid, payload: FamiliarPayload) -> Result<Familiar, AppError> {
        let payload = payload.clean(false)?;

        let mut tx = self.pool.begin().await?;
        if !self.cadastro_repo.exists(&mut *tx, cadastro_id).await? {
            return Err(AppError::NotFound("Cadastro"));
        }
        let familiar = self.familiar_repo.create(&mut *tx, Some(cadastro_id), &payload).await?;
        tx.commit().await?;

        tracing::info!("👪 Familiar {} adicionado ao cadastro {}", familiar.id, cadastro_id);
        Ok(familiar)
    }

    pub async fn criar_avulso(&self, payload: FamiliarPayload) -> Result<Familiar, AppError> {
        let payload = payload.clean(true)?;
        let familiar = self.familiar_repo.create(&self.pool, None, &payload).await?;
        tracing::info!("👪 Familiar avulso {} criado", familiar.id);
        Ok(familiar)
    }

    pub async fn detalhe(&self, id: Uuid) -> Result<FamiliarDetalhe, AppError> {
        let familiar = self.familiar_repo.find_by_id(id).await?.ok_or(AppError::NotFound("Familiar"))?;
        Ok(FamiliarDetalhe::from(familiar))
    }

    /// Na edição, o familiar continua avulso ou ligado como já estava.
    pub async fn atualizar(&self, id: Uuid, payload: FamiliarPayload) -> Result<Familiar, AppError> {
        let atual = self.familiar_repo.find_by_id(id).await?.ok_or(AppError::NotFound("Familiar"))?;
        let payload = payload.clean(atual.cadastro_id.is_none())?;
        self.familiar_repo
            .update(&self.pool, id, &payload)
            .await?
            .ok_or(AppError::NotFound("Familiar"))
    }

    /// Devolve o familiar removido (o handler usa o cadastro para redirecionar).
    pub async fn excluir(&self, id: Uuid) -> Result<Familiar, AppError> {
        let familiar = self.familiar_repo.delete(&self.pool, id).await?.ok_or(AppError::NotFound("Familiar"))?;
        tracing::info!("🗑️ Familiar {} excluído", familiar.id);
        Ok(familiar)
    }

    pub async fn salvar_foto(&self, id: Uuid, nome_arquivo: &str, conteudo: &[u8]) -> Result<String, AppError> {
        if self.familiar_repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("Familiar"));
        }
        let url = self.media.salvar_foto("familiares", nome_arquivo, conteudo).await?;
        self.familiar_repo
            .set_foto(&self.pool, id, &url)
            .await?
            .ok_or(AppError::NotFound("Familiar"))?;
        Ok(url)
    }
}
