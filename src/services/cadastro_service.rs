// src/services/cadastro_service.rs

use chrono::{FixedOffset, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::non_empty},
    db::{AgendamentoRepository, AtendimentoRepository, CadastroRepository, FamiliarRepository},
    models::{
        agendamento::Agendamento,
        atendimento::Atendimento,
        cadastro::{
            AutocompleteResponse, Cadastro, CadastroDashboard, CadastroFiltro, CadastroListaResponse,
            CadastroPayload, CadastroStatus,
        },
    },
    services::media::MediaStore,
};

// Autocomplete só começa a partir de 2 caracteres e devolve no máximo 10.
const AUTOCOMPLETE_MIN_CHARS: usize = 2;
const AUTOCOMPLETE_LIMITE: i64 = 10;

/// Data de hoje no fuso configurado.
pub fn hoje_local(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}

/// Consulta curta demais não vai ao banco.
pub fn termo_autocomplete(q: Option<&str>) -> Option<&str> {
    non_empty(q).filter(|q| q.chars().count() >= AUTOCOMPLETE_MIN_CHARS)
}

#[derive(Clone)]
pub struct CadastroService {
    cadastro_repo: CadastroRepository,
    familiar_repo: FamiliarRepository,
    atendimento_repo: AtendimentoRepository,
    agendamento_repo: AgendamentoRepository,
    media: MediaStore,
    pool: PgPool,
    offset: FixedOffset,
}

impl CadastroService {
    pub fn new(
        cadastro_repo: CadastroRepository,
        familiar_repo: FamiliarRepository,
        atendimento_repo: AtendimentoRepository,
        agendamento_repo: AgendamentoRepository,
        media: MediaStore,
        pool: PgPool,
        offset: FixedOffset,
    ) -> Self {
        Self { cadastro_repo, familiar_repo, atendimento_repo, agendamento_repo, media, pool, offset }
    }

    pub async fn criar(&self, payload: CadastroPayload) -> Result<Cadastro, AppError> {
        let payload = payload.clean()?;
        let data_cadastro = payload.data_cadastro.valor().unwrap_or_else(|| hoje_local(self.offset));

        let cadastro = self.cadastro_repo.create(&self.pool, &payload, data_cadastro).await?;
        tracing::info!("📝 Cadastro criado: {} ({})", cadastro.nome, cadastro.id);
        Ok(cadastro)
    }

    pub async fn atualizar(&self, id: Uuid, payload: CadastroPayload) -> Result<Cadastro, AppError> {
        let payload = payload.clean()?;
        self.cadastro_repo
            .update(&self.pool, id, &payload)
            .await?
            .ok_or(AppError::NotFound("Cadastro"))
    }

    pub async fn detalhe(&self, id: Uuid) -> Result<Cadastro, AppError> {
        self.cadastro_repo.find_by_id(id).await?.ok_or(AppError::NotFound("Cadastro"))
    }

    /// Arquivar/reativar: o cadastro some das listas de ativos mas continua no banco.
    pub async fn alterar_status(&self, id: Uuid, status: CadastroStatus) -> Result<Cadastro, AppError> {
        let cadastro = self
            .cadastro_repo
            .set_status(&self.pool, id, status)
            .await?
            .ok_or(AppError::NotFound("Cadastro"))?;
        tracing::info!("Cadastro {} agora está {:?}", cadastro.id, cadastro.status);
        Ok(cadastro)
    }

    pub async fn excluir(&self, id: Uuid) -> Result<(), AppError> {
        if !self.cadastro_repo.delete(&self.pool, id).await? {
            return Err(AppError::NotFound("Cadastro"));
        }
        tracing::info!("🗑️ Cadastro {} excluído (familiares e anotações junto)", id);
        Ok(())
    }

    /// Listagem por filtro da URL. Filtro desconhecido é 404.
    pub async fn listar(&self, filtro: Option<&str>) -> Result<CadastroListaResponse, AppError> {
        let filtro = match filtro {
            None => CadastroFiltro::Todos,
            Some(raw) => CadastroFiltro::parse(raw).ok_or(AppError::NotFound("Filtro"))?,
        };

        if filtro == CadastroFiltro::Familiares {
            let familiares = self.familiar_repo.list_all().await?;
            return Ok(CadastroListaResponse { filtro: filtro.label(), cadastros: Vec::new(), familiares });
        }

        let cadastros = self.cadastro_repo.list(filtro.status(), None).await?;
        Ok(CadastroListaResponse { filtro: filtro.label(), cadastros, familiares: Vec::new() })
    }

    /// Painel de cadastros: busca por nome, separada em ativos e arquivados.
    pub async fn dashboard(&self, q: Option<&str>) -> Result<CadastroDashboard, AppError> {
        let busca = non_empty(q);
        let cadastros = self.cadastro_repo.list(None, busca).await?;
        let total = cadastros.len();
        let (ativos, arquivados): (Vec<_>, Vec<_>) =
            cadastros.into_iter().partition(|c| c.status == CadastroStatus::Ativo);

        Ok(CadastroDashboard { query: busca.unwrap_or_default().to_string(), ativos, arquivados, total })
    }

    pub async fn autocomplete(&self, q: Option<&str>) -> Result<AutocompleteResponse, AppError> {
        let Some(termo) = termo_autocomplete(q) else {
            return Ok(AutocompleteResponse { results: Vec::new() });
        };
        let results = self.cadastro_repo.autocomplete(termo, AUTOCOMPLETE_LIMITE).await?;
        Ok(AutocompleteResponse { results })
    }

    pub async fn historico_atendimentos(&self, id: Uuid) -> Result<(Cadastro, Vec<Atendimento>), AppError> {
        let cadastro = self.detalhe(id).await?;
        let atendimentos = self.atendimento_repo.historico(cadastro.id, &cadastro.nome).await?;
        Ok((cadastro, atendimentos))
    }

    pub async fn historico_agendamentos(&self, id: Uuid) -> Result<(Cadastro, Vec<Agendamento>), AppError> {
        let cadastro = self.detalhe(id).await?;
        let agendamentos = self.agendamento_repo.historico(cadastro.id, &cadastro.nome).await?;
        Ok((cadastro, agendamentos))
    }

    /// Confere o cadastro antes de gravar o arquivo.
    pub async fn salvar_foto(&self, id: Uuid, nome_arquivo: &str, conteudo: &[u8]) -> Result<String, AppError> {
        if !self.cadastro_repo.exists(&self.pool, id).await? {
            return Err(AppError::NotFound("Cadastro"));
        }
        let url = self.media.salvar_foto("cadastros", nome_arquivo, conteudo).await?;
        self.cadastro_repo
            .set_foto(&self.pool, id, &url)
            .await?
            .ok_or(AppError::NotFound("Cadastro"))?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autocomplete_needs_two_characters() {
        assert_eq!(termo_autocomplete(None), None);
        assert_eq!(termo_autocomplete(Some(" m ")), None);
        assert_eq!(termo_autocomplete(Some("ma")), Some("ma"));
        // conta caracteres, não bytes
        assert_eq!(termo_autocomplete(Some("é")), None);
        assert_eq!(termo_autocomplete(Some("Jo")), Some("Jo"));
    }

    #[test]
    fn local_today_follows_the_offset() {
        let sp = FixedOffset::west_opt(3 * 3600).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let diff = hoje_local(tokyo) - hoje_local(sp);
        assert!(diff.num_days() == 0 || diff.num_days() == 1);
    }
}
