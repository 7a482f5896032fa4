// src/db/familiar_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::valores},
    models::familiar::{Familiar, FamiliarPayload},
};

#[derive(Clone)]
pub struct FamiliarRepository {
    pool: PgPool,
}

impl FamiliarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `cadastro_id = None` grava um familiar avulso.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        cadastro_id: Option<Uuid>,
        p: &FamiliarPayload,
    ) -> Result<Familiar, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let familiar = sqlx::query_as::<_, Familiar>(
            r#"
            INSERT INTO familiares (
                cadastro_id, nome, nome_social, data_nascimento, sexo_biologico,
                identidade_etnico_racial, pessoa_transexual, cpf_numero, nis_numero,
                documentos_possui, documentos_ausentes, parentesco,
                perfil_referencia_egresso, perfil_referencia_pre_egresso, nome_interno_referencia,
                bairro, telefone_numero, telefone_contato, telefone_observacao, email_contato
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING *
            "#,
        )
        .bind(cadastro_id)
        .bind(p.nome.trim())
        .bind(p.nome_social.trim())
        .bind(p.data_nascimento.valor())
        .bind(p.sexo_biologico.valor())
        .bind(p.identidade_etnico_racial.valor())
        .bind(p.pessoa_transexual)
        .bind(p.cpf_numero.as_str())
        .bind(p.nis_numero.trim())
        .bind(valores(&p.documentos_possui))
        .bind(valores(&p.documentos_ausentes))
        .bind(p.parentesco.trim())
        .bind(p.perfil_referencia_egresso)
        .bind(p.perfil_referencia_pre_egresso)
        .bind(p.nome_interno_referencia.as_str())
        .bind(p.bairro.trim())
        .bind(p.telefone_numero.trim())
        .bind(p.telefone_contato.trim())
        .bind(p.telefone_observacao.trim())
        .bind(p.email_contato.trim())
        .fetch_one(executor)
        .await?;

        Ok(familiar)
    }

    /// Atualiza os dados do formulário; o vínculo com o cadastro não muda.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        p: &FamiliarPayload,
    ) -> Result<Option<Familiar>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let familiar = sqlx::query_as::<_, Familiar>(
            r#"
            UPDATE familiares SET
                nome = $2, nome_social = $3, data_nascimento = $4, sexo_biologico = $5,
                identidade_etnico_racial = $6, pessoa_transexual = $7, cpf_numero = $8,
                nis_numero = $9, documentos_possui = $10, documentos_ausentes = $11,
                parentesco = $12, perfil_referencia_egresso = $13,
                perfil_referencia_pre_egresso = $14, nome_interno_referencia = $15,
                bairro = $16, telefone_numero = $17, telefone_contato = $18,
                telefone_observacao = $19, email_contato = $20
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(p.nome.trim())
        .bind(p.nome_social.trim())
        .bind(p.data_nascimento.valor())
        .bind(p.sexo_biologico.valor())
        .bind(p.identidade_etnico_racial.valor())
        .bind(p.pessoa_transexual)
        .bind(p.cpf_numero.as_str())
        .bind(p.nis_numero.trim())
        .bind(valores(&p.documentos_possui))
        .bind(valores(&p.documentos_ausentes))
        .bind(p.parentesco.trim())
        .bind(p.perfil_referencia_egresso)
        .bind(p.perfil_referencia_pre_egresso)
        .bind(p.nome_interno_referencia.as_str())
        .bind(p.bairro.trim())
        .bind(p.telefone_numero.trim())
        .bind(p.telefone_contato.trim())
        .bind(p.telefone_observacao.trim())
        .bind(p.email_contato.trim())
        .fetch_optional(executor)
        .await?;

        Ok(familiar)
    }

    pub async fn set_foto<'e, E>(&self, executor: E, id: Uuid, foto: &str) -> Result<Option<Familiar>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let familiar = sqlx::query_as::<_, Familiar>("UPDATE familiares SET foto = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(foto)
            .fetch_optional(executor)
            .await?;
        Ok(familiar)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Familiar>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Devolve a linha apagada para saber para onde voltar (cadastro ou lista)
        let familiar = sqlx::query_as::<_, Familiar>("DELETE FROM familiares WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(familiar)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Familiar>, AppError> {
        let familiar = sqlx::query_as::<_, Familiar>("SELECT * FROM familiares WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(familiar)
    }

    pub async fn list_by_cadastro(&self, cadastro_id: Uuid) -> Result<Vec<Familiar>, AppError> {
        let familiares = sqlx::query_as::<_, Familiar>(
            "SELECT * FROM familiares WHERE cadastro_id = $1 ORDER BY data_criacao DESC",
        )
        .bind(cadastro_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(familiares)
    }

    /// Todos os familiares (ligados ou avulsos), para o filtro "familiares".
    pub async fn list_all(&self) -> Result<Vec<Familiar>, AppError> {
        let familiares = sqlx::query_as::<_, Familiar>("SELECT * FROM familiares ORDER BY data_criacao DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(familiares)
    }
}
