// src/db/cadastro_repo.rs

use std::sync::LazyLock;

use chrono::NaiveDate;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        validation::{like_pattern, valores},
    },
    models::cadastro::{AutocompleteItem, Cadastro, CadastroPayload, CadastroResumo, CadastroStatus},
};

// Colunas preenchidas pelo formulário, na mesma ordem dos binds em `bind_payload`.
const COLUNAS: [&str; 45] = [
    "nome",
    "nome_social",
    "sexo_biologico",
    "identidade_genero",
    "identidade_sexual",
    "pessoa_transexual",
    "data_nascimento",
    "naturalidade",
    "data_cadastro",
    "religiao",
    "religiao_desde_quando",
    "identidade_etnico_racial",
    "estado_civil",
    "nome_mae",
    "nome_pai",
    "status_ocupacional",
    "grau_instrucao",
    "serie_concluida",
    "fez_ensino_superior",
    "curso_superior",
    "experiencia_escolar",
    "estuda_atualmente",
    "horario_turno_estudo",
    "documentos_apresentados",
    "documentos_ausentes",
    "cpf_numero",
    "rg_numero",
    "titulo_eleitor_numero",
    "numero_processo_pep",
    "cnh_categoria",
    "procedencia",
    "procedencia_outro",
    "motivo_procura",
    "orientado_escritorio_social",
    "encaminhamento",
    "encaminhamento_detalhe",
    "endereco",
    "bairro",
    "cidade",
    "estado_uf",
    "ponto_referencia",
    "zona_cidade",
    "telefone_numero",
    "telefone_contato",
    "email_contato",
];

static INSERT_SQL: LazyLock<String> = LazyLock::new(|| {
    let placeholders: Vec<String> = (1..=COLUNAS.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO cadastros ({}) VALUES ({}) RETURNING *",
        COLUNAS.join(", "),
        placeholders.join(", ")
    )
});

// $1 é o id; data_cadastro vazia mantém a data gravada.
static UPDATE_SQL: LazyLock<String> = LazyLock::new(|| {
    let sets: Vec<String> = COLUNAS
        .iter()
        .enumerate()
        .map(|(i, col)| match *col {
            "data_cadastro" => format!("{col} = COALESCE(${}, data_cadastro)", i + 2),
            _ => format!("{col} = ${}", i + 2),
        })
        .collect();
    format!(
        "UPDATE cadastros SET {}, updated_at = NOW() WHERE id = $1 RETURNING *",
        sets.join(", ")
    )
});

fn bind_payload<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    p: &'q CadastroPayload,
    data_cadastro: Option<NaiveDate>,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    query
        .bind(p.nome.as_str())
        .bind(p.nome_social.as_str())
        .bind(p.sexo_biologico.valor())
        .bind(p.identidade_genero.valor())
        .bind(p.identidade_sexual.valor())
        .bind(p.pessoa_transexual)
        .bind(p.data_nascimento.valor())
        .bind(p.naturalidade.as_str())
        .bind(data_cadastro)
        .bind(p.religiao.valor())
        .bind(p.religiao_desde_quando.as_str())
        .bind(p.identidade_etnico_racial.valor())
        .bind(p.estado_civil.valor())
        .bind(p.nome_mae.as_str())
        .bind(p.nome_pai.as_str())
        .bind(p.status_ocupacional.valor())
        .bind(p.grau_instrucao.valor())
        .bind(p.serie_concluida.as_str())
        .bind(p.fez_ensino_superior.valor())
        .bind(p.curso_superior.as_str())
        .bind(p.experiencia_escolar.as_str())
        .bind(p.estuda_atualmente.valor())
        .bind(p.horario_turno_estudo.as_str())
        .bind(valores(&p.documentos_apresentados))
        .bind(valores(&p.documentos_ausentes))
        .bind(p.cpf_numero.as_str())
        .bind(p.rg_numero.as_str())
        .bind(p.titulo_eleitor_numero.as_str())
        .bind(p.numero_processo_pep.as_str())
        .bind(p.cnh_categoria.valor())
        .bind(p.procedencia.valor())
        .bind(p.procedencia_outro.as_str())
        .bind(p.motivo_procura.as_str())
        .bind(p.orientado_escritorio_social)
        .bind(p.encaminhamento.valor())
        .bind(p.encaminhamento_detalhe.as_str())
        .bind(p.endereco.as_str())
        .bind(p.bairro.as_str())
        .bind(p.cidade.as_str())
        .bind(p.estado_uf.as_str())
        .bind(p.ponto_referencia.as_str())
        .bind(p.zona_cidade.valor())
        .bind(p.telefone_numero.as_str())
        .bind(p.telefone_contato.as_str())
        .bind(p.email_contato.as_str())
}

#[derive(Clone)]
pub struct CadastroRepository {
    pool: PgPool,
}

impl CadastroRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &CadastroPayload,
        data_cadastro: NaiveDate,
    ) -> Result<Cadastro, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = sqlx::query_as::<_, Cadastro>(INSERT_SQL.as_str());
        let cadastro = bind_payload(query, payload, Some(data_cadastro))
            .fetch_one(executor)
            .await?;
        Ok(cadastro)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &CadastroPayload,
    ) -> Result<Option<Cadastro>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = sqlx::query_as::<_, Cadastro>(UPDATE_SQL.as_str()).bind(id);
        let cadastro = bind_payload(query, payload, payload.data_cadastro.valor())
            .fetch_optional(executor)
            .await?;
        Ok(cadastro)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: CadastroStatus,
    ) -> Result<Option<Cadastro>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cadastro = sqlx::query_as::<_, Cadastro>(
            "UPDATE cadastros SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(cadastro)
    }

    pub async fn set_foto<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        foto: &str,
    ) -> Result<Option<Cadastro>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cadastro = sqlx::query_as::<_, Cadastro>(
            "UPDATE cadastros SET foto = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(foto)
        .fetch_optional(executor)
        .await?;
        Ok(cadastro)
    }

    /// Remove o cadastro. Familiares e anotações vão junto (ON DELETE CASCADE);
    /// atendimentos/agendamentos vinculados perdem apenas o vínculo.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM cadastros WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Cadastro>, AppError> {
        let cadastro = sqlx::query_as::<_, Cadastro>("SELECT * FROM cadastros WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(cadastro)
    }

    pub async fn find_resumo<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<CadastroResumo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let resumo = sqlx::query_as::<_, CadastroResumo>(
            "SELECT id, nome, status, data_cadastro FROM cadastros WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(resumo)
    }

    /// Listagem geral: filtra por status e por trecho do nome, mais recentes primeiro.
    pub async fn list(
        &self,
        status: Option<CadastroStatus>,
        busca: Option<&str>,
    ) -> Result<Vec<Cadastro>, AppError> {
        let cadastros = sqlx::query_as::<_, Cadastro>(
            r#"
            SELECT * FROM cadastros
            WHERE ($1::cadastro_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR nome ILIKE $2)
            ORDER BY data_cadastro DESC, created_at DESC
            "#,
        )
        .bind(status)
        .bind(busca.map(like_pattern))
        .fetch_all(&self.pool)
        .await?;
        Ok(cadastros)
    }

    /// Autocomplete: apenas cadastros ativos cujo nome contém o trecho.
    pub async fn autocomplete(&self, busca: &str, limite: i64) -> Result<Vec<AutocompleteItem>, AppError> {
        let itens = sqlx::query_as::<_, AutocompleteItem>(
            r#"
            SELECT id, nome AS text FROM cadastros
            WHERE status = 'ativo' AND nome ILIKE $1
            ORDER BY nome ASC
            LIMIT $2
            "#,
        )
        .bind(like_pattern(busca))
        .bind(limite)
        .fetch_all(&self.pool)
        .await?;
        Ok(itens)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM cadastros WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_has_one_placeholder_per_column() {
        assert!(INSERT_SQL.contains("$45)"));
        assert!(!INSERT_SQL.contains("$46"));
        assert!(INSERT_SQL.starts_with("INSERT INTO cadastros (nome, nome_social,"));
    }

    #[test]
    fn update_keeps_registration_date_when_blank() {
        assert!(UPDATE_SQL.contains("data_cadastro = COALESCE($10, data_cadastro)"));
        assert!(UPDATE_SQL.contains("email_contato = $46"));
        assert!(UPDATE_SQL.ends_with("WHERE id = $1 RETURNING *"));
    }
}
