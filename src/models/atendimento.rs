// src/models/atendimento.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::common::validation::{
    check_choice, check_date, collect, field_error, finish, finish_camel_case, non_empty, not_blank,
    parse_date_field, single, Campo, MSG_OBRIGATORIO,
};
use crate::models::cadastro::{Cadastro, VinculoCadastro};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "local_atendimento", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LocalAtendimento {
    EscritorioSocial,
    UnidadePrisional,
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_atendimento", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipoAtendimento {
    Presencial,
    Online,
    Grupal,
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "perfil_pessoa_atendida", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PerfilPessoaAtendida {
    Reeducando,
    Familiar,
    NaoCadastrado,
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "motivo_procura", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MotivoProcura {
    Documentacao,
    Trabalho,
    Assistencia,
    Saude,
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "atendimento_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AtendimentoStatus {
    #[default]
    Pendente,
    Realizado,
}

impl AtendimentoStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pendente" => Some(Self::Pendente),
            "realizado" => Some(Self::Realizado),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Atendimento {
    pub id: Uuid,
    pub cadastro_id: Option<Uuid>,
    pub nome_pessoa_atendida: String,
    pub data_atendimento: NaiveDate,
    pub local_atendimento: Option<LocalAtendimento>,
    pub tipo_atendimento: Option<TipoAtendimento>,
    pub perfil_pessoa_atendida: Option<PerfilPessoaAtendida>,
    pub motivo_procura: Option<MotivoProcura>,
    pub objetivo_atendimento: String,
    // Username de quem registrou; não muda nas edições.
    pub profissional_responsavel: String,
    pub outras_pessoas_participantes: String,
    pub descricao_atendimento: String,
    pub status: AtendimentoStatus,
    pub created_at: DateTime<Utc>,
}

/// Linha de listagem: o atendimento mais o cadastro a que ele se refere.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AtendimentoLinha {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub atendimento: Atendimento,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub vinculo: VinculoCadastro,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AtendimentoPayload {
    /// Vínculo explícito com o cadastro (opcional).
    pub cadastro_id: Option<Uuid>,
    #[validate(
        length(max = 255, message = "Máximo de 255 caracteres."),
        custom(function = "not_blank")
    )]
    #[schema(example = "Maria Silva")]
    pub nome_pessoa_atendida: String,
    #[schema(value_type = Option<NaiveDate>, example = "2024-05-10")]
    pub data_atendimento: Campo<NaiveDate>,
    #[schema(value_type = Option<LocalAtendimento>)]
    pub local_atendimento: Campo<LocalAtendimento>,
    #[schema(value_type = Option<TipoAtendimento>)]
    pub tipo_atendimento: Campo<TipoAtendimento>,
    #[schema(value_type = Option<PerfilPessoaAtendida>)]
    pub perfil_pessoa_atendida: Campo<PerfilPessoaAtendida>,
    #[schema(value_type = Option<MotivoProcura>)]
    pub motivo_procura: Campo<MotivoProcura>,
    #[validate(length(max = 255, message = "Máximo de 255 caracteres."))]
    pub objetivo_atendimento: String,
    #[validate(length(max = 255, message = "Máximo de 255 caracteres."))]
    pub outras_pessoas_participantes: String,
    pub descricao_atendimento: String,
}

impl AtendimentoPayload {
    /// Devolve a data já validada; o restante do payload segue como está.
    pub fn validate_all(&self) -> Result<NaiveDate, ValidationErrors> {
        let mut errors = collect(self.validate());
        if self.data_atendimento == Campo::Vazio {
            errors.add("data_atendimento", field_error("required", MSG_OBRIGATORIO));
        }
        check_date(&mut errors, "data_atendimento", &self.data_atendimento);
        check_choice(&mut errors, "local_atendimento", &self.local_atendimento);
        check_choice(&mut errors, "tipo_atendimento", &self.tipo_atendimento);
        check_choice(&mut errors, "perfil_pessoa_atendida", &self.perfil_pessoa_atendida);
        check_choice(&mut errors, "motivo_procura", &self.motivo_procura);
        finish_camel_case(errors)?;
        self.data_atendimento
            .valor()
            .ok_or_else(|| single("dataAtendimento", "required", MSG_OBRIGATORIO))
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct AtendimentoFiltro {
    /// Trecho do nome da pessoa atendida
    pub q: Option<String>,
    /// Data exata (AAAA-MM-DD)
    pub data: Option<String>,
    /// pendente | realizado
    pub status: Option<String>,
}

impl AtendimentoFiltro {
    /// (trecho do nome, data, status), com erro por campo se a data ou o
    /// status vierem num formato desconhecido.
    pub fn parse(&self) -> Result<(Option<&str>, Option<NaiveDate>, Option<AtendimentoStatus>), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let data = parse_date_field(&mut errors, "data", self.data.as_deref());

        let status = non_empty(self.status.as_deref()).and_then(|raw| {
            let status = AtendimentoStatus::parse(raw);
            if status.is_none() {
                errors.add("status", field_error("choice", "Status inválido."));
            }
            status
        });

        finish(errors)?;
        Ok((non_empty(self.q.as_deref()), data, status))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AtendimentoDashboard {
    pub query: String,
    pub data: String,
    pub status: String,
    pub atendimentos: Vec<AtendimentoLinha>,
    pub total: usize,
}

// Histórico do cadastro: vinculados pela chave ou, sem vínculo, pelo nome.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricoAtendimentos {
    pub cadastro: Cadastro,
    pub atendimentos: Vec<Atendimento>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_date_are_required_together() {
        let errors = AtendimentoPayload::default().validate_all().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("nomePessoaAtendida"));
        assert!(fields.contains_key("dataAtendimento"));
    }

    #[test]
    fn unknown_choices_and_bad_date_are_field_errors() {
        let p: AtendimentoPayload = serde_json::from_str(
            r#"{"nomePessoaAtendida":"","dataAtendimento":"31/02/2024","localAtendimento":"praia","motivoProcura":"saude"}"#,
        )
        .unwrap();
        let errors = p.validate_all().unwrap_err();
        let fields = errors.field_errors();
        for field in ["nomePessoaAtendida", "dataAtendimento", "localAtendimento"] {
            assert!(fields.contains_key(field), "faltou erro em {field}");
        }
        assert!(!fields.contains_key("motivoProcura"));
    }

    #[test]
    fn valid_payload_returns_the_date() {
        let data = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let p = AtendimentoPayload {
            nome_pessoa_atendida: "Maria Silva".into(),
            data_atendimento: Campo::Valor(data),
            ..Default::default()
        };
        assert_eq!(p.validate_all().unwrap(), data);
    }

    #[test]
    fn responsible_cannot_be_sent_by_the_client() {
        // O campo não existe no payload: é sempre o usuário da sessão.
        let p: AtendimentoPayload = serde_json::from_str(
            r#"{"nomePessoaAtendida":"Maria","dataAtendimento":"2024-05-10","profissionalResponsavel":"outro"}"#,
        )
        .unwrap();
        assert!(p.validate_all().is_ok());
    }

    #[test]
    fn dashboard_filter_parsing() {
        let filtro = AtendimentoFiltro {
            q: Some(" maria ".into()),
            data: Some("2024-05-10".into()),
            status: Some("realizado".into()),
        };
        let (q, data, status) = filtro.parse().unwrap();
        assert_eq!(q, Some("maria"));
        assert_eq!(data, NaiveDate::from_ymd_opt(2024, 5, 10));
        assert_eq!(status, Some(AtendimentoStatus::Realizado));

        assert_eq!(AtendimentoFiltro::default().parse().unwrap(), (None, None, None));

        let ruim = AtendimentoFiltro { q: None, data: Some("ontem".into()), status: Some("cancelado".into()) };
        let errors = ruim.parse().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("data"));
        assert!(fields.contains_key("status"));
    }
}
