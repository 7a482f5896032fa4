// src/models/agendamento.rs

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
#[sqlx(type_name = "tipo_agendamento", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipoAgendamento {
    Acompanhamento,
    Atendimento,
    Cadastro,
    Retorno,
    Outro,
}

// Faixas de meia hora entre 07:00 e 16:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "horario_atendimento")]
pub enum Horario {
    #[serde(rename = "07:00")]
    #[sqlx(rename = "07:00")]
    H0700,
    #[serde(rename = "07:30")]
    #[sqlx(rename = "07:30")]
    H0730,
    #[serde(rename = "08:00")]
    #[sqlx(rename = "08:00")]
    H0800,
    #[serde(rename = "08:30")]
    #[sqlx(rename = "08:30")]
    H0830,
    #[serde(rename = "09:00")]
    #[sqlx(rename = "09:00")]
    H0900,
    #[serde(rename = "09:30")]
    #[sqlx(rename = "09:30")]
    H0930,
    #[serde(rename = "10:00")]
    #[sqlx(rename = "10:00")]
    H1000,
    #[serde(rename = "10:30")]
    #[sqlx(rename = "10:30")]
    H1030,
    #[serde(rename = "11:00")]
    #[sqlx(rename = "11:00")]
    H1100,
    #[serde(rename = "11:30")]
    #[sqlx(rename = "11:30")]
    H1130,
    #[serde(rename = "12:00")]
    #[sqlx(rename = "12:00")]
    H1200,
    #[serde(rename = "12:30")]
    #[sqlx(rename = "12:30")]
    H1230,
    #[serde(rename = "13:00")]
    #[sqlx(rename = "13:00")]
    H1300,
    #[serde(rename = "13:30")]
    #[sqlx(rename = "13:30")]
    H1330,
    #[serde(rename = "14:00")]
    #[sqlx(rename = "14:00")]
    H1400,
    #[serde(rename = "14:30")]
    #[sqlx(rename = "14:30")]
    H1430,
    #[serde(rename = "15:00")]
    #[sqlx(rename = "15:00")]
    H1500,
    #[serde(rename = "15:30")]
    #[sqlx(rename = "15:30")]
    H1530,
    #[serde(rename = "16:00")]
    #[sqlx(rename = "16:00")]
    H1600,
}

impl Horario {
    pub const TODOS: [Horario; 19] = [
        Horario::H0700,
        Horario::H0730,
        Horario::H0800,
        Horario::H0830,
        Horario::H0900,
        Horario::H0930,
        Horario::H1000,
        Horario::H1030,
        Horario::H1100,
        Horario::H1130,
        Horario::H1200,
        Horario::H1230,
        Horario::H1300,
        Horario::H1330,
        Horario::H1400,
        Horario::H1430,
        Horario::H1500,
        Horario::H1530,
        Horario::H1600,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Horario::H0700 => "07:00",
            Horario::H0730 => "07:30",
            Horario::H0800 => "08:00",
            Horario::H0830 => "08:30",
            Horario::H0900 => "09:00",
            Horario::H0930 => "09:30",
            Horario::H1000 => "10:00",
            Horario::H1030 => "10:30",
            Horario::H1100 => "11:00",
            Horario::H1130 => "11:30",
            Horario::H1200 => "12:00",
            Horario::H1230 => "12:30",
            Horario::H1300 => "13:00",
            Horario::H1330 => "13:30",
            Horario::H1400 => "14:00",
            Horario::H1430 => "14:30",
            Horario::H1500 => "15:00",
            Horario::H1530 => "15:30",
            Horario::H1600 => "16:00",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Agendamento {
    pub id: Uuid,
    pub cadastro_id: Option<Uuid>,
    pub nome_atendido: String,
    pub tipo_agendamento: Option<TipoAgendamento>,
    pub data_agendamento: NaiveDate,
    pub horario_atendimento: Option<Horario>,
    pub observacoes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgendamentoLinha {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub agendamento: Agendamento,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub vinculo: VinculoCadastro,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AgendamentoPayload {
    pub cadastro_id: Option<Uuid>,
    #[validate(
        length(max = 255, message = "Máximo de 255 caracteres."),
        custom(function = "not_blank")
    )]
    #[schema(example = "Maria Silva")]
    pub nome_atendido: String,
    #[schema(value_type = Option<TipoAgendamento>)]
    pub tipo_agendamento: Campo<TipoAgendamento>,
    #[schema(value_type = Option<NaiveDate>, example = "2024-05-10")]
    pub data_agendamento: Campo<NaiveDate>,
    #[schema(value_type = Option<Horario>)]
    pub horario_atendimento: Campo<Horario>,
    pub observacoes: String,
}

impl AgendamentoPayload {
    /// Erros com as chaves do JSON (`nomeAtendido`, `horarioAtendimento`...).
    pub fn validate_all(&self) -> Result<NaiveDate, ValidationErrors> {
        let mut errors = collect(self.validate());
        if self.data_agendamento == Campo::Vazio {
            errors.add("data_agendamento", field_error("required", MSG_OBRIGATORIO));
        }
        check_date(&mut errors, "data_agendamento", &self.data_agendamento);
        check_choice(&mut errors, "tipo_agendamento", &self.tipo_agendamento);
        check_choice(&mut errors, "horario_atendimento", &self.horario_atendimento);
        finish_camel_case(errors)?;
        self.data_agendamento
            .valor()
            .ok_or_else(|| single("dataAgendamento", "required", MSG_OBRIGATORIO))
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct AgendamentoFiltro {
    /// Trecho do nome do atendido
    pub q: Option<String>,
    /// Data exata (AAAA-MM-DD)
    pub data: Option<String>,
}

impl AgendamentoFiltro {
    pub fn parse(&self) -> Result<(Option<&str>, Option<NaiveDate>), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let data = parse_date_field(&mut errors, "data", self.data.as_deref());
        finish(errors)?;
        Ok((non_empty(self.q.as_deref()), data))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgendamentoDashboard {
    pub query: String,
    pub data: String,
    pub agendamentos: Vec<AgendamentoLinha>,
    pub total: usize,
}

// Histórico do cadastro: vinculados pela chave ou, sem vínculo, pelo nome.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricoAgendamentos {
    pub cadastro: Cadastro,
    pub agendamentos: Vec<Agendamento>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_cover_07_to_16_every_half_hour() {
        let labels: Vec<&str> = Horario::TODOS.iter().map(Horario::as_str).collect();
        assert_eq!(labels.len(), 19);
        assert_eq!(labels.first(), Some(&"07:00"));
        assert_eq!(labels.last(), Some(&"16:00"));
        assert!(labels.contains(&"12:30"));
    }

    #[test]
    fn slot_serializes_as_clock_time() {
        assert_eq!(serde_json::to_string(&Horario::H0930).unwrap(), "\"09:30\"");
        let h: Horario = serde_json::from_str("\"15:30\"").unwrap();
        assert_eq!(h, Horario::H1530);
        assert!(serde_json::from_str::<Horario>("\"16:30\"").is_err());
        assert!(serde_json::from_str::<Horario>("\"07:15\"").is_err());
    }

    #[test]
    fn name_and_date_are_required() {
        let errors = AgendamentoPayload::default().validate_all().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("nomeAtendido"));
        assert!(fields.contains_key("dataAgendamento"));
    }

    #[test]
    fn unknown_slot_is_reported_with_the_other_errors() {
        let p: AgendamentoPayload =
            serde_json::from_str(r#"{"nomeAtendido":"","dataAgendamento":"2024-05-10","horarioAtendimento":"16:30"}"#)
                .unwrap();
        let errors = p.validate_all().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("nomeAtendido"));
        assert!(fields.contains_key("horarioAtendimento"));
        assert!(!fields.contains_key("dataAgendamento"));
        assert!(fields["horarioAtendimento"][0].message.as_deref().unwrap_or_default().contains("16:30"));
    }

    #[test]
    fn valid_payload_returns_the_date() {
        let p: AgendamentoPayload = serde_json::from_str(
            r#"{"nomeAtendido":"Maria","dataAgendamento":"2024-05-10","horarioAtendimento":"09:30","tipoAgendamento":""}"#,
        )
        .unwrap();
        assert_eq!(p.validate_all().unwrap(), NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert_eq!(p.horario_atendimento.valor(), Some(Horario::H0930));
        assert_eq!(p.tipo_agendamento, Campo::Vazio);
    }
}
