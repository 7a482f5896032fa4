// src/models/lembrete.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::common::validation::{check_choice, collect, finish_camel_case, not_blank, Campo};
use crate::models::cadastro::CadastroResumo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "urgencia", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Urgencia {
    Baixa,
    #[default]
    Media,
    Alta,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lembrete {
    pub id: Uuid,
    pub cadastro_id: Option<Uuid>,
    pub titulo: String,
    pub anotacao: String,
    pub urgencia: Urgencia,
    pub data_criacao: DateTime<Utc>,
    pub data_atualizacao: DateTime<Utc>,
    // Ficam nulos quando a conta do técnico é excluída.
    pub criado_por: Option<Uuid>,
    pub atualizado_por: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LembretePayload {
    #[validate(
        length(max = 255, message = "Máximo de 255 caracteres."),
        custom(function = "not_blank")
    )]
    #[schema(example = "Retorno com documentação")]
    pub titulo: String,
    // Vazio: média
    #[schema(value_type = Option<Urgencia>)]
    pub urgencia: Campo<Urgencia>,
    pub anotacao: String,
}

impl LembretePayload {
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        let mut errors = collect(self.validate());
        check_choice(&mut errors, "urgencia", &self.urgencia);
        finish_camel_case(errors)
    }

    pub fn urgencia(&self) -> Urgencia {
        self.urgencia.valor().unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnotacaoQuery {
    /// Cadastro dono da anotação; sem ele a anotação fica avulsa.
    pub cadastro_id: Option<Uuid>,
}

// GET /anotacoes/editar/: a anotação mais recente do cadastro (se houver).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnotacaoEdicao {
    pub cadastro: Option<CadastroResumo>,
    pub lembrete: Option<Lembrete>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgency_defaults_to_media() {
        let p: LembretePayload = serde_json::from_str(r#"{"titulo":"Ligar"}"#).unwrap();
        assert_eq!(p.urgencia(), Urgencia::Media);
        assert!(p.validate_all().is_ok());
    }

    #[test]
    fn title_is_required() {
        let p = LembretePayload { titulo: "  ".into(), ..Default::default() };
        assert!(p.validate_all().unwrap_err().field_errors().contains_key("titulo"));
    }

    #[test]
    fn unknown_urgency_is_reported_with_the_title() {
        let p: LembretePayload = serde_json::from_str(r#"{"titulo":"","urgencia":"urgentissima"}"#).unwrap();
        let errors = p.validate_all().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("titulo"));
        assert!(fields.contains_key("urgencia"));

        let p: LembretePayload = serde_json::from_str(r#"{"titulo":"Ligar","urgencia":"alta"}"#).unwrap();
        assert_eq!(p.urgencia(), Urgencia::Alta);
    }
}
