// src/models/familiar.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::common::validation::{
    check_choice, check_choices, check_date, collect, field_error, finish_camel_case, is_blank, normalize_cpf,
    not_blank, Campo,
};
use crate::models::cadastro::{email_ok, Etnia, SexoBiologico, MSG_EMAIL_INVALIDO};
use crate::models::documento::{normalize_set, Documento, DocumentoAusente, DocumentoItem};

pub const MSG_INTERNO_OBRIGATORIO: &str = "Informe o nome do interno da família.";
pub const MSG_PERFIL_UNICO: &str = "Marque somente uma opção: Egresso ou Pré-egresso.";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Familiar {
    pub id: Uuid,
    // None = familiar avulso
    pub cadastro_id: Option<Uuid>,
    pub nome: String,
    pub nome_social: String,
    pub data_nascimento: Option<NaiveDate>,
    pub sexo_biologico: Option<SexoBiologico>,
    pub identidade_etnico_racial: Option<Etnia>,
    pub pessoa_transexual: bool,
    #[schema(example = "123.456.789-01")]
    pub cpf_numero: String,
    pub nis_numero: String,
    pub documentos_possui: Vec<Documento>,
    pub documentos_ausentes: Vec<DocumentoAusente>,
    pub parentesco: String,
    pub perfil_referencia_egresso: bool,
    pub perfil_referencia_pre_egresso: bool,
    pub nome_interno_referencia: String,
    pub bairro: String,
    pub telefone_numero: String,
    pub telefone_contato: String,
    pub telefone_observacao: String,
    pub email_contato: String,
    pub foto: Option<String>,
    pub data_criacao: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FamiliarPayload {
    #[validate(
        length(max = 255, message = "Máximo de 255 caracteres."),
        custom(function = "not_blank")
    )]
    pub nome: String,
    #[validate(length(max = 255, message = "Máximo de 255 caracteres."))]
    pub nome_social: String,
    #[schema(value_type = Option<NaiveDate>)]
    pub data_nascimento: Campo<NaiveDate>,
    #[schema(value_type = Option<SexoBiologico>)]
    pub sexo_biologico: Campo<SexoBiologico>,
    #[schema(value_type = Option<Etnia>)]
    pub identidade_etnico_racial: Campo<Etnia>,
    pub pessoa_transexual: bool,
    #[schema(example = "12345678901")]
    pub cpf_numero: String,
    #[validate(length(max = 30, message = "Máximo de 30 caracteres."))]
    pub nis_numero: String,
    #[schema(value_type = Vec<Documento>)]
    pub documentos_possui: Vec<Campo<Documento>>,
    #[schema(value_type = Vec<DocumentoAusente>)]
    pub documentos_ausentes: Vec<Campo<DocumentoAusente>>,
    #[validate(length(max = 120, message = "Máximo de 120 caracteres."))]
    pub parentesco: String,
    pub perfil_referencia_egresso: bool,
    pub perfil_referencia_pre_egresso: bool,
    #[validate(length(max = 255, message = "Máximo de 255 caracteres."))]
    pub nome_interno_referencia: String,
    #[validate(length(max = 120, message = "Máximo de 120 caracteres."))]
    pub bairro: String,
    #[validate(length(max = 20, message = "Máximo de 20 caracteres."))]
    pub telefone_numero: String,
    #[validate(length(max = 120, message = "Máximo de 120 caracteres."))]
    pub telefone_contato: String,
    #[validate(length(max = 255, message = "Máximo de 255 caracteres."))]
    pub telefone_observacao: String,
    pub email_contato: String,
}

impl FamiliarPayload {
    /// Valida e devolve o payload pronto para gravar (CPF formatado,
    /// checklists sem repetição, nome do interno sem espaços nas pontas).
    ///
    /// `avulso` = o familiar não está (ou não ficará) ligado a um cadastro.
    /// Só nesse caso o interno de referência e o perfil Egresso/Pré-egresso
    /// são obrigatórios.
    pub fn clean(mut self, avulso: bool) -> Result<Self, ValidationErrors> {
        let mut errors = collect(self.validate());

        match normalize_cpf(&self.cpf_numero) {
            Ok(cpf) => self.cpf_numero = cpf,
            Err(err) => errors.add("cpf_numero", err),
        }

        if !email_ok(&self.email_contato) {
            errors.add("email_contato", field_error("email", MSG_EMAIL_INVALIDO));
        }

        check_date(&mut errors, "data_nascimento", &self.data_nascimento);
        check_choice(&mut errors, "sexo_biologico", &self.sexo_biologico);
        check_choice(&mut errors, "identidade_etnico_racial", &self.identidade_etnico_racial);
        let possui = check_choices(&mut errors, "documentos_possui", &self.documentos_possui);
        let ausentes = check_choices(&mut errors, "documentos_ausentes", &self.documentos_ausentes);

        self.nome_interno_referencia = self.nome_interno_referencia.trim().to_string();

        if avulso {
            if is_blank(&self.nome_interno_referencia) {
                errors.add(
                    "nome_interno_referencia",
                    field_error("required", MSG_INTERNO_OBRIGATORIO),
                );
            }

            let selecionados =
                usize::from(self.perfil_referencia_egresso) + usize::from(self.perfil_referencia_pre_egresso);
            if selecionados != 1 {
                errors.add("perfil_referencia_egresso", field_error("perfil", MSG_PERFIL_UNICO));
                errors.add("perfil_referencia_pre_egresso", field_error("perfil", MSG_PERFIL_UNICO));
            }
        }

        finish_camel_case(errors)?;

        self.documentos_possui = normalize_set(possui).into_iter().map(Campo::Valor).collect();
        self.documentos_ausentes = normalize_set(ausentes).into_iter().map(Campo::Valor).collect();
        Ok(self)
    }
}

// Tela de detalhes: o registro mais os rótulos dos documentos.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FamiliarDetalhe {
    pub familiar: Familiar,
    pub documentos_possui: Vec<DocumentoItem>,
    pub documentos_ausentes: Vec<DocumentoItem>,
}

impl From<Familiar> for FamiliarDetalhe {
    fn from(familiar: Familiar) -> Self {
        let documentos_possui = familiar.documentos_possui.iter().copied().map(DocumentoItem::from).collect();
        let documentos_ausentes = familiar.documentos_ausentes.iter().copied().map(DocumentoItem::from).collect();
        Self { familiar, documentos_possui, documentos_ausentes }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FamiliaresDoCadastro {
    pub cadastro_id: Uuid,
    pub cadastro_nome: String,
    pub familiares: Vec<Familiar>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::validation::MSG_CPF_INVALIDO;

    fn avulso(egresso: bool, pre_egresso: bool) -> FamiliarPayload {
        FamiliarPayload {
            nome: "Ana Souza".into(),
            nome_interno_referencia: "  João Souza ".into(),
            perfil_referencia_egresso: egresso,
            perfil_referencia_pre_egresso: pre_egresso,
            ..Default::default()
        }
    }

    fn messages(errors: &ValidationErrors, field: &str) -> Vec<String> {
        errors
            .field_errors()
            .get(field)
            .map(|errs| errs.iter().filter_map(|e| e.message.as_ref().map(|m| m.to_string())).collect())
            .unwrap_or_default()
    }

    #[test]
    fn standalone_requires_exactly_one_profile_flag() {
        for (egresso, pre) in [(false, false), (true, true)] {
            let errors = avulso(egresso, pre).clean(true).unwrap_err();
            assert_eq!(messages(&errors, "perfilReferenciaEgresso"), vec![MSG_PERFIL_UNICO]);
            assert_eq!(messages(&errors, "perfilReferenciaPreEgresso"), vec![MSG_PERFIL_UNICO]);
        }

        let ok = avulso(true, false).clean(true).unwrap();
        assert_eq!(ok.nome_interno_referencia, "João Souza");
        assert!(avulso(false, true).clean(true).is_ok());
    }

    #[test]
    fn standalone_requires_interno_name() {
        let mut p = avulso(true, false);
        p.nome_interno_referencia = "   ".into();
        let errors = p.clean(true).unwrap_err();
        assert_eq!(messages(&errors, "nomeInternoReferencia"), vec![MSG_INTERNO_OBRIGATORIO]);
    }

    #[test]
    fn linked_member_skips_standalone_rules() {
        let p = FamiliarPayload { nome: "Ana Souza".into(), ..Default::default() };
        assert!(p.clean(false).is_ok());
    }

    #[test]
    fn cpf_is_normalized_or_rejected() {
        let mut p = avulso(true, false);
        p.cpf_numero = "123 456 789 01".into();
        assert_eq!(p.clean(true).unwrap().cpf_numero, "123.456.789-01");

        let mut p = avulso(true, false);
        p.cpf_numero = "1234".into();
        let errors = p.clean(true).unwrap_err();
        assert_eq!(messages(&errors, "cpfNumero"), vec![MSG_CPF_INVALIDO]);
    }

    #[test]
    fn every_violation_is_reported_together() {
        let p = FamiliarPayload {
            nome: "".into(),
            cpf_numero: "999".into(),
            email_contato: "x@".into(),
            ..Default::default()
        };
        let errors = p.clean(true).unwrap_err();
        let fields = errors.field_errors();
        for field in [
            "nome",
            "cpfNumero",
            "emailContato",
            "nomeInternoReferencia",
            "perfilReferenciaEgresso",
            "perfilReferenciaPreEgresso",
        ] {
            assert!(fields.contains_key(field), "faltou erro em {field}");
        }
    }

    #[test]
    fn document_sets_are_deduplicated() {
        let p = avulso(true, false);
        let p = FamiliarPayload {
            documentos_ausentes: vec![Campo::Valor(DocumentoAusente::Rg2Via), Campo::Valor(DocumentoAusente::Rg2Via)],
            ..p
        }
        .clean(true)
        .unwrap();
        assert_eq!(p.documentos_ausentes, vec![Campo::Valor(DocumentoAusente::Rg2Via)]);
    }

    #[test]
    fn unknown_choice_keeps_the_other_errors() {
        let p: FamiliarPayload =
            serde_json::from_str(r#"{"nome":"","cpfNumero":"12","sexoBiologico":"xx","documentosPossui":["rg","passaporte"]}"#)
                .unwrap();
        let errors = p.clean(true).unwrap_err();
        let fields = errors.field_errors();
        for field in [
            "nome",
            "cpfNumero",
            "sexoBiologico",
            "documentosPossui",
            "nomeInternoReferencia",
            "perfilReferenciaEgresso",
        ] {
            assert!(fields.contains_key(field), "faltou erro em {field}");
        }
        assert_eq!(fields["documentosPossui"].len(), 1);
    }
}
