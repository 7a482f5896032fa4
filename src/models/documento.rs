// src/models/documento.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Checklists de documentação. No banco são arrays de ENUM
// (documento_tipo[] / documento_ausente_tipo[]), nunca texto separado por vírgula.

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "documento_tipo", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Documento {
    CertidaoNascimento,
    Rg,
    Cpf,
    CarteiraTrabalho,
    TituloEleitor,
    CertificadoEscolaridade,
    DocumentoMilitar,
    Cnh,
}

impl Documento {
    pub fn label(&self) -> &'static str {
        match self {
            Documento::CertidaoNascimento => "Certidão de Nascimento",
            Documento::Rg => "RG",
            Documento::Cpf => "CPF",
            Documento::CarteiraTrabalho => "Carteira de Trabalho",
            Documento::TituloEleitor => "Título de Eleitor",
            Documento::CertificadoEscolaridade => "Certificado de Escolaridade",
            Documento::DocumentoMilitar => "Documento Militar",
            Documento::Cnh => "CNH",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "documento_ausente_tipo", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentoAusente {
    CertidaoNascimento,
    #[serde(rename = "certidao_nascimento_2via")]
    #[sqlx(rename = "certidao_nascimento_2via")]
    CertidaoNascimento2Via,
    Rg,
    #[serde(rename = "rg_2via")]
    #[sqlx(rename = "rg_2via")]
    Rg2Via,
    Cpf,
    #[serde(rename = "cpf_2via")]
    #[sqlx(rename = "cpf_2via")]
    Cpf2Via,
    CarteiraTrabalho,
    #[serde(rename = "carteira_trabalho_2via")]
    #[sqlx(rename = "carteira_trabalho_2via")]
    CarteiraTrabalho2Via,
    TituloEleitor,
    #[serde(rename = "titulo_eleitor_2via")]
    #[sqlx(rename = "titulo_eleitor_2via")]
    TituloEleitor2Via,
    DocumentoMilitar,
    #[serde(rename = "documento_militar_2via")]
    #[sqlx(rename = "documento_militar_2via")]
    DocumentoMilitar2Via,
    Cnh,
}

impl DocumentoAusente {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentoAusente::CertidaoNascimento => "Certidão de Nascimento",
            DocumentoAusente::CertidaoNascimento2Via => "Certidão de Nascimento (2ª Via)",
            DocumentoAusente::Rg => "RG",
            DocumentoAusente::Rg2Via => "RG (2ª Via)",
            DocumentoAusente::Cpf => "CPF",
            DocumentoAusente::Cpf2Via => "CPF (2ª Via)",
            DocumentoAusente::CarteiraTrabalho => "Carteira de Trabalho",
            DocumentoAusente::CarteiraTrabalho2Via => "Carteira de Trabalho (2ª Via)",
            DocumentoAusente::TituloEleitor => "Título de Eleitor",
            DocumentoAusente::TituloEleitor2Via => "Título de Eleitor (2ª Via)",
            DocumentoAusente::DocumentoMilitar => "Documento Militar",
            DocumentoAusente::DocumentoMilitar2Via => "Documento Militar (2ª Via)",
            DocumentoAusente::Cnh => "CNH",
        }
    }
}

/// Checklist marcado no formulário: sem repetições, na ordem de declaração.
pub fn normalize_set<T: Ord>(mut items: Vec<T>) -> Vec<T> {
    items.sort();
    items.dedup();
    items
}

// Item exibido na tela de detalhes (código + rótulo).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DocumentoItem {
    #[schema(example = "rg_2via")]
    pub codigo: String,
    #[schema(example = "RG (2ª Via)")]
    pub rotulo: &'static str,
}

impl From<Documento> for DocumentoItem {
    fn from(doc: Documento) -> Self {
        Self { codigo: codigo(&doc), rotulo: doc.label() }
    }
}

impl From<DocumentoAusente> for DocumentoItem {
    fn from(doc: DocumentoAusente) -> Self {
        Self { codigo: codigo(&doc), rotulo: doc.label() }
    }
}

// O código é o mesmo nome usado na API (serde).
fn codigo<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_deduplicated_in_declaration_order() {
        let docs = normalize_set(vec![Documento::Cnh, Documento::Rg, Documento::Cnh, Documento::CertidaoNascimento]);
        assert_eq!(docs, vec![Documento::CertidaoNascimento, Documento::Rg, Documento::Cnh]);
    }

    #[test]
    fn second_copy_codes_and_labels() {
        let item = DocumentoItem::from(DocumentoAusente::Rg2Via);
        assert_eq!(item.codigo, "rg_2via");
        assert_eq!(item.rotulo, "RG (2ª Via)");

        let parsed: DocumentoAusente = serde_json::from_str("\"certidao_nascimento_2via\"").unwrap();
        assert_eq!(parsed, DocumentoAusente::CertidaoNascimento2Via);
    }

    #[test]
    fn unknown_document_is_rejected() {
        assert!(serde_json::from_str::<Documento>("\"passaporte\"").is_err());
    }
}
