// src/models/foto.rs

use serde::Serialize;
use utoipa::ToSchema;

pub const MSG_FOTO_ENVIADA: &str = "Foto enviada com sucesso";
pub const MSG_REQUISICAO_INVALIDA: &str = "Requisição inválida";

// Resposta do upload de foto (cadastro e familiar).
#[derive(Debug, Serialize, ToSchema)]
pub struct FotoResponse {
    #[schema(example = "success")]
    pub status: &'static str,
    #[schema(example = "Foto enviada com sucesso")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "/media/cadastros/0f8c.png")]
    pub foto_url: Option<String>,
}

impl FotoResponse {
    pub fn sucesso(foto_url: String) -> Self {
        Self { status: "success", message: MSG_FOTO_ENVIADA.to_string(), foto_url: Some(foto_url) }
    }

    pub fn erro(message: impl Into<String>) -> Self {
        Self { status: "error", message: message.into(), foto_url: None }
    }
}
