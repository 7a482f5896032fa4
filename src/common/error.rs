// src/common/error.rs

use axum::{
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

// O tipo de erro único da aplicação.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Sessão inválida")]
    InvalidToken,

    #[error("Operação não permitida: {0}")]
    Forbidden(String),

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Registro duplicado ({0})")]
    UniqueConstraintViolation(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` carrega o contexto (I/O, tasks, configuração).
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Agrupa as mensagens de validação por campo, na ordem alfabética dos campos.
pub fn validation_details(errors: &validator::ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut details = BTreeMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        details.insert(field.to_string(), messages);
    }
    details
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            // Todos os erros de campo voltam juntos para o formulário.
            AppError::ValidationError(errors) => {
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": validation_details(&errors),
                }));
                return (status, body).into_response();
            }
            AppError::BadRequest(message) => message,
            AppError::InvalidCredentials => "Usuário ou senha inválidos.".to_string(),
            AppError::InvalidToken => "Sessão inválida ou expirada. Entre novamente.".to_string(),
            AppError::Forbidden(message) => message,
            AppError::NotFound(_) => "Registro não encontrado.".to_string(),
            AppError::UniqueConstraintViolation(_) => "Registro duplicado.".to_string(),

            // Erros internos: loga o detalhe e devolve uma mensagem genérica.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

// Rejeições dos extratores viram o mesmo corpo de erro da aplicação.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::validation::field_error;

    #[test]
    fn validation_error_maps_to_bad_request_with_all_fields() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("perfil_referencia_egresso", field_error("perfil", "Marque somente uma opção."));
        errors.add("perfil_referencia_pre_egresso", field_error("perfil", "Marque somente uma opção."));

        let details = validation_details(&errors);
        assert_eq!(details.len(), 2);
        assert_eq!(details["perfil_referencia_egresso"], vec!["Marque somente uma opção."]);

        let response = AppError::ValidationError(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_and_auth_statuses() {
        assert_eq!(AppError::NotFound("Cadastro").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
    }
}
