// src/handlers/foto.rs

use axum::{
    body::Bytes,
    extract::Multipart,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    common::error::AppError,
    models::foto::{FotoResponse, MSG_REQUISICAO_INVALIDA},
};

// Corpo multipart que chega nas rotas de upload
#[derive(utoipa::ToSchema)]
pub struct FotoUpload {
    #[schema(format = Binary)]
    pub foto: String,
}

/// Procura o campo `foto` e devolve (nome do arquivo, conteúdo).
pub async fn ler_campo_foto(mut multipart: Multipart) -> Option<(String, Bytes)> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("foto") {
            continue;
        }
        let nome = field.file_name().unwrap_or_default().to_string();
        return field.bytes().await.ok().map(|conteudo| (nome, conteudo));
    }
    None
}

fn erro(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(FotoResponse::erro(message))).into_response()
}

/// Converte o resultado do upload no corpo {status, message, foto_url}.
/// Registro inexistente continua sendo 404.
pub fn responder(resultado: Result<String, AppError>) -> Result<Response, AppError> {
    match resultado {
        Ok(url) => Ok(Json(FotoResponse::sucesso(url)).into_response()),
        Err(AppError::BadRequest(message)) => Ok(erro(message)),
        Err(e) => Err(e),
    }
}

pub fn sem_foto() -> Response {
    erro(MSG_REQUISICAO_INVALIDA)
}
