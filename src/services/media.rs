// src/services/media.rs

use std::path::PathBuf;

use anyhow::Context;
use uuid::Uuid;

use crate::common::error::AppError;

pub const MSG_FORMATO_FOTO: &str = "Por favor, selecione apenas arquivos PNG ou JPEG";

const EXTENSOES_FOTO: [&str; 3] = ["png", "jpeg", "jpg"];

/// Extensão do arquivo enviado, em minúsculas, se for uma foto aceita.
pub fn extensao_foto(nome_arquivo: &str) -> Option<String> {
    let (_, ext) = nome_arquivo.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    EXTENSOES_FOTO.contains(&ext.as_str()).then_some(ext)
}

// Arquivos enviados ficam em MEDIA_ROOT/<pasta>/ e são servidos em MEDIA_URL.
#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
    url: String,
}

impl MediaStore {
    pub fn new(root: PathBuf, url: String) -> Self {
        Self { root, url }
    }

    /// Grava a foto com um nome novo e devolve a URL pública.
    pub async fn salvar_foto(&self, pasta: &str, nome_original: &str, conteudo: &[u8]) -> Result<String, AppError> {
        let ext = extensao_foto(nome_original).ok_or_else(|| AppError::BadRequest(MSG_FORMATO_FOTO.into()))?;

        let dir = self.root.join(pasta);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Falha ao criar {}", dir.display()))?;

        let nome = format!("{}.{}", Uuid::new_v4(), ext);
        let destino = dir.join(&nome);
        tokio::fs::write(&destino, conteudo)
            .await
            .with_context(|| format!("Falha ao gravar {}", destino.display()))?;

        Ok(format!("{}{}/{}", self.url, pasta, nome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_png_and_jpeg_are_accepted() {
        assert_eq!(extensao_foto("foto.PNG").as_deref(), Some("png"));
        assert_eq!(extensao_foto("retrato.final.jpeg").as_deref(), Some("jpeg"));
        assert_eq!(extensao_foto("a.jpg").as_deref(), Some("jpg"));
        assert_eq!(extensao_foto("documento.pdf"), None);
        assert_eq!(extensao_foto("semextensao"), None);
        assert_eq!(extensao_foto("gif.gif"), None);
    }

    #[tokio::test]
    async fn saves_under_the_folder_and_returns_public_url() {
        let root = std::env::temp_dir().join(format!("reeduc-media-{}", Uuid::new_v4()));
        let store = MediaStore::new(root.clone(), "/media/".into());

        let url = store.salvar_foto("cadastros", "Foto.JPG", b"bytes").await.unwrap();
        assert!(url.starts_with("/media/cadastros/"));
        assert!(url.ends_with(".jpg"));

        let nome = url.rsplit('/').next().unwrap();
        let gravado = tokio::fs::read(root.join("cadastros").join(nome)).await.unwrap();
        assert_eq!(gravado, b"bytes");

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn rejected_extension_writes_nothing() {
        let root = std::env::temp_dir().join(format!("reeduc-media-{}", Uuid::new_v4()));
        let store = MediaStore::new(root.clone(), "/media/".into());

        let err = store.salvar_foto("familiares", "x.gif", b"gif").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == MSG_FORMATO_FOTO));
        assert!(!root.exists());
    }
}
