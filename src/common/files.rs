// src/common/files.rs
//
// Helpers de arquivo compartilhados pelos endpoints de upload/exportação.

use std::path::Path;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::{common::error::AppError, models::import::StoredFile};

// Aceita apenas o componente final de um nome de arquivo: nada de
// separadores de caminho nem "..".
pub fn sanitize_filename(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(AppError::ResourceNotFound("Arquivo".into()));
    }
    Ok(name.to_string())
}

pub async fn list_files(dir: &Path) -> Result<Vec<StoredFile>, AppError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let modified_at: DateTime<Utc> = metadata.modified()?.into();
        files.push(StoredFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            modified_at,
        });
    }

    // Mais recentes primeiro
    files.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
    Ok(files)
}

pub async fn serve_file(dir: &Path, filename: &str) -> Result<Response, AppError> {
    let safe = sanitize_filename(filename)?;
    let path = dir.join(&safe);

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::ResourceNotFound("Arquivo".into())
        } else {
            e.into()
        }
    })?;

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", safe),
        ),
    ];

    Ok((headers, bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejeita_nomes_com_caminho() {
        assert!(sanitize_filename("../segredo.txt").is_err());
        assert!(sanitize_filename("a/b.xlsx").is_err());
        assert!(sanitize_filename("a\\b.xlsx").is_err());
        assert!(sanitize_filename("  ").is_err());
        assert_eq!(sanitize_filename(" remises.xlsx ").unwrap(), "remises.xlsx");
    }
}
