// src/handlers/excel.rs
//
// Upload da planilha de remessas. A requisição só falha inteira por
// problemas estruturais (sem arquivo, arquivo ilegível); erros de linha
// voltam dentro do relatório.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::Response,
};
use chrono::Utc;

use crate::{
    common::{error::AppError, files},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CanDownload, CanUpload, RequireCapability},
    },
    models::import::{StoredFile, UploadResponse},
    services::spreadsheet,
};

#[utoipa::path(
    post,
    path = "/api/excel/upload",
    tag = "Excel",
    responses(
        (status = 200, description = "Arquivo processado, relatório de ingestão", body = UploadResponse),
        (status = 400, description = "Sem arquivo, ou arquivo ilegível")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_excel(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireCapability<CanUpload>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut received = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::SpreadsheetError(e.to_string()))?
    {
        if field.name() == Some("file") {
            let original = field.file_name().unwrap_or("planilha.xlsx").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::SpreadsheetError(e.to_string()))?;
            received = Some((original, data));
            break;
        }
    }

    let (original, data) = received.ok_or(AppError::MissingFile)?;

    // Guarda o arquivo original, com timestamp, no diretório de uploads
    let safe = files::sanitize_filename(&original).unwrap_or_else(|_| "planilha.xlsx".into());
    let filename = format!("{}_{}", Utc::now().timestamp_millis(), safe);
    let path = app_state.upload_dir.join(&filename);
    tokio::fs::write(&path, &data).await?;

    // Parse do binário fora do executor async
    let parse_path = path.clone();
    let rows = tokio::task::spawn_blocking(move || spreadsheet::read_rows(&parse_path))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de leitura da planilha: {}", e))??;

    let report = app_state.import_service.ingest(&rows, user.0.id).await;

    Ok(Json(UploadResponse { filename, report }))
}

#[utoipa::path(
    get,
    path = "/api/excel/files",
    tag = "Excel",
    responses((status = 200, description = "Uploads armazenados", body = [StoredFile])),
    security(("api_jwt" = []))
)]
pub async fn list_uploaded_files(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanDownload>,
) -> Result<Json<Vec<StoredFile>>, AppError> {
    // Só os arquivos do nível raiz (as exportações moram em subdiretório)
    let files = files::list_files(&app_state.upload_dir).await?;
    Ok(Json(files))
}

#[utoipa::path(
    get,
    path = "/api/excel/files/{filename}",
    tag = "Excel",
    responses(
        (status = 200, description = "Conteúdo do arquivo"),
        (status = 404, description = "Arquivo não encontrado")
    ),
    params(("filename" = String, Path, description = "Nome do upload")),
    security(("api_jwt" = []))
)]
pub async fn download_uploaded_file(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanDownload>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    files::serve_file(&app_state.upload_dir, &filename).await
}
