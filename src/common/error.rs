use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("{0} não encontrado")]
    ResourceNotFound(String),

    #[error("{0}")]
    UniqueConstraintViolation(String),

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Nenhum arquivo recebido")]
    MissingFile,

    #[error("Formato de arquivo não suportado: {0}")]
    UnsupportedFile(String),

    #[error("Falha ao ler a planilha: {0}")]
    SpreadsheetError(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de E/S")]
    IoError(#[from] std::io::Error),

    #[error("Erro de CSV: {0}")]
    CsvError(#[from] csv::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::UserNotFound => {
                (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string())
            }
            AppError::ResourceNotFound(ref what) => {
                (StatusCode::NOT_FOUND, format!("{} não encontrado.", what))
            }
            AppError::UniqueConstraintViolation(ref msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::InvalidStatusTransition { ref from, ref to } => (
                StatusCode::BAD_REQUEST,
                format!("Transição de status inválida: '{}' -> '{}'.", from, to),
            ),
            AppError::MissingFile => {
                (StatusCode::BAD_REQUEST, "Nenhum arquivo recebido.".to_string())
            }
            AppError::UnsupportedFile(ref ext) => (
                StatusCode::BAD_REQUEST,
                format!("Formato de arquivo não suportado: '{}'.", ext),
            ),
            AppError::SpreadsheetError(ref msg) => (
                StatusCode::BAD_REQUEST,
                format!("Falha ao ler a planilha: {}.", msg),
            ),

            // Todos os outros erros (DatabaseError, IoError, etc.) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
