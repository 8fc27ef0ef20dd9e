// src/models/import.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

// Limite de mensagens de erro devolvidas ao cliente. `total` e `processed`
// continuam exatos sobre a entrada inteira.
pub const MAX_REPORTED_ERRORS: usize = 20;

// Entidades distintas tocadas durante uma ingestão.
#[derive(Debug, Default, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub laboratories: usize,
    pub products: usize,
    pub suppliers: usize,
    pub discounts: usize,
}

// Relatório estruturado de uma ingestão de planilha.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total: usize,
    pub processed: usize,
    pub errors: Vec<String>,
    pub stats: ImportStats,
}

impl ImportReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            errors: Vec::new(),
            stats: ImportStats::default(),
        }
    }

    // Registra a falha de uma linha sem estourar o tamanho da resposta.
    pub fn record_failure(&mut self, line: usize, reason: &str) {
        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(format!("Linha {}: {}", line, reason));
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.processed
    }
}

// Resposta do endpoint de upload: nome gravado + relatório.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub filename: String,
    pub report: ImportReport,
}

// Entrada da listagem de arquivos armazenados (uploads/exportações).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relatorio_limita_erros_mas_conta_tudo() {
        let mut report = ImportReport::new(30);
        for line in 1..=25 {
            report.record_failure(line, "coluna 'Produit' ausente ou vazia");
        }
        report.processed = 5;

        assert_eq!(report.errors.len(), MAX_REPORTED_ERRORS);
        assert_eq!(report.total, 30);
        assert_eq!(report.failed(), 25);
        assert_eq!(report.errors[0], "Linha 1: coluna 'Produit' ausente ou vazia");
    }
}
