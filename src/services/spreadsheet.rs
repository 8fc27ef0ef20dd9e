// src/services/spreadsheet.rs
//
// Converte o arquivo recebido em uma sequência ordenada de linhas
// (cabeçalho -> valor da célula). O restante do pipeline de ingestão só
// enxerga esses mapas; o formato binário morre aqui.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use calamine::{Reader, open_workbook_auto};
use csv::ReaderBuilder;

use crate::common::error::AppError;

pub type RowMap = HashMap<String, String>;

// Escolhe o parser pela extensão do arquivo gravado.
pub fn read_rows(path: &Path) -> Result<Vec<RowMap>, AppError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => read_csv_rows(path),
        "xlsx" | "xls" => read_excel_rows(path),
        _ => Err(AppError::UnsupportedFile(ext)),
    }
}

fn read_csv_rows(path: &Path) -> Result<Vec<RowMap>, AppError> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // permite linhas com comprimentos diferentes
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::SpreadsheetError(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::SpreadsheetError(e.to_string()))?;
        let mut row = RowMap::new();

        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row.insert(header.clone(), value.trim().to_string());
            }
        }

        // Ignora linhas completamente em branco
        if row.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row);
    }

    Ok(records)
}

fn read_excel_rows(path: &Path) -> Result<Vec<RowMap>, AppError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| AppError::SpreadsheetError(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let Some(sheet_name) = sheet_names.first().cloned() else {
        return Err(AppError::SpreadsheetError("arquivo sem abas".into()));
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AppError::SpreadsheetError(e.to_string()))?;

    // Cabeçalho na primeira linha
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(AppError::SpreadsheetError("arquivo sem linhas".into()));
    };

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut records = Vec::new();
    for data_row in rows {
        let mut row = RowMap::new();

        for (col_idx, cell) in data_row.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row.insert(header.clone(), cell.to_string().trim().to_string());
            }
        }

        if row.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn le_csv_com_cabecalho_aparado() {
        let file = csv_file("Produit , Laboratoire,Pharma Sud\nDoliprane,Sanofi,12.5\n");
        let rows = read_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Produit"), Some(&"Doliprane".to_string()));
        assert_eq!(rows[0].get("Laboratoire"), Some(&"Sanofi".to_string()));
        assert_eq!(rows[0].get("Pharma Sud"), Some(&"12.5".to_string()));
    }

    #[test]
    fn pula_linhas_em_branco() {
        let file = csv_file("Produit,Laboratoire\nDoliprane,Sanofi\n,\nAspegic,Sanofi\n");
        let rows = read_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn rejeita_extensao_desconhecida() {
        let file = Builder::new().suffix(".pdf").tempfile().unwrap();
        let result = read_rows(file.path());
        assert!(matches!(result, Err(AppError::UnsupportedFile(_))));
    }

    #[test]
    fn arquivo_inexistente_e_erro_estrutural() {
        let result = read_rows(Path::new("nao_existe.csv"));
        assert!(result.is_err());
    }
}
