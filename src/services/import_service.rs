// src/services/import_service.rs
//
// Pipeline de ingestão de planilhas de desconto:
//   linha -> normalização (produto/laboratório/quantidades)
//         -> resolução por nome (laboratório, depois produto)
//         -> varredura das colunas restantes (fornecedor -> percentual)
//         -> upsert da remessa chaveada por (produto, fornecedor).
//
// Cada linha é independente: falhas viram uma entrada no relatório e o lote
// segue. Só falha a requisição inteira o que acontece ANTES do loop
// (arquivo ausente/ilegível).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, DiscountRepository},
    models::{
        catalog::{Laboratory, Product, Supplier},
        import::{ImportReport, ImportStats},
    },
    services::spreadsheet::RowMap,
};

// Colunas que a varredura de fornecedores NUNCA trata como fornecedor:
// identidade da linha, quantidades e as três colunas-resumo de oferta.
pub const RESERVED_COLUMNS: &[&str] = &[
    "Produit",
    "produit",
    "Laboratoire",
    "laboratoire",
    "Quantité en Stock",
    "quantiteEnStock",
    "Quantité Vendue",
    "quantiteVendue",
    "MEILLEURE OFFRE",
    "2ÈME OFFRE",
    "3ÈME OFFRE",
];

// Linha normalizada: identidade + quantidades.
// Quantidade `None` = a coluna não existe nesta planilha (preserva o valor
// armazenado); coluna presente mas vazia/ilegível = 0.
#[derive(Debug, PartialEq)]
pub struct NormalizedRow {
    pub product: String,
    pub laboratory: String,
    pub stock_quantity: Option<i32>,
    pub sold_quantity: Option<i32>,
}

fn cell<'a>(row: &'a RowMap, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| row.get(*k)).map(String::as_str)
}

fn parse_quantity(raw: &str) -> i32 {
    let value = raw.trim().replace(',', ".");
    if value.is_empty() {
        return 0;
    }
    value.parse::<f64>().map(|q| q.round() as i32).unwrap_or(0)
}

fn quantity_cell(row: &RowMap, keys: &[&str]) -> Option<i32> {
    cell(row, keys).map(parse_quantity)
}

pub fn normalize_row(row: &RowMap) -> Result<NormalizedRow, String> {
    let product = cell(row, &["Produit", "produit"]).unwrap_or("").trim();
    if product.is_empty() {
        return Err("coluna 'Produit' ausente ou vazia".into());
    }

    let laboratory = cell(row, &["Laboratoire", "laboratoire"]).unwrap_or("").trim();
    if laboratory.is_empty() {
        return Err("coluna 'Laboratoire' ausente ou vazia".into());
    }

    Ok(NormalizedRow {
        product: product.to_string(),
        laboratory: laboratory.to_string(),
        stock_quantity: quantity_cell(row, &["Quantité en Stock", "quantiteEnStock"]),
        sold_quantity: quantity_cell(row, &["Quantité Vendue", "quantiteVendue"]),
    })
}

// "12%" -> 12, "12,5" -> 12.5, " 7.0 " -> 7.0.
// Ilegível ou <= 0 devolve None: célula vazia/zerada significa "este
// fornecedor não cota este produto", nunca um erro.
pub fn parse_percentage(raw: &str) -> Option<Decimal> {
    let value = raw.trim();
    let value = value.strip_suffix('%').unwrap_or(value).trim();
    let value = value.replace(',', ".");

    let percentage = value.parse::<Decimal>().ok()?;
    (percentage > Decimal::ZERO).then_some(percentage)
}

// Varredura das colunas de fornecedor de uma linha: cabeçalho aparado vira
// chave natural do fornecedor, célula vira percentual.
pub fn discount_candidates(row: &RowMap) -> Vec<(String, Decimal)> {
    row.iter()
        .filter(|(header, _)| {
            let name = header.trim();
            !name.is_empty() && !RESERVED_COLUMNS.contains(&name)
        })
        .filter_map(|(header, value)| {
            parse_percentage(value).map(|pct| (header.trim().to_string(), pct))
        })
        .collect()
}

fn is_unique_violation(err: &AppError) -> bool {
    match err {
        AppError::UniqueConstraintViolation(_) => true,
        AppError::DatabaseError(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[derive(Default)]
struct TouchedEntities {
    laboratories: HashSet<Uuid>,
    products: HashSet<Uuid>,
    suppliers: HashSet<Uuid>,
    discounts: usize,
}

#[derive(Clone)]
pub struct ImportService {
    catalog_repo: CatalogRepository,
    discount_repo: DiscountRepository,
}

impl ImportService {
    pub fn new(catalog_repo: CatalogRepository, discount_repo: DiscountRepository) -> Self {
        Self {
            catalog_repo,
            discount_repo,
        }
    }

    // Processa as linhas estritamente na ordem de entrada.
    // Nada aqui aborta o lote: política de melhor esforço, relatada.
    pub async fn ingest(&self, rows: &[RowMap], created_by: Uuid) -> ImportReport {
        let reference_month = Utc::now();
        let mut report = ImportReport::new(rows.len());
        let mut touched = TouchedEntities::default();

        for (idx, row) in rows.iter().enumerate() {
            match self
                .ingest_row(row, created_by, reference_month, &mut touched)
                .await
            {
                Ok(()) => report.processed += 1,
                Err(reason) => report.record_failure(idx + 1, &reason),
            }
        }

        report.stats = ImportStats {
            laboratories: touched.laboratories.len(),
            products: touched.products.len(),
            suppliers: touched.suppliers.len(),
            discounts: touched.discounts,
        };

        tracing::info!(
            total = report.total,
            processed = report.processed,
            failed = report.failed(),
            "📦 Ingestão de planilha concluída"
        );

        report
    }

    async fn ingest_row(
        &self,
        row: &RowMap,
        created_by: Uuid,
        reference_month: DateTime<Utc>,
        touched: &mut TouchedEntities,
    ) -> Result<(), String> {
        let normalized = normalize_row(row)?;

        let laboratory = self
            .resolve_laboratory(&normalized.laboratory)
            .await
            .map_err(|e| e.to_string())?;
        touched.laboratories.insert(laboratory.id);

        let product = self
            .resolve_product(laboratory.id, &normalized.product)
            .await
            .map_err(|e| e.to_string())?;
        touched.products.insert(product.id);

        for (supplier_name, percentage) in discount_candidates(row) {
            let supplier = self
                .resolve_supplier(&supplier_name)
                .await
                .map_err(|e| e.to_string())?;
            touched.suppliers.insert(supplier.id);

            self.discount_repo
                .upsert_from_import(
                    product.id,
                    supplier.id,
                    percentage,
                    normalized.stock_quantity,
                    normalized.sold_quantity,
                    reference_month,
                    created_by,
                )
                .await
                .map_err(|e| e.to_string())?;
            touched.discounts += 1;
        }

        Ok(())
    }

    // O upsert já é atômico no banco; uma violação de unicidade que ainda
    // escape em corrida ganha uma única nova tentativa antes de virar erro
    // da linha.
    async fn resolve_laboratory(&self, name: &str) -> Result<Laboratory, AppError> {
        match self.catalog_repo.upsert_laboratory(name).await {
            Err(e) if is_unique_violation(&e) => self.catalog_repo.upsert_laboratory(name).await,
            other => other,
        }
    }

    async fn resolve_product(
        &self,
        laboratory_id: Uuid,
        name: &str,
    ) -> Result<Product, AppError> {
        match self.catalog_repo.upsert_product(laboratory_id, name).await {
            Err(e) if is_unique_violation(&e) => {
                self.catalog_repo.upsert_product(laboratory_id, name).await
            }
            other => other,
        }
    }

    async fn resolve_supplier(&self, name: &str) -> Result<Supplier, AppError> {
        match self.catalog_repo.upsert_supplier(name).await {
            Err(e) if is_unique_violation(&e) => self.catalog_repo.upsert_supplier(name).await,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RowMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn normaliza_linha_completa() {
        let row = row(&[
            ("Produit", " Doliprane "),
            ("Laboratoire", "Sanofi"),
            ("Quantité en Stock", "14"),
            ("Quantité Vendue", "40"),
        ]);

        let normalized = normalize_row(&row).unwrap();
        assert_eq!(normalized.product, "Doliprane");
        assert_eq!(normalized.laboratory, "Sanofi");
        assert_eq!(normalized.stock_quantity, Some(14));
        assert_eq!(normalized.sold_quantity, Some(40));
    }

    #[test]
    fn aceita_variantes_de_caixa_das_colunas() {
        let row = row(&[
            ("produit", "Aspegic"),
            ("laboratoire", "Sanofi"),
            ("quantiteEnStock", "3"),
            ("quantiteVendue", ""),
        ]);

        let normalized = normalize_row(&row).unwrap();
        assert_eq!(normalized.product, "Aspegic");
        // Coluna presente mas vazia vale 0
        assert_eq!(normalized.sold_quantity, Some(0));
    }

    #[test]
    fn quantidades_ausentes_ficam_ausentes() {
        let row = row(&[("Produit", "Doliprane"), ("Laboratoire", "Sanofi")]);
        let normalized = normalize_row(&row).unwrap();
        assert_eq!(normalized.stock_quantity, None);
        assert_eq!(normalized.sold_quantity, None);
    }

    #[test]
    fn linha_sem_produto_ou_laboratorio_e_invalida() {
        let sem_produto = row(&[("Laboratoire", "Sanofi")]);
        assert!(normalize_row(&sem_produto).unwrap_err().contains("Produit"));

        let laboratorio_vazio = row(&[("Produit", "Doliprane"), ("Laboratoire", "  ")]);
        assert!(
            normalize_row(&laboratorio_vazio)
                .unwrap_err()
                .contains("Laboratoire")
        );
    }

    #[test]
    fn parse_de_percentual() {
        assert_eq!(parse_percentage("12%"), Some(dec("12")));
        assert_eq!(parse_percentage("12,5"), Some(dec("12.5")));
        assert_eq!(parse_percentage(" 7.0 "), Some(dec("7.0")));
        assert_eq!(parse_percentage("15 %"), Some(dec("15")));

        // Zero/negativo/ilegível: não é cotação, não é erro
        assert_eq!(parse_percentage("0"), None);
        assert_eq!(parse_percentage("-3"), None);
        assert_eq!(parse_percentage(""), None);
        assert_eq!(parse_percentage("abc"), None);
    }

    #[test]
    fn varredura_ignora_colunas_reservadas() {
        let row = row(&[
            ("Produit", "Doliprane"),
            ("Laboratoire", "Sanofi"),
            ("Quantité en Stock", "10"),
            ("Quantité Vendue", "4"),
            ("MEILLEURE OFFRE", "15%"),
            ("2ÈME OFFRE", "12%"),
            ("3ÈME OFFRE", "10%"),
            ("Pharma Sud", "15%"),
            ("CERP", "0"),
            ("OCP", ""),
        ]);

        let candidates = discount_candidates(&row);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0], ("Pharma Sud".to_string(), dec("15")));
    }

    #[test]
    fn varredura_ignora_cabecalho_vazio() {
        let row = row(&[
            ("Produit", "Doliprane"),
            ("Laboratoire", "Sanofi"),
            ("  ", "9%"),
        ]);
        assert!(discount_candidates(&row).is_empty());
    }

    #[test]
    fn quantidade_com_virgula_e_arredondada() {
        assert_eq!(parse_quantity("12,6"), 13);
        assert_eq!(parse_quantity(" 7 "), 7);
        assert_eq!(parse_quantity("abc"), 0);
        assert_eq!(parse_quantity(""), 0);
    }
}
