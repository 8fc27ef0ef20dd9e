// src/services/order_service.rs

use std::path::{Path, PathBuf};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, DiscountRepository, OrderRepository},
    models::order::{
        BatchOrderItem, BatchOrdersResponse, ExportResponse, OrderDetail, OrderFilters,
        OrderStatus,
    },
};

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    catalog_repo: CatalogRepository,
    discount_repo: DiscountRepository,
    export_dir: PathBuf,
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        catalog_repo: CatalogRepository,
        discount_repo: DiscountRepository,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            order_repo,
            catalog_repo,
            discount_repo,
            export_dir,
        }
    }

    // Cria o pedido congelando o percentual vigente da remessa: o pedido é
    // um registro histórico, não uma referência viva ao desconto.
    pub async fn create_order(
        &self,
        product_id: Uuid,
        supplier_id: Uuid,
        needed_quantity: i32,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<OrderDetail, AppError> {
        let product = self
            .catalog_repo
            .find_product_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Produto".into()))?;

        let supplier = self
            .catalog_repo
            .find_supplier_by_id(supplier_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Fornecedor".into()))?;

        let discount = self
            .discount_repo
            .find_by_pair(product.id, supplier.id)
            .await?;
        let percentage = discount.map(|d| d.percentage).unwrap_or(Decimal::ZERO);

        let order = self
            .order_repo
            .create(
                product.id,
                supplier.id,
                needed_quantity,
                percentage,
                notes.unwrap_or(""),
                created_by,
            )
            .await?;

        self.order_repo
            .find_detail_by_id(order.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Pedido recém-criado não encontrado: {}", order.id).into())
    }

    // Transições são ações administrativas explícitas; a máquina de estados
    // rejeita qualquer salto fora da cadeia.
    pub async fn transition(
        &self,
        id: Uuid,
        next: OrderStatus,
    ) -> Result<OrderDetail, AppError> {
        let order = self
            .order_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))?;

        if !order.status.can_transition_to(next) {
            return Err(AppError::InvalidStatusTransition {
                from: order.status.to_string(),
                to: next.to_string(),
            });
        }

        self.order_repo.update_status(id, next).await?;
        self.order_repo
            .find_detail_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))
    }

    // Criação em massa a partir de nomes: resolve (nunca cria) produto e
    // fornecedor, acumulando erros por linha sem abortar o lote.
    pub async fn create_batch(
        &self,
        items: &[BatchOrderItem],
        created_by: Uuid,
    ) -> Result<BatchOrdersResponse, AppError> {
        let mut count = 0;
        let mut errors = Vec::new();

        for (idx, item) in items.iter().enumerate() {
            match self.create_batch_item(item, created_by).await {
                Ok(()) => count += 1,
                Err(reason) => errors.push(format!("Linha {}: {}", idx + 1, reason)),
            }
        }

        Ok(BatchOrdersResponse { count, errors })
    }

    async fn create_batch_item(
        &self,
        item: &BatchOrderItem,
        created_by: Uuid,
    ) -> Result<(), String> {
        let product_name = item.product.trim();
        let product = self
            .catalog_repo
            .find_product_by_name(product_name)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("Produto '{}' não encontrado", product_name))?;

        let supplier_name = item.supplier.trim();
        let supplier = self
            .catalog_repo
            .find_supplier_by_name(supplier_name)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("Fornecedor '{}' não encontrado", supplier_name))?;

        let discount = self
            .discount_repo
            .find_by_pair(product.id, supplier.id)
            .await
            .map_err(|e| e.to_string())?;
        let percentage = discount.map(|d| d.percentage).unwrap_or(Decimal::ZERO);

        self.order_repo
            .create(
                product.id,
                supplier.id,
                item.needed_quantity.unwrap_or(0),
                percentage,
                "",
                created_by,
            )
            .await
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    // Exporta a listagem filtrada para um CSV no diretório de exportação.
    // Os cabeçalhos seguem o formato das planilhas que os operadores já usam.
    pub async fn export_orders(
        &self,
        filters: &OrderFilters,
    ) -> Result<ExportResponse, AppError> {
        let orders = self.order_repo.list(filters).await?;
        if orders.is_empty() {
            return Err(AppError::ResourceNotFound("Pedido a exportar".into()));
        }

        let filename = format!("pedidos_{}.csv", Utc::now().timestamp_millis());
        let path = self.export_dir.join(&filename);
        let count = orders.len();

        // Escrita em disco fora do executor async
        tokio::task::spawn_blocking(move || write_orders_csv(&path, &orders))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de exportação: {}", e))??;

        tracing::info!(%filename, count, "📄 Pedidos exportados");
        Ok(ExportResponse { filename, count })
    }
}

fn write_orders_csv(path: &Path, orders: &[OrderDetail]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "Date",
        "Produit",
        "Laboratoire",
        "Fournisseur",
        "Quantité Nécessaire",
        "Remise (%)",
        "Statut",
        "Créé par",
    ])?;

    for order in orders {
        writer.write_record([
            order.created_at.format("%d/%m/%Y").to_string(),
            order.product_name.clone(),
            order.laboratory_name.clone(),
            order.supplier_name.clone(),
            order.needed_quantity.to_string(),
            order.discount_percentage.to_string(),
            order.status.to_string(),
            order.created_by_name.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn order_detail(product: &str, supplier: &str) -> OrderDetail {
        OrderDetail {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: product.into(),
            laboratory_name: "Sanofi".into(),
            supplier_id: Uuid::new_v4(),
            supplier_name: supplier.into(),
            needed_quantity: 12,
            discount_percentage: "12.5".parse().unwrap(),
            status: OrderStatus::Pending,
            notes: String::new(),
            created_by: Uuid::new_v4(),
            created_by_name: "root".into(),
            created_at: Utc.with_ymd_and_hms(2026, 8, 3, 9, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 8, 3, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn escreve_csv_com_cabecalho_e_linhas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pedidos.csv");

        let orders = vec![
            order_detail("Doliprane", "Pharma Sud"),
            order_detail("Aspegic", "CERP"),
        ];
        write_orders_csv(&path, &orders).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("Date,Produit,Laboratoire"));
        assert!(contents.contains("Doliprane"));
        assert!(contents.contains("03/08/2026"));
        assert_eq!(contents.lines().count(), 3);
    }
}
