// src/db/discount_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::discount::{Discount, DiscountDetail, SupplierOffer},
};

// Remessas de desconto, chaveadas pelo par (product_id, supplier_id).
#[derive(Clone)]
pub struct DiscountRepository {
    pool: PgPool,
}

impl DiscountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Upsert usado pela ingestão de planilha.
    //
    // Invariante: needed_quantity é recalculada a partir de sold_quantity em
    // TODA escrita. Quantidades ausentes na linha (colunas inexistentes)
    // preservam o valor já armazenado via COALESCE.
    pub async fn upsert_from_import(
        &self,
        product_id: Uuid,
        supplier_id: Uuid,
        percentage: Decimal,
        stock_quantity: Option<i32>,
        sold_quantity: Option<i32>,
        reference_month: DateTime<Utc>,
        created_by: Uuid,
    ) -> Result<Discount, AppError> {
        let discount = sqlx::query_as::<_, Discount>(
            r#"
            INSERT INTO discounts
                (product_id, supplier_id, percentage, stock_quantity,
                 sold_quantity, needed_quantity, reference_month, created_by)
            VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, 0), COALESCE($5, 0), $6, $7)
            ON CONFLICT (product_id, supplier_id) DO UPDATE SET
                percentage = EXCLUDED.percentage,
                stock_quantity = COALESCE($4, discounts.stock_quantity),
                sold_quantity = COALESCE($5, discounts.sold_quantity),
                needed_quantity = COALESCE($5, discounts.sold_quantity),
                reference_month = EXCLUDED.reference_month,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(supplier_id)
        .bind(percentage)
        .bind(stock_quantity)
        .bind(sold_quantity)
        .bind(reference_month)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(discount)
    }

    // Upsert manual (endpoint administrativo): só mexe no percentual.
    pub async fn upsert_percentage(
        &self,
        product_id: Uuid,
        supplier_id: Uuid,
        percentage: Decimal,
        created_by: Uuid,
    ) -> Result<Discount, AppError> {
        let discount = sqlx::query_as::<_, Discount>(
            r#"
            INSERT INTO discounts (product_id, supplier_id, percentage, created_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id, supplier_id) DO UPDATE SET
                percentage = EXCLUDED.percentage,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(supplier_id)
        .bind(percentage)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(discount)
    }

    pub async fn list(&self) -> Result<Vec<DiscountDetail>, AppError> {
        let discounts = sqlx::query_as::<_, DiscountDetail>(
            r#"
            SELECT d.id, d.product_id, p.name AS product_name,
                   l.name AS laboratory_name,
                   d.supplier_id, s.name AS supplier_name,
                   d.percentage, d.stock_quantity, d.sold_quantity,
                   d.needed_quantity, d.reference_month,
                   d.created_at, d.updated_at
            FROM discounts d
            JOIN products p ON p.id = d.product_id
            JOIN laboratories l ON l.id = p.laboratory_id
            JOIN suppliers s ON s.id = d.supplier_id
            ORDER BY p.name ASC, d.percentage DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(discounts)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Discount>, AppError> {
        let discount = sqlx::query_as::<_, Discount>("SELECT * FROM discounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(discount)
    }

    pub async fn find_by_pair(
        &self,
        product_id: Uuid,
        supplier_id: Uuid,
    ) -> Result<Option<Discount>, AppError> {
        let discount = sqlx::query_as::<_, Discount>(
            "SELECT * FROM discounts WHERE product_id = $1 AND supplier_id = $2",
        )
        .bind(product_id)
        .bind(supplier_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(discount)
    }

    // Ofertas de um produto, da melhor para a pior.
    pub async fn offers_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<SupplierOffer>, AppError> {
        let offers = sqlx::query_as::<_, SupplierOffer>(
            r#"
            SELECT d.supplier_id, s.name AS supplier_name,
                   d.percentage, d.needed_quantity
            FROM discounts d
            JOIN suppliers s ON s.id = d.supplier_id
            WHERE d.product_id = $1
            ORDER BY d.percentage DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(offers)
    }

    pub async fn update_percentage(
        &self,
        id: Uuid,
        percentage: Decimal,
    ) -> Result<Option<Discount>, AppError> {
        let discount = sqlx::query_as::<_, Discount>(
            r#"
            UPDATE discounts
            SET percentage = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(percentage)
        .fetch_optional(&self.pool)
        .await?;
        Ok(discount)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Rotação mensal em um único UPDATE: a demanda do mês fechado vira a
    // necessidade do mês corrente e o contador de vendas zera. Idempotente
    // por mês calendário, já que reference_month avança para `as_of`.
    pub async fn rotate_before(
        &self,
        cutoff: DateTime<Utc>,
        as_of: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE discounts
            SET needed_quantity = sold_quantity,
                sold_quantity = 0,
                reference_month = $2,
                updated_at = now()
            WHERE reference_month < $1
            "#,
        )
        .bind(cutoff)
        .bind(as_of)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
