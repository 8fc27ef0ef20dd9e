// src/db/order_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::order::{Order, OrderDetail, OrderFilters, OrderStatus},
};

const DETAIL_SELECT: &str = r#"
    SELECT o.id, o.product_id, p.name AS product_name,
           l.name AS laboratory_name,
           o.supplier_id, s.name AS supplier_name,
           o.needed_quantity, o.discount_percentage, o.status, o.notes,
           o.created_by, u.name AS created_by_name,
           o.created_at, o.updated_at
    FROM orders o
    JOIN products p ON p.id = o.product_id
    JOIN laboratories l ON l.id = p.laboratory_id
    JOIN suppliers s ON s.id = o.supplier_id
    JOIN users u ON u.id = o.created_by
"#;

// Pedidos de compra. Mutação de status só acontece pelo service, que valida
// a máquina de estados antes de chamar `update_status`.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        product_id: Uuid,
        supplier_id: Uuid,
        needed_quantity: i32,
        discount_percentage: Decimal,
        notes: &str,
        created_by: Uuid,
    ) -> Result<Order, AppError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders
                (product_id, supplier_id, needed_quantity, discount_percentage, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(supplier_id)
        .bind(needed_quantity)
        .bind(discount_percentage)
        .bind(notes)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(order)
    }

    pub async fn list(&self, filters: &OrderFilters) -> Result<Vec<OrderDetail>, AppError> {
        let sql = format!(
            r#"
            {DETAIL_SELECT}
            WHERE ($1::order_status IS NULL OR o.status = $1)
              AND ($2::timestamptz IS NULL OR o.created_at >= $2)
              AND ($3::timestamptz IS NULL OR o.created_at <= $3)
            ORDER BY o.created_at DESC
            "#
        );
        let orders = sqlx::query_as::<_, OrderDetail>(&sql)
            .bind(filters.status)
            .bind(filters.start_date)
            .bind(filters.end_date)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn find_detail_by_id(&self, id: Uuid) -> Result<Option<OrderDetail>, AppError> {
        let sql = format!("{DETAIL_SELECT} WHERE o.id = $1");
        let order = sqlx::query_as::<_, OrderDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
