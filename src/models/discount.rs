// src/models/discount.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Remessa de desconto ---
// A identidade é o par (product_id, supplier_id): reingerir o mesmo par
// atualiza o registro no lugar. `needed_quantity` é sempre derivada de
// `sold_quantity` no momento da escrita, nunca definida de forma avulsa.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: Uuid,
    pub product_id: Uuid,
    pub supplier_id: Uuid,
    #[schema(example = "12.5")]
    pub percentage: Decimal,
    pub stock_quantity: i32,
    pub sold_quantity: i32,
    pub needed_quantity: i32,
    pub reference_month: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Remessa com os nomes de produto/laboratório/fornecedor resolvidos (JOIN).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscountDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub laboratory_name: String,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub percentage: Decimal,
    pub stock_quantity: i32,
    pub sold_quantity: i32,
    pub needed_quantity: i32,
    pub reference_month: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha do ranking de ofertas de um produto.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOffer {
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub percentage: Decimal,
    pub needed_quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BestOffer {
    pub rank: usize,
    pub supplier_id: Uuid,
    pub supplier: String,
    pub percentage: Decimal,
    pub needed_quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BestOffersResponse {
    pub product_id: Uuid,
    pub best_offers: Vec<BestOffer>,
}

// ---
// Payloads
// ---

fn validate_positive_percentage(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O percentual deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertDiscountPayload {
    pub product_id: Uuid,
    pub supplier_id: Uuid,
    #[validate(custom(function = "validate_positive_percentage"))]
    #[schema(example = "7.0")]
    pub percentage: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiscountPayload {
    #[validate(custom(function = "validate_positive_percentage"))]
    pub percentage: Decimal,
}

// Resultado da rotação mensal.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RotationResponse {
    pub updated: u64,
}
