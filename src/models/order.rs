// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- Status do pedido ---
// Cadeia: PENDING -> VALIDATED -> IN_PROGRESS -> DELIVERED.
// CANCELLED é alcançável de qualquer estado não terminal.
// DELIVERED e CANCELLED são terminais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Validated,
    InProgress,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Validated) => true,
            (Validated, InProgress) => true,
            (InProgress, Delivered) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Validated => "validated",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Pedido de compra ---
// `discount_percentage` é uma cópia do percentual da remessa no momento da
// criação, não uma referência viva: pedidos são registros históricos.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    pub supplier_id: Uuid,
    pub needed_quantity: i32,
    pub discount_percentage: Decimal,
    pub status: OrderStatus,
    pub notes: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Pedido com nomes resolvidos (JOIN), para listagens e exportação.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub laboratory_name: String,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub needed_quantity: i32,
    pub discount_percentage: Decimal,
    pub status: OrderStatus,
    pub notes: String,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub product_id: Uuid,
    pub supplier_id: Uuid,
    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub needed_quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusPayload {
    pub status: OrderStatus,
}

// Filtros de listagem/exportação (query string).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

// Item de criação em massa: resolvido por nome (nunca cria entidades).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchOrderItem {
    pub product: String,
    pub supplier: String,
    pub needed_quantity: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchOrdersPayload {
    #[validate(length(min = 1, message = "A lista de pedidos não pode ser vazia."))]
    pub orders: Vec<BatchOrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchOrdersResponse {
    pub count: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub filename: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;

    #[test]
    fn cadeia_linear_de_transicoes() {
        assert!(Pending.can_transition_to(Validated));
        assert!(Validated.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Delivered));
    }

    #[test]
    fn nao_pula_etapas() {
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Validated.can_transition_to(Delivered));
        assert!(!Delivered.can_transition_to(Pending));
    }

    #[test]
    fn cancelamento_somente_de_estados_nao_terminais() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Validated.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn estados_terminais_nao_tem_saida() {
        for next in [Pending, Validated, InProgress, Delivered, Cancelled] {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }
}
