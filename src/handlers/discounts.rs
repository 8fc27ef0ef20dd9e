// src/handlers/discounts.rs

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CanEdit, RequireCapability, RootOnly},
    },
    models::discount::{
        BestOffer, BestOffersResponse, Discount, DiscountDetail, RotationResponse,
        UpdateDiscountPayload, UpsertDiscountPayload,
    },
};

// Upsert manual pela chave composta (produto, fornecedor): criar e atualizar
// são a mesma operação.
#[utoipa::path(
    post,
    path = "/api/discounts",
    tag = "Discounts",
    request_body = UpsertDiscountPayload,
    responses(
        (status = 200, description = "Remessa criada ou atualizada", body = Discount),
        (status = 404, description = "Produto ou fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_discount(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireCapability<CanEdit>,
    Json(payload): Json<UpsertDiscountPayload>,
) -> Result<Json<Discount>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state
        .catalog_repo
        .find_product_by_id(payload.product_id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Produto".into()))?;

    app_state
        .catalog_repo
        .find_supplier_by_id(payload.supplier_id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Fornecedor".into()))?;

    let discount = app_state
        .discount_repo
        .upsert_percentage(
            payload.product_id,
            payload.supplier_id,
            payload.percentage,
            user.0.id,
        )
        .await?;

    Ok(Json(discount))
}

#[utoipa::path(
    get,
    path = "/api/discounts",
    tag = "Discounts",
    responses((status = 200, description = "Todas as remessas", body = [DiscountDetail])),
    security(("api_jwt" = []))
)]
pub async fn list_discounts(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<DiscountDetail>>, AppError> {
    let discounts = app_state.discount_repo.list().await?;
    Ok(Json(discounts))
}

// Ranking de ofertas de um produto, da melhor para a pior.
#[utoipa::path(
    get,
    path = "/api/products/{id}/discounts",
    tag = "Discounts",
    responses((status = 200, description = "Ofertas do produto", body = BestOffersResponse)),
    params(("id" = Uuid, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn best_offers(
    State(app_state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<BestOffersResponse>, AppError> {
    let offers = app_state.discount_repo.offers_for_product(product_id).await?;

    let best_offers = offers
        .into_iter()
        .enumerate()
        .map(|(i, offer)| BestOffer {
            rank: i + 1,
            supplier_id: offer.supplier_id,
            supplier: offer.supplier_name,
            percentage: offer.percentage,
            needed_quantity: offer.needed_quantity,
        })
        .collect();

    Ok(Json(BestOffersResponse {
        product_id,
        best_offers,
    }))
}

#[utoipa::path(
    put,
    path = "/api/discounts/{id}",
    tag = "Discounts",
    request_body = UpdateDiscountPayload,
    responses(
        (status = 200, description = "Percentual atualizado", body = Discount),
        (status = 404, description = "Remessa não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da remessa")),
    security(("api_jwt" = []))
)]
pub async fn update_discount(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDiscountPayload>,
) -> Result<Json<Discount>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let discount = app_state
        .discount_repo
        .update_percentage(id, payload.percentage)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Remessa".into()))?;

    Ok(Json(discount))
}

#[utoipa::path(
    delete,
    path = "/api/discounts/{id}",
    tag = "Discounts",
    responses(
        (status = 204, description = "Remessa removida"),
        (status = 404, description = "Remessa não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da remessa")),
    security(("api_jwt" = []))
)]
pub async fn delete_discount(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    if !app_state.discount_repo.delete(id).await? {
        return Err(AppError::ResourceNotFound("Remessa".into()));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

// Rotação mensal, disparada pelo agendador externo (ou manualmente).
#[utoipa::path(
    post,
    path = "/api/discounts/rotation",
    tag = "Discounts",
    responses((status = 200, description = "Rotação executada", body = RotationResponse)),
    security(("api_jwt" = []))
)]
pub async fn rotate_discounts(
    State(app_state): State<AppState>,
    _guard: RequireCapability<RootOnly>,
) -> Result<Json<RotationResponse>, AppError> {
    let updated = app_state.rotation_service.rotate(Utc::now()).await?;
    Ok(Json(RotationResponse { updated }))
}
