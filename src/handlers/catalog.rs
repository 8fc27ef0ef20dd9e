// src/handlers/catalog.rs
//
// CRUD direto do catálogo: laboratórios, produtos e fornecedores.
// Leitura exige só autenticação; escrita exige a capacidade 'edit'.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{CanEdit, RequireCapability},
    models::catalog::{
        CreateLaboratoryPayload, CreateProductPayload, CreateSupplierPayload, Laboratory,
        Product, ProductDetail, Supplier, UpdateLaboratoryPayload, UpdateProductPayload,
        UpdateSupplierPayload,
    },
};

// ---
// Laboratórios
// ---

#[utoipa::path(
    get,
    path = "/api/laboratories",
    tag = "Catalog",
    responses((status = 200, description = "Todos os laboratórios", body = [Laboratory])),
    security(("api_jwt" = []))
)]
pub async fn list_laboratories(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Laboratory>>, AppError> {
    let labs = app_state.catalog_repo.list_laboratories().await?;
    Ok(Json(labs))
}

#[utoipa::path(
    post,
    path = "/api/laboratories",
    tag = "Catalog",
    request_body = CreateLaboratoryPayload,
    responses(
        (status = 201, description = "Laboratório criado", body = Laboratory),
        (status = 409, description = "Laboratório já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_laboratory(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Json(payload): Json<CreateLaboratoryPayload>,
) -> Result<(StatusCode, Json<Laboratory>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lab = app_state
        .catalog_repo
        .create_laboratory(payload.name.trim(), payload.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(lab)))
}

#[utoipa::path(
    put,
    path = "/api/laboratories/{id}",
    tag = "Catalog",
    request_body = UpdateLaboratoryPayload,
    responses(
        (status = 200, description = "Laboratório atualizado", body = Laboratory),
        (status = 404, description = "Laboratório não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do laboratório")),
    security(("api_jwt" = []))
)]
pub async fn update_laboratory(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLaboratoryPayload>,
) -> Result<Json<Laboratory>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lab = app_state
        .catalog_repo
        .update_laboratory(id, payload.name.as_deref(), payload.description.as_deref())
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Laboratório".into()))?;

    Ok(Json(lab))
}

#[utoipa::path(
    delete,
    path = "/api/laboratories/{id}",
    tag = "Catalog",
    responses(
        (status = 204, description = "Laboratório removido"),
        (status = 404, description = "Laboratório não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do laboratório")),
    security(("api_jwt" = []))
)]
pub async fn delete_laboratory(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !app_state.catalog_repo.delete_laboratory(id).await? {
        return Err(AppError::ResourceNotFound("Laboratório".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Produtos
// ---

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    responses((status = 200, description = "Todos os produtos", body = [ProductDetail])),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ProductDetail>>, AppError> {
    let products = app_state.catalog_repo.list_products().await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/api/laboratories/{id}/products",
    tag = "Catalog",
    responses((status = 200, description = "Produtos do laboratório", body = [Product])),
    params(("id" = Uuid, Path, description = "ID do laboratório")),
    security(("api_jwt" = []))
)]
pub async fn list_products_by_laboratory(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = app_state.catalog_repo.list_products_by_laboratory(id).await?;
    Ok(Json(products))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Catalog",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 404, description = "Laboratório não encontrado"),
        (status = 409, description = "Produto já existe neste laboratório")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    // O laboratório precisa existir antes do produto
    app_state
        .catalog_repo
        .find_laboratory_by_id(payload.laboratory_id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Laboratório".into()))?;

    let product = app_state
        .catalog_repo
        .create_product(payload.laboratory_id, payload.name.trim(), payload.code.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Catalog",
    request_body = UpdateProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<Json<Product>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .catalog_repo
        .update_product(id, payload.name.as_deref(), payload.code.as_deref())
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Produto".into()))?;

    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Catalog",
    responses(
        (status = 204, description = "Produto removido"),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !app_state.catalog_repo.delete_product(id).await? {
        return Err(AppError::ResourceNotFound("Produto".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Fornecedores
// ---

#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Catalog",
    responses((status = 200, description = "Todos os fornecedores", body = [Supplier])),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Supplier>>, AppError> {
    let suppliers = app_state.catalog_repo.list_suppliers().await?;
    Ok(Json(suppliers))
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Catalog",
    request_body = CreateSupplierPayload,
    responses(
        (status = 201, description = "Fornecedor criado", body = Supplier),
        (status = 409, description = "Fornecedor já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let supplier = app_state
        .catalog_repo
        .create_supplier(
            payload.name.trim(),
            payload.contact.as_deref(),
            payload.address.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    tag = "Catalog",
    request_body = UpdateSupplierPayload,
    responses(
        (status = 200, description = "Fornecedor atualizado", body = Supplier),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    security(("api_jwt" = []))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierPayload>,
) -> Result<Json<Supplier>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let supplier = app_state
        .catalog_repo
        .update_supplier(
            id,
            payload.name.as_deref(),
            payload.contact.as_deref(),
            payload.address.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Fornecedor".into()))?;

    Ok(Json(supplier))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    tag = "Catalog",
    responses(
        (status = 204, description = "Fornecedor removido"),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    security(("api_jwt" = []))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !app_state.catalog_repo.delete_supplier(id).await? {
        return Err(AppError::ResourceNotFound("Fornecedor".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
