// src/handlers/orders.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, files},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CanDownload, CanEdit, RequireCapability},
    },
    models::{
        import::StoredFile,
        order::{
            BatchOrdersPayload, BatchOrdersResponse, CreateOrderPayload, ExportResponse,
            OrderDetail, OrderFilters, UpdateOrderStatusPayload,
        },
    },
};

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado com o percentual congelado", body = OrderDetail),
        (status = 404, description = "Produto ou fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireCapability<CanEdit>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<(StatusCode, Json<OrderDetail>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let order = app_state
        .order_service
        .create_order(
            payload.product_id,
            payload.supplier_id,
            payload.needed_quantity,
            payload.notes.as_deref(),
            user.0.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    params(OrderFilters),
    responses((status = 200, description = "Pedidos filtrados", body = [OrderDetail])),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    Query(filters): Query<OrderFilters>,
) -> Result<Json<Vec<OrderDetail>>, AppError> {
    let orders = app_state.order_repo.list(&filters).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    responses(
        (status = 200, description = "Pedido", body = OrderDetail),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>, AppError> {
    let order = app_state
        .order_repo
        .find_detail_by_id(id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))?;
    Ok(Json(order))
}

// Transição explícita de status; a máquina de estados decide.
#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    tag = "Orders",
    request_body = UpdateOrderStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = OrderDetail),
        (status = 400, description = "Transição inválida"),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> Result<Json<OrderDetail>, AppError> {
    let order = app_state.order_service.transition(id, payload.status).await?;
    Ok(Json(order))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "Orders",
    responses(
        (status = 204, description = "Pedido removido"),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanEdit>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !app_state.order_repo.delete(id).await? {
        return Err(AppError::ResourceNotFound("Pedido".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

// Criação em massa por nomes, com erros acumulados por linha.
#[utoipa::path(
    post,
    path = "/api/orders/batch",
    tag = "Orders",
    request_body = BatchOrdersPayload,
    responses((status = 201, description = "Lote processado", body = BatchOrdersResponse)),
    security(("api_jwt" = []))
)]
pub async fn create_orders_batch(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireCapability<CanEdit>,
    Json(payload): Json<BatchOrdersPayload>,
) -> Result<(StatusCode, Json<BatchOrdersResponse>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let result = app_state
        .order_service
        .create_batch(&payload.orders, user.0.id)
        .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    post,
    path = "/api/orders/export",
    tag = "Orders",
    params(OrderFilters),
    responses(
        (status = 200, description = "Exportação gravada", body = ExportResponse),
        (status = 404, description = "Nada a exportar")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_orders(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanDownload>,
    Query(filters): Query<OrderFilters>,
) -> Result<Json<ExportResponse>, AppError> {
    let result = app_state.order_service.export_orders(&filters).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/orders/files",
    tag = "Orders",
    responses((status = 200, description = "Exportações disponíveis", body = [StoredFile])),
    security(("api_jwt" = []))
)]
pub async fn list_export_files(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanDownload>,
) -> Result<Json<Vec<StoredFile>>, AppError> {
    let files = files::list_files(&app_state.export_dir).await?;
    Ok(Json(files))
}

#[utoipa::path(
    get,
    path = "/api/orders/files/{filename}",
    tag = "Orders",
    responses(
        (status = 200, description = "Conteúdo do arquivo"),
        (status = 404, description = "Arquivo não encontrado")
    ),
    params(("filename" = String, Path, description = "Nome do arquivo exportado")),
    security(("api_jwt" = []))
)]
pub async fn download_export_file(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanDownload>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    files::serve_file(&app_state.export_dir, &filename).await
}
