// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::update_permissions,

        // --- Catalog ---
        handlers::catalog::list_laboratories,
        handlers::catalog::create_laboratory,
        handlers::catalog::update_laboratory,
        handlers::catalog::delete_laboratory,
        handlers::catalog::list_products,
        handlers::catalog::list_products_by_laboratory,
        handlers::catalog::create_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::catalog::list_suppliers,
        handlers::catalog::create_supplier,
        handlers::catalog::update_supplier,
        handlers::catalog::delete_supplier,

        // --- Discounts ---
        handlers::discounts::upsert_discount,
        handlers::discounts::list_discounts,
        handlers::discounts::best_offers,
        handlers::discounts::update_discount,
        handlers::discounts::delete_discount,
        handlers::discounts::rotate_discounts,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,
        handlers::orders::delete_order,
        handlers::orders::create_orders_batch,
        handlers::orders::export_orders,
        handlers::orders::list_export_files,
        handlers::orders::download_export_file,

        // --- Excel ---
        handlers::excel::upload_excel,
        handlers::excel::list_uploaded_files,
        handlers::excel::download_uploaded_file,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::EffectivePermissions,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::UpdatePermissionsPayload,

            // --- Catalog ---
            models::catalog::Laboratory,
            models::catalog::Product,
            models::catalog::ProductDetail,
            models::catalog::Supplier,
            models::catalog::CreateLaboratoryPayload,
            models::catalog::UpdateLaboratoryPayload,
            models::catalog::CreateProductPayload,
            models::catalog::UpdateProductPayload,
            models::catalog::CreateSupplierPayload,
            models::catalog::UpdateSupplierPayload,

            // --- Discounts ---
            models::discount::Discount,
            models::discount::DiscountDetail,
            models::discount::SupplierOffer,
            models::discount::BestOffer,
            models::discount::BestOffersResponse,
            models::discount::UpsertDiscountPayload,
            models::discount::UpdateDiscountPayload,
            models::discount::RotationResponse,

            // --- Orders ---
            models::order::OrderStatus,
            models::order::Order,
            models::order::OrderDetail,
            models::order::CreateOrderPayload,
            models::order::UpdateOrderStatusPayload,
            models::order::BatchOrderItem,
            models::order::BatchOrdersPayload,
            models::order::BatchOrdersResponse,
            models::order::ExportResponse,

            // --- Import ---
            models::import::ImportStats,
            models::import::ImportReport,
            models::import::UploadResponse,
            models::import::StoredFile,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Usuários e Permissões"),
        (name = "Catalog", description = "Laboratórios, Produtos e Fornecedores"),
        (name = "Discounts", description = "Remessas de Desconto e Rotação Mensal"),
        (name = "Orders", description = "Pedidos de Compra"),
        (name = "Excel", description = "Ingestão de Planilhas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
