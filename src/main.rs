//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Garante a conta root (a API não tem outro caminho para criá-la)
    match (std::env::var("ROOT_EMAIL"), std::env::var("ROOT_PASSWORD")) {
        (Ok(email), Ok(password)) => {
            app_state
                .auth_service
                .ensure_root_user(&email, &password)
                .await
                .expect("Falha ao garantir o usuário root.");
        }
        _ => {
            tracing::warn!(
                "ROOT_EMAIL/ROOT_PASSWORD não definidos; nenhum usuário root foi criado."
            );
        }
    }

    // Rotas de autenticação: login/logout públicas; registro exige token
    // (e o guardião no handler restringe ao root)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route(
            "/register",
            post(handlers::auth::register).layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth_guard,
            )),
        );

    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users))
        .route("/me", get(handlers::auth::get_me))
        .route("/{id}/permissions", put(handlers::users::update_permissions))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let laboratory_routes = Router::new()
        .route(
            "/",
            post(handlers::catalog::create_laboratory).get(handlers::catalog::list_laboratories),
        )
        .route(
            "/{id}",
            put(handlers::catalog::update_laboratory).delete(handlers::catalog::delete_laboratory),
        )
        .route(
            "/{id}/products",
            get(handlers::catalog::list_products_by_laboratory),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let product_routes = Router::new()
        .route(
            "/",
            post(handlers::catalog::create_product).get(handlers::catalog::list_products),
        )
        .route(
            "/{id}",
            put(handlers::catalog::update_product).delete(handlers::catalog::delete_product),
        )
        .route("/{id}/discounts", get(handlers::discounts::best_offers))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let supplier_routes = Router::new()
        .route(
            "/",
            post(handlers::catalog::create_supplier).get(handlers::catalog::list_suppliers),
        )
        .route(
            "/{id}",
            put(handlers::catalog::update_supplier).delete(handlers::catalog::delete_supplier),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let discount_routes = Router::new()
        .route(
            "/",
            post(handlers::discounts::upsert_discount).get(handlers::discounts::list_discounts),
        )
        .route("/rotation", post(handlers::discounts::rotate_discounts))
        .route(
            "/{id}",
            put(handlers::discounts::update_discount).delete(handlers::discounts::delete_discount),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let order_routes = Router::new()
        .route(
            "/",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route("/batch", post(handlers::orders::create_orders_batch))
        .route("/export", post(handlers::orders::export_orders))
        .route("/files", get(handlers::orders::list_export_files))
        .route("/files/{filename}", get(handlers::orders::download_export_file))
        .route(
            "/{id}",
            get(handlers::orders::get_order).delete(handlers::orders::delete_order),
        )
        .route("/{id}/status", put(handlers::orders::update_order_status))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let excel_routes = Router::new()
        .route("/upload", post(handlers::excel::upload_excel))
        .route("/files", get(handlers::excel::list_uploaded_files))
        .route("/files/{filename}", get(handlers::excel::download_uploaded_file))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/laboratories", laboratory_routes)
        .nest("/api/products", product_routes)
        .nest("/api/suppliers", supplier_routes)
        .nest("/api/discounts", discount_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/excel", excel_routes)
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
