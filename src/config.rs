// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, path::PathBuf, time::Duration};

use crate::{
    db::{CatalogRepository, DiscountRepository, OrderRepository, UserRepository},
    services::{AuthService, ImportService, OrderService, RotationService},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
    pub export_dir: PathBuf,

    pub user_repo: UserRepository,
    pub catalog_repo: CatalogRepository,
    pub discount_repo: DiscountRepository,
    pub order_repo: OrderRepository,

    pub auth_service: AuthService,
    pub import_service: ImportService,
    pub rotation_service: RotationService,
    pub order_service: OrderService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Diretórios de upload/exportação: efeito colateral de inicialização,
        // nunca revisitado por requisição.
        let upload_dir =
            PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));
        let export_dir = upload_dir.join("pedidos");
        std::fs::create_dir_all(&export_dir)?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let discount_repo = DiscountRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret.clone());
        let import_service = ImportService::new(catalog_repo.clone(), discount_repo.clone());
        let rotation_service = RotationService::new(discount_repo.clone());
        let order_service = OrderService::new(
            order_repo.clone(),
            catalog_repo.clone(),
            discount_repo.clone(),
            export_dir.clone(),
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            upload_dir,
            export_dir,
            user_repo,
            catalog_repo,
            discount_repo,
            order_repo,
            auth_service,
            import_service,
            rotation_service,
            order_service,
        })
    }
}
