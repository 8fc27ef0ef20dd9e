// src/db/catalog_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Laboratory, Product, ProductDetail, Supplier},
};

// Catálogo: laboratórios, produtos e fornecedores.
//
// Os métodos `upsert_*` são a resolução por chave natural usada pela
// ingestão: um único INSERT .. ON CONFLICT .. RETURNING, atômico no banco.
// Nunca implemente esses caminhos como find + create separados: duas
// ingestões simultâneas do mesmo nome criariam entidades duplicadas.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Laboratórios
    // ---

    pub async fn list_laboratories(&self) -> Result<Vec<Laboratory>, AppError> {
        let labs =
            sqlx::query_as::<_, Laboratory>("SELECT * FROM laboratories ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(labs)
    }

    pub async fn find_laboratory_by_id(&self, id: Uuid) -> Result<Option<Laboratory>, AppError> {
        let lab = sqlx::query_as::<_, Laboratory>("SELECT * FROM laboratories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lab)
    }

    pub async fn create_laboratory(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Laboratory, AppError> {
        sqlx::query_as::<_, Laboratory>(
            r#"
            INSERT INTO laboratories (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Este laboratório já existe.".into(),
                    );
                }
            }
            e.into()
        })
    }

    // Resolução por nome: encontra ou cria, de forma idempotente.
    // O DO UPDATE é proposital: garante que RETURNING sempre devolva a linha,
    // mesmo quando ela já existia.
    pub async fn upsert_laboratory(&self, name: &str) -> Result<Laboratory, AppError> {
        let lab = sqlx::query_as::<_, Laboratory>(
            r#"
            INSERT INTO laboratories (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(lab)
    }

    pub async fn update_laboratory(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Laboratory>, AppError> {
        sqlx::query_as::<_, Laboratory>(
            r#"
            UPDATE laboratories
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Este laboratório já existe.".into(),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn delete_laboratory(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM laboratories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products(&self) -> Result<Vec<ProductDetail>, AppError> {
        let products = sqlx::query_as::<_, ProductDetail>(
            r#"
            SELECT p.id, p.laboratory_id, l.name AS laboratory_name,
                   p.name, p.code, p.created_at, p.updated_at
            FROM products p
            JOIN laboratories l ON l.id = p.laboratory_id
            ORDER BY p.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn list_products_by_laboratory(
        &self,
        laboratory_id: Uuid,
    ) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE laboratory_id = $1 ORDER BY name ASC",
        )
        .bind(laboratory_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    // Busca por nome simples, usada pela criação de pedidos em massa.
    // Se o mesmo nome existir em mais de um laboratório, vale o registro
    // mais antigo.
    pub async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE name = $1 ORDER BY created_at ASC LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn create_product(
        &self,
        laboratory_id: Uuid,
        name: &str,
        code: Option<&str>,
    ) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (laboratory_id, name, code)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(laboratory_id)
        .bind(name)
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Este produto já existe neste laboratório.".into(),
                    );
                }
            }
            e.into()
        })
    }

    // Resolução pela chave composta (laboratory_id, name).
    pub async fn upsert_product(
        &self,
        laboratory_id: Uuid,
        name: &str,
    ) -> Result<Product, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (laboratory_id, name)
            VALUES ($1, $2)
            ON CONFLICT (laboratory_id, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(laboratory_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        name: Option<&str>,
        code: Option<&str>,
    ) -> Result<Option<Product>, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                code = COALESCE($3, code),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Este produto já existe neste laboratório.".into(),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Fornecedores
    // ---

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        let suppliers =
            sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(suppliers)
    }

    pub async fn find_supplier_by_id(&self, id: Uuid) -> Result<Option<Supplier>, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(supplier)
    }

    pub async fn find_supplier_by_name(&self, name: &str) -> Result<Option<Supplier>, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(supplier)
    }

    pub async fn create_supplier(
        &self,
        name: &str,
        contact: Option<&str>,
        address: Option<&str>,
    ) -> Result<Supplier, AppError> {
        sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, contact, address)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(contact)
        .bind(address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Este fornecedor já existe.".into(),
                    );
                }
            }
            e.into()
        })
    }

    // Resolução por nome a partir do cabeçalho de coluna da planilha.
    pub async fn upsert_supplier(&self, name: &str) -> Result<Supplier, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(supplier)
    }

    pub async fn update_supplier(
        &self,
        id: Uuid,
        name: Option<&str>,
        contact: Option<&str>,
        address: Option<&str>,
    ) -> Result<Option<Supplier>, AppError> {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = COALESCE($2, name),
                contact = COALESCE($3, contact),
                address = COALESCE($4, address),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(contact)
        .bind(address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Este fornecedor já existe.".into(),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn delete_supplier(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
