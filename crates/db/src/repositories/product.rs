use chrono::{DateTime, Utc};
use sqlx::Row;

use fournee_core::domain::product::{compare_names, ImportanceTier, Product, ProductId};
use fournee_core::domain::user::UserId;
use fournee_core::errors::StoreError;
use fournee_core::ports::ProductCatalog;

use super::codec::format_timestamp;
use super::RepositoryError;
use crate::DbPool;

#[derive(Clone, Debug)]
pub struct NewProduct {
    pub name: String,
    pub category: Option<String>,
    pub importance: ImportanceTier,
}

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Inserts the product, or updates category and importance when the name already exists.
    pub async fn upsert(
        &self,
        user_id: UserId,
        product: NewProduct,
        now: DateTime<Utc>,
    ) -> Result<Product, RepositoryError> {
        let id = sqlx::query(
            "INSERT INTO products (user_id, name, category, business_importance, active, created_at)
             VALUES (?, ?, ?, ?, 1, ?)
             ON CONFLICT (user_id, name) DO UPDATE SET
                category = excluded.category,
                business_importance = excluded.business_importance
             RETURNING id",
        )
        .bind(user_id.0)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.importance.as_str())
        .bind(format_timestamp(now))
        .fetch_one(&self.pool)
        .await?
        .try_get::<i64, _>("id")?;

        Ok(Product {
            id: ProductId(id),
            user_id,
            name: product.name,
            category: product.category,
            importance: product.importance,
            active: true,
        })
    }

    pub async fn set_active(
        &self,
        user_id: UserId,
        product_id: ProductId,
        active: bool,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE products SET active = ? WHERE id = ? AND user_id = ?")
            .bind(active)
            .bind(product_id.0)
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn fetch_active(&self, user_id: UserId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, category, business_importance, active
             FROM products
             WHERE user_id = ? AND active = 1",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut products = rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()?;
        products.sort_by(|left, right| compare_names(&left.name, &right.name));
        Ok(products)
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let user_id: i64 = row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let category: Option<String> =
        row.try_get("category").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let importance: String =
        row.try_get("business_importance").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let active: bool = row.try_get("active").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let importance = ImportanceTier::parse(&importance).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown business importance `{importance}`"))
    })?;

    Ok(Product { id: ProductId(id), user_id: UserId(user_id), name, category, importance, active })
}

#[async_trait::async_trait]
impl ProductCatalog for SqlProductRepository {
    async fn list_active_products(&self, user_id: UserId) -> Result<Vec<Product>, StoreError> {
        Ok(self.fetch_active(user_id).await?)
    }
}
