use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;

use fournee_core::domain::product::ProductId;
use fournee_core::domain::user::UserId;
use fournee_core::errors::StoreError;
use fournee_core::ports::SalesHistory;

use super::codec::{format_date, format_timestamp, to_u32};
use super::RepositoryError;
use crate::DbPool;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewSale {
    pub product_id: ProductId,
    pub sale_date: NaiveDate,
    pub quantity_sold: u32,
    pub quantity_unsold: u32,
}

pub struct SqlSalesRepository {
    pool: DbPool,
}

impl SqlSalesRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Records the day's sales; a second entry for the same day replaces the first.
    /// Returns false when the product does not belong to the user.
    pub async fn record(
        &self,
        user_id: UserId,
        sale: NewSale,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO daily_sales
                (user_id, product_id, sale_date, quantity_sold, quantity_unsold, created_at)
             SELECT ?, id, ?, ?, ?, ? FROM products WHERE id = ? AND user_id = ?
             ON CONFLICT (user_id, product_id, sale_date) DO UPDATE SET
                quantity_sold = excluded.quantity_sold,
                quantity_unsold = excluded.quantity_unsold",
        )
        .bind(user_id.0)
        .bind(format_date(sale.sale_date))
        .bind(i64::from(sale.quantity_sold))
        .bind(i64::from(sale.quantity_unsold))
        .bind(format_timestamp(now))
        .bind(sale.product_id.0)
        .bind(user_id.0)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn fetch_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        date: NaiveDate,
    ) -> Result<Option<u32>, RepositoryError> {
        let row = sqlx::query(
            "SELECT quantity_sold FROM daily_sales
             WHERE user_id = ? AND product_id = ? AND sale_date = ?",
        )
        .bind(user_id.0)
        .bind(product_id.0)
        .bind(format_date(date))
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let quantity: i64 =
                row.try_get("quantity_sold").map_err(|e| RepositoryError::Decode(e.to_string()))?;
            to_u32("quantity_sold", quantity)
        })
        .transpose()
    }
}

#[async_trait::async_trait]
impl SalesHistory for SqlSalesRepository {
    async fn quantity_sold(
        &self,
        user_id: UserId,
        product_id: ProductId,
        date: NaiveDate,
    ) -> Result<Option<u32>, StoreError> {
        Ok(self.fetch_quantity(user_id, product_id, date).await?)
    }
}
