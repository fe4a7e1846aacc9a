use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;

use fournee_core::domain::decision::{DecisionScenario, NewDecision, ProductionDecision};
use fournee_core::domain::product::{compare_names, ProductId};
use fournee_core::domain::user::UserId;
use fournee_core::errors::StoreError;
use fournee_core::ports::DecisionStore;

use super::codec::{format_date, format_timestamp, parse_date, parse_timestamp, to_u32};
use super::RepositoryError;
use crate::DbPool;

const SELECT_DECISION: &str = "SELECT pd.id, pd.user_id, pd.product_id, p.name AS product_name,
        pd.decision_date, pd.scenario, pd.final_quantity, pd.recommendation_id, pd.notes,
        pd.validated_at
     FROM production_decisions pd
     JOIN products p ON p.id = pd.product_id";

pub struct SqlDecisionRepository {
    pool: DbPool,
}

impl SqlDecisionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn write_all(
        &self,
        user_id: UserId,
        decisions: &[NewDecision],
        validated_at: DateTime<Utc>,
    ) -> Result<Vec<ProductionDecision>, RepositoryError> {
        let validated_at = format_timestamp(validated_at);
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(decisions.len());

        for decision in decisions {
            // Foreign products yield no row, so `fetch_one` fails with RowNotFound.
            let id = sqlx::query(
                "INSERT INTO production_decisions
                    (recommendation_id, user_id, product_id, decision_date, final_quantity,
                     scenario, notes, validated_at)
                 SELECT (SELECT id FROM recommendations WHERE id = ? AND user_id = ?),
                        ?, p.id, ?, ?, ?, ?, ?
                 FROM products p WHERE p.id = ? AND p.user_id = ?
                 ON CONFLICT (user_id, product_id, decision_date) DO UPDATE SET
                    recommendation_id = excluded.recommendation_id,
                    final_quantity = excluded.final_quantity,
                    scenario = excluded.scenario,
                    notes = excluded.notes,
                    validated_at = excluded.validated_at
                 RETURNING id",
            )
            .bind(decision.recommendation_id)
            .bind(user_id.0)
            .bind(user_id.0)
            .bind(format_date(decision.target_date))
            .bind(i64::from(decision.final_quantity))
            .bind(decision.scenario.as_str())
            .bind(&decision.notes)
            .bind(&validated_at)
            .bind(decision.product_id.0)
            .bind(user_id.0)
            .fetch_one(&mut *tx)
            .await?
            .try_get::<i64, _>("id")?;

            let row = sqlx::query(&format!("{SELECT_DECISION} WHERE pd.id = ?"))
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            saved.push(row_to_decision(&row)?);
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn fetch_for_date(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
    ) -> Result<Vec<ProductionDecision>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{SELECT_DECISION} WHERE pd.user_id = ? AND pd.decision_date = ?"
        ))
        .bind(user_id.0)
        .bind(format_date(target_date))
        .fetch_all(&self.pool)
        .await?;

        let mut listed = rows.iter().map(row_to_decision).collect::<Result<Vec<_>, _>>()?;
        listed.sort_by(|left, right| compare_names(&left.product_name, &right.product_name));
        Ok(listed)
    }
}

fn row_to_decision(row: &sqlx::sqlite::SqliteRow) -> Result<ProductionDecision, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let user_id: i64 = row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let product_id: i64 =
        row.try_get("product_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let product_name: String =
        row.try_get("product_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let decision_date: String =
        row.try_get("decision_date").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let scenario: String =
        row.try_get("scenario").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let final_quantity: i64 =
        row.try_get("final_quantity").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let recommendation_id: Option<i64> =
        row.try_get("recommendation_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let notes: Option<String> =
        row.try_get("notes").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let validated_at: String =
        row.try_get("validated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let scenario = DecisionScenario::parse(&scenario)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown decision scenario `{scenario}`")))?;

    Ok(ProductionDecision {
        id,
        user_id: UserId(user_id),
        product_id: ProductId(product_id),
        product_name,
        target_date: parse_date(&decision_date)?,
        scenario,
        final_quantity: to_u32("final_quantity", final_quantity)?,
        recommendation_id,
        notes,
        validated_at: parse_timestamp(&validated_at)?,
    })
}

#[async_trait::async_trait]
impl DecisionStore for SqlDecisionRepository {
    async fn upsert_decisions(
        &self,
        user_id: UserId,
        decisions: &[NewDecision],
        validated_at: DateTime<Utc>,
    ) -> Result<Vec<ProductionDecision>, StoreError> {
        Ok(self.write_all(user_id, decisions, validated_at).await?)
    }

    async fn list_for_date(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
    ) -> Result<Vec<ProductionDecision>, StoreError> {
        Ok(self.fetch_for_date(user_id, target_date).await?)
    }
}
