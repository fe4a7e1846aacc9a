use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::domain::decision::{DecisionDraft, NewDecision, ProductionDecision};
use crate::domain::user::UserId;
use crate::errors::{ApplicationError, DomainError};
use crate::ports::{DecisionStore, ProductCatalog};

/// Records the quantities a shop owner finally chose to produce.
pub struct DecisionService {
    products: Arc<dyn ProductCatalog>,
    store: Arc<dyn DecisionStore>,
}

impl DecisionService {
    pub fn new(products: Arc<dyn ProductCatalog>, store: Arc<dyn DecisionStore>) -> Self {
        Self { products, store }
    }

    pub async fn record(
        &self,
        user_id: UserId,
        drafts: Vec<DecisionDraft>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProductionDecision>, ApplicationError> {
        if drafts.is_empty() {
            return Err(DomainError::InvalidDecision("no decisions submitted".to_owned()).into());
        }

        let decisions =
            drafts.into_iter().map(DecisionDraft::validate).collect::<Result<Vec<NewDecision>, _>>()?;

        let owned: HashSet<_> = self
            .products
            .list_active_products(user_id)
            .await?
            .into_iter()
            .map(|product| product.id)
            .collect();

        let mut seen = HashSet::new();
        for decision in &decisions {
            if !owned.contains(&decision.product_id) {
                return Err(DomainError::InvalidDecision(format!(
                    "product {} is not an active product of this shop",
                    decision.product_id
                ))
                .into());
            }
            if !seen.insert((decision.product_id, decision.target_date)) {
                return Err(DomainError::InvalidDecision(format!(
                    "product {} appears twice for {}",
                    decision.product_id, decision.target_date
                ))
                .into());
            }
        }

        let saved = self.store.upsert_decisions(user_id, &decisions, now).await?;

        info!(
            event_name = "decision.record.completed",
            user_id = user_id.0,
            decisions = saved.len(),
            "production decisions recorded"
        );

        Ok(saved)
    }

    pub async fn list(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
    ) -> Result<Vec<ProductionDecision>, ApplicationError> {
        Ok(self.store.list_for_date(user_id, target_date).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use super::DecisionService;
    use crate::domain::decision::{DecisionDraft, DecisionScenario, NewDecision, ProductionDecision};
    use crate::domain::product::{ImportanceTier, Product, ProductId};
    use crate::domain::user::UserId;
    use crate::errors::{ApplicationError, DomainError, StoreError};
    use crate::ports::{DecisionStore, ProductCatalog};

    struct OneProduct;

    #[async_trait]
    impl ProductCatalog for OneProduct {
        async fn list_active_products(&self, user_id: UserId) -> Result<Vec<Product>, StoreError> {
            Ok(vec![Product {
                id: ProductId(10),
                user_id,
                name: "Pain de campagne".to_owned(),
                category: Some("pain".to_owned()),
                importance: ImportanceTier::Core,
                active: true,
            }])
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<NewDecision>>,
    }

    #[async_trait]
    impl DecisionStore for RecordingStore {
        async fn upsert_decisions(
            &self,
            user_id: UserId,
            decisions: &[NewDecision],
            validated_at: DateTime<Utc>,
        ) -> Result<Vec<ProductionDecision>, StoreError> {
            let mut saved = self.saved.lock().map_err(|_| StoreError::Query("poisoned".into()))?;
            saved.extend_from_slice(decisions);
            Ok(decisions
                .iter()
                .enumerate()
                .map(|(index, decision)| ProductionDecision {
                    id: index as i64 + 1,
                    user_id,
                    product_id: decision.product_id,
                    product_name: "Pain de campagne".to_owned(),
                    target_date: decision.target_date,
                    scenario: decision.scenario,
                    final_quantity: decision.final_quantity,
                    recommendation_id: decision.recommendation_id,
                    notes: decision.notes.clone(),
                    validated_at,
                })
                .collect())
        }

        async fn list_for_date(
            &self,
            _user_id: UserId,
            _target_date: NaiveDate,
        ) -> Result<Vec<ProductionDecision>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn draft(product_id: i64) -> DecisionDraft {
        DecisionDraft {
            product_id: ProductId(product_id),
            target_date: NaiveDate::from_ymd_opt(2024, 6, 2).expect("date"),
            scenario: DecisionScenario::Prudent,
            final_quantity: 42,
            recommendation_id: Some(7),
            notes: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 19, 30, 0).single().expect("timestamp")
    }

    #[tokio::test]
    async fn records_decisions_for_owned_products() {
        let store = Arc::new(RecordingStore::default());
        let service = DecisionService::new(Arc::new(OneProduct), store.clone());

        let saved = service.record(UserId(1), vec![draft(10)], now()).await.expect("recorded");

        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].scenario, DecisionScenario::Prudent);
        assert_eq!(store.saved.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn rejects_empty_foreign_and_duplicate_batches() {
        let store = Arc::new(RecordingStore::default());
        let service = DecisionService::new(Arc::new(OneProduct), store.clone());

        for drafts in [vec![], vec![draft(99)], vec![draft(10), draft(10)]] {
            let error = service.record(UserId(1), drafts, now()).await.expect_err("must fail");
            assert!(matches!(error, ApplicationError::Domain(DomainError::InvalidDecision(_))));
        }
        assert!(store.saved.lock().expect("lock").is_empty());
    }
}
