use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::domain::user::UserId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionScenario {
    Standard,
    Prudent,
    Custom,
}

impl DecisionScenario {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Prudent => "prudent",
            Self::Custom => "custom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "standard" => Some(Self::Standard),
            "prudent" => Some(Self::Prudent),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Decision as submitted by the shop owner, before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionDraft {
    pub product_id: ProductId,
    pub target_date: NaiveDate,
    pub scenario: DecisionScenario,
    pub final_quantity: i64,
    #[serde(default)]
    pub recommendation_id: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDecision {
    pub product_id: ProductId,
    pub target_date: NaiveDate,
    pub scenario: DecisionScenario,
    pub final_quantity: u32,
    pub recommendation_id: Option<i64>,
    pub notes: Option<String>,
}

impl DecisionDraft {
    pub fn validate(self) -> Result<NewDecision, DomainError> {
        let final_quantity = u32::try_from(self.final_quantity).map_err(|_| {
            DomainError::InvalidDecision(format!(
                "final quantity {} for product {} is out of range",
                self.final_quantity, self.product_id
            ))
        })?;

        let notes = self.notes.map(|notes| notes.trim().to_owned()).filter(|notes| !notes.is_empty());

        Ok(NewDecision {
            product_id: self.product_id,
            target_date: self.target_date,
            scenario: self.scenario,
            final_quantity,
            recommendation_id: self.recommendation_id,
            notes,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionDecision {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub product_name: String,
    pub target_date: NaiveDate,
    pub scenario: DecisionScenario,
    pub final_quantity: u32,
    pub recommendation_id: Option<i64>,
    pub notes: Option<String>,
    pub validated_at: DateTime<Utc>,
}
