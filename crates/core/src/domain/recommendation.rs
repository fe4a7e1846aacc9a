use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::domain::user::UserId;
use crate::domain::weather::WeatherReading;

/// Quantities sold exactly 7, 14 and 365 days before the target date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalSignals {
    pub j7: Option<u32>,
    pub j14: Option<u32>,
    pub j365: Option<u32>,
}

impl HistoricalSignals {
    pub fn present_count(&self) -> usize {
        [self.j7, self.j14, self.j365].iter().filter(|value| value.is_some()).count()
    }
}

/// Integer percentages; they sum to 100, or to 0 when no signal is present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalWeights {
    pub j7: u8,
    pub j14: u8,
    pub j365: u8,
}

impl SignalWeights {
    pub fn total(&self) -> u16 {
        u16::from(self.j7) + u16::from(self.j14) + u16::from(self.j365)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Printemps,
    Ete,
    Automne,
    Hiver,
}

impl Season {
    pub fn of(date: NaiveDate) -> Self {
        match date.month() {
            3..=5 => Self::Printemps,
            6..=8 => Self::Ete,
            9..=11 => Self::Automne,
            _ => Self::Hiver,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Printemps => "printemps",
            Self::Ete => "été",
            Self::Automne => "automne",
            Self::Hiver => "hiver",
        }
    }
}

/// Computed forecast for one product and one target date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductForecast {
    pub product_id: ProductId,
    pub product_name: String,
    pub target_date: NaiveDate,
    pub history: HistoricalSignals,
    pub weights: SignalWeights,
    pub base_quantity: u32,
    pub weather: WeatherReading,
    pub cultural_events: Vec<String>,
    pub exceptional_events: Vec<String>,
    pub adjustment_percent: i32,
    pub standard_quantity: u32,
    pub prudent_quantity: u32,
    pub confidence: u8,
    pub explanation: String,
    pub season: Season,
    pub weekday: String,
}

/// A persisted recommendation row joined with its product name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRecommendation {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub product_name: String,
    pub target_date: NaiveDate,
    pub standard_quantity: u32,
    pub prudent_quantity: u32,
    pub confidence: u8,
    pub weather_condition: Option<String>,
    pub weather_impact_percent: i32,
    pub season: String,
    pub weekday: String,
    pub cultural_events: Vec<String>,
    pub exceptional_events: Vec<String>,
    pub history: HistoricalSignals,
    pub weights: SignalWeights,
    pub adjustment_percent: i32,
    pub explanation: String,
    pub generated_at: DateTime<Utc>,
}
