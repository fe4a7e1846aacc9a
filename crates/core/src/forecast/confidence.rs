use crate::domain::recommendation::HistoricalSignals;

const BASE_CONFIDENCE: u8 = 50;
const MAX_CONFIDENCE: u8 = 100;

/// Heuristic 0-100 score of how much history backs the forecast.
pub fn confidence_level(history: &HistoricalSignals) -> u8 {
    let mut score = BASE_CONFIDENCE;
    if history.j7.is_some() {
        score += 20;
    }
    if history.j14.is_some() {
        score += 15;
    }
    if history.j365.is_some() {
        score += 15;
    }
    score.min(MAX_CONFIDENCE)
}
