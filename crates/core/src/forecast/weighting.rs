//! Adaptive blending of the J-7, J-14 and J-365 sales observations.

use crate::domain::recommendation::{HistoricalSignals, SignalWeights};

/// Weights are a pure function of which signals are present.
pub fn signal_weights(history: &HistoricalSignals) -> SignalWeights {
    let weights = |j7, j14, j365| SignalWeights { j7, j14, j365 };

    match (history.j7.is_some(), history.j14.is_some(), history.j365.is_some()) {
        (false, false, false) => weights(0, 0, 0),
        (true, true, true) => weights(40, 20, 40),
        (true, true, false) => weights(60, 40, 0),
        (true, false, false) => weights(100, 0, 0),
        (true, false, true) => weights(50, 0, 50),
        (false, true, false) => weights(0, 100, 0),
        (false, true, true) => weights(0, 50, 50),
        (false, false, true) => weights(0, 0, 100),
    }
}

/// Weighted sum of the present observations, rounded half-up. Zero when nothing is present.
pub fn weighted_base(history: &HistoricalSignals, weights: &SignalWeights) -> u32 {
    let weighted = [
        (history.j7, weights.j7),
        (history.j14, weights.j14),
        (history.j365, weights.j365),
    ]
    .into_iter()
    .filter_map(|(value, weight)| value.map(|value| u64::from(value) * u64::from(weight)))
    .sum::<u64>();

    u32::try_from((weighted + 50) / 100).unwrap_or(u32::MAX)
}
