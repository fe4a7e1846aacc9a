//! Contextual adjustment of the weighted base.

use crate::domain::event::ActiveEvent;

pub const EVENT_IMPACT_CAP: i32 = 10;
pub const MAX_TOTAL_ADJUSTMENT: i32 = 15;
pub const PRUDENT_RATIO_PERCENT: u64 = 90;

/// Summed impact of a group of events, capped above. Negative sums are kept as-is.
pub fn capped_event_impact(events: &[ActiveEvent]) -> i32 {
    events.iter().map(|event| event.impact_percent).sum::<i32>().min(EVENT_IMPACT_CAP)
}

pub fn total_adjustment(weather_impact: i32, cultural: &[ActiveEvent], exceptional: &[ActiveEvent]) -> i32 {
    let total = weather_impact
        .saturating_add(capped_event_impact(cultural))
        .saturating_add(capped_event_impact(exceptional));
    total.clamp(-MAX_TOTAL_ADJUSTMENT, MAX_TOTAL_ADJUSTMENT)
}

/// `round(base * (1 + adjustment / 100))`, half-up, never below zero.
pub fn adjusted_quantity(base: u32, adjustment_percent: i32) -> u32 {
    let factor = 100 + i64::from(adjustment_percent);
    let scaled = i64::from(base) * factor;
    if scaled <= 0 {
        return 0;
    }
    u32::try_from((scaled + 50) / 100).unwrap_or(u32::MAX)
}

pub fn prudent_quantity(standard: u32) -> u32 {
    let scaled = u64::from(standard) * PRUDENT_RATIO_PERCENT;
    u32::try_from((scaled + 50) / 100).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{adjusted_quantity, capped_event_impact, prudent_quantity, total_adjustment};
    use crate::domain::event::ActiveEvent;

    fn event(name: &str, impact_percent: i32) -> ActiveEvent {
        ActiveEvent { name: name.to_owned(), impact_percent }
    }

    #[test]
    fn event_sums_are_capped_at_ten() {
        let events = vec![event("Noël", 8), event("Réveillon", 8), event("Marché", 8)];

        assert_eq!(capped_event_impact(&events), 10);
        assert_eq!(capped_event_impact(&[]), 0);
    }

    #[test]
    fn negative_event_sums_are_not_floored() {
        let events = vec![event("Travaux", -20), event("Grève", -15)];

        assert_eq!(capped_event_impact(&events), -35);
    }

    #[test]
    fn total_adjustment_is_clamped_to_fifteen() {
        let high = vec![event("Fête", 30)];
        let low = vec![event("Travaux", -40)];

        assert_eq!(total_adjustment(5, &high, &high), 15);
        assert_eq!(total_adjustment(-10, &low, &low), -15);
        assert_eq!(total_adjustment(5, &[event("Fête", 8)], &[]), 13);

        for weather in -10..=10 {
            for cultural in [-50, -5, 0, 7, 40] {
                for exceptional in [-60, 0, 9, 25] {
                    let total = total_adjustment(
                        weather,
                        &[event("c", cultural)],
                        &[event("e", exceptional)],
                    );
                    assert!((-15..=15).contains(&total), "adjustment {total} escaped the clamp");
                }
            }
        }
    }

    #[test]
    fn adjusted_and_prudent_quantities_round_half_up() {
        assert_eq!(adjusted_quantity(104, 13), 118);
        assert_eq!(prudent_quantity(118), 106);
        assert_eq!(adjusted_quantity(50, 1), 51);
        assert_eq!(prudent_quantity(5), 5);
        assert_eq!(prudent_quantity(0), 0);
    }

    #[test]
    fn adjusted_quantity_never_goes_negative() {
        assert_eq!(adjusted_quantity(0, -15), 0);
        assert_eq!(adjusted_quantity(3, -15), 3);
        assert_eq!(adjusted_quantity(1, -15), 1);
    }
}
