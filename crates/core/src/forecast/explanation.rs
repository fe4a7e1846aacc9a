use crate::domain::weather::WeatherReading;

const SEPARATOR: &str = " • ";

pub struct ExplanationInput<'a> {
    pub base_quantity: u32,
    pub weather: &'a WeatherReading,
    pub cultural_events: &'a [String],
    pub exceptional_events: &'a [String],
    pub adjustment_percent: i32,
}

/// Human-readable (French) summary of how a forecast was built.
pub fn build_explanation(input: &ExplanationInput<'_>) -> String {
    let mut parts = Vec::with_capacity(5);

    if input.base_quantity > 0 {
        parts.push(format!(
            "Base : {} unités (calculée à partir de l'historique)",
            input.base_quantity
        ));
    } else {
        parts.push("Aucune donnée historique disponible".to_owned());
    }

    if input.weather.impact_percent != 0 {
        parts.push(format!(
            "Météo ({}) : {}%",
            input.weather.condition,
            signed(input.weather.impact_percent)
        ));
    }

    if !input.cultural_events.is_empty() {
        parts.push(format!("Événements culturels actifs : {}", input.cultural_events.join(", ")));
    }

    if !input.exceptional_events.is_empty() {
        parts.push(format!("Événements exceptionnels : {}", input.exceptional_events.join(", ")));
    }

    if input.adjustment_percent != 0 {
        parts.push(format!("Ajustement total : {}%", signed(input.adjustment_percent)));
    }

    parts.join(SEPARATOR)
}

fn signed(value: i32) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{build_explanation, ExplanationInput};
    use crate::domain::weather::{WeatherCondition, WeatherReading};

    fn reading(condition: WeatherCondition, impact_percent: i32) -> WeatherReading {
        WeatherReading {
            date: NaiveDate::from_ymd_opt(2024, 6, 2).expect("date"),
            condition,
            temperature_c: 20.0,
            precipitation_mm: 0.0,
            impact_percent,
        }
    }

    #[test]
    fn full_explanation_lists_every_part_in_order() {
        let weather = reading(WeatherCondition::Beau, 5);
        let cultural = vec!["Fête des pères".to_owned(), "Solstice".to_owned()];
        let exceptional = vec!["Brocante".to_owned()];

        let text = build_explanation(&ExplanationInput {
            base_quantity: 104,
            weather: &weather,
            cultural_events: &cultural,
            exceptional_events: &exceptional,
            adjustment_percent: 13,
        });

        assert_eq!(
            text,
            "Base : 104 unités (calculée à partir de l'historique) • Météo (beau) : +5% • \
             Événements culturels actifs : Fête des pères, Solstice • \
             Événements exceptionnels : Brocante • Ajustement total : +13%"
        );
    }

    #[test]
    fn empty_history_and_neutral_context_yield_single_part() {
        let weather = reading(WeatherCondition::Moyen, 0);

        let text = build_explanation(&ExplanationInput {
            base_quantity: 0,
            weather: &weather,
            cultural_events: &[],
            exceptional_events: &[],
            adjustment_percent: 0,
        });

        assert_eq!(text, "Aucune donnée historique disponible");
    }

    #[test]
    fn negative_impacts_keep_their_minus_sign() {
        let weather = reading(WeatherCondition::Mauvais, -8);

        let text = build_explanation(&ExplanationInput {
            base_quantity: 40,
            weather: &weather,
            cultural_events: &[],
            exceptional_events: &[],
            adjustment_percent: -8,
        });

        assert!(text.contains("Météo (mauvais) : -8%"));
        assert!(text.ends_with("Ajustement total : -8%"));
    }
}
