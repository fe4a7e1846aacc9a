use crate::domain::weather::WeatherCondition;

const MAX_IMPACT: i32 = 10;

/// Maps daily temperature (°C), precipitation (mm) and WMO weather code to a condition.
pub fn classify(temperature_c: f64, precipitation_mm: f64, weather_code: i32) -> WeatherCondition {
    if precipitation_mm > 5.0 || temperature_c < 5.0 || temperature_c > 35.0 || weather_code >= 61 {
        return WeatherCondition::Mauvais;
    }

    if precipitation_mm == 0.0 && (15.0..=28.0).contains(&temperature_c) && weather_code <= 3 {
        return WeatherCondition::Beau;
    }

    WeatherCondition::Moyen
}

/// Expected effect of the weather on sales, in percent, within [-10, 10].
pub fn weather_impact(condition: WeatherCondition, temperature_c: f64, precipitation_mm: f64) -> i32 {
    let mut impact = match condition {
        WeatherCondition::Beau => 5,
        WeatherCondition::Moyen => 0,
        WeatherCondition::Mauvais => -5,
    };

    if precipitation_mm > 10.0 {
        impact -= 3;
    }
    if temperature_c < 0.0 {
        impact -= 2;
    }
    if temperature_c > 32.0 {
        impact -= 2;
    }

    impact.clamp(-MAX_IMPACT, MAX_IMPACT)
}
