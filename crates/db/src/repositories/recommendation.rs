use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;

use fournee_core::domain::product::{compare_names, ProductId};
use fournee_core::domain::recommendation::{
    HistoricalSignals, ProductForecast, SignalWeights, StoredRecommendation,
};
use fournee_core::domain::user::UserId;
use fournee_core::errors::StoreError;
use fournee_core::ports::RecommendationStore;

use super::codec::{
    decode_names, encode_names, format_date, format_timestamp, parse_date, parse_timestamp, to_u32,
};
use super::RepositoryError;
use crate::DbPool;

pub struct SqlRecommendationRepository {
    pool: DbPool,
}

impl SqlRecommendationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn write_batch(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
        forecasts: &[ProductForecast],
        generated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let day = format_date(target_date);
        let generated_at = format_timestamp(generated_at);
        let mut tx = self.pool.begin().await?;

        for forecast in forecasts {
            sqlx::query(
                "INSERT INTO recommendations (
                    user_id, product_id, recommendation_date, generated_at,
                    quantity_standard, quantity_prudent, confidence_level,
                    weather_condition, weather_impact_percent, season, day_of_week,
                    active_cultural_events, active_exceptional_events,
                    j7_value, j14_value, j365_value, j7_weight, j14_weight, j365_weight,
                    total_adjustment_percent, explanation
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT (user_id, product_id, recommendation_date) DO UPDATE SET
                    generated_at = excluded.generated_at,
                    quantity_standard = excluded.quantity_standard,
                    quantity_prudent = excluded.quantity_prudent,
                    confidence_level = excluded.confidence_level,
                    weather_condition = excluded.weather_condition,
                    weather_impact_percent = excluded.weather_impact_percent,
                    season = excluded.season,
                    day_of_week = excluded.day_of_week,
                    active_cultural_events = excluded.active_cultural_events,
                    active_exceptional_events = excluded.active_exceptional_events,
                    j7_value = excluded.j7_value,
                    j14_value = excluded.j14_value,
                    j365_value = excluded.j365_value,
                    j7_weight = excluded.j7_weight,
                    j14_weight = excluded.j14_weight,
                    j365_weight = excluded.j365_weight,
                    total_adjustment_percent = excluded.total_adjustment_percent,
                    explanation = excluded.explanation",
            )
            .bind(user_id.0)
            .bind(forecast.product_id.0)
            .bind(&day)
            .bind(&generated_at)
            .bind(i64::from(forecast.standard_quantity))
            .bind(i64::from(forecast.prudent_quantity))
            .bind(i64::from(forecast.confidence))
            .bind(forecast.weather.condition.as_str())
            .bind(forecast.weather.impact_percent)
            .bind(forecast.season.as_str())
            .bind(&forecast.weekday)
            .bind(encode_names(&forecast.cultural_events)?)
            .bind(encode_names(&forecast.exceptional_events)?)
            .bind(forecast.history.j7.map(i64::from))
            .bind(forecast.history.j14.map(i64::from))
            .bind(forecast.history.j365.map(i64::from))
            .bind(i64::from(forecast.weights.j7))
            .bind(i64::from(forecast.weights.j14))
            .bind(i64::from(forecast.weights.j365))
            .bind(forecast.adjustment_percent)
            .bind(&forecast.explanation)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fetch_for_date(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
    ) -> Result<Vec<StoredRecommendation>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT r.*, p.name AS product_name
             FROM recommendations r
             JOIN products p ON p.id = r.product_id
             WHERE r.user_id = ? AND r.recommendation_date = ?",
        )
        .bind(user_id.0)
        .bind(format_date(target_date))
        .fetch_all(&self.pool)
        .await?;

        let mut listed = rows.iter().map(row_to_recommendation).collect::<Result<Vec<_>, _>>()?;
        listed.sort_by(|left, right| {
            right
                .standard_quantity
                .cmp(&left.standard_quantity)
                .then_with(|| compare_names(&left.product_name, &right.product_name))
        });
        Ok(listed)
    }
}

fn decode<'r, T>(row: &'r sqlx::sqlite::SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn optional_u32(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<Option<u32>, RepositoryError> {
    decode::<Option<i64>>(row, column)?.map(|value| to_u32(column, value)).transpose()
}

fn weight(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<u8, RepositoryError> {
    let value: i64 = decode(row, column)?;
    u8::try_from(value)
        .map_err(|_| RepositoryError::Decode(format!("column `{column}` out of range: {value}")))
}

fn row_to_recommendation(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<StoredRecommendation, RepositoryError> {
    let target_date: String = decode(row, "recommendation_date")?;
    let generated_at: String = decode(row, "generated_at")?;
    let cultural: String = decode(row, "active_cultural_events")?;
    let exceptional: String = decode(row, "active_exceptional_events")?;
    let confidence = weight(row, "confidence_level")?;

    Ok(StoredRecommendation {
        id: decode(row, "id")?,
        user_id: UserId(decode(row, "user_id")?),
        product_id: ProductId(decode(row, "product_id")?),
        product_name: decode(row, "product_name")?,
        target_date: parse_date(&target_date)?,
        standard_quantity: to_u32("quantity_standard", decode(row, "quantity_standard")?)?,
        prudent_quantity: to_u32("quantity_prudent", decode(row, "quantity_prudent")?)?,
        confidence,
        weather_condition: decode(row, "weather_condition")?,
        weather_impact_percent: decode(row, "weather_impact_percent")?,
        season: decode(row, "season")?,
        weekday: decode(row, "day_of_week")?,
        cultural_events: decode_names(&cultural)?,
        exceptional_events: decode_names(&exceptional)?,
        history: HistoricalSignals {
            j7: optional_u32(row, "j7_value")?,
            j14: optional_u32(row, "j14_value")?,
            j365: optional_u32(row, "j365_value")?,
        },
        weights: SignalWeights {
            j7: weight(row, "j7_weight")?,
            j14: weight(row, "j14_weight")?,
            j365: weight(row, "j365_weight")?,
        },
        adjustment_percent: decode(row, "total_adjustment_percent")?,
        explanation: decode(row, "explanation")?,
        generated_at: parse_timestamp(&generated_at)?,
    })
}

#[async_trait::async_trait]
impl RecommendationStore for SqlRecommendationRepository {
    async fn upsert_batch(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
        forecasts: &[ProductForecast],
        generated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        Ok(self.write_batch(user_id, target_date, forecasts, generated_at).await?)
    }

    async fn list_for_date(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
    ) -> Result<Vec<StoredRecommendation>, StoreError> {
        Ok(self.fetch_for_date(user_id, target_date).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    use fournee_core::domain::product::{ImportanceTier, ProductId};
    use fournee_core::domain::recommendation::{
        HistoricalSignals, ProductForecast, Season, SignalWeights,
    };
    use fournee_core::domain::user::UserId;
    use fournee_core::domain::weather::WeatherReading;
    use fournee_core::errors::StoreError;
    use fournee_core::ports::RecommendationStore;

    use super::SqlRecommendationRepository;
    use crate::repositories::{NewProduct, NewUser, SqlProductRepository, SqlUserRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    fn target() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 2).expect("date")
    }

    async fn setup() -> (DbPool, UserId, UserId, Vec<ProductId>) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let users = SqlUserRepository::new(pool.clone());
        let products = SqlProductRepository::new(pool.clone());

        let mut user_ids = Vec::new();
        for email in ["alice@example.test", "bruno@example.test"] {
            let user = users
                .create(
                    NewUser {
                        email: email.to_owned(),
                        shop_name: email.to_owned(),
                        address: None,
                        location: None,
                    },
                    Utc::now(),
                )
                .await
                .expect("user");
            user_ids.push(user.id);
        }

        let mut product_ids = Vec::new();
        for name in ["Baguette", "Croissant"] {
            let product = products
                .upsert(
                    user_ids[0],
                    NewProduct {
                        name: name.to_owned(),
                        category: None,
                        importance: ImportanceTier::Core,
                    },
                    Utc::now(),
                )
                .await
                .expect("product");
            product_ids.push(product.id);
        }

        (pool, user_ids[0], user_ids[1], product_ids)
    }

    fn forecast(product_id: ProductId, name: &str, standard: u32) -> ProductForecast {
        ProductForecast {
            product_id,
            product_name: name.to_owned(),
            target_date: target(),
            history: HistoricalSignals { j7: Some(standard), j14: None, j365: None },
            weights: SignalWeights { j7: 100, j14: 0, j365: 0 },
            base_quantity: standard,
            weather: WeatherReading::neutral(target()),
            cultural_events: vec!["Fête des pères".to_owned()],
            exceptional_events: Vec::new(),
            adjustment_percent: 0,
            standard_quantity: standard,
            prudent_quantity: standard * 9 / 10,
            confidence: 70,
            explanation: format!("Base : {standard} unités (calculée à partir de l'historique)"),
            season: Season::Ete,
            weekday: "dimanche".to_owned(),
        }
    }

    #[tokio::test]
    async fn regeneration_overwrites_instead_of_duplicating() {
        let (pool, alice, _, products) = setup().await;
        let repo = SqlRecommendationRepository::new(pool.clone());
        let first_run = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).single().expect("timestamp");

        repo.upsert_batch(alice, target(), &[forecast(products[0], "Baguette", 100)], first_run)
            .await
            .expect("first run");
        repo.upsert_batch(
            alice,
            target(),
            &[forecast(products[0], "Baguette", 120)],
            first_run + Duration::hours(2),
        )
        .await
        .expect("second run");

        let stored = repo.list_for_date(alice, target()).await.expect("list");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].standard_quantity, 120);
        assert_eq!(stored[0].generated_at, first_run + Duration::hours(2));
        assert_eq!(stored[0].cultural_events, vec!["Fête des pères".to_owned()]);
        assert_eq!(stored[0].history.j14, None);
        assert_eq!(stored[0].weather_condition.as_deref(), Some("moyen"));
    }

    #[tokio::test]
    async fn listing_orders_by_standard_quantity_and_isolates_tenants() {
        let (pool, alice, bruno, products) = setup().await;
        let repo = SqlRecommendationRepository::new(pool);

        repo.upsert_batch(
            alice,
            target(),
            &[forecast(products[0], "Baguette", 40), forecast(products[1], "Croissant", 90)],
            Utc::now(),
        )
        .await
        .expect("batch");

        let names: Vec<String> = repo
            .list_for_date(alice, target())
            .await
            .expect("list")
            .into_iter()
            .map(|recommendation| recommendation.product_name)
            .collect();
        assert_eq!(names, vec!["Croissant".to_owned(), "Baguette".to_owned()]);
        assert!(repo.list_for_date(bruno, target()).await.expect("bruno").is_empty());
    }

    #[tokio::test]
    async fn failing_row_rolls_back_the_whole_batch() {
        let (pool, alice, _, products) = setup().await;
        let repo = SqlRecommendationRepository::new(pool);

        let result = repo
            .upsert_batch(
                alice,
                target(),
                &[forecast(products[0], "Baguette", 40), forecast(ProductId(9_999), "Fantôme", 10)],
                Utc::now(),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Query(_))));
        assert!(repo.list_for_date(alice, target()).await.expect("list").is_empty());
    }
}
