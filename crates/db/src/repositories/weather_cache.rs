use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;

use fournee_core::domain::weather::WeatherCacheEntry;
use fournee_core::errors::StoreError;
use fournee_core::ports::WeatherCacheStore;

use super::codec::{format_date, format_timestamp, parse_date, parse_timestamp};
use super::RepositoryError;
use crate::DbPool;

pub struct SqlWeatherCacheRepository {
    pool: DbPool,
}

impl SqlWeatherCacheRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch_fresh(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        fresh_since: DateTime<Utc>,
    ) -> Result<Option<WeatherCacheEntry>, RepositoryError> {
        let row = sqlx::query(
            "SELECT latitude, longitude, forecast_date, temperature_avg, precipitation_mm,
                    weather_condition, fetched_at
             FROM weather_cache
             WHERE latitude = ? AND longitude = ? AND forecast_date = ? AND fetched_at > ?
             LIMIT 1",
        )
        .bind(latitude)
        .bind(longitude)
        .bind(format_date(date))
        .bind(format_timestamp(fresh_since))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_entry).transpose()
    }

    async fn write(&self, entry: &WeatherCacheEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO weather_cache
                (latitude, longitude, forecast_date, temperature_avg, precipitation_mm,
                 weather_condition, fetched_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (latitude, longitude, forecast_date) DO UPDATE SET
                temperature_avg = excluded.temperature_avg,
                precipitation_mm = excluded.precipitation_mm,
                weather_condition = excluded.weather_condition,
                fetched_at = excluded.fetched_at",
        )
        .bind(entry.latitude)
        .bind(entry.longitude)
        .bind(format_date(entry.forecast_date))
        .bind(entry.temperature_c)
        .bind(entry.precipitation_mm)
        .bind(&entry.condition)
        .bind(format_timestamp(entry.fetched_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<WeatherCacheEntry, RepositoryError> {
    let latitude: f64 = row.try_get("latitude").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let longitude: f64 =
        row.try_get("longitude").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let forecast_date: String =
        row.try_get("forecast_date").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let temperature_c: Option<f64> =
        row.try_get("temperature_avg").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let precipitation_mm: Option<f64> =
        row.try_get("precipitation_mm").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let condition: Option<String> =
        row.try_get("weather_condition").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let fetched_at: String =
        row.try_get("fetched_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(WeatherCacheEntry {
        latitude,
        longitude,
        forecast_date: parse_date(&forecast_date)?,
        temperature_c,
        precipitation_mm,
        condition,
        fetched_at: parse_timestamp(&fetched_at)?,
    })
}

#[async_trait::async_trait]
impl WeatherCacheStore for SqlWeatherCacheRepository {
    async fn get_fresh(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        fresh_since: DateTime<Utc>,
    ) -> Result<Option<WeatherCacheEntry>, StoreError> {
        Ok(self.fetch_fresh(latitude, longitude, date, fresh_since).await?)
    }

    async fn upsert(&self, entry: WeatherCacheEntry) -> Result<(), StoreError> {
        Ok(self.write(&entry).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    use fournee_core::domain::weather::WeatherCacheEntry;
    use fournee_core::ports::WeatherCacheStore;

    use super::SqlWeatherCacheRepository;
    use crate::{connect_with_settings, migrations};

    async fn repo() -> SqlWeatherCacheRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlWeatherCacheRepository::new(pool)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("timestamp")
    }

    fn entry(fetched_at: DateTime<Utc>, condition: &str) -> WeatherCacheEntry {
        WeatherCacheEntry {
            latitude: 48.8566,
            longitude: 2.3522,
            forecast_date: NaiveDate::from_ymd_opt(2024, 6, 2).expect("date"),
            temperature_c: Some(18.5),
            precipitation_mm: None,
            condition: Some(condition.to_owned()),
            fetched_at,
        }
    }

    #[tokio::test]
    async fn freshness_window_excludes_its_start() {
        let repo = repo().await;
        let fresh_since = now() - Duration::hours(6);
        repo.upsert(entry(fresh_since + Duration::minutes(1), "moyen")).await.expect("upsert");

        let found = repo
            .get_fresh(48.8566, 2.3522, entry(now(), "moyen").forecast_date, fresh_since)
            .await
            .expect("lookup")
            .expect("fresh entry");
        assert_eq!(found.precipitation_mm, None);
        assert_eq!(found.temperature_c, Some(18.5));

        let stale = repo
            .get_fresh(
                48.8566,
                2.3522,
                found.forecast_date,
                fresh_since + Duration::minutes(2),
            )
            .await
            .expect("lookup");
        assert!(stale.is_none());

        let boundary = repo
            .get_fresh(
                48.8566,
                2.3522,
                found.forecast_date,
                fresh_since + Duration::minutes(1),
            )
            .await
            .expect("lookup");
        assert!(boundary.is_none(), "an entry fetched exactly at the cutoff is stale");
    }

    #[tokio::test]
    async fn upsert_refreshes_the_fetch_timestamp() {
        let repo = repo().await;
        repo.upsert(entry(now() - Duration::hours(10), "mauvais")).await.expect("first");
        repo.upsert(entry(now(), "beau")).await.expect("refresh");

        let found = repo
            .get_fresh(48.8566, 2.3522, entry(now(), "beau").forecast_date, now() - Duration::hours(1))
            .await
            .expect("lookup")
            .expect("refreshed entry");
        assert_eq!(found.condition.as_deref(), Some("beau"));
        assert_eq!(found.fetched_at, now());
    }
}
