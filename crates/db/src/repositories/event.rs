use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;

use fournee_core::domain::event::{ActiveEvent, EventWindow};
use fournee_core::domain::user::UserId;
use fournee_core::errors::StoreError;
use fournee_core::ports::EventCatalog;

use super::codec::{encode_names, format_date, format_timestamp};
use super::RepositoryError;
use crate::DbPool;

#[derive(Clone, Debug)]
pub struct NewCulturalEvent {
    pub name: String,
    pub event_type: Option<String>,
    pub window: EventWindow,
    pub default_impact_percent: i32,
}

#[derive(Clone, Debug)]
pub struct NewExceptionalEvent {
    pub name: String,
    pub window: EventWindow,
    pub impact_percent: i32,
    pub affected_categories: Vec<String>,
    pub notes: Option<String>,
}

/// Cultural calendars, user subscriptions and exceptional events.
pub struct SqlEventRepository {
    pool: DbPool,
}

impl SqlEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Returns the calendar id, creating the calendar on first use.
    pub async fn ensure_calendar(
        &self,
        name: &str,
        calendar_type: &str,
        description: Option<&str>,
    ) -> Result<i64, RepositoryError> {
        let id = sqlx::query(
            "INSERT INTO cultural_calendars (name, calendar_type, description)
             VALUES (?, ?, ?)
             ON CONFLICT (name) DO UPDATE SET description = COALESCE(excluded.description, description)
             RETURNING id",
        )
        .bind(name)
        .bind(calendar_type)
        .bind(description)
        .fetch_one(&self.pool)
        .await?
        .try_get::<i64, _>("id")?;
        Ok(id)
    }

    pub async fn add_cultural_event(
        &self,
        calendar_id: i64,
        event: NewCulturalEvent,
    ) -> Result<i64, RepositoryError> {
        let id = sqlx::query(
            "INSERT INTO cultural_events
                (calendar_id, name, event_type, start_date, end_date, default_impact_percent)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(calendar_id)
        .bind(&event.name)
        .bind(&event.event_type)
        .bind(format_date(event.window.start))
        .bind(event.window.end.map(format_date))
        .bind(event.default_impact_percent)
        .fetch_one(&self.pool)
        .await?
        .try_get::<i64, _>("id")?;
        Ok(id)
    }

    /// Enables or disables a calendar for a user.
    pub async fn set_subscription(
        &self,
        user_id: UserId,
        calendar_id: i64,
        active: bool,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO user_calendars (user_id, calendar_id, active)
             VALUES (?, ?, ?)
             ON CONFLICT (user_id, calendar_id) DO UPDATE SET active = excluded.active",
        )
        .bind(user_id.0)
        .bind(calendar_id)
        .bind(active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn add_exceptional_event(
        &self,
        user_id: UserId,
        event: NewExceptionalEvent,
        now: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let categories = if event.affected_categories.is_empty() {
            None
        } else {
            Some(encode_names(&event.affected_categories)?)
        };

        let id = sqlx::query(
            "INSERT INTO exceptional_events
                (user_id, name, start_date, end_date, impact_percent, affected_categories, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(user_id.0)
        .bind(&event.name)
        .bind(format_date(event.window.start))
        .bind(event.window.end.map(format_date))
        .bind(event.impact_percent)
        .bind(categories)
        .bind(&event.notes)
        .bind(format_timestamp(now))
        .fetch_one(&self.pool)
        .await?
        .try_get::<i64, _>("id")?;
        Ok(id)
    }

    async fn fetch_cultural(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<ActiveEvent>, RepositoryError> {
        let day = format_date(date);
        let rows = sqlx::query(
            "SELECT ce.name AS name, ce.default_impact_percent AS impact_percent
             FROM cultural_events ce
             JOIN user_calendars uc ON uc.calendar_id = ce.calendar_id
             WHERE uc.user_id = ?
               AND uc.active = 1
               AND ce.start_date <= ?
               AND (ce.end_date IS NULL OR ce.end_date >= ?)
             ORDER BY ce.start_date, ce.name",
        )
        .bind(user_id.0)
        .bind(&day)
        .bind(&day)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_event).collect()
    }

    async fn fetch_exceptional(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<ActiveEvent>, RepositoryError> {
        let day = format_date(date);
        let rows = sqlx::query(
            "SELECT name, impact_percent
             FROM exceptional_events
             WHERE user_id = ?
               AND start_date <= ?
               AND (end_date IS NULL OR end_date >= ?)
             ORDER BY start_date, name",
        )
        .bind(user_id.0)
        .bind(&day)
        .bind(&day)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_event).collect()
    }
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<ActiveEvent, RepositoryError> {
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let impact_percent: i32 =
        row.try_get("impact_percent").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    Ok(ActiveEvent { name, impact_percent })
}

#[async_trait::async_trait]
impl EventCatalog for SqlEventRepository {
    async fn active_cultural_events(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<ActiveEvent>, StoreError> {
        Ok(self.fetch_cultural(user_id, date).await?)
    }

    async fn active_exceptional_events(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<ActiveEvent>, StoreError> {
        Ok(self.fetch_exceptional(user_id, date).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use fournee_core::domain::event::{ActiveEvent, EventWindow};
    use fournee_core::domain::user::UserId;
    use fournee_core::ports::EventCatalog;

    use super::{NewCulturalEvent, NewExceptionalEvent, SqlEventRepository};
    use crate::repositories::{NewUser, SqlUserRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> (DbPool, UserId, UserId) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let users = SqlUserRepository::new(pool.clone());
        let mut ids = Vec::new();
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
                .expect("create user");
            ids.push(user.id);
        }
        (pool, ids[0], ids[1])
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).expect("date")
    }

    #[tokio::test]
    async fn cultural_events_require_an_active_subscription() {
        let (pool, alice, bruno) = setup().await;
        let repo = SqlEventRepository::new(pool);
        let calendar = repo.ensure_calendar("Fêtes commerciales", "commercial", None).await.expect("calendar");
        repo.add_cultural_event(
            calendar,
            NewCulturalEvent {
                name: "Fête des mères".to_owned(),
                event_type: Some("commerciale".to_owned()),
                window: EventWindow { start: day(5, 24), end: Some(day(5, 26)) },
                default_impact_percent: 8,
            },
        )
        .await
        .expect("event");

        repo.set_subscription(alice, calendar, true).await.expect("subscribe");
        repo.set_subscription(bruno, calendar, false).await.expect("subscribe disabled");

        assert_eq!(
            repo.active_cultural_events(alice, day(5, 26)).await.expect("alice"),
            vec![ActiveEvent { name: "Fête des mères".to_owned(), impact_percent: 8 }]
        );
        assert!(repo.active_cultural_events(alice, day(5, 27)).await.expect("after end").is_empty());
        assert!(repo.active_cultural_events(bruno, day(5, 25)).await.expect("bruno").is_empty());
    }

    #[tokio::test]
    async fn open_ended_exceptional_events_stay_active_for_their_owner_only() {
        let (pool, alice, bruno) = setup().await;
        let repo = SqlEventRepository::new(pool);
        repo.add_exceptional_event(
            alice,
            NewExceptionalEvent {
                name: "Travaux rue principale".to_owned(),
                window: EventWindow { start: day(6, 1), end: None },
                impact_percent: -12,
                affected_categories: vec!["pain".to_owned()],
                notes: Some("Accès piéton uniquement".to_owned()),
            },
            Utc::now(),
        )
        .await
        .expect("event");

        let active = repo.active_exceptional_events(alice, day(9, 30)).await.expect("alice");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].impact_percent, -12);
        assert!(repo.active_exceptional_events(alice, day(5, 31)).await.expect("before").is_empty());
        assert!(repo.active_exceptional_events(bruno, day(9, 30)).await.expect("bruno").is_empty());
    }
}
