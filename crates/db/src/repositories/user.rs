use chrono::{DateTime, Utc};
use sqlx::Row;

use fournee_core::domain::user::{ShopLocation, User, UserId};
use fournee_core::errors::StoreError;
use fournee_core::ports::UserDirectory;

use super::codec::format_timestamp;
use super::RepositoryError;
use crate::DbPool;

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub shop_name: String,
    pub address: Option<String>,
    pub location: Option<ShopLocation>,
}

pub struct SqlUserRepository {
    pool: DbPool,
}

impl SqlUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: NewUser, now: DateTime<Utc>) -> Result<User, RepositoryError> {
        let id = sqlx::query(
            "INSERT INTO users (email, shop_name, address, latitude, longitude, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&user.email)
        .bind(&user.shop_name)
        .bind(&user.address)
        .bind(user.location.map(|location| location.latitude))
        .bind(user.location.map(|location| location.longitude))
        .bind(format_timestamp(now))
        .fetch_one(&self.pool)
        .await?
        .try_get::<i64, _>("id")?;

        Ok(User { id: UserId(id), shop_name: user.shop_name, location: user.location })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, shop_name, latitude, longitude FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn set_location(
        &self,
        user_id: UserId,
        location: Option<ShopLocation>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET latitude = ?, longitude = ? WHERE id = ?")
            .bind(location.map(|location| location.latitude))
            .bind(location.map(|location| location.longitude))
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn fetch(&self, user_id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, shop_name, latitude, longitude FROM users WHERE id = ?")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_user).transpose()
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let shop_name: String =
        row.try_get("shop_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let latitude: Option<f64> =
        row.try_get("latitude").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let longitude: Option<f64> =
        row.try_get("longitude").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(ShopLocation { latitude, longitude }),
        _ => None,
    };

    Ok(User { id: UserId(id), shop_name, location })
}

#[async_trait::async_trait]
impl UserDirectory for SqlUserRepository {
    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.fetch(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use fournee_core::domain::user::{ShopLocation, UserId};
    use fournee_core::ports::UserDirectory;

    use super::{NewUser, SqlUserRepository};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn new_user(email: &str, location: Option<ShopLocation>) -> NewUser {
        NewUser {
            email: email.to_owned(),
            shop_name: "Boulangerie du Port".to_owned(),
            address: None,
            location,
        }
    }

    #[tokio::test]
    async fn created_user_is_found_with_location() {
        let repo = SqlUserRepository::new(setup().await);
        let location = ShopLocation { latitude: 43.3, longitude: 5.37 };

        let created =
            repo.create(new_user("port@example.test", Some(location)), Utc::now()).await.expect("create");
        let found = repo.find_user(created.id).await.expect("find").expect("user exists");

        assert_eq!(found.location, Some(location));
        assert_eq!(found.shop_name, "Boulangerie du Port");
        assert_eq!(
            repo.find_by_email("port@example.test").await.expect("by email").map(|user| user.id),
            Some(created.id)
        );
    }

    #[tokio::test]
    async fn clearing_location_leaves_user_without_coordinates() {
        let repo = SqlUserRepository::new(setup().await);
        let location = ShopLocation { latitude: 45.76, longitude: 4.83 };
        let created =
            repo.create(new_user("lyon@example.test", Some(location)), Utc::now()).await.expect("create");

        repo.set_location(created.id, None).await.expect("clear location");

        let found = repo.find_user(created.id).await.expect("find").expect("user exists");
        assert_eq!(found.location, None);
        assert!(repo.find_user(UserId(999)).await.expect("find").is_none());
    }
}
