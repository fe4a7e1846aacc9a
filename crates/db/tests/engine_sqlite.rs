use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use fournee_core::domain::event::{ActiveEvent, EventWindow};
use fournee_core::domain::product::ImportanceTier;
use fournee_core::domain::user::{ShopLocation, UserId};
use fournee_core::domain::weather::{DailyObservation, WeatherBackend};
use fournee_core::errors::{ApplicationError, StoreError};
use fournee_core::ports::{EventCatalog, ForecastSource, RecommendationStore};
use fournee_core::weather::{WeatherError, WeatherProvider};
use fournee_core::{DecisionDraft, DecisionScenario, DecisionService, RecommendationEngine};
use fournee_db::repositories::{
    NewCulturalEvent, NewProduct, NewSale, NewUser, SqlDecisionRepository, SqlEventRepository,
    SqlProductRepository, SqlRecommendationRepository, SqlSalesRepository, SqlUserRepository,
    SqlWeatherCacheRepository,
};
use fournee_db::{connect_with_settings, migrations, DbPool};

const LATITUDE: f64 = 47.2184;
const LONGITUDE: f64 = -1.5536;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 13, 5, 30, 0).single().expect("timestamp")
}

fn target() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 14).expect("date")
}

struct CountingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl ForecastSource for CountingSource {
    async fn daily_observation(
        &self,
        _latitude: f64,
        _longitude: f64,
        _date: NaiveDate,
        backend: WeatherBackend,
    ) -> Result<DailyObservation, WeatherError> {
        assert_eq!(backend, WeatherBackend::Forecast);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(DailyObservation { temperature_c: 21.0, precipitation_mm: 0.0, weather_code: 1 })
    }
}

struct BrokenEvents;

#[async_trait]
impl EventCatalog for BrokenEvents {
    async fn active_cultural_events(
        &self,
        _user_id: UserId,
        _date: NaiveDate,
    ) -> Result<Vec<ActiveEvent>, StoreError> {
        Err(StoreError::Query("calendar table unavailable".to_owned()))
    }

    async fn active_exceptional_events(
        &self,
        _user_id: UserId,
        _date: NaiveDate,
    ) -> Result<Vec<ActiveEvent>, StoreError> {
        Ok(Vec::new())
    }
}

struct Shop {
    pool: DbPool,
    owner: UserId,
    neighbour: UserId,
    source: Arc<CountingSource>,
}

impl Shop {
    fn engine_with_events(&self, events: Arc<dyn EventCatalog>) -> RecommendationEngine {
        let weather = WeatherProvider::new(
            Arc::new(SqlWeatherCacheRepository::new(self.pool.clone())),
            self.source.clone(),
        );
        RecommendationEngine::new(
            Arc::new(SqlProductRepository::new(self.pool.clone())),
            Arc::new(SqlSalesRepository::new(self.pool.clone())),
            events,
            Arc::new(SqlRecommendationRepository::new(self.pool.clone())),
            weather,
        )
    }

    fn engine(&self) -> RecommendationEngine {
        self.engine_with_events(Arc::new(SqlEventRepository::new(self.pool.clone())))
    }
}

async fn open_shop() -> Shop {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");

    let users = SqlUserRepository::new(pool.clone());
    let location = ShopLocation::new(LATITUDE, LONGITUDE).expect("location");
    let owner = users
        .create(
            NewUser {
                email: "atelier@example.test".to_owned(),
                shop_name: "Atelier du Pain".to_owned(),
                address: None,
                location: Some(location),
            },
            now(),
        )
        .await
        .expect("owner");
    let neighbour = users
        .create(
            NewUser {
                email: "voisin@example.test".to_owned(),
                shop_name: "Chez le voisin".to_owned(),
                address: None,
                location: Some(location),
            },
            now(),
        )
        .await
        .expect("neighbour");

    let products = SqlProductRepository::new(pool.clone());
    let baguette = products
        .upsert(
            owner.id,
            NewProduct {
                name: "Baguette".to_owned(),
                category: Some("pain".to_owned()),
                importance: ImportanceTier::Core,
            },
            now(),
        )
        .await
        .expect("baguette");
    let croissant = products
        .upsert(
            owner.id,
            NewProduct {
                name: "Croissant".to_owned(),
                category: Some("viennoiserie".to_owned()),
                importance: ImportanceTier::Secondary,
            },
            now(),
        )
        .await
        .expect("croissant");

    let sales = SqlSalesRepository::new(pool.clone());
    for (product_id, days_back, sold) in [
        (baguette.id, 7, 100),
        (baguette.id, 14, 80),
        (baguette.id, 365, 120),
        (croissant.id, 14, 50),
    ] {
        let sale = NewSale {
            product_id,
            sale_date: target() - Duration::days(days_back),
            quantity_sold: sold,
            quantity_unsold: 0,
        };
        assert!(sales.record(owner.id, sale, now()).await.expect("sale"));
    }

    let events = SqlEventRepository::new(pool.clone());
    let calendar = events.ensure_calendar("Fêtes locales", "local", None).await.expect("calendar");
    events
        .add_cultural_event(
            calendar,
            NewCulturalEvent {
                name: "Fête du quartier".to_owned(),
                event_type: None,
                window: EventWindow { start: target(), end: None },
                default_impact_percent: 8,
            },
        )
        .await
        .expect("event");
    events.set_subscription(owner.id, calendar, true).await.expect("subscription");

    Shop {
        pool,
        owner: owner.id,
        neighbour: neighbour.id,
        source: Arc::new(CountingSource { calls: AtomicUsize::new(0) }),
    }
}

#[tokio::test]
async fn generation_on_sqlite_matches_the_reference_scenario() {
    let shop = open_shop().await;
    let engine = shop.engine();

    let forecasts =
        engine.generate(shop.owner, target(), LATITUDE, LONGITUDE, now()).await.expect("generate");
    assert_eq!(forecasts.len(), 2);

    let stored = engine.list_recommendations(shop.owner, target()).await.expect("list");
    let baguette = &stored[0];
    assert_eq!(baguette.product_name, "Baguette");
    assert_eq!(baguette.standard_quantity, 118);
    assert_eq!(baguette.prudent_quantity, 106);
    assert_eq!(baguette.confidence, 100);
    assert_eq!(baguette.adjustment_percent, 13);
    assert_eq!(baguette.weather_condition.as_deref(), Some("beau"));
    assert_eq!(baguette.cultural_events, vec!["Fête du quartier".to_owned()]);

    let croissant = &stored[1];
    assert_eq!(croissant.weights.j14, 100);
    assert_eq!(croissant.confidence, 65);
}

#[tokio::test]
async fn regeneration_overwrites_rows_and_reuses_cached_weather() {
    let shop = open_shop().await;
    let engine = shop.engine();

    engine.generate(shop.owner, target(), LATITUDE, LONGITUDE, now()).await.expect("first run");
    engine
        .generate(shop.owner, target(), LATITUDE, LONGITUDE, now() + Duration::hours(2))
        .await
        .expect("second run");

    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(1) FROM recommendations WHERE user_id = ? AND recommendation_date = ?",
    )
    .bind(shop.owner.0)
    .bind("2024-06-14")
    .fetch_one(&shop.pool)
    .await
    .expect("count");
    assert_eq!(rows, 2);
    assert_eq!(shop.source.calls.load(Ordering::SeqCst), 1);

    let stored = engine.list_recommendations(shop.owner, target()).await.expect("list");
    assert!(stored.iter().all(|row| row.generated_at == now() + Duration::hours(2)));
}

#[tokio::test]
async fn neighbours_never_see_each_others_recommendations() {
    let shop = open_shop().await;
    let engine = shop.engine();

    engine.generate(shop.owner, target(), LATITUDE, LONGITUDE, now()).await.expect("generate");
    let neighbour_run = engine
        .generate(shop.neighbour, target(), LATITUDE, LONGITUDE, now())
        .await
        .expect("neighbour generate");

    assert!(neighbour_run.is_empty());
    assert!(engine.list_recommendations(shop.neighbour, target()).await.expect("list").is_empty());
    assert_eq!(engine.list_recommendations(shop.owner, target()).await.expect("list").len(), 2);
}

#[tokio::test]
async fn event_store_failure_aborts_the_whole_batch() {
    let shop = open_shop().await;
    let engine = shop.engine_with_events(Arc::new(BrokenEvents));

    let error = engine
        .generate(shop.owner, target(), LATITUDE, LONGITUDE, now())
        .await
        .expect_err("broken events");
    assert!(matches!(error, ApplicationError::Persistence(_)));

    let store = SqlRecommendationRepository::new(shop.pool.clone());
    assert!(store.list_for_date(shop.owner, target()).await.expect("list").is_empty());
}

#[tokio::test]
async fn decisions_link_to_generated_recommendations() {
    let shop = open_shop().await;
    let engine = shop.engine();
    engine.generate(shop.owner, target(), LATITUDE, LONGITUDE, now()).await.expect("generate");
    let stored = engine.list_recommendations(shop.owner, target()).await.expect("list");
    let baguette = &stored[0];

    let decisions = DecisionService::new(
        Arc::new(SqlProductRepository::new(shop.pool.clone())),
        Arc::new(SqlDecisionRepository::new(shop.pool.clone())),
    );
    let saved = decisions
        .record(
            shop.owner,
            vec![DecisionDraft {
                product_id: baguette.product_id,
                target_date: target(),
                scenario: DecisionScenario::Prudent,
                final_quantity: i64::from(baguette.prudent_quantity),
                recommendation_id: Some(baguette.id),
                notes: Some("  pluie annoncée l'après-midi ".to_owned()),
            }],
            now(),
        )
        .await
        .expect("record");

    assert_eq!(saved[0].recommendation_id, Some(baguette.id));
    assert_eq!(saved[0].final_quantity, 106);
    assert_eq!(saved[0].notes.as_deref(), Some("pluie annoncée l'après-midi"));

    let listed = decisions.list(shop.owner, target()).await.expect("list");
    assert_eq!(listed, saved);
    assert!(decisions.list(shop.neighbour, target()).await.expect("list").is_empty());
}
