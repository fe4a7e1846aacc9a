use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::Serialize;

use fournee_core::domain::event::EventWindow;
use fournee_core::domain::product::{ImportanceTier, Product};
use fournee_core::domain::user::{ShopLocation, User, UserId};

use crate::connection::DbPool;
use crate::repositories::{
    NewCulturalEvent, NewExceptionalEvent, NewProduct, NewSale, NewUser, RepositoryError,
    SqlEventRepository, SqlProductRepository, SqlSalesRepository, SqlUserRepository,
};

pub const DEMO_EMAIL: &str = "demo@fournee.local";
pub const DEMO_CALENDAR: &str = "Fêtes françaises";
pub const DEMO_EXCEPTIONAL_EVENT: &str = "Marché de producteurs";

/// Days of sales history written before the seed date; covers the J-365 lookback.
pub const DEMO_HISTORY_DAYS: i64 = 400;

const DEMO_LATITUDE: f64 = 47.2184;
const DEMO_LONGITUDE: f64 = -1.5536;

struct DemoProduct {
    name: &'static str,
    category: &'static str,
    importance: ImportanceTier,
    daily_volume: u32,
}

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Baguette tradition",
        category: "pain",
        importance: ImportanceTier::Core,
        daily_volume: 120,
    },
    DemoProduct {
        name: "Croissant",
        category: "viennoiserie",
        importance: ImportanceTier::Core,
        daily_volume: 80,
    },
    DemoProduct {
        name: "Pain au chocolat",
        category: "viennoiserie",
        importance: ImportanceTier::Secondary,
        daily_volume: 60,
    },
    DemoProduct {
        name: "Tarte aux pommes",
        category: "patisserie",
        importance: ImportanceTier::Opportunistic,
        daily_volume: 12,
    },
];

/// (name, event type, month, first day, last day, impact)
const DEMO_HOLIDAYS: &[(&str, &str, u32, u32, u32, i32)] = &[
    ("Épiphanie", "religieux", 1, 2, 10, 8),
    ("Chandeleur", "tradition", 2, 2, 2, 5),
    ("Fête de la musique", "culturel", 6, 21, 21, 5),
    ("Noël", "religieux", 12, 20, 24, 10),
];

/// Deterministic demo shop: one located user, four products, a year of sales,
/// a subscribed holiday calendar and an upcoming exceptional event.
pub struct DemoSeedDataset;

impl DemoSeedDataset {
    /// Loads the dataset relative to `today`. Reloading updates rows in place.
    pub async fn load(
        pool: &DbPool,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<SeedResult, RepositoryError> {
        let users = SqlUserRepository::new(pool.clone());
        let products = SqlProductRepository::new(pool.clone());
        let sales = SqlSalesRepository::new(pool.clone());
        let events = SqlEventRepository::new(pool.clone());

        let user = demo_user(&users, now).await?;

        let mut seeded = Vec::with_capacity(DEMO_PRODUCTS.len());
        for demo in DEMO_PRODUCTS {
            let product = products
                .upsert(
                    user.id,
                    NewProduct {
                        name: demo.name.to_owned(),
                        category: Some(demo.category.to_owned()),
                        importance: demo.importance,
                    },
                    now,
                )
                .await?;
            seeded.push((product, demo.daily_volume));
        }

        let mut sales_rows = 0;
        for offset in 1..=DEMO_HISTORY_DAYS {
            let day = today - Duration::days(offset);
            for (index, (product, volume)) in seeded.iter().enumerate() {
                let sold = demo_quantity(*volume, day, index);
                let sale = NewSale {
                    product_id: product.id,
                    sale_date: day,
                    quantity_sold: sold,
                    quantity_unsold: sold / 10,
                };
                if sales.record(user.id, sale, now).await? {
                    sales_rows += 1;
                }
            }
        }

        let calendar_id = events
            .ensure_calendar(DEMO_CALENDAR, "national", Some("Jours fériés et traditions"))
            .await?;
        let cultural_events = seed_holidays(pool, &events, calendar_id, today).await?;
        events.set_subscription(user.id, calendar_id, true).await?;

        let exceptional_events = seed_exceptional_event(pool, &events, user.id, today, now).await?;

        Ok(SeedResult {
            user_id: user.id,
            shop_name: user.shop_name,
            products: seeded.into_iter().map(|(product, _)| product).collect(),
            sales_rows,
            cultural_events,
            exceptional_events,
        })
    }
}

async fn demo_user(users: &SqlUserRepository, now: DateTime<Utc>) -> Result<User, RepositoryError> {
    let location = ShopLocation { latitude: DEMO_LATITUDE, longitude: DEMO_LONGITUDE };
    if let Some(existing) = users.find_by_email(DEMO_EMAIL).await? {
        users.set_location(existing.id, Some(location)).await?;
        return Ok(User { location: Some(location), ..existing });
    }

    users
        .create(
            NewUser {
                email: DEMO_EMAIL.to_owned(),
                shop_name: "Boulangerie du Marché".to_owned(),
                address: Some("12 place du Bouffay, Nantes".to_owned()),
                location: Some(location),
            },
            now,
        )
        .await
}

async fn seed_holidays(
    pool: &DbPool,
    events: &SqlEventRepository,
    calendar_id: i64,
    today: NaiveDate,
) -> Result<usize, RepositoryError> {
    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(1) FROM cultural_events WHERE calendar_id = ?")
            .bind(calendar_id)
            .fetch_one(pool)
            .await?;
    if existing > 0 {
        return Ok(existing as usize);
    }

    let mut inserted = 0;
    for year in [today.year() - 1, today.year(), today.year() + 1] {
        for (name, event_type, month, first, last, impact) in DEMO_HOLIDAYS {
            let (Some(start), Some(end)) = (
                NaiveDate::from_ymd_opt(year, *month, *first),
                NaiveDate::from_ymd_opt(year, *month, *last),
            ) else {
                continue;
            };
            events
                .add_cultural_event(
                    calendar_id,
                    NewCulturalEvent {
                        name: (*name).to_owned(),
                        event_type: Some((*event_type).to_owned()),
                        window: EventWindow { start, end: Some(end) },
                        default_impact_percent: *impact,
                    },
                )
                .await?;
            inserted += 1;
        }
    }
    Ok(inserted)
}

async fn seed_exceptional_event(
    pool: &DbPool,
    events: &SqlEventRepository,
    user_id: UserId,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<usize, RepositoryError> {
    let existing: i64 = sqlx::query_scalar(
        "SELECT COUNT(1) FROM exceptional_events WHERE user_id = ? AND name = ?",
    )
    .bind(user_id.0)
    .bind(DEMO_EXCEPTIONAL_EVENT)
    .fetch_one(pool)
    .await?;
    if existing > 0 {
        return Ok(existing as usize);
    }

    events
        .add_exceptional_event(
            user_id,
            NewExceptionalEvent {
                name: DEMO_EXCEPTIONAL_EVENT.to_owned(),
                window: EventWindow {
                    start: today + Duration::days(3),
                    end: Some(today + Duration::days(4)),
                },
                impact_percent: 12,
                affected_categories: vec!["viennoiserie".to_owned()],
                notes: Some("Place du Bouffay, stand partagé".to_owned()),
            },
            now,
        )
        .await?;
    Ok(1)
}

/// Weekend uplift plus a small deterministic wobble per day and product.
fn demo_quantity(volume: u32, day: NaiveDate, product_index: usize) -> u32 {
    let weekday_percent: u32 = match day.weekday() {
        Weekday::Sat => 130,
        Weekday::Sun => 115,
        Weekday::Mon => 85,
        _ => 100,
    };
    let wobble = (day.ordinal() as usize * 7 + product_index * 13) % 11;
    let scaled = volume * weekday_percent / 100;
    (scaled + wobble as u32).saturating_sub(5)
}

#[derive(Clone, Debug, Serialize)]
pub struct SeedResult {
    pub user_id: UserId,
    pub shop_name: String,
    pub products: Vec<Product>,
    pub sales_rows: usize,
    pub cultural_events: usize,
    pub exceptional_events: usize,
}
