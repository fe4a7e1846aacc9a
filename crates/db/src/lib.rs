//! SQLite persistence for Fournée: pool, migrations, store implementations and demo data.

pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod wiring;

pub use connection::{connect, connect_with_config, connect_with_settings, DbPool};
pub use fixtures::{DemoSeedDataset, SeedResult};
