//! Infrastructure layer: drug record stores, database bootstrap, config.

pub mod config;
pub mod db;
pub mod drug_store;


pub use config::{ConfigError, DatabaseConfig};
pub use drug_store::{InMemoryDrugRepository, PostgresDrugRepository};
