//! Drug inventory domain module.
//!
//! This crate contains the business rules for the pharmacy inventory: the drug
//! record model, the repository contract persistence backends implement, and
//! the inventory service that enforces uniqueness, expiration and batch rules.
//! No IO, no HTTP, no storage specifics live here.

pub mod clock;
pub mod drug;
pub mod error;
pub mod expiry;
pub mod repository;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use drug::{DrugPatch, DrugRecord, NewDrug};
pub use error::{InventoryError, InventoryResult};
pub use repository::{DrugRepository, RepoError, RepoResult};
pub use service::{
    ALL_CATEGORIES, DEFAULT_EXPIRING_WINDOW_DAYS, DEFAULT_LOW_STOCK_THRESHOLD, DeleteAck,
    DrugInventoryService,
};
