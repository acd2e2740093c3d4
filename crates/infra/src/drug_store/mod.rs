//! Drug record store backends.
//!
//! Both backends implement `pharmatrack_inventory::DrugRepository` with the
//! same ordering, uniqueness and atomicity semantics, so the inventory service
//! behaves identically on either.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryDrugRepository;
pub use postgres::PostgresDrugRepository;
