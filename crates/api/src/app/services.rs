//! Store selection and service wiring.

use std::sync::Arc;

use anyhow::Context;

use pharmatrack_infra::{db, InMemoryDrugRepository, PostgresDrugRepository};
use pharmatrack_inventory::{DrugInventoryService, DrugRepository};

use crate::config::StoreBackend;

pub type SharedDrugRepository = Arc<dyn DrugRepository>;

pub type DrugService = DrugInventoryService<SharedDrugRepository>;

/// Everything the HTTP handlers need, shared behind one `Arc`.
pub struct AppServices {
    drugs: DrugService,
    backend: &'static str,
}

impl AppServices {
    pub fn new(repository: SharedDrugRepository, backend: &'static str) -> Self {
        Self {
            drugs: DrugInventoryService::new(repository),
            backend,
        }
    }

    /// Fresh, empty in-memory store (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDrugRepository::new()), "in_memory")
    }

    pub fn drugs(&self) -> &DrugService {
        &self.drugs
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }
}

pub async fn build_services(backend: &StoreBackend) -> anyhow::Result<AppServices> {
    let services = match backend {
        StoreBackend::InMemory => AppServices::in_memory(),
        StoreBackend::Postgres(config) => {
            let pool = config
                .connect()
                .await
                .context("failed to connect to Postgres")?;
            db::ensure_schema(&pool)
                .await
                .context("failed to create the drugs schema")?;
            AppServices::new(Arc::new(PostgresDrugRepository::new(pool)), "postgres")
        }
    };

    tracing::info!(backend = services.backend(), "drug store ready");
    Ok(services)
}
