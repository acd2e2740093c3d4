//! Drug inventory service: business rules on top of a `DrugRepository`.
//!
//! # Responsibility
//! - Enforce SKU uniqueness before writes (single and batch).
//! - Reject unparsable or past expiration dates on create/update.
//! - Shape read results (categories, expiring-soon window, search + category).
//!
//! # Invariants
//! - A failed batch persists nothing: every check runs before the single
//!   `batch_create` call.
//! - The `exists` pre-check is an optimization. Two racing creates are settled
//!   by the store's unique constraint, which surfaces as `ConstraintViolation`.
//! - The service holds no mutable state and never logs.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use pharmatrack_core::{DrugId, Page, PageRequest};

use crate::clock::{Clock, SystemClock};
use crate::drug::{DrugPatch, DrugRecord, NewDrug};
use crate::error::{InventoryError, InventoryResult};
use crate::expiry::{days_until_expiration, validate_expiration_date};
use crate::repository::DrugRepository;

pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 100;
pub const DEFAULT_EXPIRING_WINDOW_DAYS: i64 = 90;

/// Category sentinel meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Acknowledgment returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteAck {
    pub message: String,
}

pub struct DrugInventoryService<R, C = SystemClock> {
    repository: R,
    clock: C,
}

impl<R: DrugRepository> DrugInventoryService<R, SystemClock> {
    pub fn new(repository: R) -> Self {
        Self::with_clock(repository, SystemClock)
    }
}

impl<R, C> DrugInventoryService<R, C>
where
    R: DrugRepository,
    C: Clock,
{
    pub fn with_clock(repository: R, clock: C) -> Self {
        Self { repository, clock }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub async fn get_all_drugs(&self) -> InventoryResult<Vec<DrugRecord>> {
        Ok(self.repository.get_all().await?)
    }

    pub async fn get_drug_by_id(&self, id: DrugId) -> InventoryResult<DrugRecord> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(InventoryError::NotFound(id))
    }

    /// Text search intersected with an exact category filter.
    ///
    /// An empty `query` means "all records". A `category` of `None` or
    /// `"All"` disables the category filter.
    pub async fn search_drugs(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> InventoryResult<Vec<DrugRecord>> {
        let mut drugs = if query.is_empty() {
            self.repository.get_all().await?
        } else {
            self.repository.search(query).await?
        };

        if let Some(category) = category.filter(|c| !c.is_empty() && *c != ALL_CATEGORIES) {
            drugs.retain(|drug| drug.category == category);
        }

        Ok(drugs)
    }

    /// Paged listing, optionally narrowed by the same text search as `search_drugs`.
    pub async fn list_drugs_page(
        &self,
        query: Option<&str>,
        request: PageRequest,
    ) -> InventoryResult<Page<DrugRecord>> {
        let page = match query.filter(|q| !q.is_empty()) {
            Some(q) => self.repository.search_paginated(q, request).await?,
            None => self.repository.get_paginated(request).await?,
        };
        Ok(page)
    }

    pub async fn get_low_stock_drugs(&self, threshold: i64) -> InventoryResult<Vec<DrugRecord>> {
        Ok(self.repository.get_low_stock(threshold).await?)
    }

    /// Records expiring within `[today, today + days]`.
    ///
    /// Records whose stored date does not parse are skipped, not reported.
    pub async fn get_expiring_soon_drugs(&self, days: i64) -> InventoryResult<Vec<DrugRecord>> {
        let today = self.clock.today();
        let drugs = self.repository.get_all().await?;

        Ok(drugs
            .into_iter()
            .filter(|drug| {
                days_until_expiration(&drug.expiration_date, today)
                    .is_some_and(|left| (0..=days).contains(&left))
            })
            .collect())
    }

    /// Sorted, de-duplicated categories across all records.
    pub async fn get_categories(&self) -> InventoryResult<Vec<String>> {
        let drugs = self.repository.get_all().await?;
        let categories: BTreeSet<String> = drugs.into_iter().map(|d| d.category).collect();
        Ok(categories.into_iter().collect())
    }

    pub async fn create_drug(&self, input: NewDrug) -> InventoryResult<DrugRecord> {
        if self.repository.exists(&input.sku).await? {
            return Err(InventoryError::DuplicateSku(input.sku));
        }

        validate_expiration_date(&input.expiration_date, self.clock.today())?;

        Ok(self.repository.create(input).await?)
    }

    pub async fn batch_create_drugs(&self, inputs: Vec<NewDrug>) -> InventoryResult<Vec<DrugRecord>> {
        if inputs.is_empty() {
            return Err(InventoryError::EmptyBatch);
        }

        {
            let mut seen = HashSet::with_capacity(inputs.len());
            for input in &inputs {
                if !seen.insert(input.sku.as_str()) {
                    return Err(InventoryError::DuplicateInBatch(input.sku.clone()));
                }
            }
        }

        let skus: Vec<String> = inputs.iter().map(|i| i.sku.clone()).collect();
        let existing = self.repository.check_existing_skus(&skus).await?;
        if !existing.is_empty() {
            return Err(InventoryError::SkusAlreadyExist(existing));
        }

        let today = self.clock.today();
        for input in &inputs {
            validate_expiration_date(&input.expiration_date, today)?;
        }

        Ok(self.repository.batch_create(inputs).await?)
    }

    pub async fn update_drug(&self, id: DrugId, patch: DrugPatch) -> InventoryResult<DrugRecord> {
        if self.repository.get_by_id(id).await?.is_none() {
            return Err(InventoryError::NotFound(id));
        }

        if let Some(raw) = patch.expiration_date.as_deref() {
            validate_expiration_date(raw, self.clock.today())?;
        }

        // Deleted between the existence check and the write.
        self.repository
            .update(id, patch)
            .await?
            .ok_or(InventoryError::NotFound(id))
    }

    pub async fn delete_drug(&self, id: DrugId) -> InventoryResult<DeleteAck> {
        if !self.repository.delete(id).await? {
            return Err(InventoryError::NotFound(id));
        }
        Ok(DeleteAck {
            message: "Drug deleted successfully".to_string(),
        })
    }
}
