//! Drug repository contract.
//!
//! Persistence-facing operations only: no business validation happens here.
//! Backends live in `pharmatrack-infra` (in-memory for tests/dev, PostgreSQL
//! for production).
//!
//! ## Ordering
//!
//! Every list-returning operation orders by `created_at` descending, ties
//! broken by `id` descending, so pagination is stable.
//!
//! ## Atomicity
//!
//! `batch_create` is all-or-nothing at the storage boundary.

use std::sync::Arc;

use thiserror::Error;

use pharmatrack_core::{DrugId, Page, PageRequest};

use crate::drug::{DrugPatch, DrugRecord, NewDrug};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository-level failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// The store rejected a write through one of its constraints
    /// (unique `sku`, positive quantity/price).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// An update tried to move a record onto a SKU another record holds.
    #[error("SKU already exists: {0}")]
    DuplicateSku(String),

    /// Connection, pool or driver failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// A persisted row could not be mapped back into a record.
    #[error("invalid persisted drug data: {0}")]
    InvalidData(String),
}

/// Storage-agnostic access to drug records.
#[async_trait::async_trait]
pub trait DrugRepository: Send + Sync {
    async fn get_all(&self) -> RepoResult<Vec<DrugRecord>>;

    async fn get_by_id(&self, id: DrugId) -> RepoResult<Option<DrugRecord>>;

    async fn get_by_sku(&self, sku: &str) -> RepoResult<Option<DrugRecord>>;

    /// Case-insensitive substring match on name, generic name or manufacturer.
    async fn search(&self, text: &str) -> RepoResult<Vec<DrugRecord>>;

    /// Exact, case-sensitive category match.
    async fn filter_by_category(&self, category: &str) -> RepoResult<Vec<DrugRecord>>;

    /// Records with `quantity < threshold`.
    async fn get_low_stock(&self, threshold: i64) -> RepoResult<Vec<DrugRecord>>;

    /// Insert one record. A taken SKU surfaces as `ConstraintViolation` from
    /// the store itself; there is no pre-check.
    async fn create(&self, input: NewDrug) -> RepoResult<DrugRecord>;

    /// Apply the present fields of `patch` and refresh `updated_at`.
    ///
    /// Returns `Ok(None)` when `id` does not exist.
    async fn update(&self, id: DrugId, patch: DrugPatch) -> RepoResult<Option<DrugRecord>>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: DrugId) -> RepoResult<bool>;

    async fn exists(&self, sku: &str) -> RepoResult<bool>;

    /// Insert all inputs in one atomic unit, preserving input order.
    async fn batch_create(&self, inputs: Vec<NewDrug>) -> RepoResult<Vec<DrugRecord>>;

    /// The subset of `skus` already present, in one lookup.
    async fn check_existing_skus(&self, skus: &[String]) -> RepoResult<Vec<String>>;

    /// One page of all records; `total` is the unfiltered row count.
    async fn get_paginated(&self, request: PageRequest) -> RepoResult<Page<DrugRecord>>;

    /// One page of `search(text)`; `total` is the filtered count.
    async fn search_paginated(
        &self,
        text: &str,
        request: PageRequest,
    ) -> RepoResult<Page<DrugRecord>>;
}

#[async_trait::async_trait]
impl<R> DrugRepository for Arc<R>
where
    R: DrugRepository + ?Sized,
{
    async fn get_all(&self) -> RepoResult<Vec<DrugRecord>> {
        (**self).get_all().await
    }

    async fn get_by_id(&self, id: DrugId) -> RepoResult<Option<DrugRecord>> {
        (**self).get_by_id(id).await
    }

    async fn get_by_sku(&self, sku: &str) -> RepoResult<Option<DrugRecord>> {
        (**self).get_by_sku(sku).await
    }

    async fn search(&self, text: &str) -> RepoResult<Vec<DrugRecord>> {
        (**self).search(text).await
    }

    async fn filter_by_category(&self, category: &str) -> RepoResult<Vec<DrugRecord>> {
        (**self).filter_by_category(category).await
    }

    async fn get_low_stock(&self, threshold: i64) -> RepoResult<Vec<DrugRecord>> {
        (**self).get_low_stock(threshold).await
    }

    async fn create(&self, input: NewDrug) -> RepoResult<DrugRecord> {
        (**self).create(input).await
    }

    async fn update(&self, id: DrugId, patch: DrugPatch) -> RepoResult<Option<DrugRecord>> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: DrugId) -> RepoResult<bool> {
        (**self).delete(id).await
    }

    async fn exists(&self, sku: &str) -> RepoResult<bool> {
        (**self).exists(sku).await
    }

    async fn batch_create(&self, inputs: Vec<NewDrug>) -> RepoResult<Vec<DrugRecord>> {
        (**self).batch_create(inputs).await
    }

    async fn check_existing_skus(&self, skus: &[String]) -> RepoResult<Vec<String>> {
        (**self).check_existing_skus(skus).await
    }

    async fn get_paginated(&self, request: PageRequest) -> RepoResult<Page<DrugRecord>> {
        (**self).get_paginated(request).await
    }

    async fn search_paginated(
        &self,
        text: &str,
        request: PageRequest,
    ) -> RepoResult<Page<DrugRecord>> {
        (**self).search_paginated(text, request).await
    }
}
