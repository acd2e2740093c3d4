use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use pharmatrack_core::{DrugId, Page, PageRequest};
use pharmatrack_inventory::{
    DrugPatch, DrugRecord, DrugRepository, NewDrug, RepoError, RepoResult,
};

#[derive(Debug)]
struct Table {
    rows: BTreeMap<DrugId, DrugRecord>,
    next_id: i64,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Table {
    fn sku_taken(&self, sku: &str) -> bool {
        self.rows.values().any(|r| r.sku == sku)
    }

    fn insert(&mut self, input: NewDrug) -> DrugRecord {
        let id = DrugId::from_raw(self.next_id);
        self.next_id += 1;
        let record = input.into_record(id, Utc::now());
        self.rows.insert(id, record.clone());
        record
    }

    /// Newest first, ties broken by id.
    fn ordered<'a>(&'a self, keep: impl Fn(&DrugRecord) -> bool) -> Vec<&'a DrugRecord> {
        let mut rows: Vec<&DrugRecord> = self.rows.values().filter(|r| keep(r)).collect();
        rows.sort_by_key(|r| Reverse((r.created_at, r.id)));
        rows
    }
}

/// In-memory drug store.
///
/// Intended for tests/dev. One lock guards the whole table, which is what
/// makes the SKU check-and-insert and `batch_create` atomic here.
#[derive(Debug, Default)]
pub struct InMemoryDrugRepository {
    table: RwLock<Table>,
}

impl InMemoryDrugRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, Table>> {
        self.table
            .read()
            .map_err(|_| RepoError::Storage("lock poisoned".to_string()))
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, Table>> {
        self.table
            .write()
            .map_err(|_| RepoError::Storage("lock poisoned".to_string()))
    }

    fn collect(&self, keep: impl Fn(&DrugRecord) -> bool) -> RepoResult<Vec<DrugRecord>> {
        let table = self.read()?;
        Ok(table.ordered(keep).into_iter().cloned().collect())
    }

    fn page(
        &self,
        request: PageRequest,
        keep: impl Fn(&DrugRecord) -> bool,
    ) -> RepoResult<Page<DrugRecord>> {
        let table = self.read()?;
        let matching = table.ordered(keep);
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, total, request))
    }
}

fn unique_violation(sku: &str) -> RepoError {
    RepoError::ConstraintViolation(format!(
        "duplicate key value violates unique constraint \"drugs_sku_key\": sku '{sku}'"
    ))
}

#[async_trait::async_trait]
impl DrugRepository for InMemoryDrugRepository {
    async fn get_all(&self) -> RepoResult<Vec<DrugRecord>> {
        self.collect(|_| true)
    }

    async fn get_by_id(&self, id: DrugId) -> RepoResult<Option<DrugRecord>> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn get_by_sku(&self, sku: &str) -> RepoResult<Option<DrugRecord>> {
        Ok(self.read()?.rows.values().find(|r| r.sku == sku).cloned())
    }

    async fn search(&self, text: &str) -> RepoResult<Vec<DrugRecord>> {
        let needle = text.to_lowercase();
        self.collect(|r| r.matches_text(&needle))
    }

    async fn filter_by_category(&self, category: &str) -> RepoResult<Vec<DrugRecord>> {
        self.collect(|r| r.category == category)
    }

    async fn get_low_stock(&self, threshold: i64) -> RepoResult<Vec<DrugRecord>> {
        self.collect(|r| r.quantity < threshold)
    }

    async fn create(&self, input: NewDrug) -> RepoResult<DrugRecord> {
        let mut table = self.write()?;
        if table.sku_taken(&input.sku) {
            return Err(unique_violation(&input.sku));
        }
        Ok(table.insert(input))
    }

    async fn update(&self, id: DrugId, patch: DrugPatch) -> RepoResult<Option<DrugRecord>> {
        let mut table = self.write()?;

        let Some(current_sku) = table.rows.get(&id).map(|r| r.sku.clone()) else {
            return Ok(None);
        };

        if let Some(sku) = patch.sku.as_deref() {
            if sku != current_sku && table.sku_taken(sku) {
                return Err(RepoError::DuplicateSku(sku.to_string()));
            }
        }

        let Some(record) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(record);
        record.updated_at = Some(Utc::now());
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: DrugId) -> RepoResult<bool> {
        Ok(self.write()?.rows.remove(&id).is_some())
    }

    async fn exists(&self, sku: &str) -> RepoResult<bool> {
        Ok(self.read()?.sku_taken(sku))
    }

    async fn batch_create(&self, inputs: Vec<NewDrug>) -> RepoResult<Vec<DrugRecord>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut table = self.write()?;

        // Validate the whole batch before touching the table.
        {
            let mut batch_skus = HashSet::with_capacity(inputs.len());
            for input in &inputs {
                if table.sku_taken(&input.sku) || !batch_skus.insert(input.sku.as_str()) {
                    return Err(unique_violation(&input.sku));
                }
            }
        }

        Ok(inputs.into_iter().map(|input| table.insert(input)).collect())
    }

    async fn check_existing_skus(&self, skus: &[String]) -> RepoResult<Vec<String>> {
        if skus.is_empty() {
            return Ok(Vec::new());
        }
        let table = self.read()?;
        let present: HashSet<&str> = table.rows.values().map(|r| r.sku.as_str()).collect();
        Ok(skus
            .iter()
            .filter(|sku| present.contains(sku.as_str()))
            .cloned()
            .collect())
    }

    async fn get_paginated(&self, request: PageRequest) -> RepoResult<Page<DrugRecord>> {
        self.page(request, |_| true)
    }

    async fn search_paginated(
        &self,
        text: &str,
        request: PageRequest,
    ) -> RepoResult<Page<DrugRecord>> {
        let needle = text.to_lowercase();
        self.page(request, |r| r.matches_text(&needle))
    }
}
