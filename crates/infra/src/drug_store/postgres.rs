//! Postgres-backed drug store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepoError | Scenario |
//! |------------|----------------------|-----------|----------|
//! | Database (unique violation) | `23505` | `ConstraintViolation` | Insert raced another insert of the same SKU |
//! | Database (unique violation during update) | `23505` | `DuplicateSku` | Update moved a record onto a taken SKU |
//! | Database (check constraint violation) | `23514` | `ConstraintViolation` | Quantity below 1 or non-positive price |
//! | Database (other) | Any other | `Storage` | Other database errors |
//! | PoolClosed / Io / other | N/A | `Storage` | Connection failures |
//!
//! Row decoding failures become `InvalidData`.

use std::sync::Arc;

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{FromRow, PgPool, Postgres, Row};
use tracing::instrument;

use chrono::{DateTime, Utc};
use pharmatrack_core::{DrugId, Page, PageRequest};
use pharmatrack_inventory::{
    DrugPatch, DrugRecord, DrugRepository, NewDrug, RepoError, RepoResult,
};
use rust_decimal::Decimal;

const DRUG_COLUMNS: &str = "id, sku, name, generic_name, dosage, quantity, expiration_date, \
     manufacturer, price, category, description, created_at, updated_at";

const ORDER_NEWEST_FIRST: &str = "ORDER BY created_at DESC, id DESC";

const TEXT_MATCH: &str = "(name ILIKE $1 ESCAPE '\\' \
     OR generic_name ILIKE $1 ESCAPE '\\' \
     OR manufacturer ILIKE $1 ESCAPE '\\')";

/// Drug store on a PostgreSQL `drugs` table (see `crate::db::ensure_schema`).
///
/// The unique constraint on `sku` and the quantity/price check constraints
/// live in the database, so concurrent writers are settled there.
#[derive(Debug, Clone)]
pub struct PostgresDrugRepository {
    pool: Arc<PgPool>,
}

impl PostgresDrugRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn fetch_records(
        &self,
        operation: &str,
        query: Query<'_, Postgres, PgArguments>,
    ) -> RepoResult<Vec<DrugRecord>> {
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        rows.iter().map(record_from_row).collect()
    }

    async fn count(&self, operation: &str, query: Query<'_, Postgres, PgArguments>) -> RepoResult<u64> {
        let row = query
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| RepoError::InvalidData(format!("failed to read total: {e}")))?;
        Ok(total.max(0) as u64)
    }
}

#[async_trait::async_trait]
impl DrugRepository for PostgresDrugRepository {
    #[instrument(skip(self), err)]
    async fn get_all(&self) -> RepoResult<Vec<DrugRecord>> {
        let sql = format!("SELECT {DRUG_COLUMNS} FROM drugs {ORDER_NEWEST_FIRST}");
        self.fetch_records("get_all", sqlx::query(&sql)).await
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&self, id: DrugId) -> RepoResult<Option<DrugRecord>> {
        let sql = format!("SELECT {DRUG_COLUMNS} FROM drugs WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_by_id", e))?;
        row.as_ref().map(record_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn get_by_sku(&self, sku: &str) -> RepoResult<Option<DrugRecord>> {
        let sql = format!("SELECT {DRUG_COLUMNS} FROM drugs WHERE sku = $1");
        let row = sqlx::query(&sql)
            .bind(sku)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_by_sku", e))?;
        row.as_ref().map(record_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn search(&self, text: &str) -> RepoResult<Vec<DrugRecord>> {
        let sql = format!("SELECT {DRUG_COLUMNS} FROM drugs WHERE {TEXT_MATCH} {ORDER_NEWEST_FIRST}");
        self.fetch_records("search", sqlx::query(&sql).bind(like_pattern(text)))
            .await
    }

    #[instrument(skip(self), err)]
    async fn filter_by_category(&self, category: &str) -> RepoResult<Vec<DrugRecord>> {
        let sql = format!("SELECT {DRUG_COLUMNS} FROM drugs WHERE category = $1 {ORDER_NEWEST_FIRST}");
        self.fetch_records("filter_by_category", sqlx::query(&sql).bind(category))
            .await
    }

    #[instrument(skip(self), err)]
    async fn get_low_stock(&self, threshold: i64) -> RepoResult<Vec<DrugRecord>> {
        let sql = format!("SELECT {DRUG_COLUMNS} FROM drugs WHERE quantity < $1 {ORDER_NEWEST_FIRST}");
        self.fetch_records("get_low_stock", sqlx::query(&sql).bind(threshold))
            .await
    }

    #[instrument(skip(self, input), fields(sku = %input.sku), err)]
    async fn create(&self, input: NewDrug) -> RepoResult<DrugRecord> {
        let sql = insert_sql();
        let row = bind_new_drug(sqlx::query(&sql), &input)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create", e))?;
        record_from_row(&row)
    }

    #[instrument(skip(self, patch), err)]
    async fn update(&self, id: DrugId, patch: DrugPatch) -> RepoResult<Option<DrugRecord>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let current_sku: Option<String> =
            sqlx::query_scalar("SELECT sku FROM drugs WHERE id = $1 FOR UPDATE")
                .bind(id.get())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update", e))?;

        let Some(current_sku) = current_sku else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Ok(None);
        };

        if let Some(sku) = patch.sku.as_deref().filter(|sku| *sku != current_sku) {
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM drugs WHERE sku = $1 AND id <> $2)")
                    .bind(sku)
                    .bind(id.get())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("update", e))?;
            if taken {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(RepoError::DuplicateSku(sku.to_string()));
            }
        }

        let sql = format!(
            r#"
            UPDATE drugs SET
                sku = COALESCE($2, sku),
                name = COALESCE($3, name),
                generic_name = COALESCE($4, generic_name),
                dosage = COALESCE($5, dosage),
                quantity = COALESCE($6, quantity),
                expiration_date = COALESCE($7, expiration_date),
                manufacturer = COALESCE($8, manufacturer),
                price = COALESCE($9, price),
                category = COALESCE($10, category),
                description = CASE WHEN $11 THEN $12 ELSE description END,
                updated_at = now()
            WHERE id = $1
            RETURNING {DRUG_COLUMNS}
            "#
        );

        let result = sqlx::query(&sql)
            .bind(id.get())
            .bind(patch.sku.as_deref())
            .bind(patch.name.as_deref())
            .bind(patch.generic_name.as_deref())
            .bind(patch.dosage.as_deref())
            .bind(patch.quantity)
            .bind(patch.expiration_date.as_deref())
            .bind(patch.manufacturer.as_deref())
            .bind(patch.price)
            .bind(patch.category.as_deref())
            .bind(patch.description.is_some())
            .bind(patch.description.clone().flatten())
            .fetch_one(&mut *tx)
            .await;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(match (&patch.sku, is_unique_violation(&e)) {
                    (Some(sku), true) => RepoError::DuplicateSku(sku.clone()),
                    _ => map_sqlx_error("update", e),
                });
            }
        };

        let record = record_from_row(&row)?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(Some(record))
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: DrugId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM drugs WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn exists(&self, sku: &str) -> RepoResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM drugs WHERE sku = $1)")
            .bind(sku)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("exists", e))
    }

    #[instrument(skip(self, inputs), fields(count = inputs.len()), err)]
    async fn batch_create(&self, inputs: Vec<NewDrug>) -> RepoResult<Vec<DrugRecord>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let sql = insert_sql();
        let mut created = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let row = match bind_new_drug(sqlx::query(&sql), input)
                .fetch_one(&mut *tx)
                .await
            {
                Ok(row) => row,
                Err(e) => {
                    tx.rollback()
                        .await
                        .map_err(|e| map_sqlx_error("rollback", e))?;
                    return Err(map_sqlx_error("batch_create", e));
                }
            };
            created.push(record_from_row(&row)?);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        tracing::debug!(count = created.len(), "drug batch inserted");
        Ok(created)
    }

    #[instrument(skip(self, skus), fields(count = skus.len()), err)]
    async fn check_existing_skus(&self, skus: &[String]) -> RepoResult<Vec<String>> {
        if skus.is_empty() {
            return Ok(Vec::new());
        }

        let present: Vec<String> = sqlx::query_scalar("SELECT sku FROM drugs WHERE sku = ANY($1)")
            .bind(skus.to_vec())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("check_existing_skus", e))?;

        Ok(skus
            .iter()
            .filter(|sku| present.contains(sku))
            .cloned()
            .collect())
    }

    #[instrument(skip(self), err)]
    async fn get_paginated(&self, request: PageRequest) -> RepoResult<Page<DrugRecord>> {
        let total = self
            .count("get_paginated", sqlx::query("SELECT COUNT(*) AS total FROM drugs"))
            .await?;

        let sql = format!("SELECT {DRUG_COLUMNS} FROM drugs {ORDER_NEWEST_FIRST} LIMIT $1 OFFSET $2");
        let items = self
            .fetch_records(
                "get_paginated",
                sqlx::query(&sql)
                    .bind(request.limit() as i64)
                    .bind(request.offset() as i64),
            )
            .await?;

        Ok(Page::new(items, total, request))
    }

    #[instrument(skip(self), err)]
    async fn search_paginated(
        &self,
        text: &str,
        request: PageRequest,
    ) -> RepoResult<Page<DrugRecord>> {
        let pattern = like_pattern(text);

        let count_sql = format!("SELECT COUNT(*) AS total FROM drugs WHERE {TEXT_MATCH}");
        let total = self
            .count("search_paginated", sqlx::query(&count_sql).bind(&pattern))
            .await?;

        let sql = format!(
            "SELECT {DRUG_COLUMNS} FROM drugs WHERE {TEXT_MATCH} {ORDER_NEWEST_FIRST} LIMIT $2 OFFSET $3"
        );
        let items = self
            .fetch_records(
                "search_paginated",
                sqlx::query(&sql)
                    .bind(&pattern)
                    .bind(request.limit() as i64)
                    .bind(request.offset() as i64),
            )
            .await?;

        Ok(Page::new(items, total, request))
    }
}

fn insert_sql() -> String {
    format!(
        r#"
        INSERT INTO drugs (
            sku, name, generic_name, dosage, quantity, expiration_date,
            manufacturer, price, category, description
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {DRUG_COLUMNS}
        "#
    )
}

fn bind_new_drug<'q>(
    query: Query<'q, Postgres, PgArguments>,
    input: &'q NewDrug,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(input.sku.as_str())
        .bind(input.name.as_str())
        .bind(input.generic_name.as_str())
        .bind(input.dosage.as_str())
        .bind(input.quantity)
        .bind(input.expiration_date.as_str())
        .bind(input.manufacturer.as_str())
        .bind(input.price)
        .bind(input.category.as_str())
        .bind(input.description.as_deref())
}

/// `%text%` with LIKE metacharacters escaped, so user input matches literally.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn record_from_row(row: &PgRow) -> RepoResult<DrugRecord> {
    DrugRow::from_row(row)
        .map(DrugRecord::from)
        .map_err(|e| RepoError::InvalidData(format!("failed to decode drug row: {e}")))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23514") => RepoError::ConstraintViolation(msg),
                _ => RepoError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            RepoError::Storage(format!("connection pool closed in {operation}"))
        }
        _ => RepoError::Storage(format!("sqlx error in {operation}: {err}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

// SQLx row types

#[derive(Debug)]
struct DrugRow {
    id: i64,
    sku: String,
    name: String,
    generic_name: String,
    dosage: String,
    quantity: i64,
    expiration_date: String,
    manufacturer: String,
    price: Decimal,
    category: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for DrugRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(DrugRow {
            id: row.try_get("id")?,
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            generic_name: row.try_get("generic_name")?,
            dosage: row.try_get("dosage")?,
            quantity: row.try_get("quantity")?,
            expiration_date: row.try_get("expiration_date")?,
            manufacturer: row.try_get("manufacturer")?,
            price: row.try_get("price")?,
            category: row.try_get("category")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<DrugRow> for DrugRecord {
    fn from(row: DrugRow) -> Self {
        DrugRecord {
            id: DrugId::from_raw(row.id),
            sku: row.sku,
            name: row.name,
            generic_name: row.generic_name,
            dosage: row.dosage,
            quantity: row.quantity,
            expiration_date: row.expiration_date,
            manufacturer: row.manufacturer,
            price: row.price,
            category: row.category,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
