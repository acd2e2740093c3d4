//! Schema bootstrap for the `drugs` table.
//!
//! Statements are idempotent so every process start can run them.

use sqlx::PgPool;
use tracing::instrument;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS drugs (
        id              BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
        sku             VARCHAR(100) NOT NULL,
        name            VARCHAR(100) NOT NULL,
        generic_name    VARCHAR(100) NOT NULL,
        dosage          VARCHAR(50)  NOT NULL,
        quantity        BIGINT       NOT NULL,
        expiration_date VARCHAR(10)  NOT NULL,
        manufacturer    VARCHAR(100) NOT NULL,
        price           NUMERIC(10, 2) NOT NULL,
        category        VARCHAR(50)  NOT NULL,
        description     VARCHAR(500),
        created_at      TIMESTAMPTZ  NOT NULL DEFAULT now(),
        updated_at      TIMESTAMPTZ,
        CONSTRAINT drugs_sku_key UNIQUE (sku),
        CONSTRAINT drugs_quantity_positive CHECK (quantity >= 1),
        CONSTRAINT drugs_price_positive CHECK (price > 0)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS drugs_name_idx ON drugs (name)",
    "CREATE INDEX IF NOT EXISTS drugs_category_idx ON drugs (category)",
    "CREATE INDEX IF NOT EXISTS drugs_created_at_idx ON drugs (created_at DESC, id DESC)",
];

/// Create the table and its indexes if they do not exist yet.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for &statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!(statements = SCHEMA.len(), "drug schema ensured");
    Ok(())
}
