use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use pharmatrack_core::Page;

// -------------------------
// Request DTOs
// -------------------------

/// Create body. Every field is optional at the wire level so that missing
/// fields produce per-field validation messages instead of a parse failure.
/// Numeric fields stay raw JSON so a wrong type is reported per field too.
#[derive(Debug, Default, Deserialize)]
pub struct CreateDrugRequest {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub generic_name: Option<String>,
    pub dosage: Option<String>,
    pub quantity: Option<Value>,
    pub expiration_date: Option<String>,
    pub manufacturer: Option<String>,
    pub price: Option<Value>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Update body: absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDrugRequest {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub generic_name: Option<String>,
    pub dosage: Option<String>,
    pub quantity: Option<Value>,
    pub expiration_date: Option<String>,
    pub manufacturer: Option<String>,
    pub price: Option<Value>,
    pub category: Option<String>,
    /// `null` clears the description; an absent key keeps it.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

/// Distinguishes an explicit `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct ListDrugsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpiringSoonQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PagedDrugsQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages,
        }
    }
}
