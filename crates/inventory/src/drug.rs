use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pharmatrack_core::{DrugId, Entity};

/// A persisted drug record.
///
/// `expiration_date` is kept as the `YYYY-MM-DD` text it was stored with.
/// Validity is checked when a record is created or updated, never
/// retroactively, so readers must tolerate values that no longer parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugRecord {
    pub id: DrugId,
    pub sku: String,
    pub name: String,
    pub generic_name: String,
    pub dosage: String,
    pub quantity: i64,
    pub expiration_date: String,
    pub manufacturer: String,
    pub price: Decimal,
    pub category: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for DrugRecord {
    type Id = DrugId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl DrugRecord {
    /// Case-insensitive substring match over name, generic name and manufacturer.
    ///
    /// `needle_lower` must already be lowercased.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        [&self.name, &self.generic_name, &self.manufacturer]
            .iter()
            .any(|field| field.to_lowercase().contains(needle_lower))
    }
}

/// Creation input: a full record minus store-assigned fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDrug {
    pub sku: String,
    pub name: String,
    pub generic_name: String,
    pub dosage: String,
    pub quantity: i64,
    pub expiration_date: String,
    pub manufacturer: String,
    pub price: Decimal,
    pub category: String,
    pub description: Option<String>,
}

impl NewDrug {
    /// Materialize the input as a record with store-assigned identity.
    pub fn into_record(self, id: DrugId, created_at: DateTime<Utc>) -> DrugRecord {
        DrugRecord {
            id,
            sku: self.sku,
            name: self.name,
            generic_name: self.generic_name,
            dosage: self.dosage,
            quantity: self.quantity,
            expiration_date: self.expiration_date,
            manufacturer: self.manufacturer,
            price: self.price,
            category: self.category,
            description: self.description,
            created_at,
            updated_at: None,
        }
    }
}

/// Partial update input.
///
/// `None` means "leave as is". `description` is the only nullable column, so
/// it gets a second layer: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrugPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub generic_name: Option<String>,
    pub dosage: Option<String>,
    pub quantity: Option<i64>,
    pub expiration_date: Option<String>,
    pub manufacturer: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<Option<String>>,
}

impl DrugPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite only the provided fields.
    ///
    /// Does not touch `updated_at`; stamping is the store's job.
    pub fn apply_to(&self, record: &mut DrugRecord) {
        if let Some(v) = &self.sku {
            record.sku = v.clone();
        }
        if let Some(v) = &self.name {
            record.name = v.clone();
        }
        if let Some(v) = &self.generic_name {
            record.generic_name = v.clone();
        }
        if let Some(v) = &self.dosage {
            record.dosage = v.clone();
        }
        if let Some(v) = self.quantity {
            record.quantity = v;
        }
        if let Some(v) = &self.expiration_date {
            record.expiration_date = v.clone();
        }
        if let Some(v) = &self.manufacturer {
            record.manufacturer = v.clone();
        }
        if let Some(v) = self.price {
            record.price = v;
        }
        if let Some(v) = &self.category {
            record.category = v.clone();
        }
        if let Some(v) = &self.description {
            record.description = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample() -> DrugRecord {
        NewDrug {
            sku: "TEST-001".to_string(),
            name: "Test Medication".to_string(),
            generic_name: "test_medication".to_string(),
            dosage: "10mg".to_string(),
            quantity: 100,
            expiration_date: "2030-12-31".to_string(),
            manufacturer: "Test Pharma".to_string(),
            price: Decimal::new(2999, 2),
            category: "Pain Relief".to_string(),
            description: Some("Test medication for testing".to_string()),
        }
        .into_record(DrugId::from_raw(1), Utc::now())
    }

    #[test]
    fn new_record_has_no_update_stamp() {
        let record = sample();
        assert_eq!(record.id, DrugId::from_raw(1));
        assert!(record.updated_at.is_none());
    }

    #[test]
    fn patch_overwrites_only_present_fields() {
        let mut record = sample();
        let before = record.clone();

        DrugPatch {
            quantity: Some(150),
            ..Default::default()
        }
        .apply_to(&mut record);

        assert_eq!(record.quantity, 150);
        assert_eq!(
            DrugRecord {
                quantity: before.quantity,
                ..record
            },
            before
        );
    }

    #[test]
    fn description_absent_keeps_and_explicit_none_clears() {
        let mut record = sample();
        DrugPatch::default().apply_to(&mut record);
        assert!(record.description.is_some());

        DrugPatch {
            description: Some(None),
            ..Default::default()
        }
        .apply_to(&mut record);
        assert!(record.description.is_none());
    }

    #[test]
    fn text_match_is_case_insensitive_over_three_fields() {
        let record = sample();
        assert!(record.matches_text("test"));
        assert!(record.matches_text("pharma"));
        assert!(record.matches_text("medication"));
        assert!(!record.matches_text("pain"));
    }

    #[test]
    fn identity_survives_attribute_changes() {
        let before = sample();
        let mut after = before.clone();
        DrugPatch {
            sku: Some("TEST-002".to_string()),
            ..Default::default()
        }
        .apply_to(&mut after);

        assert_ne!(before, after);
        assert!(before.same_identity_as(&after));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(DrugPatch::default().is_empty());
        assert!(
            !DrugPatch {
                name: Some("x".to_string()),
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = sample();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["expiration_date"], "2030-12-31");
        assert_eq!(json["price"], serde_json::json!(29.99));
        assert!(json["updated_at"].is_null());
    }
}
