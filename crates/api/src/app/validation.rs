//! Field validation for drug request bodies.
//!
//! Strings are trimmed before any check and the trimmed value is what gets
//! stored. Messages are collected per field, in field order, so a client
//! sees every problem at once.

use rust_decimal::Decimal;
use serde_json::Value;

use pharmatrack_inventory::{DrugPatch, NewDrug};

use crate::app::dto::{CreateDrugRequest, UpdateDrugRequest};

const SKU_MAX: usize = 100;
const NAME_MAX: usize = 100;
const DOSAGE_MAX: usize = 50;
const MANUFACTURER_MAX: usize = 100;
const CATEGORY_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 500;

/// Prices are stored as `NUMERIC(10, 2)`.
const PRICE_SCALE: u32 = 2;
const PRICE_LIMIT: i64 = 100_000_000;

type FieldResult<T> = Result<T, String>;

fn required<T>(value: Option<T>, label: &str) -> FieldResult<T> {
    value.ok_or_else(|| format!("{label} is required"))
}

fn text(value: &str, label: &str, max: usize) -> FieldResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{label} is required"));
    }
    if value.chars().count() > max {
        return Err(format!("{label} must be at most {max} characters"));
    }
    Ok(value.to_string())
}

/// Integral JSON numbers only; `3.0` counts as whole.
fn whole_number(value: &Value) -> FieldResult<i64> {
    const NOT_WHOLE: &str = "Quantity must be a whole number";
    let Value::Number(n) = value else {
        return Err(NOT_WHOLE.to_string());
    };
    if let Some(v) = n.as_i64() {
        return Ok(v);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(NOT_WHOLE.to_string()),
    }
}

fn quantity(value: Value) -> FieldResult<i64> {
    let value = whole_number(&value)?;
    if value < 1 {
        return Err("Quantity must be at least 1".to_string());
    }
    Ok(value)
}

fn decimal(value: &Value) -> FieldResult<Decimal> {
    const NOT_A_NUMBER: &str = "Price must be a valid number";
    let Value::Number(n) = value else {
        return Err(NOT_A_NUMBER.to_string());
    };
    let raw = n.to_string();
    raw.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| NOT_A_NUMBER.to_string())
}

fn price(value: Value) -> FieldResult<Decimal> {
    let value = decimal(&value)?;
    if value <= Decimal::ZERO {
        return Err("Price must be greater than $0.00".to_string());
    }
    if value.normalize().scale() > PRICE_SCALE {
        return Err("Price must have at most 2 decimal places".to_string());
    }
    if value >= Decimal::from(PRICE_LIMIT) {
        return Err("Price must be less than $100,000,000.00".to_string());
    }
    Ok(value)
}

/// Shape check only (`NNNN-NN-NN`); calendar validity is the service's job.
fn expiration_date(value: &str) -> FieldResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Expiration Date is required".to_string());
    }
    let shaped = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err("Please select a valid expiration date".to_string());
    }
    Ok(value.to_string())
}

/// Blank descriptions normalize to `None`.
fn description(value: &str) -> FieldResult<Option<String>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > DESCRIPTION_MAX {
        return Err(format!(
            "Description must be at most {DESCRIPTION_MAX} characters"
        ));
    }
    Ok(Some(value.to_string()))
}

fn keep<T>(errors: &mut Vec<String>, result: FieldResult<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(msg) => {
            errors.push(msg);
            None
        }
    }
}

/// Check a create body; on failure returns every field message.
pub fn validate_create(req: CreateDrugRequest) -> Result<NewDrug, Vec<String>> {
    let mut errors = Vec::new();

    let sku = keep(&mut errors, required(req.sku, "SKU").and_then(|v| text(&v, "SKU", SKU_MAX)));
    let name = keep(
        &mut errors,
        required(req.name, "Drug Name").and_then(|v| text(&v, "Drug Name", NAME_MAX)),
    );
    let generic_name = keep(
        &mut errors,
        required(req.generic_name, "Generic Name").and_then(|v| text(&v, "Generic Name", NAME_MAX)),
    );
    let dosage = keep(
        &mut errors,
        required(req.dosage, "Dosage").and_then(|v| text(&v, "Dosage", DOSAGE_MAX)),
    );
    let qty = keep(&mut errors, required(req.quantity, "Quantity").and_then(quantity));
    let expires = keep(
        &mut errors,
        required(req.expiration_date, "Expiration Date").and_then(|v| expiration_date(&v)),
    );
    let manufacturer = keep(
        &mut errors,
        required(req.manufacturer, "Manufacturer")
            .and_then(|v| text(&v, "Manufacturer", MANUFACTURER_MAX)),
    );
    let cost = keep(&mut errors, required(req.price, "Price").and_then(price));
    let category = keep(
        &mut errors,
        required(req.category, "Category").and_then(|v| text(&v, "Category", CATEGORY_MAX)),
    );
    let notes = keep(
        &mut errors,
        req.description
            .map_or(Ok(None), |v| description(&v)),
    );

    match (
        sku,
        name,
        generic_name,
        dosage,
        qty,
        expires,
        manufacturer,
        cost,
        category,
        notes,
    ) {
        (
            Some(sku),
            Some(name),
            Some(generic_name),
            Some(dosage),
            Some(quantity),
            Some(expiration_date),
            Some(manufacturer),
            Some(price),
            Some(category),
            Some(description),
        ) if errors.is_empty() => Ok(NewDrug {
            sku,
            name,
            generic_name,
            dosage,
            quantity,
            expiration_date,
            manufacturer,
            price,
            category,
            description,
        }),
        _ => Err(errors),
    }
}

/// Check every item of a batch body; messages carry a 1-based `Item <n>: ` prefix.
pub fn validate_batch(reqs: Vec<CreateDrugRequest>) -> Result<Vec<NewDrug>, Vec<String>> {
    let mut inputs = Vec::with_capacity(reqs.len());
    let mut errors = Vec::new();

    for (idx, req) in reqs.into_iter().enumerate() {
        match validate_create(req) {
            Ok(input) => inputs.push(input),
            Err(messages) => errors.extend(
                messages
                    .into_iter()
                    .map(|msg| format!("Item {}: {msg}", idx + 1)),
            ),
        }
    }

    if errors.is_empty() {
        Ok(inputs)
    } else {
        Err(errors)
    }
}

/// Check only the fields an update body carries.
pub fn validate_update(req: UpdateDrugRequest) -> Result<DrugPatch, Vec<String>> {
    let mut errors = Vec::new();

    let mut optional_text = |value: Option<String>, label: &str, max: usize| {
        value.and_then(|v| keep(&mut errors, text(&v, label, max)))
    };
    let sku = optional_text(req.sku, "SKU", SKU_MAX);
    let name = optional_text(req.name, "Drug Name", NAME_MAX);
    let generic_name = optional_text(req.generic_name, "Generic Name", NAME_MAX);
    let dosage = optional_text(req.dosage, "Dosage", DOSAGE_MAX);

    let qty = req.quantity.and_then(|v| keep(&mut errors, quantity(v)));
    let expires = req
        .expiration_date
        .and_then(|v| keep(&mut errors, expiration_date(&v)));

    let manufacturer = req
        .manufacturer
        .and_then(|v| keep(&mut errors, text(&v, "Manufacturer", MANUFACTURER_MAX)));
    let cost = req.price.and_then(|v| keep(&mut errors, price(v)));
    let category = req
        .category
        .and_then(|v| keep(&mut errors, text(&v, "Category", CATEGORY_MAX)));
    let notes = match req.description {
        None => None,
        Some(None) => Some(None),
        Some(Some(v)) => keep(&mut errors, description(&v)),
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(DrugPatch {
        sku,
        name,
        generic_name,
        dosage,
        quantity: qty,
        expiration_date: expires,
        manufacturer,
        price: cost,
        category,
        description: notes,
    })
}
