use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use shopdesk_core::EntryId;

/// Entries with fewer units than this are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Units added by a single restock order.
pub const RESTOCK_QUANTITY: i64 = 50;

/// One sellable product as exposed by the remote catalog service.
///
/// Attributes the console does not model (brand, rating, images, ...) are kept
/// in `extra` so a full-record replace sends them back untouched.
///
/// Numeric fields are read leniently: one odd record must not fail a whole
/// catalog page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Absent when the create endpoint echoed a record without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default, deserialize_with = "clamped_stock")]
    pub stock: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogEntry {
    pub fn new(id: EntryId, title: impl Into<String>, price: f64, stock: u32) -> Self {
        Self {
            id: Some(id),
            title: title.into(),
            description: String::new(),
            price,
            stock,
            category: String::new(),
            thumbnail: String::new(),
            extra: Map::new(),
        }
    }

    /// Whether this entry is keyed by `id`. Entries without an id never match.
    pub fn has_id(&self, id: EntryId) -> bool {
        self.id == Some(id)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }

    /// Stock after applying `delta`, clamped to `0..=u32::MAX`.
    pub fn stock_after(&self, delta: i64) -> u32 {
        let next = i64::from(self.stock).saturating_add(delta);
        next.clamp(0, i64::from(u32::MAX)) as u32
    }

    /// Full replacement record with the stock adjusted by `delta`.
    pub fn with_stock_adjusted(&self, delta: i64) -> Self {
        Self {
            stock: self.stock_after(delta),
            ..self.clone()
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock < LOW_STOCK_THRESHOLD
    }

    /// Value of the units on hand (`price * stock`).
    pub fn inventory_value(&self) -> f64 {
        self.price * f64::from(self.stock)
    }
}

fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|p| p.is_finite()).unwrap_or(0.0))
}

fn clamped_stock<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    if raw.is_nan() {
        return Ok(0);
    }
    // Float-to-int `as` truncates the fraction.
    Ok(raw.clamp(0.0, f64::from(u32::MAX)) as u32)
}
