//! Product drafts (create input) and the raw add/edit form.

use serde::{Deserialize, Serialize};

use shopdesk_core::{DomainError, DomainResult};

use crate::entry::CatalogEntry;

/// Candidate catalog entry submitted to the remote create endpoint.
///
/// The service assigns the `id`; a draft never carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub stock: u32,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl ProductDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        stock: u32,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            price,
            stock,
            category: category.into(),
            thumbnail: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Check the draft before it is sent anywhere.
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }
        validate_price(self.price)
    }
}

fn validate_price(price: f64) -> DomainResult<()> {
    if !price.is_finite() {
        return Err(DomainError::validation("price must be a finite number"));
    }
    if price < 0.0 {
        return Err(DomainError::validation("price cannot be negative"));
    }
    Ok(())
}

/// Raw field values of the product add/edit dialog.
///
/// Everything is a string because that is what the form inputs hold; parsing
/// happens once, here, before anything reaches the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub category: String,
}

impl DraftForm {
    /// Pre-fill the form from an existing entry (edit mode).
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            title: entry.title.clone(),
            description: entry.description.clone(),
            price: entry.price.to_string(),
            stock: entry.stock.to_string(),
            category: entry.category.clone(),
        }
    }

    /// Parse and validate into a create draft.
    pub fn parse(&self) -> DomainResult<ProductDraft> {
        let draft = ProductDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: parse_price(&self.price)?,
            stock: parse_stock(&self.stock)?,
            category: self.category.trim().to_string(),
            thumbnail: None,
        };
        draft.validate()?;
        Ok(draft)
    }

    /// Build the full replacement record for `entry` (edit mode).
    ///
    /// Identity, thumbnail and unmodelled attributes carry over from `entry`.
    pub fn apply_to(&self, entry: &CatalogEntry) -> DomainResult<CatalogEntry> {
        let draft = self.parse()?;
        Ok(CatalogEntry {
            id: entry.id,
            title: draft.title,
            description: draft.description,
            price: draft.price,
            stock: draft.stock,
            category: draft.category,
            thumbnail: entry.thumbnail.clone(),
            extra: entry.extra.clone(),
        })
    }
}

fn parse_price(raw: &str) -> DomainResult<f64> {
    let price = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| DomainError::validation(format!("price is not a number: {raw:?}")))?;
    validate_price(price)?;
    Ok(price)
}

fn parse_stock(raw: &str) -> DomainResult<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        DomainError::validation(format!("stock must be a non-negative integer: {raw:?}"))
    })
}
