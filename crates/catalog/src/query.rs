//! Read-side helpers for list views and the dashboard.

use serde::{Deserialize, Serialize};

use crate::entry::CatalogEntry;

/// Number of entries shown in the dashboard's recent-products panel.
pub const RECENT_LIMIT: usize = 5;

/// Category selector of the list views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// `"all"` (any case) or an empty value selects every category.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(raw.to_string())
        }
    }

    fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => name == category,
        }
    }
}

/// Search and category filter applied to the catalog list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    pub search: String,
    pub category: CategoryFilter,
}

impl CatalogFilter {
    pub fn new(search: impl Into<String>, category: CategoryFilter) -> Self {
        Self {
            search: search.into(),
            category,
        }
    }

    /// Case-insensitive title substring match plus category match.
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        let needle = self.search.to_lowercase();
        entry.title.to_lowercase().contains(&needle) && self.category.matches(&entry.category)
    }

    /// Matching entries, in catalog order.
    pub fn apply<'a>(&self, entries: &'a [CatalogEntry]) -> Vec<&'a CatalogEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Distinct categories in first-seen order.
pub fn categories(entries: &[CatalogEntry]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for entry in entries {
        if !seen.iter().any(|c| c == &entry.category) {
            seen.push(entry.category.clone());
        }
    }
    seen
}

/// Category label for display (`"electronics"` -> `"Electronics"`).
pub fn display_category(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Dashboard figures derived from the current catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub total_products: usize,
    pub low_stock: usize,
    pub categories: usize,
    pub inventory_value: f64,
    pub recent: Vec<CatalogEntry>,
}

impl CatalogSummary {
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        Self {
            total_products: entries.len(),
            low_stock: entries.iter().filter(|e| e.is_low_stock()).count(),
            categories: categories(entries).len(),
            inventory_value: entries.iter().map(CatalogEntry::inventory_value).sum(),
            recent: entries.iter().take(RECENT_LIMIT).cloned().collect(),
        }
    }
}
