//! Catalog provider: menu, categories, payment methods and branding, read
//! once from a JSON document.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use crate::domain::aggregates::{MenuItem, PaymentMethod};
use crate::domain::value_objects::DEFAULT_CURRENCY;

/// Category filter value that selects every item.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub site_name: String,
    #[serde(default)]
    pub site_logo: Option<String>,
    #[serde(default)]
    pub site_description: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self { site_name: "Fifth Snack Bar".to_string(), site_logo: None, site_description: None, currency: default_currency() }
    }
}

fn default_true() -> bool { true }
fn default_currency() -> String { DEFAULT_CURRENCY.to_string() }

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    site: SiteSettings,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    items: Vec<MenuItem>,
    #[serde(default)]
    payment_methods: Vec<PaymentMethod>,
}

impl Catalog {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await
            .map_err(|e| CatalogError::Io { path: path.display().to_string(), message: e.to_string() })?;
        let catalog = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), items = catalog.items.len(), categories = catalog.categories.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
        catalog.normalized()
    }

    pub fn new(site: SiteSettings, categories: Vec<Category>, items: Vec<MenuItem>, payment_methods: Vec<PaymentMethod>) -> Result<Self, CatalogError> {
        Self { site, categories, items, payment_methods }.normalized()
    }

    /// Drops inactive categories and payment methods, orders them by
    /// `sort_order`, and checks item ids and currencies.
    fn normalized(mut self) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.id.as_str()) { return Err(CatalogError::DuplicateItem(item.id.clone())); }
            if item.currency != self.site.currency {
                return Err(CatalogError::CurrencyMismatch { item: item.id.clone(), expected: self.site.currency.clone(), found: item.currency.clone() });
            }
        }
        self.categories.retain(|c| c.active);
        self.categories.sort_by_key(|c| c.sort_order);
        self.payment_methods.retain(|m| m.active);
        self.payment_methods.sort_by_key(|m| m.sort_order);
        Ok(self)
    }

    pub fn site(&self) -> &SiteSettings { &self.site }
    pub fn currency(&self) -> &str { &self.site.currency }
    pub fn categories(&self) -> &[Category] { &self.categories }
    pub fn payment_methods(&self) -> &[PaymentMethod] { &self.payment_methods }
    pub fn items(&self) -> &[MenuItem] { &self.items }
    pub fn item(&self, id: &str) -> Option<&MenuItem> { self.items.iter().find(|i| i.id == id) }

    /// Items in a category, or every item for [`ALL_CATEGORIES`].
    pub fn items_in(&self, category: &str) -> Vec<&MenuItem> {
        if category == ALL_CATEGORIES { return self.items.iter().collect(); }
        self.items.iter().filter(|i| i.category.as_deref() == Some(category)).collect()
    }

    pub fn popular(&self) -> Vec<&MenuItem> { self.items.iter().filter(|i| i.popular).collect() }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("reading catalog {path}: {message}")]
    Io { path: String, message: String },
    #[error("parsing catalog: {0}")]
    Parse(String),
    #[error("duplicate menu item {0}")]
    DuplicateItem(String),
    #[error("menu item {item} priced in {found}, catalog uses {expected}")]
    CurrencyMismatch { item: String, expected: String, found: String },
}
