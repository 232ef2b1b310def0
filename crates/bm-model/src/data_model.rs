//! Page data model
//!
//! An insertion-ordered JSON map filled by handlers and data-model services
//! and handed to whatever renders the page template.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known data model keys
pub mod keys {
    pub const WATCHING_BREEZEMOONS: &str = "watchingBreezemoons";
    pub const SELECTED: &str = "selected";
    pub const CURRENT: &str = "current";
    pub const PERMISSIONS: &str = "permissions";
    pub const PAGINATION: &str = "pagination";

    pub const SERVE_PATH: &str = "servePath";
    pub const STATIC_RESOURCE_VERSION: &str = "staticResourceVersion";
    pub const IS_LOGGED_IN: &str = "isLoggedIn";
    pub const CURRENT_USER: &str = "currentUser";
    pub const CSRF_TOKEN: &str = "csrfToken";

    pub const SIDE_RANDOM_ARTICLES: &str = "sideRandomArticles";
    pub const SIDE_HOT_ARTICLES: &str = "sideHotArticles";
    pub const SIDE_TAGS: &str = "sideTags";
    pub const SIDE_LATEST_CMTS: &str = "sideLatestCmts";

    /// Value of `selected` on watch pages
    pub const WATCH: &str = "watch";
}

/// Ordered key/value model for a rendered page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataModel(IndexMap<String, Value>);

impl DataModel {
    /// Create empty data model
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a serializable value, replacing any previous one
    ///
    /// Values that fail to serialize are stored as `null`.
    pub fn put<V: Serialize>(&mut self, key: impl Into<String>, value: V) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.0.insert(key.into(), value);
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert into a JSON object
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect())
    }
}
