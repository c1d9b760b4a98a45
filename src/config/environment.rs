//! Environment provisioning.
//!
//! Builds the immutable option table every collaborator reads from. The
//! table always holds every key in [`OPTIONS`]; overrides replace defaults
//! wholesale and the ambient process environment is never consulted.

use std::collections::BTreeMap;

use serde::Serialize;

/// How an option's string value is interpreted by its readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Free-form text.
    Text,
    /// An absolute URL (`scheme://...`).
    Url,
    /// A non-negative integer.
    Integer,
    /// A floating point scalar.
    Float,
    /// `true` or `false`.
    Bool,
    /// A JSON array of non-negative integers, e.g. `[512,256,128]`.
    IntArray,
    /// A bind host name or address.
    Host,
    /// A TCP port in `1..=65535`.
    Port,
    /// A tracing level name (case-insensitive).
    LogLevel,
}

/// A single entry of the option table.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub name: &'static str,
    pub default: &'static str,
    pub kind: OptionKind,
}

const fn opt(name: &'static str, default: &'static str, kind: OptionKind) -> OptionSpec {
    OptionSpec { name, default, kind }
}

/// Every option the demo provisions, with its default value.
pub const OPTIONS: &[OptionSpec] = &[
    // Storage and cache endpoints
    opt("DATABASE_URL", "sqlite:///./cadence.db", OptionKind::Url),
    opt("REDIS_URL", "redis://localhost:6379", OptionKind::Url),
    opt("GEMINI_API_KEY", "demo-key-not-needed-for-local", OptionKind::Text),
    // Model hyperparameters
    opt("EMBEDDING_MODEL", "sentence-transformers/all-MiniLM-L6-v2", OptionKind::Text),
    opt("EMBEDDING_DIM", "384", OptionKind::Integer),
    opt("VOCAB_SIZE", "10000", OptionKind::Integer),
    opt("HIDDEN_DIMS", "[512,256,128]", OptionKind::IntArray),
    opt("ATTENTION_DIMS", "[256,128,64]", OptionKind::IntArray),
    opt("DROPOUT_RATE", "0.3", OptionKind::Float),
    opt("LEARNING_RATE", "0.001", OptionKind::Float),
    opt("BATCH_SIZE", "32", OptionKind::Integer),
    // Clustering
    opt("N_CLUSTERS", "10", OptionKind::Integer),
    opt("MIN_CLUSTER_SIZE", "5", OptionKind::Integer),
    opt("MIN_SAMPLES", "3", OptionKind::Integer),
    // Personalization
    opt("MAX_USER_HISTORY", "500", OptionKind::Integer),
    opt("MAX_SUGGESTIONS", "10", OptionKind::Integer),
    opt("CACHE_TTL", "300", OptionKind::Integer),
    opt("ENGAGEMENT_WEIGHT_VIEW", "1.0", OptionKind::Float),
    opt("ENGAGEMENT_WEIGHT_CLICK", "2.0", OptionKind::Float),
    opt("ENGAGEMENT_WEIGHT_ADD_TO_CART", "5.0", OptionKind::Float),
    opt("ENGAGEMENT_WEIGHT_WISHLIST", "3.0", OptionKind::Float),
    opt("ENGAGEMENT_WEIGHT_PURCHASE", "10.0", OptionKind::Float),
    // Latency budgets
    opt("MAX_LATENCY_MS", "200", OptionKind::Integer),
    opt("AUTOSUGGEST_TIMEOUT_MS", "100", OptionKind::Integer),
    opt("SEARCH_TIMEOUT_MS", "300", OptionKind::Integer),
    // Serving
    opt("API_HOST", "0.0.0.0", OptionKind::Host),
    opt("API_PORT", "8000", OptionKind::Port),
    opt("LOG_LEVEL", "INFO", OptionKind::LogLevel),
    // Feature flags
    opt("DEBUG", "true", OptionKind::Bool),
    opt("DEVELOPMENT_MODE", "true", OptionKind::Bool),
    opt("ENABLE_AB_TESTING", "true", OptionKind::Bool),
    opt("ENABLE_CLUSTERING_CATEGORIES", "true", OptionKind::Bool),
    opt("ENABLE_REAL_TIME_UPDATES", "true", OptionKind::Bool),
];

/// Look up the table entry for `name`.
pub fn option_spec(name: &str) -> Option<&'static OptionSpec> {
    OPTIONS.iter().find(|spec| spec.name == name)
}

/// Frozen option table shared by every gate and collaborator.
///
/// Constructed once by [`ConfigurationSet::provision`] and never mutated;
/// share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigurationSet {
    values: BTreeMap<&'static str, String>,
}

impl ConfigurationSet {
    /// Provision the table from defaults, overwriting any key present in
    /// `overrides`.
    ///
    /// Keys not in [`OPTIONS`] are ignored here; the loader rejects them
    /// before provisioning.
    pub fn provision(overrides: &BTreeMap<String, String>) -> Self {
        let values = OPTIONS
            .iter()
            .map(|spec| {
                let value = overrides
                    .get(spec.name)
                    .cloned()
                    .unwrap_or_else(|| spec.default.to_string());
                (spec.name, value)
            })
            .collect();

        Self { values }
    }

    /// The default table with no overrides applied.
    pub fn defaults() -> Self {
        Self::provision(&BTreeMap::new())
    }

    /// Read an option.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Iterate `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.values.iter().map(|(name, value)| (*name, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
