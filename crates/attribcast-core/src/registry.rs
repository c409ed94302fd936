//! Model registry.
//!
//! The registry maps model names to their entries and is built once, up
//! front, then only read. It is passed into the calculator explicitly rather
//! than living in global state, and is safe for concurrent lookup by name.

use crate::error::{AttributionError, Result};
use crate::model::ModelKind;
use hashbrown::HashMap;
use tracing::debug;

/// Registry statistics.
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Total number of registered models.
    pub total: usize,
    /// Registered model names, sorted.
    pub names: Vec<String>,
}

/// Entry for a registered model.
#[derive(Debug, Clone)]
pub struct ModelEntry {
    /// The model strategy.
    pub kind: ModelKind,
    /// Human-readable description.
    pub description: String,
}

impl ModelEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(kind: ModelKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

/// Immutable registry of attribution models, keyed by name.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    entries: HashMap<String, ModelEntry>,
}

impl ModelRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a registry holding the five canonical models.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        let defaults = [
            (
                ModelKind::FirstTouch,
                "All credit to the first touchpoint in the path",
            ),
            (
                ModelKind::LastTouch,
                "All credit to the last touchpoint before conversion",
            ),
            (ModelKind::Linear, "Equal credit to every touchpoint"),
            (
                ModelKind::TimeDecay,
                "Exponential decay by distance from conversion (configurable half-life)",
            ),
            (
                ModelKind::PositionBased,
                "U-shaped: 40% first, 40% last, 20% split across the interior",
            ),
        ];
        for (kind, description) in defaults {
            // Defaults use distinct names; registration cannot collide.
            registry
                .register(ModelEntry::new(kind, description))
                .expect("default model registration");
        }
        registry
    }

    /// Register a model entry under its canonical name.
    pub fn register(&mut self, entry: ModelEntry) -> Result<()> {
        let name = entry.kind.as_str().to_string();
        if self.entries.contains_key(&name) {
            return Err(AttributionError::ModelAlreadyRegistered(name));
        }
        debug!(model = %name, "Registering attribution model");
        self.entries.insert(name, entry);
        Ok(())
    }

    /// Look up a model entry by name.
    pub fn get(&self, name: &str) -> Result<&ModelEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| AttributionError::unknown_model(name))
    }

    /// Resolve a model name to its kind.
    pub fn resolve(&self, name: &str) -> Result<ModelKind> {
        self.get(name).map(|entry| entry.kind)
    }

    /// Check if a model is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry holds no models.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered names, sorted for stable display.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// All entries in name order.
    #[must_use]
    pub fn entries(&self) -> Vec<&ModelEntry> {
        let mut entries: Vec<&ModelEntry> = self.entries.values().collect();
        entries.sort_by_key(|e| e.kind.as_str());
        entries
    }

    /// Registry statistics.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total: self.entries.len(),
            names: self.names(),
        }
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_register_all_five_models() {
        let registry = ModelRegistry::with_defaults();
        assert_eq!(registry.len(), 5);
        for kind in ModelKind::ALL {
            assert!(registry.contains(kind.as_str()));
        }
    }

    #[test]
    fn test_unknown_model_lookup_fails() {
        let registry = ModelRegistry::with_defaults();
        let err = registry.resolve("markov_chain").unwrap_err();
        assert!(matches!(err, AttributionError::UnknownModel(_)));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ModelRegistry::with_defaults();
        let err = registry
            .register(ModelEntry::new(ModelKind::Linear, "again"))
            .unwrap_err();
        assert!(matches!(err, AttributionError::ModelAlreadyRegistered(_)));
    }

    #[test]
    fn test_resolve_returns_kind() {
        let registry = ModelRegistry::with_defaults();
        assert_eq!(registry.resolve("time_decay").unwrap(), ModelKind::TimeDecay);
    }

    #[test]
    fn test_stats_names_sorted() {
        let registry = ModelRegistry::with_defaults();
        let stats = registry.stats();
        assert_eq!(stats.total, 5);
        let mut sorted = stats.names.clone();
        sorted.sort();
        assert_eq!(stats.names, sorted);
    }
}
