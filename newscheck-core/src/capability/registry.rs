//! Capability registry and resolver
//!
//! The `CapabilityRegistry` provides:
//! - Provider registration with duplicate detection
//! - Lazy providers materialized on first resolution
//! - Resolution of `(provider, operation)` pairs with classified failures
//! - Provider summaries for listing
//!
//! # Example
//!
//! ```rust,ignore
//! use newscheck_core::capability::{CapabilityId, CapabilityRegistry, StaticProvider, text_operation};
//!
//! let mut registry = CapabilityRegistry::new();
//! registry.register(
//!     StaticProvider::new("fake")
//!         .with_operation("predict_fake", text_operation(|_| "Likely Real".into()))
//!         .into_shared(),
//! )?;
//!
//! let op = registry.resolve(&CapabilityId::new("fake", "predict_fake"))?;
//! ```

use super::command::{CommandProviderConfig, CommandProviderLoader};
use super::operation::BoxedOperation;
use super::outcome::FailureCategory;
use super::provider::{BoxedProvider, ProviderLoader};
use super::request::CapabilityId;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Provider with this id already exists
    #[error("Provider '{0}' is already registered")]
    DuplicateProvider(String),

    /// Provider id is empty
    #[error("Provider id must not be empty")]
    EmptyProviderId,
}

/// Why a capability could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// The provider is not registered or failed to load
    #[error("Provider '{provider_id}' not found")]
    ProviderNotFound {
        /// Requested provider
        provider_id: String,
    },

    /// The provider does not expose the operation
    #[error("Operation '{operation_id}' not found on provider '{provider_id}'")]
    OperationNotFound {
        /// Requested provider
        provider_id: String,
        /// Requested operation
        operation_id: String,
    },
}

impl ResolutionError {
    /// Coarse category for the outcome reason
    pub fn category(&self) -> FailureCategory {
        match self {
            ResolutionError::ProviderNotFound { .. } => FailureCategory::ProviderNotFound,
            ResolutionError::OperationNotFound { .. } => FailureCategory::OperationNotFound,
        }
    }
}

/// Summary of a provider for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSummary {
    /// Provider id
    pub id: String,
    /// Whether the provider is materialized
    pub loaded: bool,
    /// Exposed operations (empty when not loaded)
    pub operations: Vec<String>,
}

enum ProviderEntry {
    Ready(BoxedProvider),
    Lazy {
        loader: Arc<dyn ProviderLoader>,
        // Only successful loads are cached; failures retry on next resolution
        cell: OnceCell<BoxedProvider>,
    },
}

impl ProviderEntry {
    fn get(&self, provider_id: &str) -> Option<BoxedProvider> {
        match self {
            ProviderEntry::Ready(provider) => Some(Arc::clone(provider)),
            ProviderEntry::Lazy { loader, cell } => match cell.get_or_try_init(|| loader.load()) {
                Ok(provider) => Some(Arc::clone(provider)),
                Err(e) => {
                    warn!(provider = %provider_id, "Provider failed to load: {}", e);
                    None
                }
            },
        }
    }

    fn loaded(&self) -> Option<&BoxedProvider> {
        match self {
            ProviderEntry::Ready(provider) => Some(provider),
            ProviderEntry::Lazy { cell, .. } => cell.get(),
        }
    }
}

/// Registry of capability providers
pub struct CapabilityRegistry {
    providers: HashMap<String, ProviderEntry>,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("provider_count", &self.providers.len())
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CapabilityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Build a registry of command providers keyed by provider id
    pub fn from_commands(
        configs: &BTreeMap<String, CommandProviderConfig>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for (id, config) in configs {
            registry.register_loader(id, CommandProviderLoader::new(id, config.clone()))?;
        }
        Ok(registry)
    }

    fn check_id(&self, id: &str) -> Result<(), RegistryError> {
        if id.is_empty() {
            return Err(RegistryError::EmptyProviderId);
        }
        if self.providers.contains_key(id) {
            return Err(RegistryError::DuplicateProvider(id.to_string()));
        }
        Ok(())
    }

    /// Register a ready provider
    ///
    /// Returns an error if a provider with the same id is already registered.
    pub fn register(&mut self, provider: BoxedProvider) -> Result<(), RegistryError> {
        let id = provider.id().to_string();
        self.check_id(&id)?;
        debug!(provider = %id, "Registered provider");
        self.providers.insert(id, ProviderEntry::Ready(provider));
        Ok(())
    }

    /// Register a provider that is loaded on first resolution
    pub fn register_loader(
        &mut self,
        id: impl Into<String>,
        loader: impl ProviderLoader + 'static,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        self.check_id(&id)?;
        debug!(provider = %id, "Registered lazy provider");
        self.providers.insert(
            id,
            ProviderEntry::Lazy {
                loader: Arc::new(loader),
                cell: OnceCell::new(),
            },
        );
        Ok(())
    }

    /// Register multiple providers at once
    ///
    /// Fails on the first duplicated id.
    pub fn register_all(&mut self, providers: Vec<BoxedProvider>) -> Result<(), RegistryError> {
        for provider in providers {
            self.register(provider)?;
        }
        Ok(())
    }

    /// Remove a provider; returns whether it was registered
    pub fn unregister(&mut self, id: &str) -> bool {
        self.providers.remove(id).is_some()
    }

    /// Check if a provider id is registered (loaded or not)
    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Registered provider ids, sorted
    pub fn provider_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Resolve a capability to a callable operation
    pub fn resolve(&self, id: &CapabilityId) -> Result<BoxedOperation, ResolutionError> {
        let provider = self
            .providers
            .get(&id.provider_id)
            .and_then(|entry| entry.get(&id.provider_id))
            .ok_or_else(|| ResolutionError::ProviderNotFound {
                provider_id: id.provider_id.clone(),
            })?;

        provider
            .resolve(&id.operation_id)
            .ok_or_else(|| ResolutionError::OperationNotFound {
                provider_id: id.provider_id.clone(),
                operation_id: id.operation_id.clone(),
            })
    }

    /// List providers without forcing lazy ones to load
    pub fn list(&self) -> Vec<ProviderSummary> {
        let mut summaries: Vec<ProviderSummary> = self
            .providers
            .iter()
            .map(|(id, entry)| {
                let loaded = entry.loaded();
                ProviderSummary {
                    id: id.clone(),
                    loaded: loaded.is_some(),
                    operations: loaded.map(|p| p.operations()).unwrap_or_default(),
                }
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }
}
