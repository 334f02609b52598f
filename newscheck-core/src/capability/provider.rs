//! Capability providers
//!
//! A provider owns a namespace (`topic`, `fake`, ...) and explicitly lists
//! the operations it exposes. Providers that are expensive to materialize
//! register a [`ProviderLoader`] instead and are loaded on first use.

use super::operation::BoxedOperation;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A namespace of operations
pub trait CapabilityProvider: Send + Sync {
    /// Provider namespace identifier
    fn id(&self) -> &str;

    /// Look up an operation by name
    fn resolve(&self, operation_id: &str) -> Option<BoxedOperation>;

    /// Names of the exposed operations
    fn operations(&self) -> Vec<String>;
}

/// Type alias for shared providers
pub type BoxedProvider = Arc<dyn CapabilityProvider>;

/// Materializes a provider on demand
///
/// Any error here is reported to callers as `ProviderNotFound`.
pub trait ProviderLoader: Send + Sync {
    /// Load the provider
    fn load(&self) -> Result<BoxedProvider, String>;
}

impl<F> ProviderLoader for F
where
    F: Fn() -> Result<BoxedProvider, String> + Send + Sync,
{
    fn load(&self) -> Result<BoxedProvider, String> {
        self()
    }
}

/// In-process provider with a fixed operation table
#[derive(Clone)]
pub struct StaticProvider {
    id: String,
    operations: BTreeMap<String, BoxedOperation>,
}

impl std::fmt::Debug for StaticProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticProvider")
            .field("id", &self.id)
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StaticProvider {
    /// Create an empty provider
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operations: BTreeMap::new(),
        }
    }

    /// Register an operation, replacing any previous one with the same name
    pub fn with_operation(mut self, name: impl Into<String>, operation: BoxedOperation) -> Self {
        self.operations.insert(name.into(), operation);
        self
    }

    /// Wrap in an `Arc` for registration
    pub fn into_shared(self) -> BoxedProvider {
        Arc::new(self)
    }
}

impl CapabilityProvider for StaticProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn resolve(&self, operation_id: &str) -> Option<BoxedOperation> {
        self.operations.get(operation_id).cloned()
    }

    fn operations(&self) -> Vec<String> {
        self.operations.keys().cloned().collect()
    }
}
