//! Capability identifiers and invocation requests

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Two-part name of a capability: the provider namespace and the operation
/// it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CapabilityId {
    /// Provider namespace (e.g. `topic`)
    pub provider_id: String,

    /// Operation exposed by the provider (e.g. `predict_topic`)
    pub operation_id: String,
}

impl CapabilityId {
    /// Create a new identifier
    pub fn new(provider_id: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            operation_id: operation_id.into(),
        }
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.provider_id, self.operation_id)
    }
}

/// Error returned when a `provider.operation` string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid capability id '{0}': expected 'provider.operation'")]
pub struct ParseCapabilityIdError(String);

impl FromStr for CapabilityId {
    type Err = ParseCapabilityIdError;

    /// Splits at the last `.` so dotted provider namespaces
    /// (`model_functions.topic.predict_topic`) survive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('.') {
            Some((provider, operation)) if !provider.is_empty() && !operation.is_empty() => {
                Ok(Self::new(provider, operation))
            }
            _ => Err(ParseCapabilityIdError(s.to_string())),
        }
    }
}

/// A single best-effort invocation of a capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityRequest {
    /// Which capability to invoke
    pub id: CapabilityId,

    /// Positional arguments
    #[serde(default)]
    pub arguments: Vec<Value>,
}

impl CapabilityRequest {
    /// Create a request with no arguments
    pub fn new(provider_id: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self {
            id: CapabilityId::new(provider_id, operation_id),
            arguments: Vec::new(),
        }
    }

    /// Create a request for an existing identifier
    pub fn for_id(id: CapabilityId) -> Self {
        Self {
            id,
            arguments: Vec::new(),
        }
    }

    /// Append a positional argument
    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    /// Append several positional arguments
    pub fn with_args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    /// Provider namespace
    pub fn provider_id(&self) -> &str {
        &self.id.provider_id
    }

    /// Operation name
    pub fn operation_id(&self) -> &str {
        &self.id.operation_id
    }
}
