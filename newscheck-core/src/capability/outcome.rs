//! Invocation outcomes and the failure taxonomy
//!
//! Every call through the guarded invoker ends in a [`CapabilityOutcome`]:
//! - `Success` carries the stringified value returned by the operation
//! - `Unavailable` carries a short, display-safe failure category
//!
//! The outcome is wrapped in an [`InvocationReport`] with provenance
//! metadata for tracing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Longest reason label passed through to callers
const MAX_REASON_LEN: usize = 64;

/// Label used when an error category sanitizes to nothing
const FALLBACK_REASON: &str = "InvocationError";

/// Prefix of the placeholder shown for unavailable capabilities
pub const COMING_SOON: &str = "🚧 Coming Soon";

/// Result of a single guarded invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CapabilityOutcome {
    /// The operation returned normally
    Success {
        /// Stringified return value
        value: String,
    },

    /// The capability could not be resolved or failed while running
    Unavailable {
        /// Short failure category, safe to render
        reason: String,
    },
}

impl CapabilityOutcome {
    /// Build a success outcome from an operation's return value
    ///
    /// JSON strings are kept verbatim; every other value is rendered as its
    /// JSON text.
    pub fn success(value: &Value) -> Self {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        CapabilityOutcome::Success { value }
    }

    /// Build an unavailable outcome; the label is sanitized first
    pub fn unavailable(reason: impl AsRef<str>) -> Self {
        CapabilityOutcome::Unavailable {
            reason: sanitize_reason(reason.as_ref()),
        }
    }

    /// Check if the capability produced a value
    pub fn is_success(&self) -> bool {
        matches!(self, CapabilityOutcome::Success { .. })
    }

    /// Check if the capability fell back to a placeholder
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CapabilityOutcome::Unavailable { .. })
    }

    /// Get the value if successful
    pub fn value(&self) -> Option<&str> {
        match self {
            CapabilityOutcome::Success { value } => Some(value),
            CapabilityOutcome::Unavailable { .. } => None,
        }
    }

    /// Get the failure category if unavailable
    pub fn reason(&self) -> Option<&str> {
        match self {
            CapabilityOutcome::Success { .. } => None,
            CapabilityOutcome::Unavailable { reason } => Some(reason),
        }
    }

    /// Text to show the reader: the value, or the "coming soon" placeholder
    pub fn display_text(&self) -> String {
        match self {
            CapabilityOutcome::Success { value } => value.clone(),
            CapabilityOutcome::Unavailable { reason } => format!("{COMING_SOON} — {reason}"),
        }
    }
}

impl fmt::Display for CapabilityOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

/// Reduce an arbitrary error label to an identifier-like string
///
/// Only ASCII alphanumerics and `_` survive, so paths, messages and
/// tracebacks can never leak through a reason.
pub fn sanitize_reason(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .take(MAX_REASON_LEN)
        .collect();

    if cleaned.is_empty() {
        FALLBACK_REASON.to_string()
    } else {
        cleaned
    }
}

/// Coarse failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureCategory {
    /// The provider could not be located or loaded
    ProviderNotFound,

    /// The provider loaded but does not expose the operation
    OperationNotFound,

    /// The operation ran and failed (error or panic)
    InvocationError,

    /// The operation exceeded its time budget
    Timeout,

    /// The invocation was cancelled by the caller
    Cancelled,
}

impl FailureCategory {
    /// Stable label used as the outcome reason
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::ProviderNotFound => "ProviderNotFound",
            FailureCategory::OperationNotFound => "OperationNotFound",
            FailureCategory::InvocationError => "InvocationError",
            FailureCategory::Timeout => "Timeout",
            FailureCategory::Cancelled => "Cancelled",
        }
    }

    /// Whether the failure happened before the operation was called
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            FailureCategory::ProviderNotFound | FailureCategory::OperationNotFound
        )
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by an operation
///
/// `category` plays the role of an exception type name: it becomes the
/// outcome reason. `message` is only logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// Error category (e.g. `InvalidInput`)
    pub category: String,

    /// Human-readable detail, never shown to readers
    pub message: String,
}

impl OperationError {
    /// Create a new operation error
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
        }
    }

    /// Arguments were missing or of the wrong shape
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new("InvalidInput", message)
    }

    /// Internal fault in the operation
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("InternalError", message)
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

impl std::error::Error for OperationError {}

impl From<std::io::Error> for OperationError {
    fn from(err: std::io::Error) -> Self {
        Self::new("IoError", err.to_string())
    }
}

impl From<serde_json::Error> for OperationError {
    fn from(err: serde_json::Error) -> Self {
        Self::new("SerializationError", err.to_string())
    }
}

/// Outcome plus provenance for one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationReport {
    /// What the caller should display
    pub outcome: CapabilityOutcome,

    /// Provenance metadata for tracing
    pub provenance: InvocationProvenance,
}

impl InvocationReport {
    /// Create a report
    pub fn new(outcome: CapabilityOutcome, provenance: InvocationProvenance) -> Self {
        Self {
            outcome,
            provenance,
        }
    }

    /// Check if this report represents success
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Check if this report represents a fallback
    pub fn is_unavailable(&self) -> bool {
        self.outcome.is_unavailable()
    }

    /// Coarse failure category, if any
    pub fn failure(&self) -> Option<FailureCategory> {
        self.provenance.failure
    }

    /// Consume the report, keeping the outcome
    pub fn into_outcome(self) -> CapabilityOutcome {
        self.outcome
    }
}

/// Provenance metadata for one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationProvenance {
    /// `provider.operation`
    pub capability: String,

    /// Prefix of the SHA-256 of the JSON-encoded arguments
    pub args_hash: String,

    /// Timestamp when resolution started
    pub started_at: DateTime<Utc>,

    /// Time spent resolving and invoking
    #[serde(rename = "duration_ms", with = "duration_millis")]
    pub duration: Duration,

    /// Correlation id shared by the requests of one run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    /// Coarse category when the outcome is unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureCategory>,
}

impl InvocationProvenance {
    /// Create new provenance
    pub fn new(capability: impl Into<String>, args_hash: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            args_hash: args_hash.into(),
            started_at: Utc::now(),
            duration: Duration::ZERO,
            trace_id: None,
            failure: None,
        }
    }

    /// Set duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set trace ID
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Record the failure category
    pub fn with_failure(mut self, failure: FailureCategory) -> Self {
        self.failure = Some(failure);
        self
    }
}

// Serde helper for Duration serialization as milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
