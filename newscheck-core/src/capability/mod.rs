//! Dynamic capability dispatch
//!
//! This module looks up optional, independently deployed capabilities by
//! name and invokes them without ever failing the caller:
//! - Providers register their operations explicitly
//! - Missing providers and operations are classified, not raised
//! - Errors, panics, timeouts and cancellation all become `Unavailable`
//!
//! # Example
//!
//! ```rust,no_run
//! use newscheck_core::capability::{CapabilityRegistry, CapabilityRequest, GuardedInvoker};
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let invoker = GuardedInvoker::new(Arc::new(CapabilityRegistry::new()));
//! let request = CapabilityRequest::new("topic", "predict_topic")
//!     .with_arg("Stocks rally amid inflation data");
//!
//! // No "topic" provider is registered, so this is a placeholder
//! let outcome = invoker.invoke_outcome(&request).await;
//! assert_eq!(outcome.reason(), Some("ProviderNotFound"));
//! # }
//! ```

mod command;
mod invoker;
mod operation;
mod outcome;
mod provider;
mod registry;
mod request;

pub use command::{CommandProvider, CommandProviderConfig, CommandProviderLoader};
pub use invoker::{GuardedInvoker, InvokerConfig};
pub use operation::{BoxedOperation, FnOperation, Operation, fn_operation, text_operation};
pub use outcome::{
    COMING_SOON, CapabilityOutcome, FailureCategory, InvocationProvenance, InvocationReport,
    OperationError, sanitize_reason,
};
pub use provider::{BoxedProvider, CapabilityProvider, ProviderLoader, StaticProvider};
pub use registry::{CapabilityRegistry, ProviderSummary, RegistryError, ResolutionError};
pub use request::{CapabilityId, CapabilityRequest, ParseCapabilityIdError};
