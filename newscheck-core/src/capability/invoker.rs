//! Guarded invoker
//!
//! The invoker wraps every capability call with:
//! - Resolution through the registry
//! - Panic containment around both resolution and the call
//! - One timeout covering provider loading and the call
//! - Cancellation
//! - Provenance for tracing
//!
//! Whatever happens, the caller receives a [`CapabilityOutcome`].

use super::outcome::{
    CapabilityOutcome, FailureCategory, InvocationProvenance, InvocationReport, OperationError,
};
use super::operation::BoxedOperation;
use super::registry::CapabilityRegistry;
use super::request::{CapabilityId, CapabilityRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::AbortHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument};

/// Reason reported when an operation panics
const PANIC_REASON: &str = "Panic";

/// Invoker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokerConfig {
    /// Default timeout for a single invocation
    #[serde(with = "humantime_serde")]
    pub default_timeout: Duration,

    /// Per-capability timeout overrides, keyed by `provider.operation`
    #[serde(default)]
    pub capability_timeouts: HashMap<String, humantime_serde::Serde<Duration>>,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            capability_timeouts: HashMap::new(),
        }
    }
}

impl InvokerConfig {
    /// Set the default timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Add a capability-specific timeout
    pub fn with_capability_timeout(
        mut self,
        capability: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        self.capability_timeouts
            .insert(capability.into(), timeout.into());
        self
    }

    /// Timeout for a capability
    pub fn timeout_for(&self, capability: &str) -> Duration {
        self.capability_timeouts
            .get(capability)
            .map(|t| **t)
            .unwrap_or(self.default_timeout)
    }
}

/// Best-effort invoker for optional capabilities
#[derive(Debug, Clone)]
pub struct GuardedInvoker {
    registry: Arc<CapabilityRegistry>,
    config: InvokerConfig,
    trace_id: Option<String>,
}

impl GuardedInvoker {
    /// Create an invoker with default configuration
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self::with_config(registry, InvokerConfig::default())
    }

    /// Create an invoker with custom configuration
    pub fn with_config(registry: Arc<CapabilityRegistry>, config: InvokerConfig) -> Self {
        Self {
            registry,
            config,
            trace_id: None,
        }
    }

    /// Copy of this invoker that tags provenance with a trace id
    pub fn traced(&self, trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
            ..self.clone()
        }
    }

    /// Get the registry
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Get the configuration
    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    /// Invoke a capability; never fails
    pub async fn invoke(&self, request: &CapabilityRequest) -> InvocationReport {
        self.run(request, None).await
    }

    /// Invoke a capability, giving up when `token` is cancelled
    pub async fn invoke_with_cancellation(
        &self,
        request: &CapabilityRequest,
        token: &CancellationToken,
    ) -> InvocationReport {
        self.run(request, Some(token)).await
    }

    /// Invoke and keep only the outcome
    pub async fn invoke_outcome(&self, request: &CapabilityRequest) -> CapabilityOutcome {
        self.invoke(request).await.into_outcome()
    }

    /// Invoke several capabilities concurrently
    ///
    /// Reports come back in request order. A failing request never affects
    /// the others.
    pub async fn invoke_all(&self, requests: &[CapabilityRequest]) -> Vec<InvocationReport> {
        futures::future::join_all(requests.iter().map(|request| self.invoke(request))).await
    }

    async fn run(
        &self,
        request: &CapabilityRequest,
        token: Option<&CancellationToken>,
    ) -> InvocationReport {
        let capability = request.id.to_string();
        let span = tracing::debug_span!("invoke", capability = %capability);

        async {
            let started = Instant::now();
            let mut provenance = InvocationProvenance::new(&capability, args_hash(request));
            if let Some(ref trace_id) = self.trace_id {
                provenance = provenance.with_trace_id(trace_id);
            }

            let result = self.resolve_and_call(request, &capability, token).await;
            provenance = provenance.with_duration(started.elapsed());

            let outcome = match result {
                Ok(value) => {
                    debug!("Capability succeeded");
                    CapabilityOutcome::success(&value)
                }
                Err((category, reason)) => {
                    provenance = provenance.with_failure(category);
                    CapabilityOutcome::unavailable(reason)
                }
            };
            InvocationReport::new(outcome, provenance)
        }
        .instrument(span)
        .await
    }

    /// Returns the value, or the coarse category plus the reason label
    ///
    /// Resolution and the call run on their own task, under one deadline.
    async fn resolve_and_call(
        &self,
        request: &CapabilityRequest,
        capability: &str,
        token: Option<&CancellationToken>,
    ) -> Result<Value, (FailureCategory, String)> {
        if token.is_some_and(|t| t.is_cancelled()) {
            return Err(cancelled());
        }

        let registry = Arc::clone(&self.registry);
        let id = request.id.clone();
        let arguments = request.arguments.clone();
        let task = tokio::spawn(
            async move {
                let operation = resolve_blocking(registry, id).await?;
                operation.call(arguments).await.map_err(invocation_failed)
            }
            .in_current_span(),
        );
        let _abort = AbortOnDrop(task.abort_handle());

        let limit = self.config.timeout_for(capability);
        let guarded = async {
            match timeout(limit, task).await {
                Ok(Ok(result)) => result,
                Ok(Err(error)) if error.is_panic() => {
                    warn!("Capability panicked");
                    Err((FailureCategory::InvocationError, PANIC_REASON.to_string()))
                }
                Ok(Err(_)) => Err(cancelled()),
                Err(_) => {
                    warn!(timeout = ?limit, "Capability timed out");
                    let category = FailureCategory::Timeout;
                    Err((category, category.as_str().to_string()))
                }
            }
        };

        match token {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(cancelled()),
                result = guarded => result,
            },
            None => guarded.await,
        }
    }
}

/// Aborts the invocation task when the caller stops waiting for it
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Loading a provider runs foreign code that may block or panic
async fn resolve_blocking(
    registry: Arc<CapabilityRegistry>,
    id: CapabilityId,
) -> Result<BoxedOperation, (FailureCategory, String)> {
    match tokio::task::spawn_blocking(move || registry.resolve(&id)).await {
        Ok(Ok(operation)) => Ok(operation),
        Ok(Err(error)) => {
            debug!("Resolution failed: {}", error);
            let category = error.category();
            Err((category, category.as_str().to_string()))
        }
        Err(_) => {
            warn!("Provider panicked while loading");
            let category = FailureCategory::ProviderNotFound;
            Err((category, category.as_str().to_string()))
        }
    }
}

fn invocation_failed(error: OperationError) -> (FailureCategory, String) {
    warn!(category = %error.category, "Capability failed: {}", error.message);
    (FailureCategory::InvocationError, error.category)
}

fn cancelled() -> (FailureCategory, String) {
    let category = FailureCategory::Cancelled;
    (category, category.as_str().to_string())
}

fn args_hash(request: &CapabilityRequest) -> String {
    let args_json = serde_json::to_string(&request.arguments).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(args_json.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

#[cfg(test)]
mod invoker_tests {
    use super::*;
    use crate::capability::{fn_operation, text_operation, Operation, StaticProvider};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct SlowOperation {
        delay: Duration,
    }

    #[async_trait]
    impl Operation for SlowOperation {
        async fn call(&self, _args: Vec<Value>) -> Result<Value, OperationError> {
            tokio::time::sleep(self.delay).await;
            Ok(json!("done"))
        }
    }

    fn registry() -> Arc<CapabilityRegistry> {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(
                StaticProvider::new("slow")
                    .with_operation(
                        "wait",
                        Arc::new(SlowOperation {
                            delay: Duration::from_secs(5),
                        }),
                    )
                    .with_operation(
                        "quick",
                        Arc::new(SlowOperation {
                            delay: Duration::from_millis(1),
                        }),
                    )
                    .into_shared(),
            )
            .unwrap();
        registry
            .register(
                StaticProvider::new("fake")
                    .with_operation("predict_fake", text_operation(|_| "Likely Fake (92%)".into()))
                    .into_shared(),
            )
            .unwrap();
        registry
            .register(
                StaticProvider::new("broken")
                    .with_operation("panics", fn_operation(|_| panic!("model exploded")))
                    .into_shared(),
            )
            .unwrap();
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_timeout_enforcement() {
        let config = InvokerConfig::default().with_timeout(Duration::from_millis(50));
        let invoker = GuardedInvoker::with_config(registry(), config);

        let report = invoker.invoke(&CapabilityRequest::new("slow", "wait")).await;

        assert_eq!(report.outcome.reason(), Some("Timeout"));
        assert_eq!(report.failure(), Some(FailureCategory::Timeout));
    }

    #[tokio::test]
    async fn test_capability_timeout_override() {
        let config = InvokerConfig::default()
            .with_timeout(Duration::from_secs(60))
            .with_capability_timeout("slow.wait", Duration::from_millis(20));
        let invoker = GuardedInvoker::with_config(registry(), config);

        let report = invoker.invoke(&CapabilityRequest::new("slow", "wait")).await;
        assert_eq!(report.outcome.reason(), Some("Timeout"));

        let report = invoker.invoke(&CapabilityRequest::new("slow", "quick")).await;
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_cancellation() {
        let invoker = GuardedInvoker::new(registry());
        let token = CancellationToken::new();
        token.cancel();

        let report = invoker
            .invoke_with_cancellation(&CapabilityRequest::new("slow", "wait"), &token)
            .await;

        assert_eq!(report.outcome.reason(), Some("Cancelled"));
        assert_eq!(report.failure(), Some(FailureCategory::Cancelled));
    }

    #[tokio::test]
    async fn test_cancellation_during_call() {
        let invoker = GuardedInvoker::new(registry());
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            child.cancel();
        });

        let report = invoker
            .invoke_with_cancellation(&CapabilityRequest::new("slow", "wait"), &token)
            .await;
        assert_eq!(report.outcome.reason(), Some("Cancelled"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let invoker = GuardedInvoker::new(registry());

        let report = invoker.invoke(&CapabilityRequest::new("broken", "panics")).await;

        assert_eq!(report.outcome.reason(), Some("Panic"));
        assert_eq!(report.failure(), Some(FailureCategory::InvocationError));
    }

    #[tokio::test]
    async fn test_provenance_tracking() {
        let invoker = GuardedInvoker::new(registry()).traced("trace_123");
        let request = CapabilityRequest::new("slow", "quick").with_arg("text");

        let report = invoker.invoke(&request).await;

        assert!(report.is_success());
        assert_eq!(report.provenance.capability, "slow.quick");
        assert_eq!(report.provenance.trace_id.as_deref(), Some("trace_123"));
        assert_eq!(report.provenance.args_hash.len(), 16);
        assert!(report.provenance.duration > Duration::ZERO);
        assert!(report.provenance.failure.is_none());
    }

    #[tokio::test]
    async fn test_successful_execution() {
        let invoker = GuardedInvoker::new(registry());
        let request = CapabilityRequest::new("fake", "predict_fake")
            .with_arg("Breaking: Moon replaced by cheese");

        let outcome = invoker.invoke_outcome(&request).await;

        assert_eq!(
            outcome,
            CapabilityOutcome::Success {
                value: "Likely Fake (92%)".to_string()
            }
        );
    }

    fn blocking_registry(delay: Duration) -> Arc<CapabilityRegistry> {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(
                StaticProvider::new("heavy")
                    .with_operation(
                        "predict",
                        text_operation(move |text| {
                            std::thread::sleep(delay);
                            text.to_string()
                        }),
                    )
                    .into_shared(),
            )
            .unwrap();
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_timeout_interrupts_blocking_operation() {
        let config = InvokerConfig::default().with_timeout(Duration::from_millis(50));
        let invoker = GuardedInvoker::with_config(blocking_registry(Duration::from_millis(500)), config);

        let started = Instant::now();
        let report = invoker
            .invoke(&CapabilityRequest::new("heavy", "predict").with_arg("x"))
            .await;

        assert_eq!(report.outcome.reason(), Some("Timeout"));
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_blocking_operations_run_concurrently() {
        let invoker = GuardedInvoker::new(blocking_registry(Duration::from_millis(200)));
        let requests: Vec<_> = (0..4)
            .map(|i| CapabilityRequest::new("heavy", "predict").with_arg(format!("article {i}")))
            .collect();

        let started = Instant::now();
        let reports = invoker.invoke_all(&requests).await;

        assert!(reports.iter().all(|report| report.is_success()));
        assert_eq!(reports[3].outcome.value(), Some("article 3"));
        assert!(started.elapsed() < Duration::from_millis(700));
    }

    /// Panics while building its future, before any poll
    struct EagerPanicOperation;

    impl Operation for EagerPanicOperation {
        fn call<'life0, 'async_trait>(
            &'life0 self,
            _args: Vec<Value>,
        ) -> std::pin::Pin<
            Box<
                dyn std::future::Future<Output = Result<Value, OperationError>>
                    + Send
                    + 'async_trait,
            >,
        >
        where
            'life0: 'async_trait,
            Self: 'async_trait,
        {
            panic!("weights missing")
        }
    }

    #[tokio::test]
    async fn test_eager_panic_is_contained() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(
                StaticProvider::new("eager")
                    .with_operation("predict", Arc::new(EagerPanicOperation))
                    .into_shared(),
            )
            .unwrap();
        let invoker = GuardedInvoker::new(Arc::new(registry));

        let report = invoker.invoke(&CapabilityRequest::new("eager", "predict")).await;

        assert_eq!(report.outcome.reason(), Some("Panic"));
    }

    #[tokio::test]
    async fn test_slow_provider_load_times_out() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_loader("topic", || -> Result<crate::capability::BoxedProvider, String> {
                std::thread::sleep(Duration::from_millis(300));
                Ok(StaticProvider::new("topic")
                    .with_operation("predict_topic", text_operation(|_| "Business".into()))
                    .into_shared())
            })
            .unwrap();
        let config = InvokerConfig::default().with_timeout(Duration::from_millis(50));
        let invoker = GuardedInvoker::with_config(Arc::new(registry), config);

        let started = Instant::now();
        let report = invoker
            .invoke(&CapabilityRequest::new("topic", "predict_topic").with_arg("text"))
            .await;

        assert_eq!(report.outcome.reason(), Some("Timeout"));
        assert!(started.elapsed() < Duration::from_millis(250));
    }

    #[test]
    fn test_config_deserializes_humantime() {
        let config: InvokerConfig = serde_json::from_value(json!({
            "default_timeout": "10s",
            "capability_timeouts": { "summarizer.summarize": "2m" }
        }))
        .unwrap();

        assert_eq!(config.default_timeout, Duration::from_secs(10));
        assert_eq!(config.timeout_for("summarizer.summarize"), Duration::from_secs(120));
        assert_eq!(config.timeout_for("topic.predict_topic"), Duration::from_secs(10));
    }
}
