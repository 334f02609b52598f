//! Operation trait and closure adapters
//!
//! An operation is the unit a provider exposes: it takes positional
//! arguments and returns a value or an [`OperationError`].

use super::outcome::OperationError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Core operation trait
///
/// Implementations may fail, panic or hang; the guarded invoker contains
/// all three.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Invoke the operation with positional arguments
    async fn call(&self, args: Vec<Value>) -> Result<Value, OperationError>;
}

/// Type alias for shared operations
pub type BoxedOperation = Arc<dyn Operation>;

/// Wrapper turning a synchronous closure into an [`Operation`]
///
/// The closure runs on the blocking thread pool.
pub struct FnOperation<F> {
    func: Arc<F>,
}

impl<F> FnOperation<F>
where
    F: Fn(&[Value]) -> Result<Value, OperationError> + Send + Sync + 'static,
{
    /// Wrap a closure
    pub fn new(func: F) -> Self {
        Self {
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl<F> Operation for FnOperation<F>
where
    F: Fn(&[Value]) -> Result<Value, OperationError> + Send + Sync + 'static,
{
    async fn call(&self, args: Vec<Value>) -> Result<Value, OperationError> {
        let func = Arc::clone(&self.func);
        match tokio::task::spawn_blocking(move || func(&args)).await {
            Ok(result) => result,
            // Propagate the panic to the invoker
            Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
            Err(error) => Err(OperationError::internal(error.to_string())),
        }
    }
}

/// Build a shared operation from a closure over the raw arguments
pub fn fn_operation<F>(func: F) -> BoxedOperation
where
    F: Fn(&[Value]) -> Result<Value, OperationError> + Send + Sync + 'static,
{
    Arc::new(FnOperation::new(func))
}

/// Build a shared operation for the common "text in, text out" shape
///
/// The first argument must be a JSON string; anything else fails with
/// `InvalidInput`.
pub fn text_operation<F>(func: F) -> BoxedOperation
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    fn_operation(move |args| {
        let text = args
            .first()
            .ok_or_else(|| OperationError::invalid_input("expected one text argument"))?
            .as_str()
            .ok_or_else(|| OperationError::invalid_input("first argument must be a string"))?;
        Ok(Value::String(func(text)))
    })
}
