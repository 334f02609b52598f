//! Providers backed by external executables
//!
//! An analysis model usually lives outside this process (a Python package,
//! a separately built binary). A command provider exposes such a program
//! as a capability namespace:
//!
//! - the program is resolved on `PATH` when the provider is first loaded
//! - each call runs `program [args...] <operation_id>`
//! - the positional arguments are written to stdin as a JSON array
//! - exit status 0 means success and trimmed stdout is the value
//!
//! On failure the last non-empty stderr line is inspected; a leading
//! `Identifier:` (for example `ValueError: empty text`) becomes the error
//! category.

use super::operation::{BoxedOperation, Operation};
use super::outcome::OperationError;
use super::provider::{BoxedProvider, CapabilityProvider, ProviderLoader};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

static ERROR_CATEGORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_.]*)\s*:").expect("static regex is valid")
});

/// Configuration for one command provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandProviderConfig {
    /// Program name or path
    pub program: String,

    /// Arguments placed before the operation name
    #[serde(default)]
    pub args: Vec<String>,

    /// Operations the program implements
    #[serde(default)]
    pub operations: Vec<String>,

    /// Extra environment variables
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Working directory for the child process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl CommandProviderConfig {
    /// Create a config for a program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            operations: Vec::new(),
            env: BTreeMap::new(),
            working_dir: None,
        }
    }

    /// Add a leading argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Declare an exposed operation
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operations.push(operation.into());
        self
    }

    /// Set an environment variable for the child
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Loader that locates the program before exposing the provider
#[derive(Debug, Clone)]
pub struct CommandProviderLoader {
    id: String,
    config: CommandProviderConfig,
}

impl CommandProviderLoader {
    /// Create a loader for the given namespace
    pub fn new(id: impl Into<String>, config: CommandProviderConfig) -> Self {
        Self {
            id: id.into(),
            config,
        }
    }
}

impl ProviderLoader for CommandProviderLoader {
    fn load(&self) -> Result<BoxedProvider, String> {
        let program = which::which(&self.config.program)
            .map_err(|e| format!("program '{}' not found: {}", self.config.program, e))?;
        debug!(provider = %self.id, program = %program.display(), "Resolved command provider");

        Ok(Arc::new(CommandProvider {
            id: self.id.clone(),
            program,
            config: self.config.clone(),
        }))
    }
}

/// Provider whose operations run an external program
#[derive(Debug, Clone)]
pub struct CommandProvider {
    id: String,
    program: PathBuf,
    config: CommandProviderConfig,
}

impl CapabilityProvider for CommandProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn resolve(&self, operation_id: &str) -> Option<BoxedOperation> {
        if !self.config.operations.iter().any(|op| op == operation_id) {
            return None;
        }
        Some(Arc::new(CommandOperation {
            program: self.program.clone(),
            config: self.config.clone(),
            operation_id: operation_id.to_string(),
        }))
    }

    fn operations(&self) -> Vec<String> {
        self.config.operations.clone()
    }
}

struct CommandOperation {
    program: PathBuf,
    config: CommandProviderConfig,
    operation_id: String,
}

#[async_trait]
impl Operation for CommandOperation {
    async fn call(&self, args: Vec<Value>) -> Result<Value, OperationError> {
        let payload = serde_json::to_vec(&args)?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.config.args)
            .arg(&self.operation_id)
            .envs(&self.config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.config.working_dir {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| OperationError::new("SpawnFailed", e.to_string()))?;

        // stdin is fed while stdout and stderr drain, so neither side can
        // stall on a full pipe
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // A child that exits without reading stdin is not an error by itself
                if let Err(e) = stdin.write_all(&payload).await {
                    debug!(operation = %self.operation_id, "stdin write failed: {}", e);
                }
            }
        };

        let ((), output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let category = stderr_category(&stderr).unwrap_or_else(|| "NonZeroExit".to_string());
            return Err(OperationError::new(
                category,
                format!("exited with {}", output.status),
            ));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| OperationError::new("InvalidOutput", e.to_string()))?;
        Ok(Value::String(stdout.trim().to_string()))
    }
}

/// Extract an error category from the last non-empty stderr line
///
/// Dotted names keep only their last segment (`json.decoder.JSONDecodeError`
/// becomes `JSONDecodeError`).
fn stderr_category(stderr: &str) -> Option<String> {
    let last = stderr.lines().rev().find(|line| !line.trim().is_empty())?;
    let name = ERROR_CATEGORY.captures(last)?.get(1)?.as_str();
    name.rsplit('.').next().map(str::to_string)
}
