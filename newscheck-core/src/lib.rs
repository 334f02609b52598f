//! # NewsCheck - Best-effort news analysis
//!
//! NewsCheck takes a pasted news article and runs it through a set of
//! optional analysis capabilities (topic, fake news, sentiment, clickbait,
//! bias, summary, emotion). Each capability is looked up by name at run
//! time; a missing or broken one shows a "coming soon" placeholder instead
//! of failing the page.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use newscheck_core::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut registry = CapabilityRegistry::new();
//!     registry.register(
//!         StaticProvider::new("fake")
//!             .with_operation("predict_fake", text_operation(|_| "Likely Fake (92%)".into()))
//!             .into_shared(),
//!     )?;
//!
//!     let analyzer = Analyzer::new(GuardedInvoker::new(Arc::new(registry)));
//!     let report = analyzer
//!         .analyze("Breaking: Moon replaced by cheese", &AnalysisSelection::default())
//!         .await?;
//!
//!     for card in &report.cards {
//!         println!("{} {}: {}", card.icon, card.title, card.text());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **capability**: registry, resolver and guarded invoker
//! - **analysis**: the seven news analyses and argument preparation
//! - **render**: HTML for the single page
//! - **config**: layered configuration via figment

pub mod analysis;
pub mod capability;
pub mod config;
pub mod error;
pub mod render;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analysis::{
        AnalysisError, AnalysisKind, AnalysisReport, AnalysisSelection, Analyzer, Article, Column,
        ResultCard,
    };
    pub use crate::capability::{
        CapabilityId, CapabilityOutcome, CapabilityProvider, CapabilityRegistry,
        CapabilityRequest, CommandProviderConfig, FailureCategory, GuardedInvoker,
        InvocationReport, InvokerConfig, Operation, OperationError, StaticProvider, fn_operation,
        text_operation,
    };
    pub use crate::config::{NewsCheckConfig, ServerConfig};
    pub use crate::error::{NewsCheckError, Result};
    pub use crate::render::{PageState, render_page};
}
