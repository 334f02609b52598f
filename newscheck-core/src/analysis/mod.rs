//! News analyses built on the capability dispatcher
//!
//! Maps the seven analyses offered on the page to capability requests,
//! prepares their arguments and collects the outcomes into result cards.

mod analyzer;
mod article;
mod kind;
mod selection;

pub use analyzer::{AnalysisReport, Analyzer, ResultCard};
pub use article::{AnalysisError, Article};
pub use kind::{AnalysisKind, ArticleInput, Column, UnknownAnalysis};
pub use selection::AnalysisSelection;
