//! Runs the selected analyses over one article

use super::article::{AnalysisError, Article};
use super::kind::{AnalysisKind, Column};
use super::selection::AnalysisSelection;
use crate::capability::{CapabilityOutcome, GuardedInvoker, InvocationProvenance};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// One rendered result box
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultCard {
    pub kind: AnalysisKind,
    pub title: String,
    pub icon: String,
    pub column: Column,
    pub outcome: CapabilityOutcome,
    pub provenance: InvocationProvenance,
}

impl ResultCard {
    /// Text shown in the card body
    pub fn text(&self) -> String {
        self.outcome.display_text()
    }
}

/// All cards produced for one article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Correlation id shared by every invocation in this run
    pub trace_id: String,
    /// Cards in display order
    pub cards: Vec<ResultCard>,
}

impl AnalysisReport {
    /// Cards for one page column
    pub fn column(&self, column: Column) -> impl Iterator<Item = &ResultCard> {
        self.cards.iter().filter(move |card| card.column == column)
    }

    /// Left column cards
    pub fn left(&self) -> impl Iterator<Item = &ResultCard> {
        self.column(Column::Left)
    }

    /// Right column cards
    pub fn right(&self) -> impl Iterator<Item = &ResultCard> {
        self.column(Column::Right)
    }

    /// Card for a specific analysis, if it ran
    pub fn card(&self, kind: AnalysisKind) -> Option<&ResultCard> {
        self.cards.iter().find(|card| card.kind == kind)
    }

    /// Number of cards that fell back to a placeholder
    pub fn unavailable_count(&self) -> usize {
        self.cards.iter().filter(|c| c.outcome.is_unavailable()).count()
    }
}

/// Dispatches an article to the selected analyses
#[derive(Debug, Clone)]
pub struct Analyzer {
    invoker: GuardedInvoker,
}

impl Analyzer {
    /// Create an analyzer over a guarded invoker
    pub fn new(invoker: GuardedInvoker) -> Self {
        Self { invoker }
    }

    /// Get the invoker
    pub fn invoker(&self) -> &GuardedInvoker {
        &self.invoker
    }

    /// Analyze pasted text
    ///
    /// Blank text is rejected before anything is dispatched. Otherwise the
    /// selected analyses run concurrently and each yields a card, whether or
    /// not its capability is available.
    pub async fn analyze(
        &self,
        text: &str,
        selection: &AnalysisSelection,
    ) -> Result<AnalysisReport, AnalysisError> {
        let article = Article::new(text)?;
        Ok(self.analyze_article(&article, selection).await)
    }

    /// Analyze an already validated article
    pub async fn analyze_article(
        &self,
        article: &Article,
        selection: &AnalysisSelection,
    ) -> AnalysisReport {
        let trace_id = Uuid::new_v4().to_string();
        let kinds = selection.enabled();
        let requests: Vec<_> = kinds.iter().map(|kind| article.request_for(*kind)).collect();

        let reports = self.invoker.traced(&trace_id).invoke_all(&requests).await;

        let cards: Vec<ResultCard> = kinds
            .into_iter()
            .zip(reports)
            .map(|(kind, report)| ResultCard {
                kind,
                title: kind.title().to_string(),
                icon: kind.icon().to_string(),
                column: kind.column(),
                outcome: report.outcome,
                provenance: report.provenance,
            })
            .collect();

        let report = AnalysisReport { trace_id, cards };
        info!(
            trace_id = %report.trace_id,
            analyses = report.cards.len(),
            unavailable = report.unavailable_count(),
            "Analysis complete"
        );
        report
    }
}
