//! The seven news analyses and their display metadata

use crate::capability::CapabilityId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page column a result card is placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Left,
    Right,
}

/// What part of the article an analysis receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleInput {
    /// The text exactly as pasted
    FullText,
    /// First line of the trimmed text
    Headline,
}

/// A news analysis offered on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Topic,
    FakeNews,
    Sentiment,
    Clickbait,
    Bias,
    Summary,
    Emotion,
}

impl AnalysisKind {
    /// All analyses in display order
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::Topic,
        AnalysisKind::FakeNews,
        AnalysisKind::Sentiment,
        AnalysisKind::Clickbait,
        AnalysisKind::Bias,
        AnalysisKind::Summary,
        AnalysisKind::Emotion,
    ];

    /// Card title
    pub fn title(&self) -> &'static str {
        match self {
            AnalysisKind::Topic => "Topic Classification",
            AnalysisKind::FakeNews => "Fake News Detection",
            AnalysisKind::Sentiment => "Sentiment Analysis",
            AnalysisKind::Clickbait => "Clickbait Detection",
            AnalysisKind::Bias => "Bias Detection",
            AnalysisKind::Summary => "Summarizer",
            AnalysisKind::Emotion => "Emotion Detection",
        }
    }

    /// Card icon
    pub fn icon(&self) -> &'static str {
        match self {
            AnalysisKind::Topic => "🧩",
            AnalysisKind::FakeNews => "⚠️",
            AnalysisKind::Sentiment => "💬",
            AnalysisKind::Clickbait => "🎯",
            AnalysisKind::Bias => "🧠",
            AnalysisKind::Summary => "✂️",
            AnalysisKind::Emotion => "❤️",
        }
    }

    /// Short key used in forms, config and the CLI
    pub fn key(&self) -> &'static str {
        match self {
            AnalysisKind::Topic => "topic",
            AnalysisKind::FakeNews => "fake",
            AnalysisKind::Sentiment => "sentiment",
            AnalysisKind::Clickbait => "clickbait",
            AnalysisKind::Bias => "bias",
            AnalysisKind::Summary => "summarizer",
            AnalysisKind::Emotion => "emotion",
        }
    }

    /// Provider namespace that implements this analysis
    pub fn provider_id(&self) -> &'static str {
        self.key()
    }

    /// Operation invoked on the provider
    pub fn operation_id(&self) -> &'static str {
        match self {
            AnalysisKind::Topic => "predict_topic",
            AnalysisKind::FakeNews => "predict_fake",
            AnalysisKind::Sentiment => "predict_sentiment",
            AnalysisKind::Clickbait => "is_clickbait",
            AnalysisKind::Bias => "detect_bias",
            AnalysisKind::Summary => "summarize",
            AnalysisKind::Emotion => "get_emotion",
        }
    }

    /// Full capability identifier
    pub fn capability(&self) -> CapabilityId {
        CapabilityId::new(self.provider_id(), self.operation_id())
    }

    /// Column on the results page
    pub fn column(&self) -> Column {
        match self {
            AnalysisKind::Topic | AnalysisKind::FakeNews | AnalysisKind::Sentiment => Column::Left,
            _ => Column::Right,
        }
    }

    /// Whether the analysis is selected before the reader changes anything
    pub fn enabled_by_default(&self) -> bool {
        self.column() == Column::Left
    }

    /// Portion of the article passed to the provider
    pub fn input(&self) -> ArticleInput {
        match self {
            AnalysisKind::Clickbait => ArticleInput::Headline,
            _ => ArticleInput::FullText,
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned for an unknown analysis key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown analysis '{0}'")]
pub struct UnknownAnalysis(pub String);

impl FromStr for AnalysisKind {
    type Err = UnknownAnalysis;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or(UnknownAnalysis(s.to_string()))
    }
}
