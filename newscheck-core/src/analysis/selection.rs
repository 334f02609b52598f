//! Which analyses run for a given request

use super::kind::{AnalysisKind, UnknownAnalysis};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One flag per analysis, mirroring the options sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSelection {
    pub topic: bool,
    pub fake: bool,
    pub sentiment: bool,
    pub clickbait: bool,
    pub bias: bool,
    pub summarizer: bool,
    pub emotion: bool,
}

impl Default for AnalysisSelection {
    fn default() -> Self {
        let mut selection = Self::none();
        for kind in AnalysisKind::ALL {
            selection.set(kind, kind.enabled_by_default());
        }
        selection
    }
}

impl AnalysisSelection {
    /// Nothing selected
    pub fn none() -> Self {
        Self {
            topic: false,
            fake: false,
            sentiment: false,
            clickbait: false,
            bias: false,
            summarizer: false,
            emotion: false,
        }
    }

    /// Everything selected
    pub fn all() -> Self {
        Self::from_kinds(AnalysisKind::ALL)
    }

    /// Select exactly the given analyses
    pub fn from_kinds(kinds: impl IntoIterator<Item = AnalysisKind>) -> Self {
        let mut selection = Self::none();
        for kind in kinds {
            selection.set(kind, true);
        }
        selection
    }

    fn flag_mut(&mut self, kind: AnalysisKind) -> &mut bool {
        match kind {
            AnalysisKind::Topic => &mut self.topic,
            AnalysisKind::FakeNews => &mut self.fake,
            AnalysisKind::Sentiment => &mut self.sentiment,
            AnalysisKind::Clickbait => &mut self.clickbait,
            AnalysisKind::Bias => &mut self.bias,
            AnalysisKind::Summary => &mut self.summarizer,
            AnalysisKind::Emotion => &mut self.emotion,
        }
    }

    /// Check if an analysis is selected
    pub fn is_enabled(&self, kind: AnalysisKind) -> bool {
        match kind {
            AnalysisKind::Topic => self.topic,
            AnalysisKind::FakeNews => self.fake,
            AnalysisKind::Sentiment => self.sentiment,
            AnalysisKind::Clickbait => self.clickbait,
            AnalysisKind::Bias => self.bias,
            AnalysisKind::Summary => self.summarizer,
            AnalysisKind::Emotion => self.emotion,
        }
    }

    /// Toggle an analysis
    pub fn set(&mut self, kind: AnalysisKind, enabled: bool) {
        *self.flag_mut(kind) = enabled;
    }

    /// Builder-style toggle
    pub fn with(mut self, kind: AnalysisKind, enabled: bool) -> Self {
        self.set(kind, enabled);
        self
    }

    /// Selected analyses in display order
    pub fn enabled(&self) -> Vec<AnalysisKind> {
        AnalysisKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }

    /// Check if nothing is selected
    pub fn is_empty(&self) -> bool {
        self.enabled().is_empty()
    }
}

impl FromStr for AnalysisSelection {
    type Err = UnknownAnalysis;

    /// Parses `all` or a comma-separated list of analysis keys
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }
        let kinds = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| part.parse::<AnalysisKind>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_kinds(kinds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_sidebar() {
        let selection = AnalysisSelection::default();
        assert_eq!(
            selection.enabled(),
            vec![AnalysisKind::Topic, AnalysisKind::FakeNews, AnalysisKind::Sentiment]
        );
    }

    #[test]
    fn test_parse_list() {
        let selection: AnalysisSelection = "clickbait, emotion".parse().unwrap();
        assert_eq!(
            selection.enabled(),
            vec![AnalysisKind::Clickbait, AnalysisKind::Emotion]
        );
        assert_eq!("all".parse::<AnalysisSelection>().unwrap().enabled().len(), 7);
        assert!("topic,astrology".parse::<AnalysisSelection>().is_err());
    }

    #[test]
    fn test_toggle() {
        let selection = AnalysisSelection::none()
            .with(AnalysisKind::Bias, true)
            .with(AnalysisKind::Bias, false);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let selection: AnalysisSelection =
            serde_json::from_value(serde_json::json!({ "emotion": true, "topic": false })).unwrap();
        assert!(selection.emotion);
        assert!(!selection.topic);
        assert!(selection.fake);
    }
}
