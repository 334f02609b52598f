//! Pasted article text and argument preparation

use super::kind::{AnalysisKind, ArticleInput};
use crate::capability::CapabilityRequest;

/// Why an article was rejected before any analysis ran
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Nothing but whitespace was pasted
    #[error("Please paste a news article before analyzing.")]
    EmptyArticle,
}

/// A non-blank article as pasted by the reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    text: String,
}

impl Article {
    /// Accept the text unless it is blank
    pub fn new(text: impl Into<String>) -> Result<Self, AnalysisError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyArticle);
        }
        Ok(Self { text })
    }

    /// Full text, unmodified
    pub fn text(&self) -> &str {
        &self.text
    }

    /// First line of the trimmed text
    pub fn headline(&self) -> &str {
        self.text.trim().lines().next().unwrap_or_default()
    }

    /// Build the capability request for one analysis
    pub fn request_for(&self, kind: AnalysisKind) -> CapabilityRequest {
        let input = match kind.input() {
            ArticleInput::FullText => self.text(),
            ArticleInput::Headline => self.headline(),
        };
        CapabilityRequest::for_id(kind.capability()).with_arg(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_article_rejected() {
        assert_eq!(Article::new("  \n\t "), Err(AnalysisError::EmptyArticle));
        assert_eq!(
            AnalysisError::EmptyArticle.to_string(),
            "Please paste a news article before analyzing."
        );
    }

    #[test]
    fn test_headline_is_first_trimmed_line() {
        let article = Article::new("\n\n  Moon replaced by cheese\nScientists baffled.\n").unwrap();
        assert_eq!(article.headline(), "Moon replaced by cheese");
    }

    #[test]
    fn test_requests_use_prepared_arguments() {
        let text = "Moon replaced by cheese\nScientists baffled.";
        let article = Article::new(text).unwrap();

        let clickbait = article.request_for(AnalysisKind::Clickbait);
        assert_eq!(clickbait.arguments, vec![json!("Moon replaced by cheese")]);

        let topic = article.request_for(AnalysisKind::Topic);
        assert_eq!(topic.operation_id(), "predict_topic");
        assert_eq!(topic.arguments, vec![json!(text)]);
    }
}
