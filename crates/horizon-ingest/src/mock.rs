//! Mock analysis backend for tests.
//!
//! Returns a scripted [`Analysis`] (or error) without any network access,
//! so API handler tests can exercise the ingest endpoints deterministically.

use std::sync::Mutex;

use async_trait::async_trait;

use horizon_core::{
    defaults, Analysis, AnalysisBackend, Certainty, Error, Horizon, Result, SignalStub,
};

/// Scripted analysis backend.
pub struct MockAnalysisBackend {
    response: Mutex<Option<Analysis>>,
    fail_with: Mutex<Option<String>>,
}

impl MockAnalysisBackend {
    /// A mock that always succeeds with a plausible fixed analysis.
    pub fn new() -> Self {
        Self {
            response: Mutex::new(Some(Analysis {
                summary: "Fixed mock summary.".to_string(),
                takeaways: vec![
                    "First takeaway.".to_string(),
                    "Second takeaway.".to_string(),
                    "Third takeaway.".to_string(),
                ],
                tags: vec!["mock".to_string(), "testing".to_string()],
                relevance: defaults::RELEVANCE_DEFAULT,
                horizon: Horizon::FiveToTen,
                certainty: Certainty::Uncertain,
            })),
            fail_with: Mutex::new(None),
        }
    }

    /// A mock that returns the given analysis.
    pub fn with_analysis(analysis: Analysis) -> Self {
        Self {
            response: Mutex::new(Some(analysis)),
            fail_with: Mutex::new(None),
        }
    }

    /// A mock that fails every call with an inference error.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Mutex::new(None),
            fail_with: Mutex::new(Some(message.to_string())),
        }
    }
}

impl Default for MockAnalysisBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisBackend for MockAnalysisBackend {
    async fn analyze(
        &self,
        content: &str,
        _title: Option<&str>,
        _url: Option<&str>,
    ) -> Result<Analysis> {
        let len = content.trim().chars().count();
        if len < defaults::ANALYZE_MIN_CONTENT_CHARS {
            return Err(Error::ContentTooShort(len));
        }
        if let Some(msg) = self.fail_with.lock().unwrap().clone() {
            return Err(Error::Inference(msg));
        }
        Ok(self
            .response
            .lock()
            .unwrap()
            .clone()
            .expect("mock has neither response nor failure"))
    }

    async fn describe(&self, title: &str, signals: &[SignalStub]) -> Result<String> {
        if let Some(msg) = self.fail_with.lock().unwrap().clone() {
            return Err(Error::Inference(msg));
        }
        Ok(format!(
            "Mock description of {} grounded in {} signals.",
            title,
            signals.len()
        ))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_rejects_short_content() {
        let backend = MockAnalysisBackend::new();
        let err = backend.analyze("too short", None, None).await.unwrap_err();
        assert!(matches!(err, Error::ContentTooShort(_)));
    }

    #[tokio::test]
    async fn test_mock_returns_scripted_analysis() {
        let backend = MockAnalysisBackend::new();
        let content = "c".repeat(200);
        let analysis = backend.analyze(&content, None, None).await.unwrap();
        assert_eq!(analysis.takeaways.len(), 3);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let backend = MockAnalysisBackend::failing("boom");
        let content = "c".repeat(200);
        assert!(backend.analyze(&content, None, None).await.is_err());
    }
}
