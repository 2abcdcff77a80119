use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use crate::config::{AnalysisConfig, AnalysisMode};
use crate::errors::{AnalysisError, AnalysisResult};
use crate::models::AnalysisRecord;
use super::mock_analyzer::MockAnalyzer;
use super::remote_analyzer::RemoteAnalyzer;

/// One encoded image in, one analysis record out. An `Err` means the
/// unit could not be reached, as opposed to a record with failed status.
#[async_trait]
pub trait Analyzer: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn analyze(&self, image: &str) -> AnalysisResult<AnalysisRecord>;
}

pub type SharedAnalyzer = Arc<dyn Analyzer>;

pub fn build_analyzer(config: &AnalysisConfig) -> AnalysisResult<SharedAnalyzer> {
    match config.mode {
        AnalysisMode::Mock => Ok(Arc::new(MockAnalyzer::from_config(config))),
        AnalysisMode::Remote => {
            let endpoint = config.endpoint.clone().ok_or_else(|| {
                AnalysisError::Misconfigured("analysis.endpoint is required in remote mode".into())
            })?;
            Ok(Arc::new(RemoteAnalyzer::new(endpoint, config.api_key.clone())?))
        }
    }
}

/// Submits every image at once and waits for all of them. Results come
/// back in input order; the first rejection fails the whole batch and the
/// other results are dropped.
pub async fn analyze_batch(
    analyzer: &dyn Analyzer,
    images: &[String],
) -> AnalysisResult<Vec<AnalysisRecord>> {
    tracing::info!("Submitting batch of {} images to {} analyzer", images.len(), analyzer.backend_tag());

    let calls = images.iter().map(|image| analyzer.analyze(image));
    let records = try_join_all(calls).await.map_err(|e| {
        tracing::error!("Batch of {} aborted: {}", images.len(), e);
        AnalysisError::BatchAborted { cause: Box::new(e) }
    })?;

    tracing::info!("Batch of {} images analyzed", records.len());
    Ok(records)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::models::AnalysisStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Completes every call except the one numbered `fail_on` (0-based).
    pub struct ScriptedAnalyzer {
        pub fail_on: Option<usize>,
        pub calls: AtomicUsize,
    }

    impl ScriptedAnalyzer {
        pub fn new(fail_on: Option<usize>) -> Self {
            Self { fail_on, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Analyzer for ScriptedAnalyzer {
        fn backend_tag(&self) -> &'static str {
            "scripted"
        }

        async fn analyze(&self, image: &str) -> AnalysisResult<AnalysisRecord> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if Some(call) == self.fail_on {
                return Err(AnalysisError::Connection("unit offline".into()));
            }
            Ok(AnalysisRecord::new(image, "E. coli", 92.4, "scripted", AnalysisStatus::Completed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::testing::ScriptedAnalyzer;
    use std::sync::atomic::Ordering;

    fn images(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("data:image/png;base64,img{}", i)).collect()
    }

    #[tokio::test]
    async fn test_batch_keeps_input_order() {
        let analyzer = ScriptedAnalyzer::new(None);
        let records = analyze_batch(&analyzer, &images(3)).await.unwrap();

        let sources: Vec<_> = records.iter().map(|r| r.image.clone()).collect();
        assert_eq!(sources, images(3));
    }

    #[tokio::test]
    async fn test_one_rejection_fails_whole_batch() {
        let analyzer = ScriptedAnalyzer::new(Some(1));
        let err = analyze_batch(&analyzer, &images(3)).await.unwrap_err();

        assert!(matches!(err, AnalysisError::BatchAborted { .. }));
        assert_eq!(err.to_string(), "Connection to analysis unit failed during batch analysis.");
        assert!(analyzer.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty() {
        let analyzer = ScriptedAnalyzer::new(Some(0));
        assert!(analyze_batch(&analyzer, &[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_remote_mode_requires_endpoint() {
        let config = AnalysisConfig {
            mode: AnalysisMode::Remote,
            ..AnalysisConfig::default()
        };
        let err = build_analyzer(&config).err().unwrap();
        assert!(matches!(err, AnalysisError::Misconfigured(_)));

        let mock = build_analyzer(&AnalysisConfig::default()).unwrap();
        assert_eq!(mock.backend_tag(), "mock");
    }
}
