use async_trait::async_trait;
use crate::errors::{AnalysisError, AnalysisResult};
use crate::models::{AnalysisRecord, AnalysisRequest, AnalysisResponse, AnalysisStatus};
use super::analyzer::Analyzer;

/// Client for a real analysis unit reachable over HTTP.
pub struct RemoteAnalyzer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteAnalyzer {
    pub fn new(endpoint: String, api_key: Option<String>) -> AnalysisResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AnalysisError::Misconfigured(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }
}

/// Maps a unit response onto a record. A response with `success: false`
/// is still an answer, so it becomes a failed record rather than an error.
pub fn record_from_response(image: &str, response: AnalysisResponse) -> AnalysisResult<AnalysisRecord> {
    if !response.success {
        let reason = response
            .error
            .unwrap_or_else(|| "Analysis unit reported an error".to_string());
        return Ok(AnalysisRecord::new(image, "Unknown", 0.0, reason, AnalysisStatus::Failed));
    }

    let data = response
        .data
        .ok_or_else(|| AnalysisError::Decode("successful response without data".into()))?;

    Ok(AnalysisRecord::new(
        image,
        data.identified_bacteria,
        data.confidence_score.clamp(0.0, 100.0),
        format!("Analysis received from unit in {} ms", data.analysis_time_ms),
        AnalysisStatus::Completed,
    ))
}

#[async_trait]
impl Analyzer for RemoteAnalyzer {
    fn backend_tag(&self) -> &'static str {
        "remote"
    }

    async fn analyze(&self, image: &str) -> AnalysisResult<AnalysisRecord> {
        tracing::debug!("Sending image to {}", self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(&AnalysisRequest { image });
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Analysis unit unreachable at {}: {}", self.endpoint, e);
            AnalysisError::from(e)
        })?;

        if !response.status().is_success() {
            tracing::error!("Analysis unit returned {}", response.status());
            return Err(AnalysisError::Status(response.status().as_u16()));
        }

        let body: AnalysisResponse = response.json().await?;
        record_from_response(image, body)
    }
}
