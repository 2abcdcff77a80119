use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Completed,
    Pending,
    Failed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub id: String,
    pub image: String,  // data URL of the analyzed sample
    pub timestamp: DateTime<Utc>,
    pub organism: String,
    pub confidence: f64,  // 0-100
    pub notes: String,
    pub status: AnalysisStatus,
}

impl AnalysisRecord {
    pub fn new(
        image: &str,
        organism: impl Into<String>,
        confidence: f64,
        notes: impl Into<String>,
        status: AnalysisStatus,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            image: image.to_string(),
            timestamp: Utc::now(),
            organism: organism.into(),
            confidence,
            notes: notes.into(),
            status,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
    Failed,
}

impl StatusFilter {
    pub fn matches(self, status: AnalysisStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => status == AnalysisStatus::Completed,
            StatusFilter::Pending => status == AnalysisStatus::Pending,
            StatusFilter::Failed => status == AnalysisStatus::Failed,
        }
    }
}

// Wire format of the remote analysis unit.
#[derive(Serialize, Debug)]
pub struct AnalysisRequest<'a> {
    pub image: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct AnalysisResponse {
    pub success: bool,
    pub data: Option<AnalysisData>,
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AnalysisData {
    pub identified_bacteria: String,
    pub confidence_score: f64,
    pub analysis_time_ms: u64,
}
