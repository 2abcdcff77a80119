use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis unit unreachable: {0}")]
    Connection(String),

    #[error("Analysis unit returned HTTP {0}")]
    Status(u16),

    #[error("Malformed analysis response: {0}")]
    Decode(String),

    #[error("Analysis backend misconfigured: {0}")]
    Misconfigured(String),

    #[error("Connection to analysis unit failed during batch analysis.")]
    BatchAborted {
        #[source]
        cause: Box<AnalysisError>,
    },
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AnalysisError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            AnalysisError::Status(status.as_u16())
        } else {
            AnalysisError::Connection(err.to_string())
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
