// Application error types and the result aliases used across the service.
use thiserror::Error;

pub mod analysis;
pub mod crop;
pub mod response;
pub mod storage;

pub use analysis::{AnalysisError, AnalysisResult};
pub use crop::{CropError, CropResult};
pub use storage::{StorageError, StorageResult};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Crop error: {0}")]
    Crop(#[from] CropError),

    #[error("Credential error: {0}")]
    Credential(#[from] bcrypt::BcryptError),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// Registration rejections are recoverable and reported back to the form.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("System Capacity Reached ({capacity}/{capacity} Users). Contact Administrator.")]
    CapacityReached { capacity: usize },

    #[error("All fields are required for registration.")]
    MissingField,

    #[error("Username already exists. Please choose another.")]
    UsernameTaken,
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        AppError::Session(err.to_string())
    }
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
