mod user;
mod forms;
mod analysis;
mod session;

pub use user::{UserAccount, UserProfile, DirectoryUsage};
pub use forms::{LoginForm, RegisterForm, CropForm, AnalyzeForm, SelectionForm, DeleteRecordsForm, HistoryQuery};
pub use analysis::{AnalysisRecord, AnalysisStatus, StatusFilter, AnalysisRequest, AnalysisResponse};
pub use session::{Workspace, CapturedSample, SampleSummary, USER_SESSION_KEY, WORKSPACE_KEY};
