use serde::Deserialize;
use super::analysis::StatusFilter;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub role: String,
    pub department: String,
}

impl RegisterForm {
    pub fn has_empty_field(&self) -> bool {
        [&self.username, &self.password, &self.role, &self.department]
            .iter()
            .any(|field| field.is_empty())
    }
}

/// Rectangle drawn by the user. Coordinates are in display pixels when
/// `display_width` is given, otherwise in source-image pixels.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CropForm {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub display_width: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AnalyzeForm {
    // Analyze the whole working set instead of the selected samples
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Deserialize)]
pub struct SelectionForm {
    pub selected: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRecordsForm {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HistoryQuery {
    #[serde(default)]
    pub status: StatusFilter,
}
