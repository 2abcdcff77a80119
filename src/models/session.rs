use serde::{Deserialize, Serialize};
use super::analysis::AnalysisRecord;
use super::user::UserProfile;

// Session keys
pub const USER_SESSION_KEY: &str = "user_session";
pub const WORKSPACE_KEY: &str = "workspace";

/// Per-session state: who is logged in, their history as of the last load
/// or mutation, and the samples staged for analysis.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Workspace {
    pub profile: UserProfile,
    pub history: Vec<AnalysisRecord>,
    #[serde(default)]
    pub samples: Vec<CapturedSample>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CapturedSample {
    pub id: String,
    pub image: String,
    pub selected: bool,
}

/// Listing entry for a staged sample, without the image payload.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SampleSummary {
    pub id: String,
    pub selected: bool,
    pub encoded_len: usize,
}

impl CapturedSample {
    pub fn new(image: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            image,
            selected: false,
        }
    }

    pub fn summary(&self) -> SampleSummary {
        SampleSummary {
            id: self.id.clone(),
            selected: self.selected,
            encoded_len: self.image.len(),
        }
    }
}

impl Workspace {
    pub fn new(profile: UserProfile, history: Vec<AnalysisRecord>) -> Self {
        Self {
            profile,
            history,
            samples: Vec::new(),
        }
    }

    pub fn sample_mut(&mut self, id: &str) -> Option<&mut CapturedSample> {
        self.samples.iter_mut().find(|sample| sample.id == id)
    }

    pub fn remove_sample(&mut self, id: &str) -> bool {
        let before = self.samples.len();
        self.samples.retain(|sample| sample.id != id);
        before != self.samples.len()
    }

    pub fn remove_selected_samples(&mut self) -> usize {
        let before = self.samples.len();
        self.samples.retain(|sample| !sample.selected);
        before - self.samples.len()
    }

    pub fn select_all(&mut self, selected: bool) {
        for sample in &mut self.samples {
            sample.selected = selected;
        }
    }

    /// Samples to submit: the whole working set, or only the selected ones.
    pub fn samples_for_analysis(&self, all: bool) -> Vec<CapturedSample> {
        self.samples
            .iter()
            .filter(|sample| all || sample.selected)
            .cloned()
            .collect()
    }

    pub fn drop_samples(&mut self, ids: &[String]) {
        self.samples.retain(|sample| !ids.contains(&sample.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> Workspace {
        let profile = UserProfile {
            username: "tech1".into(),
            role: "Technician".into(),
            department: "Micro".into(),
        };
        Workspace::new(profile, Vec::new())
    }

    #[test]
    fn test_samples_for_analysis_respects_selection() {
        let mut ws = workspace();
        ws.samples.push(CapturedSample::new("a".into()));
        ws.samples.push(CapturedSample::new("b".into()));
        ws.samples[1].selected = true;

        let selected = ws.samples_for_analysis(false);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].image, "b");
        assert_eq!(ws.samples_for_analysis(true).len(), 2);

        ws.select_all(true);
        assert_eq!(ws.remove_selected_samples(), 2);
        assert!(ws.samples.is_empty());
    }
}
