use async_trait::async_trait;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::sync::Mutex;
use tokio::time::{sleep, Duration};
use crate::config::AnalysisConfig;
use crate::errors::AnalysisResult;
use crate::models::{AnalysisRecord, AnalysisStatus};
use super::analyzer::Analyzer;

pub const ORGANISMS: [&str; 5] = [
    "Staphylococcus aureus",
    "E. coli",
    "Salmonella",
    "Streptococcus",
    "Lactobacillus",
];

pub const MIN_CONFIDENCE: f64 = 85.0;
pub const MAX_CONFIDENCE: f64 = 99.9;

/// Stand-in for the analysis unit: random delay, random outcome.
pub struct MockAnalyzer {
    delay_min_ms: u64,
    delay_max_ms: u64,
    failure_rate: f64,
    pending_rate: f64,
    rng: Mutex<StdRng>,
}

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Failed,
    Pending,
    Completed { organism: &'static str, confidence: f64 },
}

impl MockAnalyzer {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            delay_min_ms: config.delay_min_ms,
            delay_max_ms: config.delay_max_ms.max(config.delay_min_ms),
            failure_rate: config.failure_rate.clamp(0.0, 1.0),
            pending_rate: config.pending_rate.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        }
    }

    // Everything random is drawn up front so the lock is never held across the sleep.
    fn draw(&self) -> (Duration, Outcome) {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let delay = Duration::from_millis(rng.gen_range(self.delay_min_ms..=self.delay_max_ms));

        // Two independent draws: failure first, then pending.
        let outcome = if rng.gen_bool(self.failure_rate) {
            Outcome::Failed
        } else if rng.gen_bool(self.pending_rate) {
            Outcome::Pending
        } else {
            let organism = ORGANISMS.choose(&mut *rng).copied().unwrap_or(ORGANISMS[0]);
            let confidence = (rng.gen_range(MIN_CONFIDENCE..=MAX_CONFIDENCE) * 10.0).round() / 10.0;
            Outcome::Completed { organism, confidence }
        };

        (delay, outcome)
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    fn backend_tag(&self) -> &'static str {
        "mock"
    }

    async fn analyze(&self, image: &str) -> AnalysisResult<AnalysisRecord> {
        let (delay, outcome) = self.draw();
        tracing::debug!("Mock analysis will answer in {:?}", delay);
        sleep(delay).await;

        let record = match outcome {
            Outcome::Failed => AnalysisRecord::new(
                image,
                "Analysis Failed",
                0.0,
                "Connection timeout or sensor error",
                AnalysisStatus::Failed,
            ),
            Outcome::Pending => AnalysisRecord::new(
                image,
                "Pending Review",
                0.0,
                "Low confidence score, requires manual verification",
                AnalysisStatus::Pending,
            ),
            Outcome::Completed { organism, confidence } => AnalysisRecord::new(
                image,
                organism,
                confidence,
                "Automated analysis",
                AnalysisStatus::Completed,
            ),
        };

        tracing::debug!("Mock analysis {} finished with status {:?}", record.id, record.status);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(failure_rate: f64, pending_rate: f64, seed: u64) -> AnalysisConfig {
        AnalysisConfig {
            delay_min_ms: 0,
            delay_max_ms: 0,
            failure_rate,
            pending_rate,
            seed: Some(seed),
            ..AnalysisConfig::default()
        }
    }

    #[tokio::test]
    async fn test_completed_records_are_in_range() {
        let analyzer = MockAnalyzer::from_config(&config(0.0, 0.0, 7));
        for _ in 0..200 {
            let record = analyzer.analyze("data:image/png;base64,AAAA").await.unwrap();
            assert_eq!(record.status, AnalysisStatus::Completed);
            assert!(ORGANISMS.contains(&record.organism.as_str()));
            assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&record.confidence));
            // one decimal place
            assert!(((record.confidence * 10.0).round() - record.confidence * 10.0).abs() < 1e-9);
            assert_eq!(record.image, "data:image/png;base64,AAAA");
        }
    }

    #[tokio::test]
    async fn test_forced_failure_and_pending() {
        let failing = MockAnalyzer::from_config(&config(1.0, 0.0, 1));
        let record = failing.analyze("img").await.unwrap();
        assert_eq!(record.status, AnalysisStatus::Failed);
        assert_eq!(record.confidence, 0.0);
        assert_eq!(record.notes, "Connection timeout or sensor error");

        let pending = MockAnalyzer::from_config(&config(0.0, 1.0, 1));
        let record = pending.analyze("img").await.unwrap();
        assert_eq!(record.status, AnalysisStatus::Pending);
        assert_eq!(record.confidence, 0.0);
        assert_eq!(record.organism, "Pending Review");
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let analyzer = MockAnalyzer::from_config(&config(0.1, 0.05, 3));
        let mut ids = std::collections::HashSet::new();
        for _ in 0..50 {
            ids.insert(analyzer.analyze("img").await.unwrap().id);
        }
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_same_seed_same_outcomes() {
        let a = MockAnalyzer::from_config(&config(0.3, 0.3, 42));
        let b = MockAnalyzer::from_config(&config(0.3, 0.3, 42));
        for _ in 0..20 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn test_delay_stays_in_window() {
        let analyzer = MockAnalyzer::from_config(&AnalysisConfig {
            seed: Some(9),
            ..AnalysisConfig::default()
        });
        for _ in 0..100 {
            let (delay, _) = analyzer.draw();
            assert!(delay >= Duration::from_millis(1500) && delay <= Duration::from_millis(2500));
        }
    }
}
