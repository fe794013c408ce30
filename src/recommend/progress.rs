use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Fetching,
    Scoring,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecommendationProgress {
    pub current: usize,
    pub total: usize,
    pub phase: Phase,
}

impl RecommendationProgress {
    pub fn new(phase: Phase, current: usize, total: usize) -> Self {
        Self {
            current,
            total,
            phase,
        }
    }
}

/// Receives progress events synchronously, in the order the engine emits them.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: RecommendationProgress);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: RecommendationProgress) {}
}

impl<F> ProgressSink for F
where
    F: Fn(RecommendationProgress) + Send + Sync,
{
    fn report(&self, progress: RecommendationProgress) {
        self(progress)
    }
}

/// Logs each event; used where there is no interactive consumer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, progress: RecommendationProgress) {
        match progress.phase {
            Phase::Fetching => debug!(
                current = progress.current,
                total = progress.total,
                "Fetched recommendation batch"
            ),
            Phase::Scoring => info!("Scoring {} candidates", progress.total),
            Phase::Done => info!("Recommendation run finished ({} candidates)", progress.total),
        }
    }
}
