//! Watched-list recommendations: fan out to TMDB for each watched movie,
//! pool what comes back, and rank it against the user's genre profile.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use crate::config::RecommendConfig;
use crate::tmdb::TmdbApi;

mod aggregate;
mod profile;
mod progress;
mod score;

pub use profile::{build_genre_profile, GenreProfile};
pub use progress::{NoProgress, Phase, ProgressSink, RecommendationProgress, TracingProgress};
pub use score::ScoredCandidate;

/// A run that could not produce a ranking at all. Individual fetch failures
/// never end up here.
#[derive(Debug, thiserror::Error)]
pub enum EngineFailure {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEntry {
    pub id: i32,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub movies: Vec<ScoredCandidate>,
    pub genre_profile: GenreProfile,
}

pub fn favorite_ids(watched: &[WatchedEntry]) -> HashSet<i32> {
    watched
        .iter()
        .filter(|m| m.is_favorite)
        .map(|m| m.id)
        .collect()
}

/// Runs one independent recommendation pass over a snapshot of the watched list.
pub async fn generate_recommendations(
    api: &dyn TmdbApi,
    watched: &[WatchedEntry],
    favorites: &HashSet<i32>,
    config: &RecommendConfig,
    progress: &dyn ProgressSink,
) -> Result<Recommendations, EngineFailure> {
    if watched.is_empty() {
        return Ok(Recommendations::default());
    }
    config.validate()?;

    let genre_profile =
        build_genre_profile(watched, favorites, config.favorite_weight, config.top_genres);

    let watched_ids: Vec<i32> = watched.iter().map(|m| m.id).collect();
    let ordered = aggregate::favorites_first(&watched_ids, favorites);
    let pool =
        aggregate::collect_candidates(api, &ordered, favorites, config.batch_size, progress).await;

    let candidate_count = pool.len();
    progress.report(RecommendationProgress::new(Phase::Scoring, 0, candidate_count));

    let scored = score::score_candidates(pool.into_records(), &genre_profile, config.favorite_weight);
    let movies = score::rank(scored, config.max_results);

    progress.report(RecommendationProgress::new(
        Phase::Done,
        candidate_count,
        candidate_count,
    ));
    info!(
        "Ranked {} of {} candidates from {} watched movies",
        movies.len(),
        candidate_count,
        watched.len()
    );

    Ok(Recommendations {
        movies,
        genre_profile,
    })
}
