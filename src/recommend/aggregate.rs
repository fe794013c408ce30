use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::progress::{Phase, ProgressSink, RecommendationProgress};
use crate::tmdb::{FetchFailure, MovieListKind, MovieListPage, MovieSummary, TmdbApi};

#[derive(Debug, Clone)]
pub(crate) struct CandidateRecord {
    pub movie: MovieSummary,
    pub frequency: u32,
    /// Watched ids that surfaced this movie, first sighting first, no repeats.
    pub sources: Vec<i32>,
    pub favorite_source_count: u32,
}

/// Candidates keyed by movie id, iterated in first-sighting order.
#[derive(Debug, Default)]
pub(crate) struct CandidatePool {
    slots: HashMap<i32, usize>,
    records: Vec<CandidateRecord>,
}

impl CandidatePool {
    /// Every hit counts, including the same movie coming back from both the
    /// recommendations and the similar list of one watched movie.
    pub fn record_hit(&mut self, movie: MovieSummary, source: i32, from_favorite: bool) {
        let favorite_hit = u32::from(from_favorite);
        match self.slots.get(&movie.id) {
            Some(&slot) => {
                let record = &mut self.records[slot];
                record.frequency += 1;
                record.favorite_source_count += favorite_hit;
                if !record.sources.contains(&source) {
                    record.sources.push(source);
                }
            }
            None => {
                self.slots.insert(movie.id, self.records.len());
                self.records.push(CandidateRecord {
                    movie,
                    frequency: 1,
                    sources: vec![source],
                    favorite_source_count: favorite_hit,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn into_records(self) -> Vec<CandidateRecord> {
        self.records
    }
}

/// Stable partition: favorites keep their relative order ahead of the rest.
pub(crate) fn favorites_first(watched_ids: &[i32], favorites: &HashSet<i32>) -> Vec<i32> {
    let (mut ordered, rest): (Vec<i32>, Vec<i32>) = watched_ids
        .iter()
        .copied()
        .partition(|id| favorites.contains(id));
    ordered.extend(rest);
    ordered
}

/// Fans out recommendations + similar requests for each watched id, one
/// batch at a time, and folds the successful pages into a candidate pool.
pub(crate) async fn collect_candidates(
    api: &dyn TmdbApi,
    ordered_ids: &[i32],
    favorites: &HashSet<i32>,
    batch_size: usize,
    progress: &dyn ProgressSink,
) -> CandidatePool {
    let watched: HashSet<i32> = ordered_ids.iter().copied().collect();
    let total = ordered_ids.len();
    let mut pool = CandidatePool::default();
    let mut processed = 0usize;

    for batch in ordered_ids.chunks(batch_size) {
        let outcomes = join_all(batch.iter().map(|&watched_id| async move {
            let (recommendations, similar) = tokio::join!(
                api.fetch_movie_list(watched_id, MovieListKind::Recommendations),
                api.fetch_movie_list(watched_id, MovieListKind::Similar),
            );
            (watched_id, [recommendations, similar])
        }))
        .await;

        for (watched_id, pages) in outcomes {
            let from_favorite = favorites.contains(&watched_id);
            for page in pages.into_iter().filter_map(|r| settled(watched_id, r)) {
                for movie in page.results {
                    if watched.contains(&movie.id) {
                        continue;
                    }
                    pool.record_hit(movie, watched_id, from_favorite);
                }
            }
        }

        processed = (processed + batch.len()).min(total);
        progress.report(RecommendationProgress::new(Phase::Fetching, processed, total));
    }

    pool
}

fn settled(
    watched_id: i32,
    outcome: Result<MovieListPage, FetchFailure>,
) -> Option<MovieListPage> {
    match outcome {
        Ok(page) => Some(page),
        Err(err) => {
            debug!(movie_id = watched_id, "Skipping failed TMDB fetch: {}", err);
            None
        }
    }
}
