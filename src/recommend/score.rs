use serde::Serialize;

use super::aggregate::CandidateRecord;
use super::profile::GenreProfile;
use crate::tmdb::MovieSummary;

const WITH_GENRE: Weights = Weights {
    frequency: 0.40,
    genre: 0.25,
    rating: 0.20,
    popularity: 0.15,
};

const WITHOUT_GENRE: Weights = Weights {
    frequency: 0.50,
    genre: 0.0,
    rating: 0.30,
    popularity: 0.20,
};

struct Weights {
    frequency: f64,
    genre: f64,
    rating: f64,
    popularity: f64,
}

/// A ranked candidate: the TMDB list item plus how it scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub movie: MovieSummary,
    pub recommendation_score: f64,
    pub frequency: u32,
    pub sources: Vec<i32>,
    pub from_favorite: bool,
    pub genre_match_score: f64,
}

pub(crate) fn score_candidates(
    records: Vec<CandidateRecord>,
    profile: &GenreProfile,
    favorite_weight: u32,
) -> Vec<ScoredCandidate> {
    let extra_per_favorite = favorite_weight.saturating_sub(1);
    let weighted = |r: &CandidateRecord| {
        f64::from(r.frequency) + f64::from(r.favorite_source_count) * f64::from(extra_per_favorite)
    };

    let max_weighted = records.iter().map(weighted).fold(0.0, f64::max);
    let max_popularity = records
        .iter()
        .map(|r| r.movie.popularity)
        .fold(0.0, f64::max);
    let weights = if profile.is_empty() {
        &WITHOUT_GENRE
    } else {
        &WITH_GENRE
    };

    records
        .into_iter()
        .map(|record| {
            let frequency_score = if max_weighted > 0.0 {
                weighted(&record) / max_weighted
            } else {
                0.0
            };
            let genre_score = profile.match_score(&record.movie.genre_ids);
            let rating_score = (record.movie.vote_average / 10.0).clamp(0.0, 1.0);
            let popularity_score = if max_popularity > 0.0 {
                (record.movie.popularity / max_popularity).max(0.0)
            } else {
                0.0
            };

            let composite = weights.frequency * frequency_score
                + weights.genre * genre_score
                + weights.rating * rating_score
                + weights.popularity * popularity_score;

            ScoredCandidate {
                recommendation_score: round2(composite),
                frequency: record.frequency,
                sources: record.sources,
                from_favorite: record.favorite_source_count > 0,
                genre_match_score: round2(genre_score),
                movie: record.movie,
            }
        })
        .collect()
}

/// Highest score first; equal scores keep their incoming order.
pub(crate) fn rank(mut scored: Vec<ScoredCandidate>, max_results: usize) -> Vec<ScoredCandidate> {
    scored.sort_by(|a, b| b.recommendation_score.total_cmp(&a.recommendation_score));
    scored.truncate(max_results);
    scored
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(id: i32, frequency: u32, favorite_hits: u32, genres: &[i32]) -> CandidateRecord {
        CandidateRecord {
            movie: MovieSummary {
                id,
                title: format!("Movie {id}"),
                original_title: String::new(),
                overview: String::new(),
                poster_path: None,
                backdrop_path: None,
                release_date: None,
                vote_average: 8.0,
                vote_count: 100,
                popularity: 50.0,
                genre_ids: genres.to_vec(),
                adult: false,
                original_language: "en".to_string(),
            },
            frequency,
            sources: vec![1],
            favorite_source_count: favorite_hits,
        }
    }

    fn profile(pairs: &[(i32, f64)]) -> GenreProfile {
        GenreProfile {
            weights: pairs.iter().copied().collect::<BTreeMap<_, _>>(),
            top_genre_ids: pairs.iter().map(|&(g, _)| g).collect(),
        }
    }

    #[test]
    fn lone_favorite_candidate_uses_fallback_formula() {
        let scored = score_candidates(vec![record(10, 1, 1, &[])], &GenreProfile::default(), 2);
        // 0.5 * 1.0 + 0.3 * 0.8 + 0.2 * 1.0
        assert_eq!(scored[0].recommendation_score, 0.94);
        assert_eq!(scored[0].genre_match_score, 0.0);
        assert!(scored[0].from_favorite);
    }

    #[test]
    fn genre_signal_switches_to_four_part_blend() {
        let p = profile(&[(18, 1.0), (28, 0.5)]);
        let scored = score_candidates(
            vec![record(10, 2, 0, &[18, 28]), record(11, 1, 0, &[99])],
            &p,
            2,
        );
        // 0.4 * 1.0 + 0.25 * 0.75 + 0.2 * 0.8 + 0.15 * 1.0 = 0.8975
        assert_eq!(scored[0].recommendation_score, 0.9);
        assert_eq!(scored[0].genre_match_score, 0.75);
        // 0.4 * 0.5 + 0 + 0.16 + 0.15 = 0.51
        assert_eq!(scored[1].recommendation_score, 0.51);
        assert!(!scored[1].from_favorite);
    }

    #[test]
    fn favorite_hits_lift_frequency_score() {
        let scored = score_candidates(
            vec![record(10, 2, 0, &[]), record(11, 2, 2, &[])],
            &GenreProfile::default(),
            2,
        );
        // weighted 2 vs 4
        assert_eq!(scored[0].recommendation_score, 0.69);
        assert_eq!(scored[1].recommendation_score, 0.94);
    }

    #[test]
    fn zero_popularity_everywhere_scores_zero_popularity() {
        let mut quiet = record(10, 1, 0, &[]);
        quiet.movie.popularity = 0.0;
        let scored = score_candidates(vec![quiet], &GenreProfile::default(), 2);
        assert_eq!(scored[0].recommendation_score, 0.74);
    }

    #[test]
    fn rank_sorts_descending_stably_and_truncates() {
        let p = GenreProfile::default();
        let scored = score_candidates(
            vec![
                record(1, 1, 0, &[]),
                record(2, 2, 0, &[]),
                record(3, 1, 0, &[]),
                record(4, 2, 0, &[]),
            ],
            &p,
            2,
        );
        let ranked = rank(scored, 3);
        let ids: Vec<i32> = ranked.iter().map(|c| c.movie.id).collect();
        assert_eq!(ids, vec![2, 4, 1]);
    }
}
