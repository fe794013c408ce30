use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::WatchedEntry;

/// Genre preference derived from the watched list. The most preferred genre
/// always has weight 1.0; an empty map means no genre signal at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreProfile {
    pub weights: BTreeMap<i32, f64>,
    pub top_genre_ids: Vec<i32>,
}

impl GenreProfile {
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weight(&self, genre_id: i32) -> f64 {
        self.weights.get(&genre_id).copied().unwrap_or(0.0)
    }

    /// Mean profile weight over the movie's genres, 0 when either side has none.
    pub fn match_score(&self, genre_ids: &[i32]) -> f64 {
        if genre_ids.is_empty() || self.is_empty() {
            return 0.0;
        }
        let total: f64 = genre_ids.iter().map(|&gid| self.weight(gid)).sum();
        total / genre_ids.len() as f64
    }
}

pub fn build_genre_profile(
    watched: &[WatchedEntry],
    favorites: &HashSet<i32>,
    favorite_weight: u32,
    top_genres: usize,
) -> GenreProfile {
    // First-encounter order breaks ties in the top list.
    let mut counts: Vec<(i32, u32)> = Vec::new();
    let mut slots: HashMap<i32, usize> = HashMap::new();

    for movie in watched {
        let weight = if favorites.contains(&movie.id) {
            favorite_weight
        } else {
            1
        };
        for &gid in &movie.genre_ids {
            match slots.get(&gid) {
                Some(&slot) => counts[slot].1 += weight,
                None => {
                    slots.insert(gid, counts.len());
                    counts.push((gid, weight));
                }
            }
        }
    }

    let Some(max_count) = counts.iter().map(|&(_, c)| c).max() else {
        return GenreProfile::default();
    };

    let weights = counts
        .iter()
        .map(|&(gid, count)| (gid, f64::from(count) / f64::from(max_count)))
        .collect();

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    let top_genre_ids = counts
        .into_iter()
        .take(top_genres)
        .map(|(gid, _)| gid)
        .collect();

    GenreProfile {
        weights,
        top_genre_ids,
    }
}
