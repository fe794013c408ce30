//! "If you like this actor/director" lookups: follow TMDB recommendations out
//! of a person's own movies and count who keeps showing up in their credits.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::config::SimilarPeopleConfig;
use crate::recommend::EngineFailure;
use crate::tmdb::{image_url, Credits, MovieListKind, PersonCredits, TmdbApi};

const PROFILE_SIZE: &str = "w185";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonRole {
    Actor,
    Director,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarPerson {
    pub id: i32,
    pub name: String,
    pub profile_path: Option<String>,
    pub profile_url: Option<String>,
    /// Distinct recommended movies this person was credited on.
    pub movie_count: usize,
}

struct Sighting {
    id: i32,
    name: String,
    profile_path: Option<String>,
}

#[derive(Default)]
struct PeoplePool {
    slots: HashMap<i32, usize>,
    entries: Vec<(Sighting, HashSet<i32>)>,
}

impl PeoplePool {
    fn record(&mut self, person: Sighting, movie_id: i32) {
        match self.slots.get(&person.id) {
            Some(&slot) => {
                self.entries[slot].1.insert(movie_id);
            }
            None => {
                self.slots.insert(person.id, self.entries.len());
                self.entries.push((person, HashSet::from([movie_id])));
            }
        }
    }

    fn ranked(self, max_results: usize) -> Vec<SimilarPerson> {
        let mut people: Vec<SimilarPerson> = self
            .entries
            .into_iter()
            .map(|(person, movies)| SimilarPerson {
                id: person.id,
                name: person.name,
                profile_url: image_url(person.profile_path.as_deref(), PROFILE_SIZE),
                profile_path: person.profile_path,
                movie_count: movies.len(),
            })
            .collect();
        people.sort_by(|a, b| b.movie_count.cmp(&a.movie_count));
        people.truncate(max_results);
        people
    }
}

/// The person's own movies to start from, best rated first.
///
/// Cast credits are deduplicated by movie; directing credits are taken as listed.
pub fn seed_movie_ids(role: PersonRole, credits: &PersonCredits, limit: usize) -> Vec<i32> {
    let mut movies: Vec<_> = match role {
        PersonRole::Actor => {
            let mut seen = HashSet::new();
            credits.cast.iter().filter(|m| seen.insert(m.id)).collect()
        }
        PersonRole::Director => credits
            .crew
            .iter()
            .filter(|c| c.job.as_deref() == Some("Director"))
            .collect(),
    };
    movies.sort_by(|a, b| b.vote_average.total_cmp(&a.vote_average));
    movies.into_iter().take(limit).map(|m| m.id).collect()
}

fn people_in(role: PersonRole, credits: Credits, top_billing: u32) -> Vec<Sighting> {
    match role {
        PersonRole::Actor => credits
            .cast
            .into_iter()
            .filter(|c| c.order < top_billing)
            .map(|c| Sighting {
                id: c.id,
                name: c.name,
                profile_path: c.profile_path,
            })
            .collect(),
        PersonRole::Director => credits
            .crew
            .into_iter()
            .filter(|c| c.is_director())
            .map(|c| Sighting {
                id: c.id,
                name: c.name,
                profile_path: c.profile_path,
            })
            .collect(),
    }
}

pub async fn find_similar_people(
    api: &dyn TmdbApi,
    person_id: i32,
    role: PersonRole,
    seed_movies: &[i32],
    config: &SimilarPeopleConfig,
) -> Result<Vec<SimilarPerson>, EngineFailure> {
    config.validate()?;
    let mut pool = PeoplePool::default();

    for batch in seed_movies.chunks(config.batch_size) {
        let pages = join_all(
            batch
                .iter()
                .map(|&id| api.fetch_movie_list(id, MovieListKind::Recommendations)),
        )
        .await;

        let mut recommended: Vec<i32> = Vec::new();
        for page in pages {
            match page {
                Ok(page) => recommended.extend(
                    page.results
                        .iter()
                        .take(config.per_movie_slice)
                        .map(|m| m.id),
                ),
                Err(err) => debug!("Skipping failed recommendations fetch: {}", err),
            }
        }
        recommended.truncate(config.credits_per_batch);

        let credits = join_all(
            recommended
                .iter()
                .map(|&movie_id| async move { (movie_id, api.fetch_credits(movie_id).await) }),
        )
        .await;

        for (movie_id, outcome) in credits {
            let credits = match outcome {
                Ok(c) => c,
                Err(err) => {
                    debug!(movie_id, "Skipping failed credits fetch: {}", err);
                    continue;
                }
            };
            for person in people_in(role, credits, config.top_billing) {
                if person.id != person_id {
                    pool.record(person, movie_id);
                }
            }
        }
    }

    let people = pool.ranked(config.max_results);
    info!(
        person_id,
        "Found {} similar {:?}s from {} seed movies",
        people.len(),
        role,
        seed_movies.len()
    );
    Ok(people)
}
