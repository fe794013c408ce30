#![allow(dead_code)]

use async_trait::async_trait;
use cinerec::tmdb::{
    CastMember, Credits, CrewMember, FetchFailure, MovieListKind, MovieListPage, MovieSummary,
    PersonCredits, PersonMovieCredit, TmdbApi,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory TMDB. Anything not registered answers with a 404 failure.
#[derive(Default)]
pub struct FakeTmdb {
    pub lists: HashMap<(i32, MovieListKind), Vec<MovieSummary>>,
    pub credits: HashMap<i32, Credits>,
    pub person_credits: HashMap<i32, PersonCredits>,
    pub calls: Mutex<Vec<(i32, MovieListKind)>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeTmdb {
    pub fn with_list(mut self, movie_id: i32, kind: MovieListKind, movies: Vec<MovieSummary>) -> Self {
        self.lists.insert((movie_id, kind), movies);
        self
    }

    pub fn with_credits(mut self, movie_id: i32, credits: Credits) -> Self {
        self.credits.insert(movie_id, credits);
        self
    }

    pub fn with_person(mut self, person_id: i32, credits: PersonCredits) -> Self {
        self.person_credits.insert(person_id, credits);
        self
    }

    pub fn list_calls(&self) -> Vec<(i32, MovieListKind)> {
        self.calls.lock().unwrap().clone()
    }
}

fn not_found(path: String) -> FetchFailure {
    FetchFailure::Status {
        path,
        status: reqwest::StatusCode::NOT_FOUND,
        body: r#"{"status_code":34}"#.to_string(),
    }
}

#[async_trait]
impl TmdbApi for FakeTmdb {
    async fn fetch_movie_list(
        &self,
        movie_id: i32,
        kind: MovieListKind,
    ) -> Result<MovieListPage, FetchFailure> {
        self.calls.lock().unwrap().push((movie_id, kind));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        // Let sibling requests start before this one settles.
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.lists.get(&(movie_id, kind)) {
            Some(results) => Ok(MovieListPage {
                page: 1,
                results: results.clone(),
                total_pages: 1,
                total_results: results.len() as u32,
            }),
            None => Err(not_found(format!("/movie/{movie_id}/{kind:?}"))),
        }
    }

    async fn fetch_credits(&self, movie_id: i32) -> Result<Credits, FetchFailure> {
        self.credits
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| not_found(format!("/movie/{movie_id}/credits")))
    }

    async fn fetch_person_credits(&self, person_id: i32) -> Result<PersonCredits, FetchFailure> {
        self.person_credits
            .get(&person_id)
            .cloned()
            .ok_or_else(|| not_found(format!("/person/{person_id}/movie_credits")))
    }
}

pub fn movie(id: i32, genre_ids: &[i32], vote_average: f64, popularity: f64) -> MovieSummary {
    MovieSummary {
        id,
        title: format!("Movie {id}"),
        original_title: format!("Movie {id}"),
        overview: String::new(),
        poster_path: Some(format!("/poster-{id}.jpg")),
        backdrop_path: None,
        release_date: Some("2020-01-01".to_string()),
        vote_average,
        vote_count: 100,
        popularity,
        genre_ids: genre_ids.to_vec(),
        adult: false,
        original_language: "en".to_string(),
    }
}

pub fn cast(id: i32, name: &str, order: u32) -> CastMember {
    CastMember {
        id,
        name: name.to_string(),
        character: None,
        profile_path: Some(format!("/profile-{id}.jpg")),
        order,
    }
}

pub fn director(id: i32, name: &str) -> CrewMember {
    CrewMember {
        id,
        name: name.to_string(),
        job: Some("Director".to_string()),
        department: Some("Directing".to_string()),
        profile_path: None,
    }
}

pub fn person_movie(id: i32, vote_average: f64, job: Option<&str>) -> PersonMovieCredit {
    PersonMovieCredit {
        id,
        title: format!("Movie {id}"),
        vote_average,
        job: job.map(str::to_string),
    }
}
