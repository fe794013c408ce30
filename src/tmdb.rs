use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::Settings;

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Failure of a single gateway request. Callers drop these per request; a
/// failed fetch never aborts its siblings.
#[derive(Debug, thiserror::Error)]
pub enum FetchFailure {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} -> {status}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },
    #[error("malformed body from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovieListKind {
    Recommendations,
    Similar,
}

impl MovieListKind {
    fn segment(&self) -> &'static str {
        match self {
            MovieListKind::Recommendations => "recommendations",
            MovieListKind::Similar => "similar",
        }
    }
}

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn fetch_movie_list(
        &self,
        movie_id: i32,
        kind: MovieListKind,
    ) -> Result<MovieListPage, FetchFailure>;
    async fn fetch_credits(&self, movie_id: i32) -> Result<Credits, FetchFailure>;
    async fn fetch_person_credits(&self, person_id: i32) -> Result<PersonCredits, FetchFailure>;
}

/// A movie as it appears in TMDB list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub original_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieListPage {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastMember {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    pub profile_path: Option<String>,
    /// Billing position, 0 is top billed.
    #[serde(default = "unbilled")]
    pub order: u32,
}

fn unbilled() -> u32 {
    u32::MAX
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrewMember {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    pub profile_path: Option<String>,
}

impl CrewMember {
    pub fn is_director(&self) -> bool {
        self.job.as_deref() == Some("Director")
    }
}

/// `/person/{id}/movie_credits`: the movies a person acted in or crewed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonCredits {
    #[serde(default)]
    pub cast: Vec<PersonMovieCredit>,
    #[serde(default)]
    pub crew: Vec<PersonMovieCredit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonMovieCredit {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub job: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl TmdbClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        language: impl Into<String>,
    ) -> anyhow::Result<Self> {
        use anyhow::Context;

        let user_agent = format!("cinerec/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(
            settings.tmdb_api_key.clone(),
            settings.tmdb_base_url.clone(),
            settings.tmdb_language.clone(),
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchFailure> {
        let url = format!("{}{path}", self.base_url);
        debug!(%path, "TMDB request");
        let res = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(|source| FetchFailure::Transport {
                path: path.to_string(),
                source,
            })?;
        let status = res.status();
        let text = res.text().await.map_err(|source| FetchFailure::Transport {
            path: path.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(FetchFailure::Status {
                path: path.to_string(),
                status,
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|source| FetchFailure::Decode {
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn fetch_movie_list(
        &self,
        movie_id: i32,
        kind: MovieListKind,
    ) -> Result<MovieListPage, FetchFailure> {
        self.get_json(&format!("/movie/{movie_id}/{}", kind.segment()))
            .await
    }

    async fn fetch_credits(&self, movie_id: i32) -> Result<Credits, FetchFailure> {
        self.get_json(&format!("/movie/{movie_id}/credits")).await
    }

    async fn fetch_person_credits(&self, person_id: i32) -> Result<PersonCredits, FetchFailure> {
        self.get_json(&format!("/person/{person_id}/movie_credits"))
            .await
    }
}

/// Poster/profile URL for a TMDB image path at one of the CDN sizes (`w185`, `w500`, `original`, ...).
pub fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    path.map(|p| format!("{IMAGE_BASE}/{size}{p}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_item_tolerates_missing_optional_fields() {
        let raw = r#"{"page":1,"results":[{"id":7,"title":"Seven","poster_path":null,"backdrop_path":null}]}"#;
        let page: MovieListPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.results.len(), 1);
        let movie = &page.results[0];
        assert_eq!(movie.id, 7);
        assert!(movie.genre_ids.is_empty());
        assert_eq!(movie.popularity, 0.0);
    }

    #[test]
    fn credits_default_unbilled_cast_to_the_back() {
        let raw = r#"{"cast":[{"id":1,"name":"A","profile_path":null}],"crew":[{"id":2,"name":"B","job":"Director","profile_path":null}]}"#;
        let credits: Credits = serde_json::from_str(raw).unwrap();
        assert_eq!(credits.cast[0].order, u32::MAX);
        assert!(credits.crew[0].is_director());
    }

    #[test]
    fn image_urls_join_size_and_path() {
        assert_eq!(
            image_url(Some("/abc.jpg"), "w500").as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(image_url(None, "w185"), None);
    }
}
