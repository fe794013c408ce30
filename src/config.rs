use anyhow::{Context, Result};
use std::env;

use crate::recommend::EngineFailure;
use crate::tmdb::TMDB_BASE;

const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_PORT: u16 = 3146;

/// Process-level settings read from the environment (.env supported by the binaries).
#[derive(Debug, Clone)]
pub struct Settings {
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub tmdb_language: String,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let tmdb_api_key = env::var("TMDB_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .context("TMDB_API_KEY not set")?;
        let tmdb_base_url = non_empty_var("TMDB_BASE_URL").unwrap_or_else(|| TMDB_BASE.to_string());
        let tmdb_language =
            non_empty_var("TMDB_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let port = match non_empty_var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };
        Ok(Self {
            tmdb_api_key,
            tmdb_base_url,
            tmdb_language,
            port,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Tuning for the watched-list recommendation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendConfig {
    /// Watched movies fetched per wave; each costs two requests.
    pub batch_size: usize,
    pub max_results: usize,
    /// How much a favorite counts relative to a plain watched movie.
    pub favorite_weight: u32,
    pub top_genres: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            max_results: 20,
            favorite_weight: 2,
            top_genres: 5,
        }
    }
}

impl RecommendConfig {
    pub fn validate(&self) -> Result<(), EngineFailure> {
        if self.batch_size == 0 {
            return Err(EngineFailure::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(EngineFailure::InvalidConfig(
                "max_results must be at least 1".to_string(),
            ));
        }
        if self.favorite_weight == 0 {
            return Err(EngineFailure::InvalidConfig(
                "favorite_weight must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tuning for the actor/director "similar people" finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarPeopleConfig {
    pub batch_size: usize,
    /// Recommended movies kept from each seed's page.
    pub per_movie_slice: usize,
    /// Credit lookups issued per batch.
    pub credits_per_batch: usize,
    /// Cast members with a billing order below this are considered.
    pub top_billing: u32,
    pub seed_movies: usize,
    pub max_results: usize,
}

impl Default for SimilarPeopleConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            per_movie_slice: 5,
            credits_per_batch: 10,
            top_billing: 5,
            seed_movies: 10,
            max_results: 6,
        }
    }
}

impl SimilarPeopleConfig {
    pub fn validate(&self) -> Result<(), EngineFailure> {
        if self.batch_size == 0 {
            return Err(EngineFailure::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(EngineFailure::InvalidConfig(
                "max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RecommendConfig::default().validate().is_ok());
        assert!(SimilarPeopleConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_batch_and_zero_favorite_weight() {
        let zero_batch = RecommendConfig {
            batch_size: 0,
            ..RecommendConfig::default()
        };
        assert!(matches!(
            zero_batch.validate(),
            Err(EngineFailure::InvalidConfig(_))
        ));

        let zero_weight = RecommendConfig {
            favorite_weight: 0,
            ..RecommendConfig::default()
        };
        assert!(zero_weight.validate().is_err());

        let zero_people = SimilarPeopleConfig {
            max_results: 0,
            ..SimilarPeopleConfig::default()
        };
        assert!(zero_people.validate().is_err());
    }
}
