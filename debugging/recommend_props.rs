//! Run the recommendation engine against live TMDB and print the ranked list.
//! Usage:
//!   cargo run --bin recommend_props -- <watched.json>
//! The file holds `[{"id": 603, "genreIds": [28, 878], "isFavorite": true}, ...]`.
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use cinerec::config::{RecommendConfig, Settings};
use cinerec::recommend::{self, RecommendationProgress, WatchedEntry};
use cinerec::tmdb::TmdbClient;
use dotenvy::dotenv;
use std::env;
use std::fs;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present for local runs.
    dotenv().ok();

    let path = env::args()
        .nth(1)
        .context("Usage: recommend_props <watched.json>")?;
    let raw = fs::read_to_string(&path).with_context(|| format!("Failed to read {path}"))?;
    let watched: Vec<WatchedEntry> =
        serde_json::from_str(&raw).context("Watched list is not valid JSON")?;

    let settings = Settings::from_env()?;
    let client = TmdbClient::from_settings(&settings)?;
    let favorites = recommend::favorite_ids(&watched);

    let print_progress = |p: RecommendationProgress| {
        eprintln!("[{:?}] {}/{}", p.phase, p.current, p.total);
    };
    let result = recommend::generate_recommendations(
        &client,
        &watched,
        &favorites,
        &RecommendConfig::default(),
        &print_progress,
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
