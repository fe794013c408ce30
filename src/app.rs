use crate::config::{RecommendConfig, Settings, SimilarPeopleConfig};
use crate::people::{self, PersonRole, SimilarPerson};
use crate::recommend::{self, EngineFailure, Recommendations, TracingProgress, WatchedEntry};
use crate::tmdb::{FetchFailure, TmdbApi, TmdbClient};
use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};

const MAX_BODY_BYTES: usize = 1024 * 1024; // 1MB safety cap

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
    pub recommend: RecommendConfig,
    pub people: SimilarPeopleConfig,
}

impl AppState {
    pub fn new(tmdb: Arc<dyn TmdbApi>) -> Self {
        Self {
            tmdb,
            recommend: RecommendConfig::default(),
            people: SimilarPeopleConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub watched: Vec<WatchedEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub role: PersonRole,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Engine(EngineFailure),
    Upstream(FetchFailure),
}

impl From<EngineFailure> for ApiError {
    fn from(err: EngineFailure) -> Self {
        ApiError::Engine(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Engine(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            ApiError::Upstream(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub async fn run_server(settings: Settings) -> Result<()> {
    let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::from_settings(&settings)?);
    info!(
        "Using TMDB at {} (language {})",
        settings.tmdb_base_url, settings.tmdb_language
    );

    let app = build_router(AppState::new(tmdb));

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/recommendations", post(recommendations))
        .route("/people/:id/similar", get(similar_people))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn recommendations(
    State(state): State<AppState>,
    body: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<Recommendations>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        warn!("Rejected recommendation request: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;
    let favorites = recommend::favorite_ids(&request.watched);
    info!(
        "Recommendation run for {} watched movies ({} favorites)",
        request.watched.len(),
        favorites.len()
    );
    let result = recommend::generate_recommendations(
        state.tmdb.as_ref(),
        &request.watched,
        &favorites,
        &state.recommend,
        &TracingProgress,
    )
    .await
    .map_err(|err| {
        error!("Recommendation run failed: {}", err);
        ApiError::from(err)
    })?;
    Ok(Json(result))
}

async fn similar_people(
    State(state): State<AppState>,
    Path(person_id): Path<i32>,
    Query(query): Query<SimilarQuery>,
) -> Result<Json<Vec<SimilarPerson>>, ApiError> {
    let credits = state
        .tmdb
        .fetch_person_credits(person_id)
        .await
        .map_err(|err| {
            warn!(person_id, "Failed to fetch person credits: {}", err);
            ApiError::Upstream(err)
        })?;
    let seeds = people::seed_movie_ids(query.role, &credits, state.people.seed_movies);
    let found = people::find_similar_people(
        state.tmdb.as_ref(),
        person_id,
        query.role,
        &seeds,
        &state.people,
    )
    .await?;
    Ok(Json(found))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
