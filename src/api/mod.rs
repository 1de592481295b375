use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    ExplorerError, VERSION,
    aggregator::generate_location_details,
    config::DefaultsConfig,
    controller::{SearchController, SearchState},
    error::ErrorCode,
    generation::GenerationClient,
    models::LocationData,
};

/// Shared handles for the API handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SearchController>,
    pub client: Arc<dyn GenerationClient>,
    pub defaults: DefaultsConfig,
}

impl AppState {
    pub fn new(client: Arc<dyn GenerationClient>, defaults: DefaultsConfig) -> Self {
        Self {
            controller: Arc::new(SearchController::new(client.clone())),
            client,
            defaults,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefaults {
    pub initial_query: String,
}

#[derive(Debug, Serialize)]
pub struct ApiHealth {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl IntoResponse for ExplorerError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = match code {
            ErrorCode::EmptyQuery => StatusCode::BAD_REQUEST,
            ErrorCode::Config => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::MalformedResponse
            | ErrorCode::GenerationEmpty
            | ErrorCode::TransportFailure => StatusCode::BAD_GATEWAY,
        };
        let body = ApiError {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", get(get_search).post(submit_search))
        .route("/location-details", post(location_details))
        .route("/defaults", get(get_defaults))
        .route("/health", get(health))
        .with_state(state)
}

async fn get_search(State(state): State<AppState>) -> Json<SearchState> {
    Json(state.controller.state())
}

async fn submit_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchState> {
    Json(state.controller.submit(&request.query).await)
}

async fn location_details(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<LocationData>, ExplorerError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ExplorerError::EmptyQuery);
    }
    let data = generate_location_details(Arc::clone(&state.client), query).await?;
    Ok(Json(data))
}

async fn get_defaults(State(state): State<AppState>) -> Json<ApiDefaults> {
    Json(ApiDefaults {
        initial_query: state.defaults.initial_query.clone(),
    })
}

async fn health() -> Json<ApiHealth> {
    Json(ApiHealth {
        status: "ok",
        version: VERSION,
    })
}
