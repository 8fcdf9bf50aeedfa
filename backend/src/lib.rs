pub mod coord;
pub mod database;
pub mod error;
pub mod matching;
pub mod models;
pub mod projection;
pub mod provider;
pub mod route_handlers;
pub mod schedule;
pub mod similarity;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::database::{DatabaseError, RouteStore};
use crate::error::MatchError;
use crate::matching::MatchService;
use crate::models::{MatchResult, Route};
use crate::projection::IntermediatePoint;
use crate::provider::RouteProvider;
use shared::{
    AnchorDoc, ApiError, ItineraryRequest, ItineraryResponse, MatchRequest, MatchResponse,
};

pub struct AppState<S, P> {
    pub store: Arc<S>,
    pub provider: Arc<P>,
    pub matcher: MatchService<S>,
}

impl<S, P> Clone for AppState<S, P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            provider: Arc::clone(&self.provider),
            matcher: self.matcher.clone(),
        }
    }
}

pub fn create_router<S, P>(state: AppState<S, P>) -> Router
where
    S: RouteStore + 'static,
    P: RouteProvider + 'static,
{
    Router::new()
        .route("/api/match", post(match_handler::<S, P>))
        .route("/api/itinerary", post(itinerary_handler::<S, P>))
        .route("/api/routes", post(route_handlers::save_route::<S, P>))
        .route("/api/routes/:owner", get(route_handlers::list_routes::<S, P>))
        .route(
            "/api/routes/:owner/:name",
            get(route_handlers::get_route::<S, P>).delete(route_handlers::delete_route::<S, P>),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// POST /api/match - Rank other users' routes against the submitted one
async fn match_handler<S, P>(
    State(state): State<AppState<S, P>>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, (StatusCode, Json<ApiError>)>
where
    S: RouteStore + 'static,
    P: RouteProvider + 'static,
{
    let path = coord::decode_path(&req.route)
        .map_err(|err| match_error_response(err.into()))?;

    let requester = Route {
        owner: req.owner,
        name: req.name,
        start_address: String::new(),
        end_address: String::new(),
        path,
        schedule: req.planning,
        comment: None,
    };

    let matches = state
        .matcher
        .find_matches(&requester)
        .await
        .map_err(match_error_response)?;

    Ok(Json(MatchResponse {
        similarities: matches.into_iter().map(MatchResult::into_entry).collect(),
    }))
}

/// POST /api/itinerary - Compute the cycling path for ordered waypoints and
/// re-anchor the manually-dragged intermediate points against it
async fn itinerary_handler<S, P>(
    State(state): State<AppState<S, P>>,
    Json(req): Json<ItineraryRequest>,
) -> Result<Json<ItineraryResponse>, (StatusCode, Json<ApiError>)>
where
    S: RouteStore + 'static,
    P: RouteProvider + 'static,
{
    let waypoints = coord::decode_path(&req.waypoints)
        .map_err(|err| match_error_response(err.into()))?;

    let dragged = req
        .anchors
        .iter()
        .map(|anchor| {
            coord::decode(&anchor.position).map(|position| IntermediatePoint {
                position,
                index: anchor.index,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| match_error_response(err.into()))?;

    let path = state
        .provider
        .shortest_path(&waypoints)
        .await
        .map_err(|err| match_error_response(err.into()))?;

    let anchors = projection::reanchor(&path, &dragged)
        .map_err(|err| match_error_response(err.into()))?;

    Ok(Json(ItineraryResponse {
        path: coord::encode_path(&path),
        anchors: anchors
            .into_iter()
            .map(|anchor| AnchorDoc {
                position: coord::encode(anchor.position),
                index: anchor.index,
            })
            .collect(),
    }))
}

fn match_error_response(err: MatchError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        MatchError::Coordinate(_) => StatusCode::BAD_REQUEST,
        MatchError::Projection(_) | MatchError::Similarity(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MatchError::Storage(DatabaseError::Connection(_)) => StatusCode::SERVICE_UNAVAILABLE,
        MatchError::Storage(DatabaseError::NotFound { .. }) => StatusCode::NOT_FOUND,
        MatchError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        MatchError::Provider(_) => StatusCode::BAD_GATEWAY,
    };

    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
