// Handlers for the route storage API endpoints
// Identity: `owner` is an opaque identifier supplied by the auth layer

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::database::{DatabaseError, RouteStore};
use crate::models::Route;
use crate::provider::RouteProvider;
use crate::AppState;
use shared::{ApiError, RouteDoc};

/// POST /api/routes - Save a route (upsert on owner + name)
pub async fn save_route<S, P>(
    State(state): State<AppState<S, P>>,
    Json(doc): Json<RouteDoc>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)>
where
    S: RouteStore + 'static,
    P: RouteProvider + 'static,
{
    if doc.name.trim().is_empty() {
        return Err(bad_request("route name must not be empty"));
    }

    let route = Route::from_doc(doc).map_err(|err| bad_request(&err.to_string()))?;
    if route.path.len() < 2 {
        return Err(bad_request("route path needs at least two points"));
    }

    state
        .store
        .save_route(&route)
        .await
        .map(|_| StatusCode::CREATED)
        .map_err(db_error_to_api_error)
}

/// GET /api/routes/:owner - List an owner's routes
pub async fn list_routes<S, P>(
    State(state): State<AppState<S, P>>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<RouteDoc>>, (StatusCode, Json<ApiError>)>
where
    S: RouteStore + 'static,
    P: RouteProvider + 'static,
{
    state
        .store
        .list_routes(&owner)
        .await
        .map(|routes| Json(routes.iter().map(Route::to_doc).collect()))
        .map_err(db_error_to_api_error)
}

/// GET /api/routes/:owner/:name - Fetch a specific route
pub async fn get_route<S, P>(
    State(state): State<AppState<S, P>>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Json<RouteDoc>, (StatusCode, Json<ApiError>)>
where
    S: RouteStore + 'static,
    P: RouteProvider + 'static,
{
    match state
        .store
        .find_route(&owner, &name)
        .await
        .map_err(db_error_to_api_error)?
    {
        Some(route) => Ok(Json(route.to_doc())),
        None => Err(db_error_to_api_error(DatabaseError::NotFound {
            owner,
            name,
        })),
    }
}

/// DELETE /api/routes/:owner/:name - Delete a route
pub async fn delete_route<S, P>(
    State(state): State<AppState<S, P>>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)>
where
    S: RouteStore + 'static,
    P: RouteProvider + 'static,
{
    state
        .store
        .delete_route(&owner, &name)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(db_error_to_api_error)
}

fn bad_request(message: &str) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            message: message.to_string(),
        }),
    )
}

/// Convert DatabaseError to an API error response
pub(crate) fn db_error_to_api_error(err: DatabaseError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        DatabaseError::NotFound { .. } => StatusCode::NOT_FOUND,
        DatabaseError::InvalidData(_) => StatusCode::BAD_REQUEST,
        DatabaseError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DatabaseError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
