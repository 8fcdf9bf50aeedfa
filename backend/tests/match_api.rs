use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use backend::{
    create_router,
    database::{MemoryStore, RouteStore},
    matching::MatchService,
    models::Route,
    provider::{ProviderError, RouteProvider},
    AppState,
};
use hyper::StatusCode;
use serde_json::json;
use shared::{GeoPoint, ItineraryResponse, MatchResponse, RouteDoc, Schedule};
use tower::ServiceExt;

/// Routing provider stub returning a canned path.
struct StubProvider {
    path: Vec<GeoPoint>,
}

impl RouteProvider for StubProvider {
    async fn shortest_path(&self, _waypoints: &[GeoPoint]) -> Result<Vec<GeoPoint>, ProviderError> {
        Ok(self.path.clone())
    }
}

fn p(lng: f64, lat: f64) -> GeoPoint {
    GeoPoint { lat, lng }
}

fn monday_schedule(time: &str) -> Schedule {
    serde_json::from_value(json!({"periodic": [{"day": 1, "time": time}]})).unwrap()
}

fn route(owner: &str, name: &str, path: Vec<GeoPoint>, schedule: Schedule) -> Route {
    Route {
        owner: owner.to_string(),
        name: name.to_string(),
        start_address: String::new(),
        end_address: String::new(),
        path,
        schedule,
        comment: None,
    }
}

async fn test_app(routes: Vec<Route>, provider_path: Vec<GeoPoint>) -> axum::Router {
    let store = Arc::new(MemoryStore::new());
    for route in &routes {
        store.save_route(route).await.expect("seed route");
    }
    let state = AppState {
        matcher: MatchService::new(Arc::clone(&store), 0.0),
        store,
        provider: Arc::new(StubProvider {
            path: provider_path,
        }),
    };
    create_router(state)
}

fn post_json(uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn match_endpoint_returns_ranked_similarities() {
    let app = test_app(
        vec![route(
            "bob",
            "river-commute",
            vec![p(0.0, 0.0), p(0.0, 1.0), p(0.0, 2.0), p(0.0, 3.0)],
            monday_schedule("08:05"),
        )],
        Vec::new(),
    )
    .await;

    let payload = json!({
        "owner": "alice",
        "route": ["[0,0]", "[0,1]", "[0,2]"],
        "planning": {"periodic": [{"day": 1, "time": "08:00"}]}
    });

    let response = app.oneshot(post_json("/api/match", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: MatchResponse = body_json(response).await;
    assert_eq!(body.similarities.len(), 1);

    let entry = &body.similarities[0];
    assert_eq!(entry.route.owner, "bob");
    assert_eq!(entry.route.name, "river-commute");
    assert_eq!(entry.similarity, 1.0);
    assert_eq!(entry.lcs, vec!["[0,0]", "[0,1]", "[0,2]"]);
}

#[tokio::test]
async fn match_endpoint_never_returns_the_requesters_own_routes() {
    let path = vec![p(0.0, 0.0), p(0.0, 1.0), p(0.0, 2.0)];
    let app = test_app(
        vec![route("alice", "mine", path, monday_schedule("08:00"))],
        Vec::new(),
    )
    .await;

    let payload = json!({
        "owner": "alice",
        "route": ["[0,0]", "[0,1]", "[0,2]"],
        "planning": {"periodic": [{"day": 1, "time": "08:00"}]}
    });

    let response = app.oneshot(post_json("/api/match", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: MatchResponse = body_json(response).await;
    assert!(body.similarities.is_empty());
}

#[tokio::test]
async fn match_endpoint_filters_schedule_incompatible_candidates() {
    let path = vec![p(0.0, 0.0), p(0.0, 1.0), p(0.0, 2.0)];
    let app = test_app(
        vec![route(
            "bob",
            "tuesday-ride",
            path,
            serde_json::from_value(json!({"periodic": [{"day": 2, "time": "08:00"}]})).unwrap(),
        )],
        Vec::new(),
    )
    .await;

    let payload = json!({
        "owner": "alice",
        "route": ["[0,0]", "[0,1]", "[0,2]"],
        "planning": {"periodic": [{"day": 1, "time": "08:00"}]}
    });

    let response = app.oneshot(post_json("/api/match", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: MatchResponse = body_json(response).await;
    assert!(body.similarities.is_empty());
}

#[tokio::test]
async fn match_endpoint_rejects_malformed_coordinates() {
    let app = test_app(Vec::new(), Vec::new()).await;

    let payload = json!({
        "owner": "alice",
        "route": ["[0,0]", "not-a-coordinate"],
        "planning": {}
    });

    let response = app.oneshot(post_json("/api/match", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn itinerary_endpoint_reanchors_dragged_points() {
    let app = test_app(
        Vec::new(),
        vec![p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0)],
    )
    .await;

    let payload = json!({
        "waypoints": ["[0,0]", "[10,10]"],
        "anchors": [{"position": "[5,9]", "index": 0}]
    });

    let response = app
        .oneshot(post_json("/api/itinerary", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ItineraryResponse = body_json(response).await;
    assert_eq!(body.path, vec!["[0,0]", "[0,10]", "[10,10]"]);
    // the dragged point keeps its position but is re-bound to the second leg
    assert_eq!(body.anchors.len(), 1);
    assert_eq!(body.anchors[0].position, "[5,9]");
    assert_eq!(body.anchors[0].index, 1);
}

#[tokio::test]
async fn route_crud_cycle() {
    let app = test_app(Vec::new(), Vec::new()).await;

    let doc = json!({
        "owner": "alice",
        "name": "commute",
        "start_address": "12 rue de la Paix",
        "end_address": "Part-Dieu",
        "route": ["[4.83,45.76]", "[4.85,45.77]"],
        "planning": {"periodic": [{"day": 1, "time": "08:00"}]}
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/routes", doc))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/api/routes/alice"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed: Vec<RouteDoc> = body_json(response).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "commute");

    let response = app
        .clone()
        .oneshot(get("/api/routes/alice/commute"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: RouteDoc = body_json(response).await;
    assert_eq!(fetched.route, vec!["[4.83,45.76]", "[4.85,45.77]"]);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/routes/alice/commute")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get("/api/routes/alice/commute")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn save_rejects_degenerate_routes() {
    let app = test_app(Vec::new(), Vec::new()).await;

    let single_point = json!({
        "owner": "alice",
        "name": "too-short",
        "route": ["[4.83,45.76]"],
        "planning": {}
    });
    let response = app
        .clone()
        .oneshot(post_json("/api/routes", single_point))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let unnamed = json!({
        "owner": "alice",
        "name": "  ",
        "route": ["[4.83,45.76]", "[4.85,45.77]"],
        "planning": {}
    });
    let response = app
        .oneshot(post_json("/api/routes", unnamed))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
