mod common;

use axum::{
    http::StatusCode,
    routing::{get as get_route, post},
    Router,
};
use common::{get, json_request, roadwork, send, MemoryOrm};
use roadwork::{common_routes, BaseModel, Orm, Roadwork};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn widgets(orm: &Arc<MemoryOrm>) -> Roadwork {
    let mut api = roadwork(orm);
    api.generate(&BaseModel::new("widget"), None).unwrap();
    api
}

async fn seed(api: &Roadwork, names: &[&str]) {
    for name in names {
        let (status, _) = send(api.router(), json_request("POST", "/widgets", json!({ "name": name }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn create_then_read() {
    let orm = MemoryOrm::new();
    let api = widgets(&orm);

    let (status, body) = send(api.router(), json_request("POST", "/widgets", json!({ "name": "bolt" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "bolt");
    let id = body["data"]["id"].clone();

    let (status, body) = send(api.router(), get(&format!("/widgets/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "bolt");
    assert_eq!(orm.rows("widget").len(), 1);
}

#[tokio::test]
async fn find_all_and_count() {
    let orm = MemoryOrm::new();
    let api = widgets(&orm);
    seed(&api, &["bolt", "nut"]).await;

    let (status, body) = send(api.router(), get("/widgets")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["count"], 2);

    let (status, body) = send(api.router(), get("/widgets/count")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": { "count": 2 } }));
}

#[tokio::test]
async fn pagination_reports_totals() {
    let orm = MemoryOrm::new();
    let api = widgets(&orm);
    seed(&api, &["a", "b", "c", "d", "e"]).await;

    let (status, body) = send(api.router(), get("/widgets/pagination/2?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["c", "d"]);
    assert_eq!(
        body["meta"]["pagination"],
        json!({ "offset": 2, "limit": 2, "rowCount": 5, "pageCount": 3 })
    );
}

#[tokio::test]
async fn pagination_uses_the_default_limit() {
    let orm = MemoryOrm::new();
    let api = widgets(&orm);
    seed(&api, &["a"]).await;

    let (status, body) = send(api.router(), get("/widgets/pagination/0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["pagination"]["limit"], 100);
}

#[tokio::test]
async fn pagination_rejects_bad_offsets() {
    let orm = MemoryOrm::new();
    let api = widgets(&orm);

    let (status, body) = send(api.router(), get("/widgets/pagination/first")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn pagination_rejects_offsets_beyond_bigint() {
    let orm = MemoryOrm::new();
    let api = widgets(&orm);

    let (status, body) = send(api.router(), get("/widgets/pagination/18446744073709551615")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn pagination_clamps_the_limit() {
    let orm = MemoryOrm::new();
    let api = widgets(&orm);
    seed(&api, &["a", "b"]).await;

    let (status, body) = send(api.router(), get("/widgets/pagination/0?limit=5000")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["pagination"]["limit"], 1000);
    assert_eq!(body["meta"]["pagination"]["pageCount"], 1);

    let (status, body) = send(api.router(), get("/widgets/pagination/0?limit=0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["pagination"]["limit"], 1);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["meta"]["pagination"]["pageCount"], 2);

    let (status, _) = send(api.router(), get("/widgets/pagination/0?limit=many")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_and_delete() {
    let orm = MemoryOrm::new();
    let api = widgets(&orm);
    seed(&api, &["bolt"]).await;

    let (status, body) = send(api.router(), json_request("PUT", "/widgets/1", json!({ "name": "screw" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "id": 1, "name": "screw" }));

    let (status, _) = send(api.router(), json_request("DELETE", "/widgets/1", json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(api.router(), get("/widgets/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let orm = MemoryOrm::new();
    let api = widgets(&orm);

    let (status, _) = send(api.router(), json_request("PUT", "/widgets/42", json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(api.router(), json_request("DELETE", "/widgets/42", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_requires_a_json_object() {
    let orm = MemoryOrm::new();
    let api = widgets(&orm);

    let (status, body) = send(api.router(), json_request("POST", "/widgets", json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "bad request: body must be a JSON object");
    assert!(orm.rows("widget").is_empty());
}

#[tokio::test]
async fn update_requires_a_json_object() {
    let orm = MemoryOrm::new();
    let api = widgets(&orm);
    seed(&api, &["bolt"]).await;

    let (status, body) = send(api.router(), json_request("PUT", "/widgets/1", json!("screw"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "bad request: body must be a JSON object");
    assert_eq!(orm.rows("widget")[0]["name"], "bolt");
}

#[tokio::test]
async fn disabled_route_is_not_served() {
    let orm = MemoryOrm::new();
    let mut api = roadwork(&orm);
    api.generate(
        &BaseModel::new("widget"),
        Some(&json!({ "routes": { "delete": { "isEnabled": false } } })),
    )
    .unwrap();

    let (status, _) = send(api.router(), json_request("DELETE", "/widgets/1", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn application_routes_are_served_behind_generated_ones() {
    let orm = MemoryOrm::new();
    let server = Router::new()
        .route("/widgets", get_route(|| async { "application list" }).delete(|| async { "purged" }))
        .route("/gadgets", post(|| async { StatusCode::ACCEPTED }));
    let mut api = Roadwork::builder()
        .server(server)
        .connection(orm.clone())
        .build()
        .unwrap();
    api.generate(&BaseModel::new("widget"), None).unwrap();
    assert_eq!(api.server().routes().len(), 7);

    let (status, body) = send(api.router(), get("/widgets")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 0);

    let (status, _) = send(api.router(), json_request("POST", "/gadgets", json!({}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = send(api.router(), json_request("DELETE", "/widgets", json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(api.router(), get("/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn readiness_follows_the_connection() {
    let orm = MemoryOrm::new();
    let connection: Arc<dyn Orm> = orm.clone();

    let (status, body) = send(common_routes(connection.clone()), get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    orm.fail_ping.store(true, Ordering::SeqCst);
    let (status, body) = send(common_routes(connection), get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
}
