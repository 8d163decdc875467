use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Thing};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- list ---

#[tokio::test]
async fn list_things_is_seeded_with_total_count() {
    let resp = app().oneshot(get("/things")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-total-count"], "2");
    let things: Vec<Thing> = body_json(resp).await;
    assert_eq!(things.len(), 2);
    assert_eq!(things[0].name, "a");
}

// --- create ---

#[tokio::test]
async fn create_thing_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/things", r#"{"name":"c"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let thing: Thing = body_json(resp).await;
    assert_eq!(thing, Thing { id: 3, name: "c".to_string() });
}

#[tokio::test]
async fn create_thing_with_taken_name_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/things", r#"{"name":"a"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"error": "invalid name", "code": "validation_error"}));
}

// --- get ---

#[tokio::test]
async fn get_thing_found() {
    let resp = app().oneshot(get("/things/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"id": 1, "name": "a"}));
}

#[tokio::test]
async fn get_thing_not_found() {
    let resp = app().oneshot(get("/things/99")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["code"], "not_found");
}

// --- update ---

#[tokio::test]
async fn patch_thing_renames() {
    let resp = app()
        .oneshot(json_request("PATCH", "/things/2", r#"{"name":"z"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let thing: Thing = body_json(resp).await;
    assert_eq!(thing.name, "z");
}

#[tokio::test]
async fn update_thing_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/things/99", r#"{"name":"z"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_thing_returns_removed_thing() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/things/1")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let thing: Thing = body_json(resp).await;
    assert_eq!(thing.id, 1);
}

// --- fixtures ---

#[tokio::test]
async fn echo_describes_request() {
    let resp = app()
        .oneshot(json_request("PUT", "/echo", r#"{"k":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["method"], "PUT");
    assert_eq!(body["body"], r#"{"k":1}"#);
    assert_eq!(body["headers"]["content-type"], "application/json");
}

#[tokio::test]
async fn broken_error_is_not_json() {
    let resp = app().oneshot(get("/broken-error")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&body).is_err());
}

#[tokio::test]
async fn bare_error_has_no_error_field() {
    let resp = app().oneshot(get("/bare-error")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = body_json(resp).await;
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn large_body_exceeds_ten_mebibytes() {
    let resp = app().oneshot(get("/large")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert!(body.len() > 10 * 1024 * 1024);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value[0].as_str().unwrap().len(), mock_server::LARGE_BODY_LEN);
}

// --- lifecycle against one service ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/things", r#"{"name":"walk dog"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Thing = body_json(resp).await;
    let id = created.id;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/things"))
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-total-count"], "3");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(format!("/things/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/things/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
