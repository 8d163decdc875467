use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thing {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct ThingInput {
    #[serde(default)]
    pub name: Option<String>,
}

pub type Db = Arc<RwLock<BTreeMap<u64, Thing>>>;

fn seeded() -> Db {
    let things = [(1, "a"), (2, "b")]
        .into_iter()
        .map(|(id, name)| {
            (
                id,
                Thing {
                    id,
                    name: name.to_string(),
                },
            )
        })
        .collect();
    Arc::new(RwLock::new(things))
}

pub fn app() -> Router {
    Router::new()
        .route("/things", get(list_things).post(create_thing))
        .route(
            "/things/{id}",
            get(get_thing)
                .put(update_thing)
                .patch(update_thing)
                .delete(delete_thing),
        )
        .route("/echo", any(echo))
        .route("/broken", get(broken))
        .route("/broken-error", get(broken_error))
        .route("/bare-error", get(bare_error))
        .route("/scalar", get(scalar))
        .route("/large", get(large))
        .with_state(seeded())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn api_error(status: StatusCode, error: &str, code: &str) -> Response {
    (status, Json(json!({ "error": error, "code": code }))).into_response()
}

fn invalid_name() -> Response {
    api_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid name", "validation_error")
}

fn not_found() -> Response {
    api_error(StatusCode::NOT_FOUND, "thing not found", "not_found")
}

/// Body must be a JSON object with a non-empty `name` not already taken.
fn validated_name(body: &Bytes, things: &BTreeMap<u64, Thing>, id: Option<u64>) -> Option<String> {
    let input: ThingInput = serde_json::from_slice(body).ok()?;
    let name = input.name.filter(|n| !n.is_empty())?;
    let taken = things
        .values()
        .any(|t| t.name == name && Some(t.id) != id);
    (!taken).then_some(name)
}

async fn list_things(State(db): State<Db>) -> Response {
    let things: Vec<Thing> = db.read().await.values().cloned().collect();
    let count = things.len().to_string();
    ([("x-total-count", count)], Json(things)).into_response()
}

async fn create_thing(State(db): State<Db>, body: Bytes) -> Response {
    let mut things = db.write().await;
    let Some(name) = validated_name(&body, &things, None) else {
        return invalid_name();
    };
    let id = things.keys().next_back().copied().unwrap_or(0) + 1;
    let thing = Thing { id, name };
    things.insert(id, thing.clone());
    (StatusCode::CREATED, Json(thing)).into_response()
}

async fn get_thing(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    match db.read().await.get(&id) {
        Some(thing) => Json(thing.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_thing(State(db): State<Db>, Path(id): Path<u64>, body: Bytes) -> Response {
    let mut things = db.write().await;
    if !things.contains_key(&id) {
        return not_found();
    }
    let Some(name) = validated_name(&body, &things, Some(id)) else {
        return invalid_name();
    };
    let thing = Thing { id, name };
    things.insert(id, thing.clone());
    Json(thing).into_response()
}

async fn delete_thing(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    match db.write().await.remove(&id) {
        Some(thing) => Json(thing).into_response(),
        None => not_found(),
    }
}

/// Describe the request back to the caller.
async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
        .collect();
    Json(json!({
        "method": method.as_str(),
        "body": String::from_utf8_lossy(&body),
        "headers": headers,
    }))
}

async fn broken() -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], "not json").into_response()
}

async fn broken_error() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/html")],
        "<html>bad gateway</html>",
    )
        .into_response()
}

async fn bare_error() -> Response {
    (StatusCode::CONFLICT, Json(json!({ "detail": "already locked" }))).into_response()
}

async fn scalar() -> Json<Value> {
    Json(json!(42))
}

/// Size of the single string element served by `/large`.
pub const LARGE_BODY_LEN: usize = 11 * 1024 * 1024;

/// A JSON array larger than common client-side body limits.
async fn large() -> Json<Value> {
    Json(json!(["a".repeat(LARGE_BODY_LEN)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> BTreeMap<u64, Thing> {
        [(1, "a"), (2, "b")]
            .into_iter()
            .map(|(id, name)| (id, Thing { id, name: name.to_string() }))
            .collect()
    }

    #[test]
    fn thing_serializes_to_json() {
        let thing = Thing {
            id: 7,
            name: "Test".to_string(),
        };
        let json = serde_json::to_value(&thing).unwrap();
        assert_eq!(json, json!({"id": 7, "name": "Test"}));
    }

    #[test]
    fn new_name_is_accepted() {
        let body = Bytes::from_static(br#"{"name":"c"}"#);
        assert_eq!(validated_name(&body, &store(), None).as_deref(), Some("c"));
    }

    #[test]
    fn taken_name_is_rejected() {
        let body = Bytes::from_static(br#"{"name":"a"}"#);
        assert!(validated_name(&body, &store(), None).is_none());
    }

    #[test]
    fn renaming_to_own_name_is_allowed() {
        let body = Bytes::from_static(br#"{"name":"a"}"#);
        assert_eq!(validated_name(&body, &store(), Some(1)).as_deref(), Some("a"));
    }

    #[test]
    fn missing_or_empty_name_is_rejected() {
        for raw in [&br#"{}"#[..], &br#"{"name":""}"#[..], &b"not json"[..]] {
            let body = Bytes::copy_from_slice(raw);
            assert!(validated_name(&body, &store(), None).is_none());
        }
    }
}
