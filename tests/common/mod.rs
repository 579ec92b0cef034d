//! In-process fake of the identity, object storage and webhook endpoints.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, put};
use axum::{Json, Router};
use ofs_client::Credentials;
use serde_json::{json, Value};

pub const USERNAME: &str = "gncu12345678";
pub const PASSWORD: &str = "correct horse";
pub const TENANT_ID: &str = "0123456789abcdef";
pub const TOKEN: &str = "gAAAAABm-test-token";
/// Username for which the identity endpoint answers 200 without a token.
pub const TOKENLESS_USERNAME: &str = "tokenless";

#[derive(Default)]
struct Container {
    objects: BTreeMap<String, Vec<u8>>,
    public: bool,
}

#[derive(Default)]
struct Inner {
    containers: BTreeMap<String, Container>,
    storage_requests: usize,
    token_expired: bool,
    garbled_listings: bool,
    messages: Vec<String>,
}

type Shared = Arc<Mutex<Inner>>;

pub struct FakeServer {
    addr: SocketAddr,
    state: Shared,
}

impl FakeServer {
    pub fn start() -> Self {
        let state = Shared::default();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });

        Self { addr, state }
    }

    pub fn token_url(&self) -> String {
        format!("http://{}/v2.0/tokens", self.addr)
    }

    pub fn storage_url(&self) -> String {
        format!("http://{}/v1/AUTH_{TENANT_ID}", self.addr)
    }

    pub fn webhook_url(&self) -> String {
        format!("http://{}/services/T0000/B0000/XXXXXXXX", self.addr)
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials_for(USERNAME, PASSWORD)
    }

    pub fn credentials_for(&self, username: &str, password: &str) -> Credentials {
        Credentials::new(
            username,
            password,
            TENANT_ID,
            self.token_url(),
            self.storage_url(),
        )
    }

    /// Number of requests that reached the storage endpoints.
    pub fn storage_requests(&self) -> usize {
        self.state.lock().unwrap().storage_requests
    }

    pub fn object(&self, container: &str, name: &str) -> Option<Vec<u8>> {
        let inner = self.state.lock().unwrap();
        inner.containers.get(container)?.objects.get(name).cloned()
    }

    pub fn is_public(&self, container: &str) -> bool {
        let inner = self.state.lock().unwrap();
        inner.containers.get(container).is_some_and(|c| c.public)
    }

    pub fn has_container(&self, container: &str) -> bool {
        self.state.lock().unwrap().containers.contains_key(container)
    }

    /// Reject the issued token from now on.
    pub fn expire_token(&self) {
        self.state.lock().unwrap().token_expired = true;
    }

    /// Answer listings with 200 and a body that is not JSON.
    pub fn garble_listings(&self) {
        self.state.lock().unwrap().garbled_listings = true;
    }

    pub fn messages(&self) -> Vec<String> {
        self.state.lock().unwrap().messages.clone()
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/v2.0/tokens", post(issue_token))
        .route("/services/{*hook}", post(webhook))
        .route(
            "/v1/{account}/{container}",
            put(create_container)
                .get(list_objects)
                .delete(delete_container)
                .post(update_container),
        )
        .route(
            "/v1/{account}/{container}/{*object}",
            put(put_object).get(get_object).delete(delete_object),
        )
        .with_state(state)
}

async fn issue_token(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers.get("accept").and_then(|v| v.to_str().ok()) != Some("application/json") {
        return StatusCode::NOT_ACCEPTABLE.into_response();
    }

    let auth = &body["auth"];
    let username = auth["passwordCredentials"]["username"].as_str();
    let password = auth["passwordCredentials"]["password"].as_str();
    let tenant = auth["tenantId"].as_str();

    if username == Some(TOKENLESS_USERNAME) {
        return Json(json!({"access": {"user": {"name": TOKENLESS_USERNAME}}})).into_response();
    }

    if username == Some(USERNAME) && password == Some(PASSWORD) && tenant == Some(TENANT_ID) {
        Json(json!({
            "access": {
                "token": {"id": TOKEN, "expires": "2099-01-01T00:00:00Z"},
                "serviceCatalog": []
            }
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"unauthorized": {"code": 401, "message": "Invalid user / password"}})),
        )
            .into_response()
    }
}

async fn webhook(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    match body["text"].as_str() {
        Some(text) => {
            state.lock().unwrap().messages.push(text.to_string());
            "ok".into_response()
        }
        None => (StatusCode::BAD_REQUEST, "no_text").into_response(),
    }
}

/// Count the request and check its token.
fn admit(state: &Shared, headers: &HeaderMap) -> Result<(), StatusCode> {
    let mut inner = state.lock().unwrap();
    inner.storage_requests += 1;
    let token = headers.get("x-auth-token").and_then(|v| v.to_str().ok());
    if inner.token_expired || token != Some(TOKEN) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(())
}

async fn create_container(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_account, container)): Path<(String, String)>,
) -> StatusCode {
    if let Err(status) = admit(&state, &headers) {
        return status;
    }
    let mut inner = state.lock().unwrap();
    if inner.containers.contains_key(&container) {
        return StatusCode::ACCEPTED;
    }
    inner.containers.insert(container, Container::default());
    StatusCode::CREATED
}

async fn list_objects(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_account, container)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(status) = admit(&state, &headers) {
        return status.into_response();
    }
    let inner = state.lock().unwrap();
    let Some(entry) = inner.containers.get(&container) else {
        return (StatusCode::NOT_FOUND, "<html><h1>Not Found</h1></html>").into_response();
    };
    if inner.garbled_listings {
        return "[{'name': 'a.txt'}]".into_response();
    }

    let prefix = query.get("prefix").map(String::as_str).unwrap_or("");
    let names = entry.objects.iter().filter(|(name, _)| name.starts_with(prefix));

    if query.get("format").map(String::as_str) != Some("json") {
        let plain: String = names.map(|(name, _)| format!("{name}\n")).collect();
        return plain.into_response();
    }

    let records: Vec<Value> = names
        .map(|(name, data)| {
            json!({
                "name": name,
                "bytes": data.len(),
                "hash": format!("{:032x}", data.len()),
                "last_modified": "2024-05-01T10:00:00.000000",
                "content_type": "application/octet-stream",
            })
        })
        .collect();
    Json(records).into_response()
}

async fn delete_container(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_account, container)): Path<(String, String)>,
) -> StatusCode {
    if let Err(status) = admit(&state, &headers) {
        return status;
    }
    let mut inner = state.lock().unwrap();
    match inner.containers.get(&container) {
        None => StatusCode::NOT_FOUND,
        Some(entry) if !entry.objects.is_empty() => StatusCode::CONFLICT,
        Some(_) => {
            inner.containers.remove(&container);
            StatusCode::NO_CONTENT
        }
    }
}

async fn update_container(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_account, container)): Path<(String, String)>,
) -> StatusCode {
    if let Err(status) = admit(&state, &headers) {
        return status;
    }
    let mut inner = state.lock().unwrap();
    let Some(entry) = inner.containers.get_mut(&container) else {
        return StatusCode::NOT_FOUND;
    };
    if headers.get("x-container-read").and_then(|v| v.to_str().ok()) == Some(".r:*") {
        entry.public = true;
    }
    if headers.contains_key("x-remove-container-read") {
        entry.public = false;
    }
    StatusCode::NO_CONTENT
}

async fn put_object(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_account, container, object)): Path<(String, String, String)>,
    body: Bytes,
) -> StatusCode {
    if let Err(status) = admit(&state, &headers) {
        return status;
    }
    let mut inner = state.lock().unwrap();
    match inner.containers.get_mut(&container) {
        Some(entry) => {
            entry.objects.insert(object, body.to_vec());
            StatusCode::CREATED
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn get_object(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_account, container, object)): Path<(String, String, String)>,
) -> Response {
    if let Err(status) = admit(&state, &headers) {
        return status.into_response();
    }
    let inner = state.lock().unwrap();
    match inner
        .containers
        .get(&container)
        .and_then(|entry| entry.objects.get(&object))
    {
        Some(data) => data.clone().into_response(),
        None => (StatusCode::NOT_FOUND, "<html><h1>Not Found</h1></html>").into_response(),
    }
}

async fn delete_object(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_account, container, object)): Path<(String, String, String)>,
) -> StatusCode {
    if let Err(status) = admit(&state, &headers) {
        return status;
    }
    let mut inner = state.lock().unwrap();
    match inner
        .containers
        .get_mut(&container)
        .and_then(|entry| entry.objects.remove(&object))
    {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}
