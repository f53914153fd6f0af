//! Integration test harness for Layercraft.
//!
//! [`FakeBackend`] is an in-process HTTP server speaking the subset of the
//! backend's account and database REST API the storefront uses. Tests point
//! a [`StorefrontConfig`] at it and drive the real client end to end.
//!
//! ```rust,ignore
//! let backend = FakeBackend::start().await;
//! let mut store = Store::new(Storefront::new(backend.config())?);
//! store.register("ada@example.com", "correct-horse", "Ada").await?;
//! ```
//!
//! The fake keeps everything in memory, ignores document permissions and
//! the API key, and supports the `equal`, `search`, `orderAsc`, `orderDesc`,
//! `limit` and `offset` query methods.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, RawQuery, Request, State};
use axum::http::header::{COOKIE, RETRY_AFTER, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use layercraft_core::unique_id;
use layercraft_storefront::config::{ConfigError, StorefrontConfig};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::task::JoinHandle;

/// Project ID the fake accepts.
pub const PROJECT_ID: &str = "layercraft";

/// Database ID used by [`FakeBackend::config`].
pub const DATABASE_ID: &str = "store";

/// Collection IDs used by [`FakeBackend::config`].
pub mod collections {
    pub const USERS: &str = "users";
    pub const PRODUCTS: &str = "products";
    pub const ORDERS: &str = "orders";
    pub const REQUESTS: &str = "requests";
}

const SESSION_COOKIE: &str = "a_session_layercraft";

/// Default page size when a listing carries no `limit` query.
const DEFAULT_LIMIT: usize = 25;

// =============================================================================
// State
// =============================================================================

struct Account {
    id: String,
    email: String,
    password: String,
    name: String,
}

#[derive(Default)]
struct Backend {
    accounts: Vec<Account>,
    /// Session secret to (session ID, account ID).
    sessions: HashMap<String, (String, String)>,
    /// Collection ID to documents in insertion order.
    documents: HashMap<String, Vec<Value>>,
    failing_collections: HashSet<String>,
    rate_limit_next: Option<u64>,
    requests: Vec<String>,
    clock: u32,
}

impl Backend {
    /// Strictly increasing timestamps so `$createdAt` ordering is stable.
    fn tick(&mut self, epoch: DateTime<Utc>) -> String {
        self.clock += 1;
        (epoch + Duration::milliseconds(i64::from(self.clock)))
            .to_rfc3339_opts(SecondsFormat::Millis, false)
    }

    fn account_for(&self, headers: &HeaderMap) -> Option<&Account> {
        let secret = session_secret(headers)?;
        let (_, account_id) = self.sessions.get(&secret)?;
        self.accounts.iter().find(|a| &a.id == account_id)
    }
}

#[derive(Clone)]
struct Shared {
    backend: Arc<Mutex<Backend>>,
    epoch: DateTime<Utc>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Backend> {
        // A panicking handler only poisons test state; keep serving.
        self.backend
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// =============================================================================
// FakeBackend
// =============================================================================

/// In-memory backend served on a local port for the lifetime of the value.
pub struct FakeBackend {
    addr: SocketAddr,
    shared: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Bind to an ephemeral local port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let shared = Shared {
            backend: Arc::new(Mutex::new(Backend::default())),
            epoch: Utc::now(),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend address");
        let app = router(shared.clone());

        let server = tokio::spawn(async move {
            #[allow(clippy::print_stderr)]
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("fake backend stopped: {e}");
            }
        });

        Self {
            addr,
            shared,
            server,
        }
    }

    /// API endpoint, e.g. `http://127.0.0.1:41234/v1`.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Storefront configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the generated configuration is rejected.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self) -> StorefrontConfig {
        self.config_with(&[]).expect("fake backend config")
    }

    /// Like [`FakeBackend::config`], with extra or overriding variables.
    ///
    /// # Errors
    ///
    /// Returns the configuration error for invalid overrides.
    pub fn config_with(&self, overrides: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let mut vars: HashMap<String, String> = [
            ("APPWRITE_URL", self.endpoint()),
            ("APPWRITE_PROJECT_ID", PROJECT_ID.to_string()),
            ("APPWRITE_DATABASE_ID", DATABASE_ID.to_string()),
            ("APPWRITE_USER_COLLECTION_ID", collections::USERS.to_string()),
            ("APPWRITE_PRODUCT_COLLECTION_ID", collections::PRODUCTS.to_string()),
            ("APPWRITE_ORDER_COLLECTION_ID", collections::ORDERS.to_string()),
            ("APPWRITE_REQUEST_COLLECTION_ID", collections::REQUESTS.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        for (key, value) in overrides {
            vars.insert((*key).to_string(), (*value).to_string());
        }

        StorefrontConfig::from_source(&|key: &str| vars.get(key).cloned())
    }

    /// Insert a document directly, bypassing the API. Returns its ID.
    pub fn insert_document(&self, collection: &str, data: Value) -> String {
        let id = unique_id();
        let mut backend = self.shared.lock();
        let doc = new_document(&mut backend, self.shared.epoch, collection, &id, data);
        backend
            .documents
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        id
    }

    /// Snapshot of a collection's documents in insertion order.
    #[must_use]
    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.shared
            .lock()
            .documents
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Set the `role` of the profile with `email`. Returns whether one matched.
    pub fn set_role(&self, email: &str, role: &str) -> bool {
        let mut backend = self.shared.lock();
        let profile = backend
            .documents
            .get_mut(collections::USERS)
            .and_then(|docs| docs.iter_mut().find(|d| d["email"] == email));

        match profile {
            Some(doc) => {
                doc["role"] = Value::from(role);
                true
            }
            None => false,
        }
    }

    /// Make document creates and updates in `collection` fail with a 500.
    pub fn fail_writes(&self, collection: &str) {
        self.shared
            .lock()
            .failing_collections
            .insert(collection.to_string());
    }

    /// Undo [`FakeBackend::fail_writes`].
    pub fn restore_writes(&self, collection: &str) {
        self.shared.lock().failing_collections.remove(collection);
    }

    /// Answer the next request with 429 and the given `Retry-After`.
    pub fn rate_limit_next(&self, retry_after: u64) {
        self.shared.lock().rate_limit_next = Some(retry_after);
    }

    /// Number of requests received so far matching `method` and `path`.
    #[must_use]
    pub fn request_count(&self, method: &str, path: &str) -> usize {
        let needle = format!("{method} {path}");
        self.shared
            .lock()
            .requests
            .iter()
            .filter(|r| **r == needle)
            .count()
    }

    /// Path of a collection's documents endpoint, for [`FakeBackend::request_count`].
    #[must_use]
    pub fn documents_path(collection: &str) -> String {
        format!("/v1/databases/{DATABASE_ID}/collections/{collection}/documents")
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(shared: Shared) -> Router {
    Router::new()
        .route("/v1/account", post(create_account).get(get_account))
        .route("/v1/account/sessions/email", post(create_session))
        .route("/v1/account/sessions/{session_id}", delete(delete_session))
        .route(
            "/v1/databases/{database_id}/collections/{collection_id}/documents",
            post(create_document).get(list_documents),
        )
        .route(
            "/v1/databases/{database_id}/collections/{collection_id}/documents/{document_id}",
            get(get_document).patch(update_document),
        )
        .layer(middleware::from_fn_with_state(shared.clone(), gatekeeper))
        .with_state(shared)
}

/// Record every request, check the project header and apply rate limiting.
async fn gatekeeper(State(shared): State<Shared>, request: Request, next: Next) -> Response {
    let rate_limited = {
        let mut backend = shared.lock();
        backend
            .requests
            .push(format!("{} {}", request.method(), request.uri().path()));
        backend.rate_limit_next.take()
    };

    if let Some(seconds) = rate_limited {
        let mut response = error(
            StatusCode::TOO_MANY_REQUESTS,
            "general_rate_limit_exceeded",
            "Rate limit for the current endpoint has been exceeded.",
        );
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(seconds));
        return response;
    }

    let project = request
        .headers()
        .get("X-Appwrite-Project")
        .and_then(|v| v.to_str().ok());
    if project != Some(PROJECT_ID) {
        return error(
            StatusCode::NOT_FOUND,
            "project_not_found",
            "Project with the requested ID could not be found.",
        );
    }

    next.run(request).await
}

// -----------------------------------------------------------------------------
// Account
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountBody {
    user_id: String,
    email: String,
    password: String,
    #[serde(default)]
    name: String,
}

async fn create_account(State(shared): State<Shared>, Json(body): Json<CreateAccountBody>) -> Response {
    let mut backend = shared.lock();

    if backend
        .accounts
        .iter()
        .any(|a| a.email.eq_ignore_ascii_case(&body.email) || a.id == body.user_id)
    {
        return error(
            StatusCode::CONFLICT,
            "user_already_exists",
            "A user with the same id, email, or phone already exists in this project.",
        );
    }

    let account = Account {
        id: body.user_id,
        email: body.email,
        password: body.password,
        name: body.name,
    };
    let json = account_json(&account);
    backend.accounts.push(account);

    (StatusCode::CREATED, Json(json)).into_response()
}

async fn get_account(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let backend = shared.lock();
    match backend.account_for(&headers) {
        Some(account) => Json(account_json(account)).into_response(),
        None => unauthorized(),
    }
}

#[derive(Deserialize)]
struct CreateSessionBody {
    email: String,
    password: String,
}

async fn create_session(State(shared): State<Shared>, Json(body): Json<CreateSessionBody>) -> Response {
    let mut backend = shared.lock();

    let Some(account_id) = backend
        .accounts
        .iter()
        .find(|a| a.email.eq_ignore_ascii_case(&body.email) && a.password == body.password)
        .map(|a| a.id.clone())
    else {
        return error(
            StatusCode::UNAUTHORIZED,
            "user_invalid_credentials",
            "Invalid credentials. Please check the email and password.",
        );
    };

    let session_id = unique_id();
    let secret = unique_id();
    backend
        .sessions
        .insert(secret.clone(), (session_id.clone(), account_id.clone()));

    let expire = (Utc::now() + Duration::days(365)).to_rfc3339_opts(SecondsFormat::Millis, false);
    let body = json!({
        "$id": session_id,
        "userId": account_id,
        "expire": expire,
        "current": true,
    });

    (
        StatusCode::CREATED,
        [(SET_COOKIE, format!("{SESSION_COOKIE}={secret}; Path=/; HttpOnly"))],
        Json(body),
    )
        .into_response()
}

async fn delete_session(
    State(shared): State<Shared>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut backend = shared.lock();

    let Some(secret) = session_secret(&headers) else {
        return unauthorized();
    };
    let matches = backend
        .sessions
        .get(&secret)
        .is_some_and(|(id, _)| session_id == "current" || *id == session_id);
    if !matches {
        return unauthorized();
    }

    backend.sessions.remove(&secret);
    (
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, format!("{SESSION_COOKIE}=; Path=/; Max-Age=0"))],
    )
        .into_response()
}

// -----------------------------------------------------------------------------
// Documents
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentBody {
    document_id: String,
    data: Map<String, Value>,
}

#[derive(Deserialize)]
struct UpdateDocumentBody {
    data: Map<String, Value>,
}

async fn create_document(
    State(shared): State<Shared>,
    Path((_database_id, collection_id)): Path<(String, String)>,
    Json(body): Json<CreateDocumentBody>,
) -> Response {
    let mut backend = shared.lock();

    if backend.failing_collections.contains(&collection_id) {
        return server_error();
    }

    let exists = backend
        .documents
        .get(&collection_id)
        .is_some_and(|docs| docs.iter().any(|d| d["$id"] == body.document_id));
    if exists {
        return error(
            StatusCode::CONFLICT,
            "document_already_exists",
            "Document with the requested ID already exists.",
        );
    }

    let doc = new_document(
        &mut backend,
        shared.epoch,
        &collection_id,
        &body.document_id,
        Value::Object(body.data),
    );
    backend
        .documents
        .entry(collection_id)
        .or_default()
        .push(doc.clone());

    (StatusCode::CREATED, Json(doc)).into_response()
}

async fn get_document(
    State(shared): State<Shared>,
    Path((_database_id, collection_id, document_id)): Path<(String, String, String)>,
) -> Response {
    let backend = shared.lock();
    backend
        .documents
        .get(&collection_id)
        .and_then(|docs| docs.iter().find(|d| d["$id"] == document_id))
        .map_or_else(document_not_found, |doc| Json(doc.clone()).into_response())
}

async fn update_document(
    State(shared): State<Shared>,
    Path((_database_id, collection_id, document_id)): Path<(String, String, String)>,
    Json(body): Json<UpdateDocumentBody>,
) -> Response {
    let mut backend = shared.lock();

    if backend.failing_collections.contains(&collection_id) {
        return server_error();
    }

    let updated_at = backend.tick(shared.epoch);
    let Some(doc) = backend
        .documents
        .get_mut(&collection_id)
        .and_then(|docs| docs.iter_mut().find(|d| d["$id"] == document_id))
    else {
        return document_not_found();
    };

    if let Value::Object(fields) = doc {
        for (key, value) in body.data {
            fields.insert(key, value);
        }
        fields.insert("$updatedAt".to_string(), Value::from(updated_at));
    }

    Json(doc.clone()).into_response()
}

#[derive(Deserialize)]
struct ListQuery {
    method: String,
    #[serde(default)]
    attribute: Option<String>,
    #[serde(default)]
    values: Vec<Value>,
}

async fn list_documents(
    State(shared): State<Shared>,
    Path((_database_id, collection_id)): Path<(String, String)>,
    RawQuery(raw): RawQuery,
) -> Response {
    let mut queries = Vec::new();
    for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        if key != "queries[]" {
            continue;
        }
        match serde_json::from_str::<ListQuery>(&value) {
            Ok(query) => queries.push(query),
            Err(_) => {
                return error(
                    StatusCode::BAD_REQUEST,
                    "general_query_invalid",
                    &format!("Invalid query: {value}"),
                );
            }
        }
    }

    let mut docs = shared
        .lock()
        .documents
        .get(&collection_id)
        .cloned()
        .unwrap_or_default();

    let mut limit = DEFAULT_LIMIT;
    let mut offset = 0;

    for query in &queries {
        let attribute = query.attribute.as_deref().unwrap_or_default();
        match query.method.as_str() {
            "equal" => docs.retain(|d| query.values.contains(&d[attribute])),
            "search" => {
                let term = query
                    .values
                    .first()
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_lowercase();
                docs.retain(|d| {
                    d[attribute]
                        .as_str()
                        .is_some_and(|s| s.to_lowercase().contains(&term))
                });
            }
            "orderAsc" => docs.sort_by(|a, b| compare(&a[attribute], &b[attribute])),
            "orderDesc" => docs.sort_by(|a, b| compare(&b[attribute], &a[attribute])),
            "limit" => limit = first_usize(&query.values).unwrap_or(limit),
            "offset" => offset = first_usize(&query.values).unwrap_or(offset),
            other => {
                return error(
                    StatusCode::BAD_REQUEST,
                    "general_query_invalid",
                    &format!("Unsupported query method: {other}"),
                );
            }
        }
    }

    let total = docs.len();
    let page: Vec<Value> = docs.into_iter().skip(offset).take(limit).collect();

    Json(json!({ "total": total, "documents": page })).into_response()
}

// =============================================================================
// Helpers
// =============================================================================

fn new_document(
    backend: &mut Backend,
    epoch: DateTime<Utc>,
    collection_id: &str,
    id: &str,
    data: Value,
) -> Value {
    let now = backend.tick(epoch);
    let mut fields = match data {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };

    fields.insert("$id".to_string(), Value::from(id));
    fields.insert("$collectionId".to_string(), Value::from(collection_id));
    fields.insert("$databaseId".to_string(), Value::from(DATABASE_ID));
    fields.insert("$createdAt".to_string(), Value::from(now.clone()));
    fields.insert("$updatedAt".to_string(), Value::from(now));
    fields.insert("$permissions".to_string(), json!([]));
    Value::Object(fields)
}

fn account_json(account: &Account) -> Value {
    json!({
        "$id": account.id,
        "name": account.name,
        "email": account.email,
        "emailVerification": false,
        "labels": [],
    })
}

fn session_secret(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(std::cmp::Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) => std::cmp::Ordering::Equal,
        (Value::Null, _) => std::cmp::Ordering::Less,
        (_, Value::Null) => std::cmp::Ordering::Greater,
        _ => std::cmp::Ordering::Equal,
    }
}

fn first_usize(values: &[Value]) -> Option<usize> {
    values
        .first()
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

fn error(status: StatusCode, kind: &str, message: &str) -> Response {
    let body = json!({
        "message": message,
        "code": status.as_u16(),
        "type": kind,
        "version": "1.5.7",
    });
    (status, Json(body)).into_response()
}

fn unauthorized() -> Response {
    error(
        StatusCode::UNAUTHORIZED,
        "general_unauthorized_scope",
        "User (role: guests) missing scope (account)",
    )
}

fn document_not_found() -> Response {
    error(
        StatusCode::NOT_FOUND,
        "document_not_found",
        "Document with the requested ID could not be found.",
    )
}

fn server_error() -> Response {
    error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "general_unknown",
        "Server Error",
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_secret_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; a_session_layercraft=s3cret"),
        );
        assert_eq!(session_secret(&headers).as_deref(), Some("s3cret"));

        headers.insert(COOKIE, HeaderValue::from_static("a_session_layercraft="));
        assert_eq!(session_secret(&headers), None);
    }

    #[test]
    fn test_compare_orders_numbers_and_strings() {
        assert!(compare(&json!(2), &json!(10)).is_lt());
        assert!(compare(&json!("b"), &json!("a")).is_gt());
        assert!(compare(&Value::Null, &json!("a")).is_lt());
    }
}
