#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use watchdesk::client::RemoteClient;
use watchdesk::config::{BackendSettings, QueryConfig};
use watchdesk::services::OpsService;

/// Scripted failure served for the next request against a table.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Permission,
    Transient,
}

#[derive(Default)]
struct TableState {
    rows: Vec<Value>,
    hits: u32,
    queries: Vec<String>,
    failures: VecDeque<Failure>,
}

struct StubState {
    tables: Mutex<HashMap<String, TableState>>,
    user_id: Uuid,
}

/// In-process imitation of the hosted backend's REST and auth surface.
/// Requests are recorded per table so tests can assert how many round
/// trips a code path actually made.
pub struct TestBackend {
    pub base_url: String,
    state: Arc<StubState>,
}

impl TestBackend {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let state = Arc::new(StubState {
            tables: Mutex::new(HashMap::new()),
            user_id: Uuid::new_v4(),
        });

        let app = Router::new()
            .route("/auth/v1/token", post(token_handler))
            .route("/rest/v1/:table", any(rest_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind stub backend")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        })
    }

    pub fn client(&self) -> RemoteClient {
        RemoteClient::new(
            BackendSettings::new(&self.base_url, "stub-anon-key"),
            test_config(),
        )
    }

    pub fn service(&self) -> OpsService {
        OpsService::new(self.client(), &test_config())
    }

    pub fn user_id(&self) -> Uuid {
        self.state.user_id
    }

    /// Install a session for the stub's user without the password dance.
    pub fn sign_in(&self, client: &RemoteClient) {
        let token = forged_token(self.state.user_id, Utc::now().timestamp() + 3600);
        client.auth().set_session(&token).expect("set stub session");
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.state.tables.lock().unwrap();
        tables.entry(table.to_string()).or_default().rows = rows;
    }

    pub fn fail_next(&self, table: &str, failure: Failure) {
        let mut tables = self.state.tables.lock().unwrap();
        tables
            .entry(table.to_string())
            .or_default()
            .failures
            .push_back(failure);
    }

    /// Requests observed for the table so far, any method.
    pub fn hits(&self, table: &str) -> u32 {
        let tables = self.state.tables.lock().unwrap();
        tables.get(table).map(|t| t.hits).unwrap_or(0)
    }

    /// Raw (percent-encoded) query strings observed for the table.
    pub fn queries(&self, table: &str) -> Vec<String> {
        let tables = self.state.tables.lock().unwrap();
        tables
            .get(table)
            .map(|t| t.queries.clone())
            .unwrap_or_default()
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        let tables = self.state.tables.lock().unwrap();
        tables.get(table).map(|t| t.rows.clone()).unwrap_or_default()
    }
}

pub fn test_config() -> QueryConfig {
    QueryConfig {
        max_attempts: 3,
        retry_backoff_ms: 1,
        cache_ttl_secs: 30,
        request_timeout_secs: 5,
    }
}

pub fn forged_token(user_id: Uuid, exp: i64) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &json!({ "sub": user_id.to_string(), "exp": exp }),
        &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
    )
    .expect("forge token")
}

async fn token_handler(State(state): State<Arc<StubState>>) -> Json<Value> {
    Json(json!({
        "access_token": forged_token(state.user_id, Utc::now().timestamp() + 3600),
        "refresh_token": "stub-refresh",
    }))
}

async fn rest_handler(
    State(state): State<Arc<StubState>>,
    Path(table): Path<String>,
    method: Method,
    RawQuery(query): RawQuery,
    body: Option<Json<Value>>,
) -> Response {
    let query = query.unwrap_or_default();
    let mut tables = state.tables.lock().unwrap();
    let entry = tables.entry(table.clone()).or_default();
    entry.hits += 1;
    entry.queries.push(query.clone());

    if let Some(failure) = entry.failures.pop_front() {
        return failure_response(failure, &table);
    }

    let params: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    match method {
        Method::HEAD => {
            let count = matching(&entry.rows, &params).len();
            let range = format!("0-{}/{}", count.saturating_sub(1), count);
            let mut headers = HeaderMap::new();
            headers.insert("Content-Range", range.parse().unwrap());
            (StatusCode::OK, headers, Body::empty()).into_response()
        }
        Method::GET => {
            let mut rows = matching(&entry.rows, &params);
            apply_order(&mut rows, &params);
            apply_limit(&mut rows, &params);
            Json(Value::Array(rows)).into_response()
        }
        Method::POST => {
            let Some(Json(payload)) = body else {
                return StatusCode::BAD_REQUEST.into_response();
            };
            let row = with_server_fields(payload);
            entry.rows.push(row.clone());
            Json(json!([row])).into_response()
        }
        Method::PATCH => {
            let Some(Json(payload)) = body else {
                return StatusCode::BAD_REQUEST.into_response();
            };
            let patch = payload.as_object().cloned().unwrap_or_default();
            let mut written = Vec::new();
            for row in entry.rows.iter_mut() {
                if row_matches(row, &params) {
                    if let Some(obj) = row.as_object_mut() {
                        for (k, v) in &patch {
                            obj.insert(k.clone(), v.clone());
                        }
                        obj.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));
                    }
                    written.push(row.clone());
                }
            }
            Json(Value::Array(written)).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

fn failure_response(failure: Failure, table: &str) -> Response {
    match failure {
        Failure::Permission => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "code": "42501",
                "message": format!("permission denied for table {}", table),
            })),
        )
            .into_response(),
        Failure::Transient => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "upstream timeout" })),
        )
            .into_response(),
    }
}

fn matching(rows: &[Value], params: &[(String, String)]) -> Vec<Value> {
    rows.iter()
        .filter(|row| row_matches(row, params))
        .cloned()
        .collect()
}

fn row_matches(row: &Value, params: &[(String, String)]) -> bool {
    for (column, raw) in params {
        if matches!(column.as_str(), "select" | "order" | "limit") {
            continue;
        }
        let actual = field_as_string(row, column);
        let matched = if let Some(expected) = raw.strip_prefix("eq.") {
            actual.as_deref() == Some(expected)
        } else if let Some(list) = raw.strip_prefix("in.(").and_then(|v| v.strip_suffix(')')) {
            actual
                .as_deref()
                .map(|a| list.split(',').any(|v| v == a))
                .unwrap_or(false)
        } else if let Some(expected) = raw.strip_prefix("gte.") {
            actual.as_deref().map(|a| a >= expected).unwrap_or(false)
        } else if let Some(expected) = raw.strip_prefix("lte.") {
            actual.as_deref().map(|a| a <= expected).unwrap_or(false)
        } else {
            true
        };
        if !matched {
            return false;
        }
    }
    true
}

fn apply_order(rows: &mut [Value], params: &[(String, String)]) {
    let Some((_, spec)) = params.iter().find(|(k, _)| k == "order") else {
        return;
    };
    // Stable-sort by each key from least to most significant.
    for segment in spec.split(',').rev() {
        let (column, direction) = segment.rsplit_once('.').unwrap_or((segment, "asc"));
        let column = column.to_string();
        rows.sort_by(|a, b| {
            let left = field_as_string(a, &column).unwrap_or_default();
            let right = field_as_string(b, &column).unwrap_or_default();
            if direction == "desc" {
                right.cmp(&left)
            } else {
                left.cmp(&right)
            }
        });
    }
}

fn apply_limit(rows: &mut Vec<Value>, params: &[(String, String)]) {
    if let Some((_, limit)) = params.iter().find(|(k, _)| k == "limit") {
        if let Ok(limit) = limit.parse::<usize>() {
            rows.truncate(limit);
        }
    }
}

fn field_as_string(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn with_server_fields(payload: Value) -> Value {
    let mut row = payload;
    if let Some(obj) = row.as_object_mut() {
        let now = json!(Utc::now().to_rfc3339());
        obj.entry("id".to_string())
            .or_insert_with(|| json!(Uuid::new_v4().to_string()));
        obj.entry("created_at".to_string()).or_insert_with(|| now.clone());
        obj.entry("updated_at".to_string()).or_insert_with(|| now);
    }
    row
}
