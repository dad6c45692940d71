use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use rovernet_log::LogEntryRequest;
use rovernet_store::{Document, KeyValueStore};
use serde_json::{json, Value};

use crate::error::{ServerError, ServerResult};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Per-collection wording and field names used by the load/save handlers.
struct Endpoint {
    /// Request parameter carrying the key on load, e.g. `userId`.
    param: &'static str,
    /// Document field carrying the key on save, e.g. `UserId`.
    field: &'static str,
    found: &'static str,
    missing: &'static str,
    saved: &'static str,
    /// Ids are integers > 0, accepted as numbers or numeric strings.
    numeric: bool,
}

static PLAYERS: Endpoint = Endpoint {
    param: "userId",
    field: "UserId",
    found: "Player data loaded successfully",
    missing: "Player not found, ready for creation",
    saved: "Player data saved successfully",
    numeric: true,
};

static COMPANIES: Endpoint = Endpoint {
    param: "companyId",
    field: "CompanyId",
    found: "Company data loaded successfully",
    missing: "Company not found",
    saved: "Company data saved successfully",
    numeric: false,
};

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": "rovernet-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn player_load_query(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ServerResult<Json<ApiResponse>> {
    let key = params.get(PLAYERS.param).cloned().map(Value::String);
    load(state.players, key, &PLAYERS).await
}

pub async fn player_load_body(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<Json<ApiResponse>> {
    let key = key_from_body(&body, &PLAYERS)?;
    load(state.players, key, &PLAYERS).await
}

pub async fn player_save(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<Json<ApiResponse>> {
    save(state.players, &body, &PLAYERS).await
}

pub async fn company_load_query(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ServerResult<Json<ApiResponse>> {
    let key = params.get(COMPANIES.param).cloned().map(Value::String);
    load(state.companies, key, &COMPANIES).await
}

pub async fn company_load_body(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<Json<ApiResponse>> {
    let key = key_from_body(&body, &COMPANIES)?;
    load(state.companies, key, &COMPANIES).await
}

pub async fn company_save(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<Json<ApiResponse>> {
    save(state.companies, &body, &COMPANIES).await
}

pub async fn admin_log_append(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<Json<ApiResponse>> {
    let request: LogEntryRequest = serde_json::from_slice(&body)
        .map_err(|e| ServerError::BadRequest(format!("Invalid request body: {e}")))?;

    let log = state.admin_log;
    let receipt = blocking(move || Ok(log.append(&request)?)).await?;

    Ok(Json(ApiResponse::ok(
        "Admin action logged successfully",
        json!({
            "totalLogs": receipt.total_entries,
            "bytesWritten": receipt.bytes_written,
        }),
    )))
}

async fn load(
    store: Arc<dyn KeyValueStore>,
    key: Option<Value>,
    endpoint: &Endpoint,
) -> ServerResult<Json<ApiResponse>> {
    let (key, _) = key
        .as_ref()
        .and_then(|value| endpoint.key(value))
        .ok_or_else(|| ServerError::BadRequest(format!("Invalid {} provided", endpoint.param)))?;

    let loaded = blocking(move || Ok(store.load(&key)?)).await?;
    let response = match loaded {
        Some(document) => ApiResponse::ok(endpoint.found, Value::Object(document)),
        None => ApiResponse::ok(endpoint.missing, Value::Null),
    };
    Ok(Json(response))
}

async fn save(
    store: Arc<dyn KeyValueStore>,
    body: &[u8],
    endpoint: &Endpoint,
) -> ServerResult<Json<ApiResponse>> {
    let mut request = parse_object(body)?;
    let document: Document = match request.remove("data") {
        Some(Value::Object(document)) => document,
        _ => return Err(ServerError::BadRequest("Missing or invalid data field".into())),
    };

    let (key, id) = document
        .get(endpoint.field)
        .and_then(|value| endpoint.key(value))
        .ok_or_else(|| ServerError::BadRequest(format!("Invalid or missing {}", endpoint.field)))?;

    let bytes_written = blocking(move || Ok(store.save(&key, &document)?)).await?;

    let mut data = Document::new();
    data.insert(endpoint.param.to_string(), id);
    data.insert("bytesWritten".to_string(), bytes_written.into());
    Ok(Json(ApiResponse::ok(endpoint.saved, Value::Object(data))))
}

/// Answer for a method an endpoint does not serve.
pub async fn post_only() -> (StatusCode, Json<ApiResponse>) {
    method_not_allowed("Only POST requests are allowed")
}

pub async fn get_or_post_only() -> (StatusCode, Json<ApiResponse>) {
    method_not_allowed("Only GET or POST requests are allowed")
}

fn method_not_allowed(message: &str) -> (StatusCode, Json<ApiResponse>) {
    (StatusCode::METHOD_NOT_ALLOWED, Json(ApiResponse::failure(message)))
}

/// Run a storage call on the blocking thread pool.
async fn blocking<T, F>(call: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}

fn parse_object(body: &[u8]) -> ServerResult<Document> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ServerError::BadRequest("Request body must be a JSON object".into())),
        Err(e) => Err(ServerError::BadRequest(format!("Invalid request body: {e}"))),
    }
}

fn key_from_body(body: &[u8], endpoint: &Endpoint) -> ServerResult<Option<Value>> {
    let mut request = parse_object(body)?;
    Ok(request.remove(endpoint.param))
}

impl Endpoint {
    /// Storage key for a client-supplied id, plus the id as echoed back.
    fn key(&self, value: &Value) -> Option<(String, Value)> {
        if self.numeric {
            let id = numeric_id(value).filter(|id| *id > 0)?;
            Some((id.to_string(), id.into()))
        } else {
            let key = text_id(value).filter(|key| !key.is_empty())?;
            Some((key.clone(), key.into()))
        }
    }
}

/// Company ids arrive as JSON strings or integers; anything else is not a key.
fn text_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

/// Player ids are numbers or numeric strings, truncated toward zero.
fn numeric_id(value: &Value) -> Option<i64> {
    let f = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => return Some(i),
            None => n.as_f64()?,
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some(i);
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
    (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f.trunc() as i64)
}
