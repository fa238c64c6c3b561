//! In-memory stand-in for the SharePoint list REST API.
//!
//! Serves the handful of `/_api` endpoints the client uses, in
//! `odata=verbose` format, and enforces the parts of the protocol the client
//! is responsible for: request digest on writes, `__metadata.type` in write
//! bodies, `X-HTTP-Method` verb overrides and `IF-MATCH` on item writes.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// Digest accepted by `app()`.
pub const MOCK_DIGEST: &str = "0xMOCKDIGEST,17 Oct 2026 00:00:00 -0000";

/// SharePoint's default page size when `$top` is absent.
const DEFAULT_TOP: usize = 100;

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub digest: String,
    pub lists: Vec<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            digest: MOCK_DIGEST.to_string(),
            lists: vec!["Tasks".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpList {
    pub entity_type: String,
    pub items: BTreeMap<u64, Map<String, Value>>,
    next_id: u64,
}

impl SpList {
    pub fn new(title: &str) -> Self {
        Self {
            entity_type: entity_type_for(title),
            items: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Item as SharePoint returns it: fields plus `__metadata`, `Id` and `ID`.
    fn render(&self, id: u64, fields: &Map<String, Value>) -> Value {
        let mut item = fields.clone();
        item.insert("__metadata".to_string(), json!({ "type": self.entity_type }));
        item.insert("Id".to_string(), json!(id));
        item.insert("ID".to_string(), json!(id));
        Value::Object(item)
    }
}

/// `SP.Data.{Title}ListItem`, with spaces escaped the way SharePoint does.
pub fn entity_type_for(title: &str) -> String {
    format!("SP.Data.{}ListItem", title.replace(' ', "_x0020_"))
}

pub type Db = Arc<RwLock<HashMap<String, SpList>>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    digest: Arc<str>,
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let lists = config
        .lists
        .iter()
        .map(|title| (title.clone(), SpList::new(title)))
        .collect();
    let state = AppState {
        db: Arc::new(RwLock::new(lists)),
        digest: config.digest.into(),
    };
    Router::new()
        .route("/_api/contextinfo", post(context_info))
        .route("/_api/web/lists/{*rest}", get(read_list).post(write_list))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

/// What a `/_api/web/lists/...` path addresses.
#[derive(Debug, PartialEq, Eq)]
enum Target {
    List(String),
    Items(String),
    Item(String, u64),
}

/// Parse `GetByTitle('{title}')[/items[({id})]]`. The title may itself
/// contain quotes and parentheses, so the suffix is matched first.
fn parse_target(rest: &str) -> Option<Target> {
    let inner = rest.strip_prefix("GetByTitle('")?;
    if let Some(title) = inner.strip_suffix("')") {
        return Some(Target::List(title.to_string()));
    }
    if let Some(title) = inner.strip_suffix("')/items") {
        return Some(Target::Items(title.to_string()));
    }
    let (head, tail) = inner.rsplit_once("')/items(")?;
    let id = tail.strip_suffix(')')?.parse().ok()?;
    Some(Target::Item(head.to_string(), id))
}

fn sp_error(status: StatusCode, code: &str, message: &str) -> Response {
    let body = json!({
        "error": {
            "code": code,
            "message": { "lang": "en-US", "value": message }
        }
    });
    (status, Json(body)).into_response()
}

fn bad_path() -> Response {
    sp_error(
        StatusCode::BAD_REQUEST,
        "-1, Microsoft.SharePoint.Client.InvalidClientQueryException",
        "The expression is not valid.",
    )
}

fn list_not_found(title: &str) -> Response {
    sp_error(
        StatusCode::NOT_FOUND,
        "-1, System.ArgumentException",
        &format!("List '{title}' does not exist at site with URL 'http://mock'."),
    )
}

fn item_not_found() -> Response {
    sp_error(
        StatusCode::NOT_FOUND,
        "-2147024809, System.ArgumentException",
        "Item does not exist. It may have been deleted by another user.",
    )
}

async fn context_info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "d": {
            "GetContextWebInformation": {
                "__metadata": { "type": "SP.ContextWebInformation" },
                "FormDigestValue": &*state.digest,
                "FormDigestTimeoutSeconds": 1800
            }
        }
    }))
}

async fn read_list(
    State(state): State<AppState>,
    Path(rest): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(target) = parse_target(&rest) else {
        return bad_path();
    };
    let db = state.db.read().await;
    match target {
        Target::List(title) => match db.get(&title) {
            Some(list) => Json(json!({
                "d": {
                    "__metadata": { "type": "SP.List" },
                    "Title": title,
                    "ListItemEntityTypeFullName": list.entity_type,
                    "ItemCount": list.items.len()
                }
            }))
            .into_response(),
            None => list_not_found(&title),
        },
        Target::Items(title) => {
            let Some(list) = db.get(&title) else {
                return list_not_found(&title);
            };
            let top = match params.get("$top").map(|t| t.parse::<usize>()) {
                None => DEFAULT_TOP,
                Some(Ok(top)) => top,
                Some(Err(_)) => return bad_path(),
            };
            let clauses = match params.get("$filter").map(|f| parse_filter(f)) {
                None => Vec::new(),
                Some(Ok(clauses)) => clauses,
                Some(Err(msg)) => {
                    return sp_error(
                        StatusCode::BAD_REQUEST,
                        "-1, Microsoft.SharePoint.Client.InvalidClientQueryException",
                        &msg,
                    )
                }
            };
            let results: Vec<Value> = list
                .items
                .iter()
                .map(|(id, fields)| list.render(*id, fields))
                .filter(|item| matches_all(item, &clauses))
                .take(top)
                .collect();
            Json(json!({ "d": { "results": results } })).into_response()
        }
        Target::Item(title, id) => {
            let Some(list) = db.get(&title) else {
                return list_not_found(&title);
            };
            match list.items.get(&id) {
                Some(fields) => Json(json!({ "d": list.render(id, fields) })).into_response(),
                None => item_not_found(),
            }
        }
    }
}

async fn write_list(
    State(state): State<AppState>,
    Path(rest): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if header(&headers, "x-requestdigest") != Some(&*state.digest) {
        return sp_error(
            StatusCode::FORBIDDEN,
            "-2130575252, Microsoft.SharePoint.SPException",
            "The security validation for this page is invalid and might be corrupted. \
             Please use your web browser's Back button to try your operation again.",
        );
    }
    let Some(target) = parse_target(&rest) else {
        return bad_path();
    };

    let mut db = state.db.write().await;
    match target {
        Target::List(_) => sp_error(
            StatusCode::METHOD_NOT_ALLOWED,
            "-1, Microsoft.SharePoint.Client.ClientServiceException",
            "The HTTP method 'POST' cannot be used on a list resource here.",
        ),
        Target::Items(title) => {
            let Some(list) = db.get_mut(&title) else {
                return list_not_found(&title);
            };
            let fields = match write_fields(&body, &list.entity_type) {
                Ok(fields) => fields,
                Err(response) => return response,
            };
            let id = list.next_id;
            list.next_id += 1;
            let created = list.render(id, &fields);
            list.items.insert(id, fields);
            debug!(list = %title, id, "item created");
            (StatusCode::CREATED, Json(json!({ "d": created }))).into_response()
        }
        Target::Item(title, id) => {
            let Some(list) = db.get_mut(&title) else {
                return list_not_found(&title);
            };
            if header(&headers, "if-match").is_none() {
                return sp_error(
                    StatusCode::PRECONDITION_FAILED,
                    "-1, Microsoft.SharePoint.Client.ClientServiceException",
                    "The request ETag value '' does not match the object's ETag value.",
                );
            }
            match header(&headers, "x-http-method") {
                Some("MERGE") => {
                    let fields = match write_fields(&body, &list.entity_type) {
                        Ok(fields) => fields,
                        Err(response) => return response,
                    };
                    let Some(item) = list.items.get_mut(&id) else {
                        return item_not_found();
                    };
                    item.extend(fields);
                    debug!(list = %title, id, "item merged");
                    StatusCode::NO_CONTENT.into_response()
                }
                Some("DELETE") => match list.items.remove(&id) {
                    Some(_) => {
                        debug!(list = %title, id, "item deleted");
                        StatusCode::OK.into_response()
                    }
                    None => item_not_found(),
                },
                _ => sp_error(
                    StatusCode::BAD_REQUEST,
                    "-1, Microsoft.SharePoint.Client.InvalidClientQueryException",
                    "The X-HTTP-Method header must be MERGE or DELETE.",
                ),
            }
        }
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Validate a write body and strip the fields SharePoint manages itself.
fn write_fields(body: &str, entity_type: &str) -> Result<Map<String, Value>, Response> {
    let invalid = |msg: &str| {
        sp_error(
            StatusCode::BAD_REQUEST,
            "-1, Microsoft.SharePoint.Client.InvalidClientQueryException",
            msg,
        )
    };
    let Ok(Value::Object(mut fields)) = serde_json::from_str::<Value>(body) else {
        return Err(invalid("Invalid JSON. The request body must be a JSON object."));
    };
    let declared = fields
        .remove("__metadata")
        .and_then(|m| m.get("type").and_then(Value::as_str).map(str::to_string));
    match declared {
        Some(t) if t == entity_type => {}
        Some(t) => {
            return Err(invalid(&format!(
                "A type named '{t}' could not be resolved by the model."
            )))
        }
        None => return Err(invalid("The property '__metadata' is required.")),
    }
    fields.remove("Id");
    fields.remove("ID");
    Ok(fields)
}

/// One `Field eq literal` clause of a `$filter`.
#[derive(Debug, PartialEq)]
struct Clause {
    field: String,
    value: Value,
}

/// Supports `Field eq 'text'`, `Field eq 42` and `Field eq true`, joined
/// with `and`.
fn parse_filter(expr: &str) -> Result<Vec<Clause>, String> {
    expr.split(" and ")
        .map(|clause| {
            let clause = clause.trim();
            let (field, literal) = clause
                .split_once(" eq ")
                .ok_or_else(|| format!("Unsupported filter clause: {clause}"))?;
            Ok(Clause {
                field: field.trim().to_string(),
                value: parse_literal(literal.trim())?,
            })
        })
        .collect()
}

fn parse_literal(literal: &str) -> Result<Value, String> {
    if let Some(text) = literal
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
    {
        return Ok(Value::String(text.replace("''", "'")));
    }
    match literal {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "null" => return Ok(Value::Null),
        _ => {}
    }
    literal
        .parse::<i64>()
        .map(Value::from)
        .map_err(|_| format!("Unsupported filter literal: {literal}"))
}

fn matches_all(item: &Value, clauses: &[Clause]) -> bool {
    clauses
        .iter()
        .all(|c| item.get(&c.field).unwrap_or(&Value::Null) == &c.value)
}
