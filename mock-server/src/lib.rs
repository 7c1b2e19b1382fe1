//! In-memory stand-in for the parts of the Canvas REST API the client
//! integration tests exercise.
//!
//! Every route sits behind a bearer check that mimics Canvas:
//! `EXPIRED_TOKEN` (or no token) gets a 401 with a `WWW-Authenticate`
//! challenge, `UNAUTHORIZED_TOKEN` gets a bare 401, anything else passes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const EXPIRED_TOKEN: &str = "expired-token";
pub const UNAUTHORIZED_TOKEN: &str = "student-token";

/// Course seeded with `SEEDED_ASSIGNMENTS` assignments.
pub const SEEDED_COURSE: u64 = 1;
pub const SEEDED_ASSIGNMENTS: u64 = 25;

const DEFAULT_PER_PAGE: usize = 10;
const SLOW_ROUTE_DELAY: Duration = Duration::from_millis(1500);

pub struct Store {
    assignments: RwLock<BTreeMap<u64, Value>>,
    next_id: AtomicU64,
}

pub type Db = Arc<Store>;

impl Store {
    fn seeded() -> Self {
        let assignments = (1..=SEEDED_ASSIGNMENTS)
            .map(|id| {
                let assignment = json!({
                    "id": id,
                    "course_id": SEEDED_COURSE,
                    "name": format!("Assignment {id}"),
                    "points_possible": 10.0,
                    "published": true,
                    "position": id,
                });
                (id, assignment)
            })
            .collect();
        Self {
            assignments: RwLock::new(assignments),
            next_id: AtomicU64::new(SEEDED_ASSIGNMENTS + 1),
        }
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(Store::seeded());
    Router::new()
        .route(
            "/api/v1/courses/{course_id}/assignments",
            get(list_assignments).post(create_assignment),
        )
        .route(
            "/api/v1/courses/{course_id}/assignments/{id}",
            get(get_assignment).put(update_assignment),
        )
        .route(
            "/api/v1/courses/{course_id}/enrollments/{id}",
            delete(conclude_enrollment),
        )
        .route("/api/v1/conversations", post(create_conversation))
        .route("/api/v1/accounts/{account_id}/logins/{id}", put(edit_login))
        .route("/api/v1/broken", get(broken))
        .route("/api/v1/slow", get(slow))
        .layer(middleware::from_fn(require_bearer))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_bearer(request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    match token.as_deref() {
        None | Some(EXPIRED_TOKEN) => (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, r#"Bearer realm="canvas-lms""#)],
            Json(json!({"errors": [{"message": "Invalid access token."}]})),
        )
            .into_response(),
        Some(UNAUTHORIZED_TOKEN) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "status": "unauthorized",
                "errors": [{"message": "user not authorized to perform that action"}]
            })),
        )
            .into_response(),
        Some(_) => next.run(request).await,
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

async fn list_assignments(
    State(db): State<Db>,
    Path(course_id): Path<u64>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let assignments = db.assignments.read().await;
    let in_course: Vec<&Value> = assignments
        .values()
        .filter(|a| a["course_id"] == course_id)
        .collect();
    let last = in_course.len().div_ceil(per_page).max(1);
    let items: Vec<Value> = in_course
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .cloned()
        .collect();

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let base = format!("http://{host}/api/v1/courses/{course_id}/assignments");
    let link = link_header(&base, page, last, per_page);
    ([(header::LINK, link)], Json(items)).into_response()
}

/// Canvas-style `Link` header with current, first, last and, where they
/// exist, prev and next relations.
pub fn link_header(base: &str, page: usize, last: usize, per_page: usize) -> String {
    let url = |n: usize| format!("<{base}?page={n}&per_page={per_page}>");
    let mut links = vec![format!(r#"{}; rel="current""#, url(page))];
    if page < last {
        links.push(format!(r#"{}; rel="next""#, url(page + 1)));
    }
    if page > 1 {
        links.push(format!(r#"{}; rel="prev""#, url(page - 1)));
    }
    links.push(format!(r#"{}; rel="first""#, url(1)));
    links.push(format!(r#"{}; rel="last""#, url(last)));
    links.join(",")
}

async fn get_assignment(
    State(db): State<Db>,
    Path((course_id, id)): Path<(u64, u64)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let assignments = db.assignments.read().await;
    assignments
        .get(&id)
        .filter(|a| a["course_id"] == course_id)
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn create_assignment(
    State(db): State<Db>,
    Path(course_id): Path<u64>,
    Json(input): Json<Value>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let Some(Value::Object(fields)) = input.get("assignment").cloned() else {
        return Err(bad_request("assignment is required"));
    };
    let id = db.next_id.fetch_add(1, Ordering::SeqCst);
    let mut assignment = fields;
    assignment.insert("id".to_string(), json!(id));
    assignment.insert("course_id".to_string(), json!(course_id));
    let assignment = Value::Object(assignment);
    db.assignments.write().await.insert(id, assignment.clone());
    tracing::info!(course_id, id, "created assignment");
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn update_assignment(
    State(db): State<Db>,
    Path((course_id, id)): Path<(u64, u64)>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Some(Value::Object(changes)) = input.get("assignment").cloned() else {
        return Err(bad_request("assignment is required"));
    };
    let mut assignments = db.assignments.write().await;
    let assignment = assignments
        .get_mut(&id)
        .filter(|a| a["course_id"] == course_id)
        .ok_or_else(not_found)?;
    if let Value::Object(existing) = &mut *assignment {
        for (key, value) in changes {
            if key != "id" && key != "course_id" {
                existing.insert(key, value);
            }
        }
    }
    Ok(Json(assignment.clone()))
}

/// Canvas reads `task` from the body of this DELETE.
async fn conclude_enrollment(
    Path((course_id, id)): Path<(u64, u64)>,
    Form(params): Form<Vec<(String, String)>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let task = first(&params, "task").unwrap_or("conclude");
    let state = match task {
        "conclude" => "completed",
        "delete" => "deleted",
        "inactivate" | "deactivate" => "inactive",
        other => return Err(bad_request(&format!("unknown task {other}"))),
    };
    Ok(Json(json!({
        "id": id,
        "course_id": course_id,
        "enrollment_state": state,
    })))
}

async fn create_conversation(
    Form(params): Form<Vec<(String, String)>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let recipients = all(&params, "recipients[]");
    if recipients.is_empty() {
        return Err(bad_request("recipients are required"));
    }
    let mut conversation = Map::new();
    conversation.insert("id".to_string(), json!(1));
    conversation.insert("subject".to_string(), json!(first(&params, "subject")));
    conversation.insert("body".to_string(), json!(first(&params, "body")));
    conversation.insert("recipients".to_string(), json!(recipients));
    Ok(Json(Value::Array(vec![Value::Object(conversation)])))
}

async fn edit_login(
    Path((account_id, id)): Path<(u64, u64)>,
    Form(params): Form<Vec<(String, String)>>,
) -> Json<Value> {
    Json(json!({
        "id": id,
        "account_id": account_id,
        "unique_id": first(&params, "login[unique_id]"),
        "sis_user_id": first(&params, "login[sis_user_id]"),
    }))
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_ROUTE_DELAY).await;
    Json(json!([]))
}

fn first<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn all<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
    params
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"errors": [{"message": "The specified resource does not exist."}]})),
    )
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"errors": [{"message": message}]})),
    )
}
