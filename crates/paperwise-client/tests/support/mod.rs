// In-process stand-in for the research backend, bound to an ephemeral port.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

pub const TOKEN: &str = "stub-token";
pub const PASSWORD: &str = "correct horse";

#[derive(Default)]
pub struct StubState {
    hits: AtomicUsize,
    bookmarks: Mutex<Vec<Value>>,
    last_search: Mutex<Option<HashMap<String, String>>>,
    deleted_keys: Mutex<Vec<String>>,
}

pub struct StubBackend {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubBackend {
    /// Start a backend on `127.0.0.1:0` for the current test.
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new()
            .route("/api/health", get(health))
            .route("/api/auth/signin", post(signin))
            .route("/api/auth/signup", post(signup))
            .route("/api/papers/search", get(search))
            .route("/api/papers/fields", get(fields))
            .route("/api/papers/field/{field_id}", get(field_papers))
            .route("/api/ai/answer", post(answer))
            .route("/api/ai/explain", post(explain))
            .route("/api/user/profile", get(profile))
            .route("/api/user/bookmarks", get(list_bookmarks).post(add_bookmark))
            .route("/api/user/bookmarks/{key}", delete(remove_bookmark))
            .layer(middleware::from_fn_with_state(state.clone(), count_hits))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral test port");
        let addr = listener.local_addr().expect("get local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn bookmarks(&self) -> Vec<Value> {
        self.state.bookmarks.lock().unwrap().clone()
    }

    pub fn seed_bookmark(&self, paper: Value) {
        self.state.bookmarks.lock().unwrap().push(paper);
    }

    pub fn last_search(&self) -> Option<HashMap<String, String>> {
        self.state.last_search.lock().unwrap().clone()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.state.deleted_keys.lock().unwrap().clone()
    }
}

pub fn paper(n: usize) -> Value {
    json!({
        "title": format!("Quantum Paper {}", n),
        "authors": ["Alice Zhang", "Bob Ortiz", "Chen Wu", "Dana Fox"],
        "summary": "We study error-corrected logical qubits. ".repeat(10),
        "link": format!("http://arxiv.org/abs/2401.0000{}", n),
        "source": "arXiv",
        "published": "2024-01-05"
    })
}

async fn count_hits(State(state): State<Arc<StubState>>, request: Request, next: Next) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid or expired token"}))).into_response()
}

fn stub_user() -> Value {
    json!({"_id": "u-42", "name": "Ada Lovelace", "email": "ada@example.com"})
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn signin(Json(body): Json<Value>) -> Response {
    if body["password"] == PASSWORD {
        Json(json!({"token": TOKEN, "user": stub_user()})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid credentials"}))).into_response()
    }
}

async fn signup(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@example.com" {
        return (StatusCode::CONFLICT, Json(json!({"error": "Email already registered"})))
            .into_response();
    }
    let user = json!({"_id": "u-43", "name": body["name"], "email": body["email"]});
    (StatusCode::CREATED, Json(json!({"token": TOKEN, "user": user}))).into_response()
}

async fn search(
    State(state): State<Arc<StubState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    *state.last_search.lock().unwrap() = Some(params.clone());
    let query = params.get("query").map(String::as_str).unwrap_or_default();
    match query {
        "quantum computing" => {
            Json(json!({"success": true, "papers": [paper(1), paper(2), paper(3)]})).into_response()
        }
        "upstream down" => Json(json!({"success": false, "error": "arXiv unavailable"})).into_response(),
        "crash" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "sparse metadata" => {
            let mut bare = paper(2);
            bare["authors"] = Value::Null;
            bare["summary"] = Value::Null;
            Json(json!({"success": true, "papers": [paper(1), bare]})).into_response()
        }
        "AI" => {
            let papers: Vec<Value> = (1..=8).map(paper).collect();
            Json(json!({"success": true, "papers": papers})).into_response()
        }
        _ => Json(json!({"success": true, "papers": []})).into_response(),
    }
}

async fn fields() -> Json<Value> {
    Json(json!({"fields": [
        {"id": "physics", "name": "Physics", "description": "Matter, energy and the universe"},
        {"id": "medicine", "name": "Medicine", "description": "Clinical and biomedical research"}
    ]}))
}

async fn field_papers(
    Path(field_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    assert_eq!(params.get("limit").map(String::as_str), Some("20"));
    match field_id.as_str() {
        "physics" => Json(json!({"success": true, "papers": [paper(7)]})).into_response(),
        _ => Json(json!({"success": false, "error": "Unknown field"})).into_response(),
    }
}

async fn answer(Json(body): Json<Value>) -> Json<Value> {
    let question = body["question"].as_str().unwrap_or_default();
    if question.contains("limit") {
        Json(json!({"success": false, "error": "quota exceeded"}))
    } else {
        Json(json!({"success": true, "answer": format!("Answer to: {}", question)}))
    }
}

async fn explain(Json(body): Json<Value>) -> Json<Value> {
    if let Some(question) = body["question"].as_str() {
        return Json(json!({
            "success": true,
            "explanation": {"explanation": format!("Follow-up: {}", question), "keyPoints": []}
        }));
    }
    let kind = body["type"].as_str().unwrap_or_default();
    Json(json!({
        "success": true,
        "explanation": {
            "explanation": format!("Explained as {}", kind),
            "keyPoints": ["one", "two", "three", "four", "five", "six", "seven"]
        }
    }))
}

async fn profile(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"user": stub_user()})).into_response()
}

async fn list_bookmarks(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let bookmarks = state.bookmarks.lock().unwrap().clone();
    Json(json!({"bookmarks": bookmarks})).into_response()
}

async fn add_bookmark(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut paper = body["paper"].clone();
    let mut bookmarks = state.bookmarks.lock().unwrap();
    if bookmarks.iter().any(|b| b["paperId"] == paper["paperId"]) {
        return (StatusCode::CONFLICT, Json(json!({"error": "Already bookmarked"}))).into_response();
    }
    paper["_id"] = json!(format!("bm-{}", bookmarks.len() + 1));
    bookmarks.push(paper);
    (StatusCode::CREATED, Json(json!({"success": true}))).into_response()
}

async fn remove_bookmark(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.deleted_keys.lock().unwrap().push(key.clone());
    state
        .bookmarks
        .lock()
        .unwrap()
        .retain(|b| b["paperId"] != key.as_str());
    Json(json!({"success": true})).into_response()
}
