//! In-process FinSight backend for client tests

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    reject_all: AtomicBool,
    fail_logout: AtomicBool,
}

pub struct MockBackend {
    addr: std::net::SocketAddr,
    state: Arc<MockState>,
}

impl MockBackend {
    pub const LOGIN_TOKEN: &'static str = "login-token-0001";
    pub const DEMO_TOKEN: &'static str = "demo-token-0002";

    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let router = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }

    /// Answer 401 to every protected endpoint, whatever the token
    pub async fn set_reject_all(&self, reject: bool) {
        self.state.reject_all.store(reject, Ordering::SeqCst);
    }

    pub async fn set_fail_logout(&self, fail: bool) {
        self.state.fail_logout.store(fail, Ordering::SeqCst);
    }
}

fn goal_json(current: &str) -> Value {
    json!({
        "id": "g1",
        "name": "Emergency fund",
        "goal_type": "savings",
        "target_amount": "10000.00",
        "current_amount": current,
        "target_date": "2030-01-01",
        "progress_percentage": 25.0,
        "days_remaining": 1500
    })
}

fn user_json() -> Value {
    json!({
        "id": "u1",
        "username": "admin",
        "email": "admin@example.com",
        "first_name": "Admin",
        "last_name": "User",
        "monthly_income": "6000.00",
        "currency": "USD",
        "timezone": "UTC"
    })
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().await.push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: authorization.clone(),
        request_id: headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    let valid = !state.reject_all.load(Ordering::SeqCst)
        && matches!(
            authorization.as_deref().and_then(|h| h.strip_prefix("Token ")),
            Some(MockBackend::LOGIN_TOKEN) | Some(MockBackend::DEMO_TOKEN)
        );

    // public endpoints
    match (method.as_str(), path.as_str()) {
        ("GET", "/api/health/") => {
            return Json(json!({ "status": "healthy" })).into_response();
        }
        ("POST", "/api/auth/login/") | ("POST", "/api/auth/register/") => {
            return Json(json!({
                "user": user_json(),
                "token": MockBackend::LOGIN_TOKEN,
                "message": "ok"
            }))
            .into_response();
        }
        ("POST", "/api/auth/logout/") => {
            return if state.fail_logout.load(Ordering::SeqCst) {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            } else {
                Json(json!({ "message": "Logged out" })).into_response()
            };
        }
        ("GET", "/api/auth/demo-token/") => {
            return Json(json!({
                "token": MockBackend::DEMO_TOKEN,
                "user": { "id": 1, "username": "admin", "email": "admin@example.com",
                          "first_name": "Admin", "last_name": "User" }
            }))
            .into_response();
        }
        _ => {}
    }

    if !valid {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid token." })),
        )
            .into_response();
    }

    match (method.as_str(), path.as_str()) {
        ("GET", "/api/auth/me/") => Json(user_json()).into_response(),
        ("GET", "/api/goals/") => Json(json!([goal_json("2500.00")])).into_response(),
        ("POST", "/api/goals/g1/add-contribution/") => Json(goal_json("3000.00")).into_response(),
        ("DELETE", _) => StatusCode::NO_CONTENT.into_response(),
        ("GET", "/api/accounts/") | ("GET", "/api/budgets/") => Json(json!([])).into_response(),
        ("GET", "/api/categories/") => Json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{ "id": "c1", "name": "Groceries", "category_type": "expense" }]
        }))
        .into_response(),
        ("GET", "/api/transactions/") => Json(json!({
            "count": 1,
            "results": [{
                "id": "t1",
                "account": "a1",
                "amount": "-42.50",
                "transaction_type": "debit",
                "description": "Coffee beans",
                "transaction_date": "2025-03-04T09:15:00Z"
            }]
        }))
        .into_response(),
        ("GET", "/api/learning/api/courses/") => Json(json!([{
            "id": "course-1",
            "title": "Budgeting Basics",
            "description": "Learn to budget",
            "difficulty": "beginner",
            "status": "active",
            "total_lessons": 2,
            "lessons": [
                { "id": "l1", "title": "Why budget", "lesson_type": "reading", "order": 1 },
                { "id": "l2", "title": "Quiz", "lesson_type": "quiz", "order": 2, "passing_score": 70 }
            ]
        }]))
        .into_response(),
        ("POST", "/api/learning/api/daily-challenges/ch1/attempt/") => Json(json!({
            "message": "Correct!",
            "is_correct": true,
            "points_earned": 10,
            "explanation": "Compound interest grows on interest.",
            "attempt": {
                "id": "at1",
                "challenge": "ch1",
                "user_answer": "B",
                "is_correct": true,
                "points_earned": 10,
                "time_taken_seconds": 12,
                "attempted_at": "2025-03-04T09:15:00Z"
            }
        }))
        .into_response(),
        ("GET", "/api/learning/api/analytics/") => Json(json!({
            "total_courses_enrolled": 3,
            "total_courses_completed": 1,
            "total_lessons_completed": 7,
            "total_time_spent_hours": 4.5,
            "total_points_earned": 120,
            "current_streak": 2,
            "longest_streak": 5
        }))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response(),
    }
}
