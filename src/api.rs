//! REST API server for the FinSight estimators
//!
//! Exposes the pure calculators over HTTP so the web front end (or any
//! other client) can share one implementation.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::calculators::planning::{self, Debt, HealthProfile, PayoffStrategy};
use crate::calculators::{fire, tax, Allocation, FireInputs, TaxBracket, TaxInputs, TaxTable};
use crate::categorizer::suggest_category;
use crate::error::FinsightError;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct TaxRequest {
    #[serde(flatten)]
    pub inputs: TaxInputs,
    /// Custom bracket table; the 2024 federal table when absent
    pub brackets: Option<Vec<TaxBracket>>,
    pub state_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LoanRequest {
    pub principal: f64,
    /// Annual rate as a fraction
    pub annual_rate: f64,
    pub term_years: f64,
}

#[derive(Debug, Deserialize)]
pub struct DebtPlanRequest {
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub strategy: PayoffStrategy,
}

#[derive(Debug, Deserialize)]
pub struct CategorizeRequest {
    #[serde(default)]
    pub merchant: String,
    #[serde(default)]
    pub description: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type Reply = (StatusCode, Json<ApiResponse>);

fn respond<T: Serialize>(result: crate::Result<T>) -> Reply {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))),
        Err(FinsightError::InvalidInput(msg)) => {
            warn!(error = %msg, "Rejected calculator input");
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(msg)))
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        ),
    }
}

/// Malformed bodies get the envelope too, instead of axum's plain-text 422
fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Reply> {
    body.map(|Json(value)| value).map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(rejection.body_text())),
        )
    })
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub tax_table: Arc<TaxTable>,
}

impl Default for ApiState {
    fn default() -> Self {
        Self {
            tax_table: Arc::new(TaxTable::federal_2024()),
        }
    }
}

/// =============================
/// Handlers
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn fire_projection(body: Result<Json<FireInputs>, JsonRejection>) -> Reply {
    let inputs = match parse_body(body) {
        Ok(inputs) => inputs,
        Err(reply) => return reply,
    };
    respond(fire::project(&inputs))
}

async fn tax_estimate(
    State(state): State<ApiState>,
    body: Result<Json<TaxRequest>, JsonRejection>,
) -> Reply {
    let req = match parse_body(body) {
        Ok(req) => req,
        Err(reply) => return reply,
    };

    let result = match (req.brackets, req.state_rate) {
        (None, None) => tax::estimate(&req.inputs, &state.tax_table),
        (brackets, state_rate) => TaxTable::new(
            brackets.unwrap_or_else(|| state.tax_table.brackets().to_vec()),
            state_rate.unwrap_or_else(|| state.tax_table.state_rate()),
        )
        .and_then(|table| tax::estimate(&req.inputs, &table)),
    };
    respond(result)
}

async fn portfolio_blend(body: Result<Json<Allocation>, JsonRejection>) -> Reply {
    match parse_body(body) {
        Ok(allocation) => respond(Ok(allocation.summary())),
        Err(reply) => reply,
    }
}

async fn loan_payment(body: Result<Json<LoanRequest>, JsonRejection>) -> Reply {
    let req = match parse_body(body) {
        Ok(req) => req,
        Err(reply) => return reply,
    };
    respond(
        planning::loan_payment(req.principal, req.annual_rate, req.term_years).map(
            |monthly_payment| {
                serde_json::json!({
                    "monthly_payment": monthly_payment,
                    "total_paid": monthly_payment * req.term_years * 12.0,
                })
            },
        ),
    )
}

async fn debt_plan(body: Result<Json<DebtPlanRequest>, JsonRejection>) -> Reply {
    match parse_body(body) {
        Ok(req) => {
            info!(debts = req.debts.len(), strategy = ?req.strategy, "Building debt plan");
            respond(Ok(planning::debt_plan(req.debts, req.strategy)))
        }
        Err(reply) => reply,
    }
}

async fn health_score(body: Result<Json<HealthProfile>, JsonRejection>) -> Reply {
    match parse_body(body) {
        Ok(profile) => respond(Ok(serde_json::json!({
            "score": planning::health_score(&profile)
        }))),
        Err(reply) => reply,
    }
}

async fn categorize(body: Result<Json<CategorizeRequest>, JsonRejection>) -> Reply {
    match parse_body(body) {
        Ok(req) => respond(Ok(serde_json::json!({
            "category": suggest_category(&req.merchant, &req.description)
        }))),
        Err(reply) => reply,
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/calculators/fire", post(fire_projection))
        .route("/api/calculators/tax", post(tax_estimate))
        .route("/api/calculators/portfolio", post(portfolio_blend))
        .route("/api/calculators/loan", post(loan_payment))
        .route("/api/calculators/debt-plan", post(debt_plan))
        .route("/api/calculators/health-score", post(health_score))
        .route("/api/categorize", post(categorize))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(port: u16) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(ApiState::default());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Calculator API listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let router = create_router(ApiState::default());
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_fire_projection() {
        let inputs = serde_json::to_value(FireInputs::default()).unwrap();
        let (status, body) = call("POST", "/api/calculators/fire", Some(inputs)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["fire_number"], 1_250_000.0);
        assert_eq!(body["data"]["progress_percent"], 100.0);
    }

    #[tokio::test]
    async fn test_fire_invalid_ages_is_bad_request() {
        let inputs = json!({
            "current_age": 60, "retirement_age": 50, "current_savings": 0,
            "monthly_contribution": 0, "expected_return": 7,
            "annual_expenses": 40000, "withdrawal_rate": 4
        });
        let (status, body) = call("POST", "/api/calculators/fire", Some(inputs)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("retirement age"));
    }

    #[tokio::test]
    async fn test_fire_absurd_retirement_age_is_bad_request() {
        let inputs = json!({
            "current_age": 30, "retirement_age": 400_000_000u32, "current_savings": 0,
            "monthly_contribution": 1000, "expected_return": 7,
            "annual_expenses": 40000, "withdrawal_rate": 4
        });
        let (status, body) = call("POST", "/api/calculators/fire", Some(inputs)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("at most 150"));
    }

    #[tokio::test]
    async fn test_tax_default_and_custom_table() {
        let (status, body) = call(
            "POST",
            "/api/calculators/tax",
            Some(json!({ "income": 0, "deductions": 12950 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["effective_rate"], 0.0);

        let (status, body) = call(
            "POST",
            "/api/calculators/tax",
            Some(json!({
                "income": 20000, "deductions": 0, "state_rate": 0.0,
                "brackets": [
                    { "min": 0, "max": 10000, "rate": 0.0 },
                    { "min": 10000, "max": null, "rate": 0.1 }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["federal_tax"], 1000.0);
        assert_eq!(body["data"]["marginal_rate"], 10.0);

        let (status, body) = call(
            "POST",
            "/api/calculators/tax",
            Some(json!({
                "income": 1000000, "deductions": 0,
                "brackets": [
                    { "min": 0, "max": 10000, "rate": 0.0 },
                    { "min": 10000, "max": 20000, "rate": 0.3 }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("unbounded"));
    }

    #[tokio::test]
    async fn test_portfolio_rejects_overweight_allocation() {
        let (status, body) = call(
            "POST",
            "/api/calculators/portfolio",
            Some(json!({ "stocks": 80, "bonds": 30 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = call(
            "POST",
            "/api/calculators/portfolio",
            Some(json!({ "stocks": 60, "bonds": 30, "crypto": 5, "reits": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["grade"], "A+");
    }

    #[tokio::test]
    async fn test_loan_and_debt_plan() {
        let (status, body) = call(
            "POST",
            "/api/calculators/loan",
            Some(json!({ "principal": 12000, "annual_rate": 0.0, "term_years": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["monthly_payment"], 1000.0);

        let (status, body) = call(
            "POST",
            "/api/calculators/debt-plan",
            Some(json!({
                "strategy": "snowball",
                "debts": [
                    { "id": "car", "balance": 8000, "interest_rate": 0.05 },
                    { "id": "card", "balance": 2000, "interest_rate": 0.22 }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["id"], "card");
        assert_eq!(body["data"][0]["priority"], 1);
    }

    #[tokio::test]
    async fn test_health_score_and_categorize() {
        let (_, body) = call(
            "POST",
            "/api/calculators/health-score",
            Some(json!({
                "net_worth": 0, "monthly_income": 0, "monthly_expenses": 0,
                "total_debt": 0, "emergency_fund": 0
            })),
        )
        .await;
        assert_eq!(body["data"]["score"], 50);

        let (_, body) = call(
            "POST",
            "/api/categorize",
            Some(json!({ "merchant": "Starbucks" })),
        )
        .await;
        assert_eq!(body["data"]["category"], "Food & Drink");
    }

    #[tokio::test]
    async fn test_malformed_body_uses_envelope() {
        let (status, body) = call(
            "POST",
            "/api/calculators/loan",
            Some(json!({ "principal": "lots" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
}
