//! Typed client for the FinSight REST API
//!
//! One method per endpoint. Every call except login, register and health
//! needs a session token (or the demo-auth policy).

use crate::config::ClientConfig;
use crate::models::{
    Account, AccountPayload, AuthResponse, Budget, BudgetPayload, Category, CategoryPayload,
    DashboardData, Goal, GoalContribution, GoalPayload, LoginRequest, Paginated, ProfileUpdate,
    RegisterRequest, Transaction, TransactionPayload, TransactionQuery, User,
};
use crate::session::{FileTokenStore, InMemoryTokenStore, Session, TokenStore};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub mod demo;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use demo::DemoAuthenticator;
pub use transport::{AuthPolicy, RequestSpec, Transport};

/// List endpoints answer either a bare array or a DRF page
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Plain(Vec<T>),
    Page(Paginated<T>),
}

impl<T> ListResponse<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Plain(items) => items,
            ListResponse::Page(page) => page.results,
        }
    }
}

/// Build the token store selected by configuration
pub fn token_store_for(config: &ClientConfig) -> Arc<dyn TokenStore> {
    match &config.token_file {
        Some(path) => Arc::new(FileTokenStore::new(path)),
        None => Arc::new(InMemoryTokenStore::new()),
    }
}

pub struct ApiClient {
    transport: Transport,
}

impl ApiClient {
    /// Build a client with a session loaded from the configured token store
    pub async fn from_config(config: &ClientConfig) -> Result<Self> {
        let session = Arc::new(Session::load(token_store_for(config)).await?);
        Self::with_session(config, session)
    }

    pub fn with_session(config: &ClientConfig, session: Arc<Session>) -> Result<Self> {
        let http = transport::build_http_client(config)?;
        let policy = if config.demo_auth {
            AuthPolicy::DemoFallback
        } else {
            AuthPolicy::RequireToken
        };

        Ok(Self {
            transport: Transport::new(
                http,
                config.api_base_url.clone(),
                config.api_base_url.clone(),
                session,
                policy,
            ),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        self.transport.session()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session().is_authenticated().await
    }

    pub async fn auth_token(&self) -> Option<String> {
        self.session().token().await
    }

    /// Obtain a demo token (validating any stored token first)
    pub async fn demo_login(&self) -> Option<String> {
        self.transport.demo().acquire(self.session()).await
    }

    // =============================
    // Health & Auth
    // =============================

    pub async fn health(&self) -> Result<serde_json::Value> {
        self.transport
            .request(RequestSpec::get("/health/").public())
            .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .transport
            .request(RequestSpec::post("/auth/register/").public().json(request)?)
            .await?;
        self.session().set_token(&response.token).await?;
        info!(username = %response.user.username, "Registered");
        Ok(response)
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .transport
            .request(RequestSpec::post("/auth/login/").public().json(credentials)?)
            .await?;
        self.session().set_token(&response.token).await?;
        info!(username = %response.user.username, "Logged in");
        Ok(response)
    }

    /// Log out server-side when possible; the local token is always cleared
    pub async fn logout(&self) {
        let session = self.session();
        let authorization = session.authorization_header().await;

        if !session.begin_logout() {
            return;
        }

        if authorization.is_some() {
            let spec = RequestSpec::post("/auth/logout/")
                .public()
                .authorization(authorization);
            if let Err(e) = self.transport.request_empty(spec).await {
                warn!(error = %e, "Logout error");
            }
        }

        if let Err(e) = session.clear().await {
            warn!(error = %e, "Failed to clear token on logout");
        }
        session.end_logout();
    }

    // =============================
    // Dashboard & Profile
    // =============================

    pub async fn dashboard(&self) -> Result<DashboardData> {
        self.transport.request(RequestSpec::get("/dashboard/")).await
    }

    pub async fn profile(&self) -> Result<User> {
        self.transport.request(RequestSpec::get("/users/profile/")).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.transport
            .request(RequestSpec::patch("/users/update_profile/").json(update)?)
            .await
    }

    // =============================
    // Accounts
    // =============================

    pub async fn accounts(&self) -> Result<Vec<Account>> {
        self.list("/accounts/").await
    }

    pub async fn create_account(&self, payload: &AccountPayload) -> Result<Account> {
        self.create("/accounts/", payload).await
    }

    pub async fn update_account(&self, id: &str, payload: &AccountPayload) -> Result<Account> {
        self.update("/accounts/", id, payload).await
    }

    pub async fn delete_account(&self, id: &str) -> Result<()> {
        self.delete("/accounts/", id).await
    }

    // =============================
    // Transactions
    // =============================

    pub async fn transactions(&self, query: &TransactionQuery) -> Result<Paginated<Transaction>> {
        self.transport
            .request(RequestSpec::get("/transactions/").query(query)?)
            .await
    }

    pub async fn create_transaction(&self, payload: &TransactionPayload) -> Result<Transaction> {
        self.create("/transactions/", payload).await
    }

    pub async fn update_transaction(
        &self,
        id: &str,
        payload: &TransactionPayload,
    ) -> Result<Transaction> {
        self.update("/transactions/", id, payload).await
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<()> {
        self.delete("/transactions/", id).await
    }

    // =============================
    // Categories
    // =============================

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.list("/categories/").await
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<Category> {
        self.create("/categories/", payload).await
    }

    pub async fn update_category(&self, id: &str, payload: &CategoryPayload) -> Result<Category> {
        self.update("/categories/", id, payload).await
    }

    pub async fn delete_category(&self, id: &str) -> Result<()> {
        self.delete("/categories/", id).await
    }

    // =============================
    // Budgets
    // =============================

    pub async fn budgets(&self) -> Result<Vec<Budget>> {
        self.list("/budgets/").await
    }

    pub async fn create_budget(&self, payload: &BudgetPayload) -> Result<Budget> {
        self.create("/budgets/", payload).await
    }

    pub async fn update_budget(&self, id: &str, payload: &BudgetPayload) -> Result<Budget> {
        self.update("/budgets/", id, payload).await
    }

    pub async fn delete_budget(&self, id: &str) -> Result<()> {
        self.delete("/budgets/", id).await
    }

    // =============================
    // Goals
    // =============================

    pub async fn goals(&self) -> Result<Vec<Goal>> {
        self.list("/goals/").await
    }

    pub async fn create_goal(&self, payload: &GoalPayload) -> Result<Goal> {
        self.create("/goals/", payload).await
    }

    pub async fn update_goal(&self, id: &str, payload: &GoalPayload) -> Result<Goal> {
        self.update("/goals/", id, payload).await
    }

    pub async fn delete_goal(&self, id: &str) -> Result<()> {
        self.delete("/goals/", id).await
    }

    pub async fn add_goal_contribution(
        &self,
        goal_id: &str,
        contribution: &GoalContribution,
    ) -> Result<Goal> {
        self.transport
            .request(
                RequestSpec::post(format!("/goals/{}/add-contribution/", goal_id))
                    .json(contribution)?,
            )
            .await
    }

    // =============================
    // Generic Access
    // =============================

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.transport.request(RequestSpec::get(endpoint)).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.transport
            .request(RequestSpec::post(endpoint).json(body)?)
            .await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.transport
            .request(RequestSpec::put(endpoint).json(body)?)
            .await
    }

    async fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let response: ListResponse<T> = self.transport.request(RequestSpec::get(collection)).await?;
        Ok(response.into_vec())
    }

    async fn create<B, T>(&self, collection: &str, payload: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.transport
            .request(RequestSpec::post(collection).json(payload)?)
            .await
    }

    async fn update<B, T>(&self, collection: &str, id: &str, payload: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.transport
            .request(RequestSpec::patch(format!("{}{}/", collection, id)).json(payload)?)
            .await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.transport
            .request_empty(RequestSpec::delete(format!("{}{}/", collection, id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockBackend;
    use super::*;
    use crate::error::FinsightError;
    use crate::session::AUTH_TOKEN_KEY;
    use rust_decimal::Decimal;

    async fn client_for(backend: &MockBackend, demo_auth: bool) -> (ApiClient, Arc<InMemoryTokenStore>) {
        let store = Arc::new(InMemoryTokenStore::new());
        let session = Arc::new(Session::load(store.clone()).await.unwrap());
        let mut config = ClientConfig::new(backend.base_url());
        config.demo_auth = demo_auth;
        (ApiClient::with_session(&config, session).unwrap(), store)
    }

    #[tokio::test]
    async fn test_requires_token_before_sending() {
        let backend = MockBackend::start().await;
        let (client, _) = client_for(&backend, false).await;

        let result = client.goals().await;

        assert!(matches!(result, Err(FinsightError::AuthenticationRequired)));
        assert!(backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_login_stores_token_and_attaches_header() {
        let backend = MockBackend::start().await;
        let (client, store) = client_for(&backend, false).await;

        let auth = client
            .login(&LoginRequest {
                email: "admin@example.com".into(),
                password: "admin123".into(),
            })
            .await
            .unwrap();
        assert_eq!(auth.token, MockBackend::LOGIN_TOKEN);
        assert_eq!(
            store.get(AUTH_TOKEN_KEY).await.unwrap().as_deref(),
            Some(MockBackend::LOGIN_TOKEN)
        );

        let goals = client.goals().await.unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].progress_percent(), 25.0);

        let requests = backend.requests().await;
        let last = requests.last().unwrap();
        assert_eq!(last.path, "/api/goals/");
        assert_eq!(
            last.authorization.as_deref(),
            Some(format!("Token {}", MockBackend::LOGIN_TOKEN).as_str())
        );
        assert!(last.request_id.is_some());
    }

    #[tokio::test]
    async fn test_unauthorized_clears_token_and_next_request_is_bare() {
        let backend = MockBackend::start().await;
        let (client, store) = client_for(&backend, false).await;
        client.session().set_token("stale-token").await.unwrap();

        let result = client.budgets().await;
        assert!(matches!(result, Err(FinsightError::Unauthorized(_))));
        assert!(!client.is_authenticated().await);
        assert!(store.get(AUTH_TOKEN_KEY).await.unwrap().is_none());

        // no stale header can leak into a later call
        let health = client.health().await.unwrap();
        assert_eq!(health["status"], "healthy");
        let requests = backend.requests().await;
        assert!(requests.last().unwrap().authorization.is_none());
    }

    #[tokio::test]
    async fn test_demo_fallback_retries_once() {
        let backend = MockBackend::start().await;
        let (client, _) = client_for(&backend, true).await;
        client.session().set_token("stale-token").await.unwrap();

        let goals = client.goals().await.unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(client.auth_token().await.as_deref(), Some(MockBackend::DEMO_TOKEN));

        let goal_calls: Vec<_> = backend
            .requests()
            .await
            .into_iter()
            .filter(|r| r.path == "/api/goals/")
            .collect();
        assert_eq!(goal_calls.len(), 2);
        assert_eq!(
            goal_calls[1].authorization.as_deref(),
            Some(format!("Token {}", MockBackend::DEMO_TOKEN).as_str())
        );
    }

    #[tokio::test]
    async fn test_demo_fallback_gives_up_after_one_retry() {
        let backend = MockBackend::start().await;
        backend.set_reject_all(true).await;
        let (client, _) = client_for(&backend, true).await;

        let result = client.accounts().await;
        assert!(matches!(result, Err(FinsightError::Unauthorized(_))));

        let account_calls = backend
            .requests()
            .await
            .into_iter()
            .filter(|r| r.path == "/api/accounts/")
            .count();
        assert_eq!(account_calls, 2);
    }

    #[tokio::test]
    async fn test_logout_always_clears_token() {
        let backend = MockBackend::start().await;
        backend.set_fail_logout(true).await;
        let (client, store) = client_for(&backend, false).await;
        client.session().set_token(MockBackend::LOGIN_TOKEN).await.unwrap();

        client.logout().await;

        assert!(!client.is_authenticated().await);
        assert!(store.get(AUTH_TOKEN_KEY).await.unwrap().is_none());
        assert!(!client.session().is_logging_out());

        let requests = backend.requests().await;
        let logout = requests.iter().find(|r| r.path == "/api/auth/logout/").unwrap();
        assert_eq!(
            logout.authorization.as_deref(),
            Some(format!("Token {}", MockBackend::LOGIN_TOKEN).as_str())
        );
    }

    #[tokio::test]
    async fn test_transactions_query_and_paginated_lists() {
        let backend = MockBackend::start().await;
        let (client, _) = client_for(&backend, false).await;
        client.session().set_token(MockBackend::LOGIN_TOKEN).await.unwrap();

        let page = client
            .transactions(&TransactionQuery {
                page: Some(1),
                page_size: Some(20),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].amount, Decimal::new(-4250, 2));

        let requests = backend.requests().await;
        let query = requests.last().unwrap().query.clone().unwrap_or_default();
        assert!(query.contains("page=1"));
        assert!(query.contains("page_size=20"));

        // categories come back as a DRF page rather than a bare array
        let categories = client.categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Groceries");
    }

    #[tokio::test]
    async fn test_delete_and_contribution() {
        let backend = MockBackend::start().await;
        let (client, _) = client_for(&backend, false).await;
        client.session().set_token(MockBackend::LOGIN_TOKEN).await.unwrap();

        client.delete_goal("g1").await.unwrap();

        let goal = client
            .add_goal_contribution(
                "g1",
                &GoalContribution {
                    amount: Decimal::new(50000, 2),
                    description: Some("bonus".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(goal.current_amount, Decimal::new(3000, 0));

        let requests = backend.requests().await;
        assert!(requests
            .iter()
            .any(|r| r.method == "DELETE" && r.path == "/api/goals/g1/"));
        let contribution = requests.last().unwrap();
        assert_eq!(contribution.body.as_ref().unwrap()["amount"], "500.00");
    }
}
