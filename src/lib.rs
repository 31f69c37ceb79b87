//! FinSight client core
//!
//! Typed access to the FinSight personal-finance backend plus the
//! client-side estimators the web app runs locally:
//! - Token session with pluggable storage and legacy-key migration
//! - Finance API client (accounts, transactions, budgets, goals, dashboard)
//! - Learning API client with demo-token bootstrap and a single 401 retry
//! - FIRE, tax, portfolio and planning calculators
//! - A small axum service exposing the calculators

pub mod api;
pub mod calculators;
pub mod categorizer;
pub mod client;
pub mod config;
pub mod de;
pub mod error;
pub mod format;
pub mod learning;
pub mod models;
pub mod session;

pub use error::{FinsightError, Result};

// Re-export common types
pub use client::ApiClient;
pub use config::ClientConfig;
pub use learning::LearningClient;
pub use session::Session;
