use finsight_core::{
    calculators::{fire, tax, Allocation, FireInputs, TaxInputs, TaxTable},
    format::{format_currency, format_money, format_percentage},
    ApiClient, ClientConfig, LearningClient,
};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::from_env()?;
    info!(api = %config.api_base_url, demo_auth = config.demo_auth, "FinSight client starting");

    let client = ApiClient::from_config(&config).await?;

    match client.health().await {
        Ok(status) => info!(%status, "Backend reachable"),
        Err(e) => warn!(error = %e, "Backend health check failed"),
    }

    if !client.is_authenticated().await && client.demo_login().await.is_none() {
        warn!("No token available; skipping account data");
    }

    if client.is_authenticated().await {
        print_account_overview(&client).await;
    }

    let learning = LearningClient::new(&config, Arc::clone(client.session()))?;
    match learning.courses().await {
        Ok(courses) => {
            for course in &courses {
                println!(
                    "📚 {} ({} lessons, {})",
                    course.title, course.total_lessons, course.difficulty
                );
            }
        }
        Err(e) => warn!(error = %e, "Could not load courses: {}", e.user_message()),
    }

    print_estimates()?;

    Ok(())
}

async fn print_account_overview(client: &ApiClient) {
    match client.dashboard().await {
        Ok(dashboard) => {
            println!(
                "💰 Balance {} across {} accounts, savings rate {}",
                format_money(dashboard.total_balance, &dashboard.user_currency),
                dashboard.account_count,
                format_percentage(dashboard.savings_rate.to_f64().unwrap_or(0.0), 1)
            );
        }
        Err(e) => warn!(error = %e, "Dashboard unavailable: {}", e.user_message()),
    }

    match client.goals().await {
        Ok(goals) => {
            let today = Utc::now().date_naive();
            for goal in &goals {
                println!(
                    "🎯 {} {} of {} ({} days left)",
                    goal.name,
                    format_percentage(goal.progress_percent(), 0),
                    format_money(goal.target_amount, "USD"),
                    goal.days_remaining(today)
                );
            }
        }
        Err(e) => warn!(error = %e, "Goals unavailable: {}", e.user_message()),
    }
}

fn print_estimates() -> finsight_core::Result<()> {
    let projection = fire::project(&FireInputs::default())?;
    println!(
        "🔥 FIRE number {}, projected {} in {} years ({})",
        format_currency(projection.fire_number, "USD"),
        format_currency(projection.projected_savings, "USD"),
        projection.years_to_retirement,
        format_percentage(projection.progress_percent, 1)
    );

    let estimate = tax::estimate(&TaxInputs::default(), &TaxTable::federal_2024())?;
    println!(
        "🧾 Tax {} (effective {}, marginal {})",
        format_currency(estimate.total_tax, "USD"),
        format_percentage(estimate.effective_rate, 1),
        format_percentage(estimate.marginal_rate, 0)
    );

    let portfolio = Allocation::default().summary();
    println!(
        "📈 Portfolio return {}, risk {}, grade {}",
        format_percentage(portfolio.expected_return, 1),
        format_percentage(portfolio.risk, 1),
        portfolio.grade
    );

    Ok(())
}
