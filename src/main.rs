use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use samastu::api::router;
use samastu::config::AppConfig;
use samastu::db;
use samastu::llm::{GeminiPlanGenerator, NoopPlanGenerator, PlanGenerator};
use samastu::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "samastu=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::init_pool(&config.database_url, 5).await?;
    db::seed::seed_default_catalog(&pool).await?;

    let planner: Arc<dyn PlanGenerator> = match config.gemini.clone() {
        Some(gemini) => {
            info!("AI plan generation enabled (model {})", gemini.model);
            Arc::new(GeminiPlanGenerator::new(gemini)?)
        }
        None => {
            warn!("GEMINI_API_KEY not set; using the default workout catalog only");
            Arc::new(NoopPlanGenerator)
        }
    };

    let app = router(AppState::new(pool, planner));

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
