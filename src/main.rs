//! Maternity risk server: loads configuration, wires adapters, serves HTTP.

use std::error::Error;
use std::sync::Arc;

use axum::Router;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use maternity_risk::adapters::ai::ChatCompletionsEnhancementClient;
use maternity_risk::adapters::http::{risk_assessment_router, RiskAssessmentAppState};
use maternity_risk::adapters::postgres::{
    PostgresAssessmentCacheStore, PostgresHealthProfileReader,
};
use maternity_risk::application::{
    AIAugmentationOrchestrator, AssessmentAssembler, RiskAssessmentService,
};
use maternity_risk::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let pool = config.database.pool_options().connect(&config.database.url).await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    if !config.ai.has_api_key() {
        info!("No AI API key configured; assessments will be rule-based only");
    }
    let ai_client = Arc::new(ChatCompletionsEnhancementClient::new(config.ai.client_config())?);
    let orchestrator = AIAugmentationOrchestrator::new(ai_client, config.assessment.enhancement());

    let profiles = Arc::new(PostgresHealthProfileReader::new(pool.clone()));
    let service = RiskAssessmentService::new(
        profiles.clone(),
        profiles,
        Arc::new(PostgresAssessmentCacheStore::new(pool)),
        AssessmentAssembler::new(orchestrator),
    );

    let app: Router = risk_assessment_router()
        .with_state(RiskAssessmentAppState::new(Arc::new(service)))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.is_production() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("tracing init failed: {}", e);
    }
}
