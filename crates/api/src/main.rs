use anyhow::Result;
use speechact_api::{build_app, ApiConfig};
use speechact_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("speechact_api");

    let config = ApiConfig::from_env()?;
    let app = build_app(&config);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        bind = %config.bind,
        model = %config.model.model_name,
        "speech act tagger api started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
