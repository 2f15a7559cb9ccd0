mod configuration;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use parley::agent::Agent;
use parley::providers::openai::OpenAiProvider;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = configuration::Settings::new()?;

    let provider = OpenAiProvider::new(settings.provider.to_config())?;
    let agent = Agent::new(Arc::new(provider))
        .with_defaults(settings.provider.model.clone(), settings.provider.temperature)
        .with_direct_reply(settings.chat.direct_reply);

    let app = routes::configure(state::AppState::new(agent));

    let listener = tokio::net::TcpListener::bind(settings.server.socket_addr()?).await?;
    info!(
        model = %settings.provider.model,
        direct_reply = %settings.chat.direct_reply,
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;
    Ok(())
}
