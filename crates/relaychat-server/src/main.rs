use std::sync::Arc;

use relaychat_agent::{AgentConfig, AgentInvoker, HttpAgentRuntime};
use relaychat_server::config::ServerConfig;
use relaychat_server::{AppState, router};

#[tokio::main]
async fn main() {
    // Initialize tracing logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,relaychat_server=debug".into()),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting RelayChat relay server");

    // Fail fast on incomplete agent configuration.
    let agent_config = AgentConfig::from_env().expect("Failed to load agent configuration");
    let runtime = Arc::new(HttpAgentRuntime::new(&agent_config));
    let state = AppState {
        invoker: AgentInvoker::new(runtime, &agent_config),
    };

    let server_config = ServerConfig::from_env();
    let app = router(state);

    let addr = format!("{}:{}", server_config.host, server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");

    tracing::info!("RelayChat running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
