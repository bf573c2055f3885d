//! Gateway entrypoint: load configuration from the environment, build
//! [`AppState`], and serve until a shutdown signal arrives.

use std::net::SocketAddr;

use nebula_api::config::ApiConfig;
use nebula_api::state::AppState;
use nebula_credential_builtin::RawProviderConfig;
use nebula_log::Config as LogConfig;
use nebula_schema::SecretString;

const PROVIDERS: &[&str] = &["google_calendar", "github", "slack"];

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn load_config() -> ApiConfig {
    let bind_addr: SocketAddr =
        env_or("NEBULA_BIND_ADDR", "0.0.0.0:8080").parse().expect("NEBULA_BIND_ADDR must be host:port");
    let secret = std::env::var("NEBULA_CREDENTIAL_ENCRYPTION_SECRET")
        .expect("NEBULA_CREDENTIAL_ENCRYPTION_SECRET must be set");

    let mut config = ApiConfig::new(bind_addr, SecretString::new(secret));
    config.log_level = env_or("NEBULA_LOG_LEVEL", &config.log_level);

    for provider in PROVIDERS {
        let prefix = format!("NEBULA_PROVIDER_{}", provider.to_uppercase());
        let Ok(client_id) = std::env::var(format!("{prefix}_CLIENT_ID")) else { continue };
        let Ok(client_secret) = std::env::var(format!("{prefix}_CLIENT_SECRET")) else { continue };
        let Ok(authorize_url) = std::env::var(format!("{prefix}_AUTHORIZE_URL")) else { continue };
        let Ok(token_url) = std::env::var(format!("{prefix}_TOKEN_URL")) else { continue };
        let default_scopes = std::env::var(format!("{prefix}_DEFAULT_SCOPES"))
            .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();
        config = config.with_provider(
            *provider,
            RawProviderConfig {
                client_id,
                client_secret: SecretString::new(client_secret),
                authorize_url,
                token_url,
                default_scopes,
            },
        );
    }

    config
}

#[tokio::main]
async fn main() {
    let config = load_config();
    let _guard = nebula_log::init(LogConfig { level: config.log_level.clone(), ..LogConfig::default() })
        .expect("failed to install logger");

    let bind_addr = config.bind_addr;
    let state = AppState::build(config).expect("failed to assemble gateway state");
    let router = nebula_api::router::build_router(state);

    nebula_log::info!(%bind_addr, "starting nebula-server");
    let listener = tokio::net::TcpListener::bind(bind_addr).await.expect("failed to bind listener");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    nebula_log::info!("shutdown signal received");
}
