use chatrs_config::Config;
use chatrs_session::SessionStore;
use chatrs_web::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use super::build_gateway;

/// Input parameters for the Serve command strategy.
#[derive(Debug, Clone)]
pub struct ServeInput {
    /// Bind address override
    pub host: Option<String>,
    /// Port override
    pub port: Option<u16>,
}

/// Strategy for running the browser chat app.
#[derive(Debug, Clone, Copy)]
pub struct ServeStrategy;

impl super::CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default()?;
        let web = &config.web;

        let host = input.host.unwrap_or_else(|| web.host.clone());
        let port = input.port.unwrap_or(web.port);
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {host}:{port}: {e}"))?;

        let gateway = build_gateway(&config, None)?;
        let store = SessionStore::new(web.session_idle_timeout())
            .with_default_credential(config.default_credential());

        info!(
            "Sessions expire after {}s idle; default API key {}",
            web.session_idle_secs,
            if config.default_credential().is_empty() {
                "not set"
            } else {
                "set"
            }
        );

        let state =
            AppState::new(store, Arc::new(gateway)).with_secure_cookies(web.secure_cookies);
        chatrs_web::serve(state, addr).await?;

        Ok(())
    }
}
