//! Startup helpers shared by the binaries.

use std::process::ExitCode;

use crate::common::config::ApiConfig;
use crate::server::{self, AppState};

/// Environment variable overriding the relay port.
pub const PORT_ENV: &str = "CHATKIT_PORT";

/// Install the `tracing` subscriber, `info` unless `RUST_LOG` says otherwise.
///
/// Logs go to stderr so they never interleave with chat output.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the relay server (used by the `chatkit-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();
    tracing::info!("starting chatkit relay v{}", env!("CARGO_PKG_VERSION"));

    let config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("failed to create state: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let port = get_port();
    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, port, shutdown_signal())) {
        tracing::error!("server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

/// Configured relay port.
#[must_use]
pub fn get_port() -> u16 {
    port_from(std::env::var(PORT_ENV).ok().as_deref())
}

fn port_from(raw: Option<&str>) -> u16 {
    raw.and_then(|p| p.trim().parse().ok())
        .unwrap_or(server::DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_parsing() {
        assert_eq!(port_from(None), server::DEFAULT_PORT);
        assert_eq!(port_from(Some("8080")), 8080);
        assert_eq!(port_from(Some(" 9000 ")), 9000);
        assert_eq!(port_from(Some("not-a-port")), server::DEFAULT_PORT);
        assert_eq!(port_from(Some("70000")), server::DEFAULT_PORT);
    }
}
