// # ddnsd - DDNS Daemon
//
// Thin integration layer. All reconciliation logic lives in ddns-core.
//
// The ddnsd daemon is responsible for:
// 1. Parsing the command line (`--config <path>`, default `ddns.yml`)
// 2. Loading and validating the configuration file
// 3. Initializing logging and the runtime
// 4. Building the IP resolver and DigitalOcean client
// 5. Running the DDNS engine until the process is killed
//
// ## Configuration
//
// ```yaml
// token: "dop_v1_..."
// source: "https://api.ipify.org"
// interval: 300
// records:
//   - domain: example.com
//     subdomains: [home, vpn]
// ```
//
// ### Environment
// - `DDNS_LOG_LEVEL`: trace, debug, info (default), warn, error

use anyhow::{Context, Result};
use clap::Parser;
use ddns_core::{DdnsConfig, DdnsEngine};
use ddns_ip_http::HttpIpResolver;
use ddns_provider_digitalocean::DigitalOceanProvider;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Keep DigitalOcean A records pointed at this host's public IP
#[derive(Parser, Debug)]
#[command(name = "ddnsd", version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, value_name = "PATH", default_value = "ddns.yml")]
    config: PathBuf,
}

/// Map `DDNS_LOG_LEVEL` to a tracing level
fn parse_log_level(value: &str) -> Result<Level> {
    match value.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            value
        ),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match parse_log_level(
        &std::env::var("DDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
    ) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    // Load configuration
    let config = match DdnsConfig::load(&cli.config) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("{}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if config.records.is_empty() {
        warn!(
            "No records configured in {}; nothing will be updated",
            cli.config.display()
        );
    }

    info!("Starting ddnsd daemon");
    info!("Configuration loaded: {} record(s)", config.target_count());

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Arc<DdnsConfig>) -> Result<()> {
    let resolver = HttpIpResolver::new().context("Failed to build IP resolver")?;
    let provider = DigitalOceanProvider::new(config.token.clone())
        .context("Failed to build DigitalOcean client")?;

    for (domain, subdomain) in config.targets() {
        info!("Managing record: {}.{}", subdomain, domain);
    }

    // Every event is also a log line, so the receiver is dropped right away.
    let (engine, _) = DdnsEngine::new(config, Box::new(resolver), Arc::new(provider))?;

    engine.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_flag_defaults_to_ddns_yml() {
        let cli = Cli::try_parse_from(["ddnsd"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("ddns.yml"));
    }

    #[test]
    fn test_config_flag_override() {
        let cli = Cli::try_parse_from(["ddnsd", "--config", "/etc/ddns/ddns.yml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/ddns/ddns.yml"));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["ddnsd", "--interval", "5"]).is_err());
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert!(parse_log_level("verbose").is_err());
    }
}
