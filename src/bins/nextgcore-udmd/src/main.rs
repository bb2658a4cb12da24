//! NextGCore UDM (Unified Data Management)
//!
//! Daemon serving Nudm-ueau generate-auth-data: 5G HE AKA authentication
//! vectors and AUTS resynchronization for provisioned subscribers.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nextgcore_udmd::{udm_sbi_close, udm_sbi_open, UdmConfig, UdmContext};
use ogs_dbi::{AuthSubscriptionStore, MemoryDbi, MongoDbi};
use ogs_sbi::SbiServerConfig;

/// NextGCore UDM - Unified Data Management
#[derive(Parser, Debug)]
#[command(name = "nextgcore-udmd")]
#[command(author = "NextGCore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "5G Core Unified Data Management", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, default_value = "/etc/nextgcore/udm.yaml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'e', long)]
    log_level: Option<String>,

    /// Disable color output
    #[arg(short = 'm', long)]
    no_color: bool,

    /// SBI server address (overrides sbi.addr)
    #[arg(long)]
    sbi_addr: Option<String>,

    /// SBI server port (overrides sbi.port)
    #[arg(long)]
    sbi_port: Option<u16>,

    /// MongoDB URI (overrides db_uri)
    #[arg(long)]
    db_uri: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    apply_overrides(&mut config, &args);

    // Initialize logging
    init_logging(&args, &config)?;

    log::info!("NextGCore UDM v{} starting...", env!("CARGO_PKG_VERSION"));

    // The MongoDB driver is used through its blocking API
    let store = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || open_store(&config))
            .await
            .context("Store initialization aborted")??
    };
    let ctx = Arc::new(UdmContext::new(store));
    log::info!("UDM context initialized");

    let sbi_config = SbiServerConfig::with_host_port(&config.sbi.addr, config.sbi.port)
        .context("Invalid SBI address")?;
    let (sbi_server, _addr) = udm_sbi_open(sbi_config, ctx)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start SBI server: {}", e))?;

    log::info!("NextGCore UDM ready");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    log::info!("Received shutdown signal");

    udm_sbi_close(&sbi_server)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to stop SBI server: {}", e))?;

    log::info!("NextGCore UDM stopped");
    Ok(())
}

/// Read the configuration file, falling back to defaults when it is absent
fn load_config(path: &str) -> Result<UdmConfig> {
    if !std::path::Path::new(path).exists() {
        return Ok(UdmConfig::default());
    }
    UdmConfig::load(path).with_context(|| format!("Failed to load configuration {}", path))
}

/// Command line options take precedence over the configuration file
fn apply_overrides(config: &mut UdmConfig, args: &Args) {
    if let Some(addr) = &args.sbi_addr {
        config.sbi.addr = addr.clone();
    }
    if let Some(port) = args.sbi_port {
        config.sbi.port = port;
    }
    if let Some(db_uri) = &args.db_uri {
        config.db_uri = Some(db_uri.clone());
    }
    if let Some(level) = &args.log_level {
        config.logger.level = Some(level.clone());
    }
}

/// MongoDB when a URI is configured, otherwise the subscribers from the file
fn open_store(config: &UdmConfig) -> Result<Arc<dyn AuthSubscriptionStore>> {
    match &config.db_uri {
        Some(db_uri) => {
            let dbi = MongoDbi::connect(db_uri).context("Failed to connect to MongoDB")?;
            log::info!("MongoDB connected [{}]", dbi.masked_db_uri());
            Ok(Arc::new(dbi))
        }
        None => {
            let dbi = MemoryDbi::with_subscriptions(config.subscribers.iter().cloned());
            log::info!("Serving {} subscriber(s) from configuration", dbi.len());
            Ok(Arc::new(dbi))
        }
    }
}

/// Initialize logging based on command line arguments
fn init_logging(args: &Args, config: &UdmConfig) -> Result<()> {
    let mut builder = env_logger::Builder::new();

    // Set log level
    let level = match config.logger.level.as_deref().unwrap_or("info").to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };
    builder.filter_level(level);

    // Configure format
    builder.format_timestamp_millis();

    if args.no_color {
        builder.write_style(env_logger::WriteStyle::Never);
    }

    builder.try_init().context("Failed to initialize logger")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default() {
        let args = Args::parse_from(["nextgcore-udmd"]);
        assert_eq!(args.config, "/etc/nextgcore/udm.yaml");
        assert!(args.log_level.is_none());
        assert!(args.sbi_addr.is_none());
        assert!(args.sbi_port.is_none());
        assert!(args.db_uri.is_none());
        assert!(!args.no_color);
    }

    #[test]
    fn test_args_custom() {
        let args = Args::parse_from([
            "nextgcore-udmd",
            "-c",
            "/custom/udm.yaml",
            "-e",
            "debug",
            "-m",
            "--sbi-addr",
            "0.0.0.0",
            "--sbi-port",
            "8080",
            "--db-uri",
            "mongodb://db/nextgcore",
        ]);
        assert_eq!(args.config, "/custom/udm.yaml");
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.no_color);
        assert_eq!(args.sbi_addr.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.sbi_port, Some(8080));
        assert_eq!(args.db_uri.as_deref(), Some("mongodb://db/nextgcore"));
    }

    #[test]
    fn test_overrides() {
        let mut config = UdmConfig::from_yaml("sbi:\n  addr: 10.0.0.1\n  port: 7000\n").unwrap();
        let args = Args::parse_from(["nextgcore-udmd", "--sbi-port", "8080"]);
        apply_overrides(&mut config, &args);
        assert_eq!(config.sbi.addr, "10.0.0.1");
        assert_eq!(config.sbi.port, 8080);
        assert!(config.db_uri.is_none());
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let config = load_config("/nonexistent/udm.yaml").unwrap();
        assert!(config.subscribers.is_empty());
    }

    #[test]
    fn test_memory_store_from_config() {
        let config = UdmConfig::from_yaml(
            "subscribers:\n  - supi: imsi-001010000000001\n    sequenceNumber: \"000000000001\"\n",
        )
        .unwrap();
        let store = open_store(&config).unwrap();
        assert!(store.auth_subscription("imsi-001010000000001").is_ok());
    }
}
