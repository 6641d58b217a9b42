//! # Consent Node Runtime
//!
//! Hosts the consent contract over a transactional world state.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (stderr; stdout carries responses)
//! 2. Load configuration from the environment and validate it
//! 3. Open the storage backend and the ledger over it
//! 4. Install the consent contract and its secondary indexes
//! 5. Seed the example consents (if `CONSENT_SEED_ON_START`)
//! 6. Serve JSON-lines invocations on stdin until EOF or Ctrl+C; the
//!    invocation in progress when Ctrl+C arrives still completes
//!
//! ## Example
//!
//! ```text
//! $ echo '{"function":"GetConsentsByProvider","args":["JIO"]}' \
//!     | CONSENT_SEED_ON_START=true node-runtime
//! {"status":200,"payload":[{"id":"consent1",...},{"id":"consent3",...}],"tx_id":"..."}
//! ```

use anyhow::{Context, Result};
use node_runtime::container::NodeConfig;
use node_runtime::{serve_until, NodeContainer};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Load configuration from environment.
fn load_config() -> Result<NodeConfig> {
    NodeConfig::from_env().context("Failed to load configuration")
}

fn init_logging(default_level: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    init_logging(&config.logging.level)?;

    info!("===========================================");
    info!("  Consent Node Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        backend = %config.storage.backend,
        namespace = %config.ledger.namespace,
        "Starting"
    );

    let container = NodeContainer::new(config).context("Failed to start node")?;
    let host = container.host();

    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => warn!("Interrupted, finishing current invocation"),
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl+C, serving until EOF");
                std::future::pending::<()>().await;
            }
        }
    };

    info!("Serving invocations on stdin. Press Ctrl+C to stop.");
    serve_until(host.clone(), input, output, shutdown)
        .await
        .context("Invocation loop failed")?;

    let stats = host.stats();
    info!(
        invocations = stats.invocations,
        committed = stats.committed,
        failed = stats.failed,
        conflicts = stats.conflicts,
        sequence = host.ledger().sequence(),
        "Shutdown complete"
    );
    Ok(())
}
