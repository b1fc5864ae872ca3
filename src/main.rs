//! # cosmos-mgmt
//!
//! Idempotent Azure Cosmos DB provisioning over Azure Resource Manager.
//!
//! See [`cosmos_mgmt::cli`] for the command surface.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use cosmos_mgmt::cli::{self, Cli};
use cosmos_mgmt::observability;

#[tokio::main]
async fn main() -> Result<()> {
    // Configure rustls crypto provider FIRST, before any TLS client is built
    // Required for rustls 0.23+ when no default provider is set via features
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider was already installed");
    }

    observability::init_tracing();

    let cli = Cli::parse();

    info!("Starting cosmos-mgmt {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Build info: datetime={}, git_hash={}",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    match cli::execute(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
