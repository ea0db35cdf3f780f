//! Bucket client application library

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use bucket::{BucketClient, ProtocolIds};
use bucket_api::AppState;
use bucket_core::{AppConfig, SuiAddress};
use sui_rpc_client::{ChainClient, RpcClient};

/// Wire the protocol client and API state for a configuration
pub fn build_state(config: AppConfig, chain: Arc<dyn ChainClient>) -> anyhow::Result<AppState> {
    let client = match &config.deployment_file {
        Some(path) => {
            let ids = ProtocolIds::from_file(path)
                .with_context(|| format!("loading deployment {}", path.display()))?;
            BucketClient::with_ids(chain, config.network, ids)?
        }
        None => BucketClient::new(chain, config.network)?,
    };

    let client = match &config.sender {
        Some(sender) => client.with_sender(SuiAddress::new(sender)),
        None => client,
    };
    let client = client.with_apy_config(config.apy.clone());

    Ok(AppState::new(config, client))
}

/// Load configuration, connect to the fullnode and serve the API
pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bucket=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    let config = AppConfig::load(config_path)?;
    tracing::info!(
        network = %config.network,
        rpc = %config.rpc.url,
        "Starting Bucket client"
    );

    let rpc = RpcClient::new(&config.rpc)?;
    let state = build_state(config, Arc::new(rpc))?;

    bucket_api::start_server(state).await?;
    Ok(())
}
