//! Configuration types for the Bucket client

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Network};

/// Fullnode connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC URL (e.g., "https://fullnode.mainnet.sui.io:443")
    pub url: String,

    /// Upper bound for a single request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl RpcConfig {
    pub fn fullnode_url(network: Network) -> &'static str {
        match network {
            Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Network::Testnet => "https://fullnode.testnet.sui.io:443",
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: Self::fullnode_url(Network::Mainnet).to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Liquid staking yield endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApyConfig {
    /// JSON endpoint returning `{"data": {"apy": <number>}}`
    pub hasui_url: String,

    /// Text endpoint returning the APY as a fraction (e.g. "0.042")
    pub afsui_url: String,

    /// Fixed vSUI APY in percent
    #[serde(default = "default_vsui_apy")]
    pub vsui_apy: f64,
}

fn default_vsui_apy() -> f64 {
    4.2
}

impl Default for ApyConfig {
    fn default() -> Self {
        Self {
            hasui_url: "https://www.haedal.xyz/api/stats/home".to_string(),
            afsui_url: "https://aftermath.finance/api/staking/apy".to_string(),
            vsui_apy: default_vsui_apy(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fullnode connection settings
    pub rpc: RpcConfig,

    /// Network (mainnet or testnet)
    pub network: Network,

    /// Sender used for devInspect calls (defaults to the zero address)
    #[serde(default)]
    pub sender: Option<String>,

    /// Interface the API server binds to
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Yield data sources
    #[serde(default)]
    pub apy: ApyConfig,

    /// JSON file replacing the built-in deployment IDs
    #[serde(default)]
    pub deployment_file: Option<PathBuf>,
}

fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    19080
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            network: Network::Mainnet,
            sender: None,
            api_host: default_api_host(),
            api_port: default_api_port(),
            apy: ApyConfig::default(),
            deployment_file: None,
        }
    }
}

impl AppConfig {
    /// Load from an optional JSON file, then apply `BUCKET_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                serde_json::from_str(&raw).map_err(|e| Error::Serialization(e.to_string()))?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Socket address of the API server
    pub fn bind_addr(&self) -> Result<SocketAddr, Error> {
        let ip: IpAddr = self
            .api_host
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("Invalid API host: {}", self.api_host)))?;
        Ok(SocketAddr::new(ip, self.api_port))
    }

    /// Apply overrides from a key lookup (environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(network) = lookup("BUCKET_NETWORK") {
            self.network = Network::from_name(&network)
                .ok_or_else(|| Error::Config(format!("Unknown network: {}", network)))?;
            if lookup("BUCKET_RPC_URL").is_none() {
                self.rpc.url = RpcConfig::fullnode_url(self.network).to_string();
            }
        }

        if let Some(url) = lookup("BUCKET_RPC_URL") {
            self.rpc.url = url;
        }

        if let Some(host) = lookup("BUCKET_API_HOST") {
            self.api_host = host;
        }

        if let Some(port) = lookup("BUCKET_API_PORT") {
            self.api_port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid port: {}", port)))?;
        }

        Ok(())
    }
}
