//! Bucket Protocol Constants
//!
//! Package and object IDs, coin registry and oracle feeds per network.

use std::path::Path;

use bucket_core::{constants::SUI_COIN_TYPE, Error, Network, ObjectId};
use serde::{Deserialize, Serialize};

/// Mainnet deployment
pub mod mainnet {
    /// Package that defines `buck`, `tank`, `well` and `bucket_events`
    pub const PACKAGE_ID: &str =
        "0x155a2b4a924288070dc6cced78e6af9e244c654b24b5d6b7c7f3d8d62cd8ee5b";

    /// Shared protocol object holding buckets and tanks as dynamic fields
    pub const PROTOCOL_ID: &str =
        "0x9e3dab13212b27f5434416939db5dec6a319d15b89a84fd074d03ece6350d3df";

    /// Package exposing the `bucket_operations` entry functions
    pub const BUCKET_OPERATIONS_PACKAGE_ID: &str =
        "0x30c2b4e9b0f8bd6a8b0fa2f4a1b3a39fa2d1d6e1d5d5b06ec06a0c1c0d9bba23";

    /// Original package: defining module of `ContributorToken` and `BUCK`
    pub const CONTRIBUTOR_TOKEN_ID: &str =
        "0xce7ff77a83ea0cb6fd39bd8748e2ec89a3f41e8efdc3f4eb123e0ca37b184db2";

    /// Package used for read-only `borrow_tank` / `tank::*` inspection
    pub const CORE_PACKAGE_ID: &str =
        "0xce7ff77a83ea0cb6fd39bd8748e2ec89a3f41e8efdc3f4eb123e0ca37b184db2";

    /// Bucket price oracle
    pub const ORACLE_OBJECT_ID: &str =
        "0xf578d73f54b3068166d73c1a1edd5a105ce82f97f5a8ea1ac17d53e0132a1078";

    /// Supra oracle holder
    pub const SUPRA_HANDLER_OBJECT: &str =
        "0xaa0315f0748c1f24ddb2b45f7939cff40f7a8104af5ccbc4a1d32f870c0b4105";

    /// Refreshes the Bucket oracle from Supra for one collateral
    pub const SUPRA_UPDATE_TARGET: &str =
        "0xe2077d678de929d64d3fcd79c1adfbd23d97324e9bae3a60102d44367fbe008c::bucket_oracle::update_price";
}

/// Coin symbols
pub mod symbols {
    pub const SUI: &str = "SUI";
    pub const VSUI: &str = "vSUI";
    pub const AFSUI: &str = "afSUI";
    pub const HASUI: &str = "haSUI";
    pub const USDC: &str = "USDC";
    pub const USDT: &str = "USDT";
    pub const WETH: &str = "WETH";
    pub const WBTC: &str = "WBTC";
    pub const BUCK: &str = "BUCK";
}

/// Collateral not yet launched; user bottles are not looked up for these
pub const UNLAUNCHED_COLLATERAL: &[&str] = &[symbols::WBTC, symbols::WETH];

/// Decimals assumed for a coin missing from the registry
pub const DEFAULT_DECIMALS: u8 = 9;

/// Default `base_fee_rate` when a bucket does not report one
pub const DEFAULT_BASE_FEE_RATE: u64 = 5_000;

/// A coin known to the protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinInfo {
    pub symbol: String,
    pub coin_type: String,
    pub decimals: u8,
    /// Supra pair index used when refreshing the oracle
    #[serde(default)]
    pub supra_id: Option<u32>,
}

/// Supra price feed object, read in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFeed {
    /// Pair name, e.g. `sui_usdt`
    pub name: String,
    pub object_id: ObjectId,
}

/// Deployment IDs for a specific network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolIds {
    pub package_id: ObjectId,
    pub protocol_id: ObjectId,
    pub bucket_operations_package: ObjectId,
    pub contributor_token_package: ObjectId,
    pub core_package: ObjectId,
    pub oracle_id: ObjectId,
    pub supra_handler_id: ObjectId,
    pub supra_update_target: String,
    /// Read in order: `usdc_usd` and `usdt_usd` before the pairs quoted in them
    #[serde(default)]
    pub price_feeds: Vec<PriceFeed>,
    pub coins: Vec<CoinInfo>,
}

impl ProtocolIds {
    /// Get deployment IDs for a network
    pub fn for_network(network: Network) -> Option<Self> {
        match network {
            Network::Mainnet => Some(Self::mainnet()),
            // Testnet deployment is not tracked
            Network::Testnet => None,
        }
    }

    fn mainnet() -> Self {
        let coin = |symbol: &str, coin_type: &str, decimals: u8, supra_id: Option<u32>| CoinInfo {
            symbol: symbol.to_string(),
            coin_type: coin_type.to_string(),
            decimals,
            supra_id,
        };

        Self {
            package_id: ObjectId::new(mainnet::PACKAGE_ID),
            protocol_id: ObjectId::new(mainnet::PROTOCOL_ID),
            bucket_operations_package: ObjectId::new(mainnet::BUCKET_OPERATIONS_PACKAGE_ID),
            contributor_token_package: ObjectId::new(mainnet::CONTRIBUTOR_TOKEN_ID),
            core_package: ObjectId::new(mainnet::CORE_PACKAGE_ID),
            oracle_id: ObjectId::new(mainnet::ORACLE_OBJECT_ID),
            supra_handler_id: ObjectId::new(mainnet::SUPRA_HANDLER_OBJECT),
            supra_update_target: mainnet::SUPRA_UPDATE_TARGET.to_string(),
            // Feed objects move with oracle upgrades and are not built in; a
            // deployment file supplies them.
            price_feeds: Vec::new(),
            coins: vec![
                coin(symbols::SUI, SUI_COIN_TYPE, 9, Some(90)),
                coin(
                    symbols::VSUI,
                    "0x549e8b69270defbfafd4f94e17ec44cdbdd99820b33bda2278dea3b9a32d3f55::cert::CERT",
                    9,
                    Some(90),
                ),
                coin(
                    symbols::AFSUI,
                    "0xf325ce1300e8dac124071d3152c5c5ee6174914f8bc2161e88329cf579246efc::afsui::AFSUI",
                    9,
                    Some(90),
                ),
                coin(
                    symbols::HASUI,
                    "0xbde4ba4c2e274a60ce15c1cfff9e5c42e41654ac8b6d906a57efa4bd3c29f47d::hasui::HASUI",
                    9,
                    Some(90),
                ),
                coin(
                    symbols::USDC,
                    "0x5d4b302506645c37ff133b98c4b50a5ae14841659738d6d733d59d0d217a93bf::coin::COIN",
                    6,
                    Some(89),
                ),
                coin(
                    symbols::USDT,
                    "0xc060006111016b8a020ad5b33834984a437aaa7d3c74c18e09a95d48aceab08c::coin::COIN",
                    6,
                    Some(48),
                ),
                coin(
                    symbols::WETH,
                    "0xaf8cd5edc19c4512f4259f0bee101a40d41ebed738ade5874359610ef8eeced5::coin::COIN",
                    8,
                    Some(1),
                ),
                coin(
                    symbols::WBTC,
                    "0x027792d9fed7f9844eb4839566001bb6f6cb4804f66aa2da6fe1ee242d896881::coin::COIN",
                    8,
                    Some(0),
                ),
                coin(
                    symbols::BUCK,
                    "0xce7ff77a83ea0cb6fd39bd8748e2ec89a3f41e8efdc3f4eb123e0ca37b184db2::buck::BUCK",
                    9,
                    None,
                ),
            ],
        }
    }

    /// Look up a coin by its type string (short and long address forms match)
    pub fn coin_by_type(&self, coin_type: &str) -> Option<&CoinInfo> {
        self.coins
            .iter()
            .find(|c| sui_tx::same_type(&c.coin_type, coin_type))
    }

    pub fn coin_by_symbol(&self, symbol: &str) -> Option<&CoinInfo> {
        self.coins.iter().find(|c| c.symbol == symbol)
    }

    pub fn symbol_for_type(&self, coin_type: &str) -> Option<&str> {
        self.coin_by_type(coin_type).map(|c| c.symbol.as_str())
    }

    /// Decimals of a coin type, falling back to [`DEFAULT_DECIMALS`]
    pub fn decimals_for_type(&self, coin_type: &str) -> u8 {
        self.coin_by_type(coin_type)
            .map(|c| c.decimals)
            .unwrap_or(DEFAULT_DECIMALS)
    }

    /// BUCK coin type as registered
    pub fn buck_type(&self) -> String {
        self.coin_by_symbol(symbols::BUCK)
            .map(|c| c.coin_type.clone())
            .unwrap_or_else(|| format!("{}::buck::BUCK", self.contributor_token_package))
    }

    pub fn is_sui(coin_type: &str) -> bool {
        sui_tx::same_type(coin_type, SUI_COIN_TYPE)
    }

    /// `package::module::function` in the main package
    pub fn target(&self, module: &str, function: &str) -> String {
        format!("{}::{}::{}", self.package_id, module, function)
    }

    /// Read a deployment table from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_constants() {
        let ids = ProtocolIds::for_network(Network::Mainnet).unwrap();
        for id in [
            &ids.package_id,
            &ids.protocol_id,
            &ids.bucket_operations_package,
            &ids.contributor_token_package,
            &ids.core_package,
            &ids.oracle_id,
            &ids.supra_handler_id,
        ] {
            assert_eq!(id.as_str().len(), 66);
            assert!(id.to_bytes().is_some());
        }
        assert!(ids.price_feeds.is_empty());
    }

    #[test]
    fn test_testnet_not_supported() {
        assert!(ProtocolIds::for_network(Network::Testnet).is_none());
    }

    #[test]
    fn test_coin_registry() {
        let ids = ProtocolIds::for_network(Network::Mainnet).unwrap();
        assert_eq!(ids.symbol_for_type("0x2::sui::SUI"), Some("SUI"));
        assert_eq!(
            ids.symbol_for_type(
                "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI"
            ),
            Some("SUI")
        );
        assert_eq!(ids.decimals_for_type(&ids.coin_by_symbol("USDC").unwrap().coin_type), 6);
        assert_eq!(ids.decimals_for_type("0x9::unknown::X"), DEFAULT_DECIMALS);
        assert!(ids.buck_type().ends_with("::buck::BUCK"));
        assert!(ProtocolIds::is_sui("0x2::sui::SUI"));
    }

    #[test]
    fn test_ids_roundtrip_json() {
        let ids = ProtocolIds::for_network(Network::Mainnet).unwrap();
        let json = serde_json::to_string(&ids).unwrap();
        let parsed: ProtocolIds = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ids);
    }

    #[test]
    fn test_ids_from_file() {
        let mut ids = ProtocolIds::for_network(Network::Mainnet).unwrap();
        ids.price_feeds = vec![
            PriceFeed {
                name: "usdt_usd".into(),
                object_id: ObjectId::new("0xf1"),
            },
            PriceFeed {
                name: "sui_usdt".into(),
                object_id: ObjectId::new("0xf2"),
            },
        ];
        let path = std::env::temp_dir().join(format!("bucket-ids-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&ids).unwrap()).unwrap();

        let loaded = ProtocolIds::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.price_feeds.len(), 2);

        let err = ProtocolIds::from_file(Path::new("/nonexistent/ids.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
