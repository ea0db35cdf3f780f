//! Bucket client facade
//!
//! Holds the chain capability and the deployment table for one network and
//! exposes every builder and reader behind a single cloneable handle.

use std::sync::Arc;
use std::time::Duration;

use bucket_core::{ApyConfig, Error, Network, ObjectId, ProtocolError, SuiAddress};
use sui_rpc_client::{ChainClient, EventId};
use sui_tx::TransactionBlock;

use crate::apy::fetch_apys;
use crate::constants::ProtocolIds;
use crate::fetch;
use crate::state::{
    BucketConstants, BucketInfo, PaginatedBottleSummary, TankInfo, TokenApys, TokenPrices,
    UserBottleInfo, UserTankList,
};
use crate::tx_builder;

const APY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct BucketClient {
    chain: Arc<dyn ChainClient>,
    network: Network,
    ids: Arc<ProtocolIds>,
    current_address: Option<SuiAddress>,
    sender: SuiAddress,
    http: reqwest::Client,
    apy: ApyConfig,
}

impl BucketClient {
    /// Client for a network with a built-in deployment table
    pub fn new(chain: Arc<dyn ChainClient>, network: Network) -> Result<Self, Error> {
        let ids = ProtocolIds::for_network(network).ok_or_else(|| {
            ProtocolError::NetworkNotSupported {
                network: network.to_string(),
            }
        })?;
        Self::with_ids(chain, network, ids)
    }

    /// Client with an explicit deployment table
    pub fn with_ids(
        chain: Arc<dyn ChainClient>,
        network: Network,
        ids: ProtocolIds,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent("bucket-client")
            .timeout(APY_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            chain,
            network,
            ids: Arc::new(ids),
            current_address: None,
            sender: SuiAddress::dummy(),
            http,
            apy: ApyConfig::default(),
        })
    }

    pub fn with_current_address(mut self, address: SuiAddress) -> Self {
        self.current_address = Some(address);
        self
    }

    /// Sender used for constant lookups through devInspect
    pub fn with_sender(mut self, sender: SuiAddress) -> Self {
        self.sender = sender;
        self
    }

    pub fn with_apy_config(mut self, apy: ApyConfig) -> Self {
        self.apy = apy;
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn ids(&self) -> &ProtocolIds {
        &self.ids
    }

    pub fn current_address(&self) -> Option<&SuiAddress> {
        self.current_address.as_ref()
    }

    fn chain(&self) -> &dyn ChainClient {
        self.chain.as_ref()
    }

    // =========================================================================
    // Transaction builders
    // =========================================================================

    pub fn deposit_to_tank(
        &self,
        asset_type: &str,
        tank_id: &ObjectId,
        buck_coin: &ObjectId,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::deposit_to_tank(&self.ids, asset_type, tank_id, buck_coin)?)
    }

    pub fn absorb_from_tank(
        &self,
        asset_type: &str,
        tank_id: &ObjectId,
        collateral_coin: &ObjectId,
        debt_amount: u64,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::absorb_from_tank(
            &self.ids,
            asset_type,
            tank_id,
            collateral_coin,
            debt_amount,
        )?)
    }

    pub fn withdraw_from_tank(
        &self,
        asset_type: &str,
        tank_id: &ObjectId,
        contributor_token: &ObjectId,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::withdraw_from_tank(
            &self.ids,
            asset_type,
            tank_id,
            contributor_token,
        )?)
    }

    pub fn claim_from_tank(
        &self,
        asset_type: &str,
        tank_id: &ObjectId,
        contributor_token: &ObjectId,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::claim_from_tank(
            &self.ids,
            asset_type,
            tank_id,
            contributor_token,
        )?)
    }

    pub fn claim_bkt(
        &self,
        asset_type: &str,
        tank_id: &ObjectId,
        contributor_token: &ObjectId,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::claim_bkt(&self.ids, asset_type, tank_id, contributor_token)?)
    }

    pub fn borrow(
        &self,
        asset_type: &str,
        collateral_coin: &ObjectId,
        buck_output_amount: u64,
        insertion: Option<&SuiAddress>,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::borrow(
            &self.ids,
            asset_type,
            &self.ids.protocol_id,
            collateral_coin,
            buck_output_amount,
            insertion,
        )?)
    }

    pub fn top_up(
        &self,
        asset_type: &str,
        collateral_coin: &ObjectId,
        for_address: &SuiAddress,
        insertion: Option<&SuiAddress>,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::top_up(
            &self.ids,
            asset_type,
            &self.ids.protocol_id,
            collateral_coin,
            for_address,
            insertion,
        )?)
    }

    pub fn withdraw(
        &self,
        asset_type: &str,
        collateral_amount: u64,
        insertion: Option<&SuiAddress>,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::withdraw(
            &self.ids,
            asset_type,
            &self.ids.protocol_id,
            &self.ids.oracle_id,
            collateral_amount,
            insertion,
        )?)
    }

    pub fn repay(&self, asset_type: &str, buck_coin: &ObjectId) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::repay(&self.ids, asset_type, &self.ids.protocol_id, buck_coin)?)
    }

    pub fn redeem(
        &self,
        asset_type: &str,
        buck_coin: &ObjectId,
        insertion: Option<&SuiAddress>,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::redeem(
            &self.ids,
            asset_type,
            &self.ids.protocol_id,
            &self.ids.oracle_id,
            buck_coin,
            insertion,
        )?)
    }

    pub fn stake(
        &self,
        asset_type: &str,
        well_id: &ObjectId,
        bkt_coin: &ObjectId,
        lock_time: u64,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::stake(&self.ids, asset_type, well_id, bkt_coin, lock_time)?)
    }

    pub fn unstake(
        &self,
        asset_type: &str,
        well_id: &ObjectId,
        staked_bkt: &ObjectId,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::unstake(&self.ids, asset_type, well_id, staked_bkt)?)
    }

    pub fn force_unstake(
        &self,
        asset_type: &str,
        well_id: &ObjectId,
        bkt_treasury: &ObjectId,
        staked_bkt: &ObjectId,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::force_unstake(
            &self.ids,
            asset_type,
            well_id,
            bkt_treasury,
            staked_bkt,
        )?)
    }

    pub fn claim_from_well(
        &self,
        asset_type: &str,
        well_id: &ObjectId,
        staked_bkt: &ObjectId,
    ) -> Result<TransactionBlock, Error> {
        Ok(tx_builder::claim_from_well(&self.ids, asset_type, well_id, staked_bkt)?)
    }

    /// Open or grow a bottle, pulling non-SUI collateral from `wallet`'s coins
    pub async fn get_borrow_tx(
        &self,
        is_new_bottle: bool,
        collateral_type: &str,
        collateral_amount: u64,
        borrow_amount: u64,
        wallet: &SuiAddress,
    ) -> Result<TransactionBlock, Error> {
        let coins = if ProtocolIds::is_sui(collateral_type) {
            Vec::new()
        } else {
            fetch::fetch_coins(self.chain(), wallet, collateral_type).await?
        };

        Ok(tx_builder::build_borrow_tx(
            &self.ids,
            is_new_bottle,
            collateral_type,
            collateral_amount,
            borrow_amount,
            wallet,
            &coins,
        )?)
    }

    /// Repay with `wallet`'s BUCK and withdraw collateral
    pub async fn get_repay_tx(
        &self,
        collateral_type: &str,
        repay_amount: u64,
        withdraw_amount: u64,
        wallet: &SuiAddress,
    ) -> Result<TransactionBlock, Error> {
        let coins = fetch::fetch_coins(self.chain(), wallet, &self.ids.buck_type()).await?;
        Ok(tx_builder::build_repay_tx(
            &self.ids,
            collateral_type,
            repay_amount,
            withdraw_amount,
            wallet,
            &coins,
        )?)
    }

    // =========================================================================
    // Readers
    // =========================================================================

    pub async fn check_protocol_object(&self) -> Result<(), ProtocolError> {
        fetch::check_protocol_object(self.chain(), &self.ids).await
    }

    pub async fn get_all_bottles(
        &self,
        cursor: Option<EventId>,
    ) -> Result<PaginatedBottleSummary, ProtocolError> {
        fetch::fetch_bottles(self.chain(), &self.ids, "BottleCreated", cursor).await
    }

    pub async fn get_destroyed_bottles(
        &self,
        cursor: Option<EventId>,
    ) -> Result<PaginatedBottleSummary, ProtocolError> {
        fetch::fetch_bottles(self.chain(), &self.ids, "BottleDestroyed", cursor).await
    }

    pub async fn get_bucket_constants(&self) -> Result<BucketConstants, ProtocolError> {
        fetch::fetch_bucket_constants(self.chain(), &self.ids, &self.sender).await
    }

    pub async fn get_all_buckets(&self) -> Result<Vec<BucketInfo>, ProtocolError> {
        fetch::fetch_all_buckets(self.chain(), &self.ids).await
    }

    pub async fn get_all_tanks(&self) -> Result<Vec<TankInfo>, ProtocolError> {
        fetch::fetch_all_tanks(self.chain(), &self.ids).await
    }

    /// Bottles of `address`; an empty address has none
    pub async fn get_user_bottles(&self, address: &str) -> Result<Vec<UserBottleInfo>, ProtocolError> {
        match parse_user_address(address)? {
            Some(address) => fetch::fetch_user_bottles(self.chain(), &self.ids, &address).await,
            None => Ok(Vec::new()),
        }
    }

    /// Tank positions of `address`; an empty address has none
    pub async fn get_user_tanks(&self, address: &str) -> Result<UserTankList, ProtocolError> {
        match parse_user_address(address)? {
            Some(address) => fetch::fetch_user_tanks(self.chain(), &self.ids, &address).await,
            None => Ok(UserTankList::new()),
        }
    }

    pub async fn get_prices(&self) -> Result<TokenPrices, ProtocolError> {
        fetch::fetch_prices(self.chain(), &self.ids).await
    }

    pub async fn get_apys(&self) -> TokenApys {
        fetch_apys(&self.http, &self.apy).await
    }
}

fn parse_user_address(address: &str) -> Result<Option<SuiAddress>, ProtocolError> {
    let address = address.trim();
    if address.is_empty() {
        return Ok(None);
    }
    let parsed = SuiAddress::new(address);
    if parsed.to_bytes().is_none() {
        return Err(ProtocolError::InvalidAddress {
            address: address.to_string(),
        });
    }
    Ok(Some(parsed))
}
