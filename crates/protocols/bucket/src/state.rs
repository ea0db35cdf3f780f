//! Bucket Protocol State Parsing
//!
//! Typed views returned by the readers, and the pure functions that reshape
//! fullnode objects and devInspect results into them.

use std::collections::BTreeMap;

use bucket_core::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sui_rpc_client::{EventId, SuiEvent, SuiExecutionResult, SuiObjectResponse};
use sui_tx::object_utils::{field_string, field_string_or, field_u64};
use sui_tx::{coin_type_from_object_type, decode_u64, decode_u8, to_display_amount};

use crate::constants::{ProtocolIds, DEFAULT_BASE_FEE_RATE};

/// A bottle (CDP position) seen in `BottleCreated` / `BottleDestroyed` events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BottleSummary {
    pub bottle_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedBottleSummary {
    pub data: Vec<BottleSummary>,
    pub next_cursor: Option<EventId>,
    pub has_next_page: bool,
}

/// Protocol constants read through devInspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketConstants {
    pub fee_precision: u64,
    pub liquidation_rebate: u64,
    pub flash_loan_fee: u64,
    pub buck_decimal: u8,
    pub max_lock_time: u64,
    pub min_lock_time: u64,
    pub min_fee: u64,
    pub max_fee: u64,
}

/// Per-collateral vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketInfo {
    pub token: String,
    pub base_fee_rate: u64,
    pub bottle_table_size: String,
    pub collateral_decimal: u64,
    pub collateral_vault: String,
    pub latest_redemption_time: u64,
    pub min_collateral_ratio: String,
    pub minted_buck_amount: String,
    pub min_bottle_size: String,
    pub max_mint_amount: String,
    pub recovery_mode_threshold: String,
}

/// Stability pool for one collateral
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankInfo {
    pub token: String,
    pub buck_reserve: String,
    pub collateral_pool: String,
    pub current_s: String,
    pub current_p: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBottleInfo {
    pub token: String,
    pub collateral_amount: String,
    pub buck_amount: String,
}

/// A user's position in one tank, in display units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTankInfo {
    #[serde(rename = "totalBUCK")]
    pub total_buck: f64,
    pub total_earned: f64,
}

/// Tank positions keyed by collateral symbol
pub type UserTankList = BTreeMap<String, UserTankInfo>;

/// USD prices derived from the Supra feeds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenPrices {
    #[serde(rename = "WETH")]
    pub weth: f64,
    #[serde(rename = "SUI")]
    pub sui: f64,
    #[serde(rename = "vSUI")]
    pub vsui: f64,
    #[serde(rename = "afSUI")]
    pub afsui: f64,
    #[serde(rename = "haSUI")]
    pub hasui: f64,
    #[serde(rename = "USDC")]
    pub usdc: f64,
    #[serde(rename = "USDT")]
    pub usdt: f64,
    #[serde(rename = "BUCK")]
    pub buck: f64,
}

impl Default for TokenPrices {
    fn default() -> Self {
        Self {
            weth: 0.0,
            sui: 0.0,
            vsui: 0.0,
            afsui: 0.0,
            hasui: 0.0,
            usdc: 1.0,
            usdt: 1.0,
            buck: 1.0,
        }
    }
}

/// Liquid staking yields in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenApys {
    #[serde(rename = "vSUI")]
    pub vsui: f64,
    #[serde(rename = "haSUI", default, skip_serializing_if = "Option::is_none")]
    pub hasui: Option<f64>,
    #[serde(rename = "afSUI", default, skip_serializing_if = "Option::is_none")]
    pub afsui: Option<f64>,
}

// =============================================================================
// Parsers
// =============================================================================

/// Bottle IDs out of an event page
pub fn parse_bottle_events(events: &[SuiEvent]) -> Vec<BottleSummary> {
    events
        .iter()
        .filter_map(|e| match &e.parsed_json["bottle_id"] {
            Value::String(id) => Some(BottleSummary {
                bottle_id: id.clone(),
            }),
            _ => {
                tracing::debug!(event = %e.id.tx_digest, "Bottle event without bottle_id");
                None
            }
        })
        .collect()
}

/// Decode the eight `constants::*` results, in call order
pub fn parse_bucket_constants(
    results: &[SuiExecutionResult],
) -> Result<BucketConstants, ProtocolError> {
    Ok(BucketConstants {
        fee_precision: return_u64(results, 0, "fee_precision")?,
        liquidation_rebate: return_u64(results, 1, "liquidation_rebate")?,
        flash_loan_fee: return_u64(results, 2, "flash_loan_fee")?,
        buck_decimal: decode_u8(return_bytes(results, 3, "buck_decimal")?).map_err(|e| {
            ProtocolError::ObjectParseError {
                message: format!("constants::buck_decimal: {}", e),
            }
        })?,
        max_lock_time: return_u64(results, 4, "max_lock_time")?,
        min_lock_time: return_u64(results, 5, "min_lock_time")?,
        min_fee: return_u64(results, 6, "min_fee")?,
        max_fee: return_u64(results, 7, "max_fee")?,
    })
}

fn return_bytes<'a>(
    results: &'a [SuiExecutionResult],
    index: usize,
    name: &str,
) -> Result<&'a [u8], ProtocolError> {
    results
        .get(index)
        .and_then(|r| r.first_return_bytes())
        .ok_or_else(|| ProtocolError::ObjectParseError {
            message: format!("constants::{} returned no value", name),
        })
}

fn return_u64(results: &[SuiExecutionResult], index: usize, name: &str) -> Result<u64, ProtocolError> {
    decode_u64(return_bytes(results, index, name)?).map_err(|e| ProtocolError::ObjectParseError {
        message: format!("constants::{}: {}", name, e),
    })
}

/// Reshape a bucket object. Returns `None` for collateral outside the registry.
pub fn parse_bucket(
    object: &SuiObjectResponse,
    min_bottle_size: &str,
    ids: &ProtocolIds,
) -> Option<BucketInfo> {
    let coin_type = coin_type_from_object_type(object.object_type()?)?;
    let token = ids.symbol_for_type(&coin_type)?.to_string();
    let fields = object.fields()?;

    Some(BucketInfo {
        token,
        base_fee_rate: field_u64(fields, &["base_fee_rate"]).unwrap_or(DEFAULT_BASE_FEE_RATE),
        bottle_table_size: field_string_or(fields, &["bottle_table", "table", "size"], ""),
        collateral_decimal: field_u64(fields, &["collateral_decimal"]).unwrap_or(0),
        collateral_vault: field_string_or(fields, &["collateral_vault"], ""),
        latest_redemption_time: field_u64(fields, &["latest_redemption_time"]).unwrap_or(0),
        min_collateral_ratio: field_string_or(fields, &["min_collateral_ratio"], ""),
        minted_buck_amount: field_string_or(fields, &["minted_buck_amount"], ""),
        min_bottle_size: min_bottle_size.to_string(),
        max_mint_amount: field_string_or(fields, &["max_mint_amount"], ""),
        recovery_mode_threshold: field_string_or(fields, &["recovery_mode_threshold"], ""),
    })
}

/// Bottle table ID of a bucket, where user bottles are keyed by address
pub fn bottle_table_id(object: &SuiObjectResponse) -> Option<String> {
    field_string(object.fields()?, &["bottle_table", "table", "id", "id"])
}

/// Reshape a tank object; unknown collateral keeps an empty token name
pub fn parse_tank(object: &SuiObjectResponse, ids: &ProtocolIds) -> TankInfo {
    let token = object
        .object_type()
        .and_then(coin_type_from_object_type)
        .and_then(|t| ids.symbol_for_type(&t).map(str::to_string))
        .unwrap_or_default();
    let empty = Value::Null;
    let fields = object.fields().unwrap_or(&empty);

    TankInfo {
        token,
        buck_reserve: field_string_or(fields, &["reserve"], "0"),
        collateral_pool: field_string_or(fields, &["collateral_pool"], "0"),
        current_s: field_string_or(fields, &["current_s"], "0"),
        current_p: field_string_or(fields, &["current_p"], "1"),
    }
}

/// A user's bottle from a bottle-table entry; `None` when absent
pub fn parse_user_bottle(object: &SuiObjectResponse, token: &str) -> Option<UserBottleInfo> {
    let fields = object.fields()?;
    Some(UserBottleInfo {
        token: token.to_string(),
        collateral_amount: field_string(fields, &["value", "value", "collateral_amount"])?,
        buck_amount: field_string(fields, &["value", "value", "buck_amount"])?,
    })
}

/// Sum devInspect amounts after the leading `borrow_tank` result.
///
/// Calls that returned nothing count as zero.
pub fn sum_tank_results(results: &[SuiExecutionResult], decimals: usize) -> f64 {
    results
        .iter()
        .skip(1)
        .map(|r| to_display_amount(r.first_return_bytes().unwrap_or(&[0]), decimals))
        .sum()
}

/// `value / 10^decimal` of a Supra feed object
pub fn parse_price_feed(object: &SuiObjectResponse) -> Option<f64> {
    let fields = object.fields()?;
    let value: f64 = field_string(fields, &["value", "value"])?.parse().ok()?;
    let decimal = field_u64(fields, &["value", "decimal"])?;
    Some(value / 10f64.powi(i32::try_from(decimal).ok()?))
}

/// Derive USD prices from feed readings, in feed order.
///
/// Quote-in-USDT pairs are scaled by the USDT price read before them, and
/// liquid staking pairs by the SUI price.
pub fn derive_prices<'a>(feeds: impl IntoIterator<Item = (&'a str, f64)>) -> TokenPrices {
    let mut prices = TokenPrices::default();
    for (name, price) in feeds {
        match name {
            "usdc_usd" => prices.usdc = price,
            "usdt_usd" => prices.usdt = price,
            "eth_usdt" => prices.weth = prices.usdt * price,
            "sui_usdt" => prices.sui = prices.usdt * price,
            "vsui_sui" => prices.vsui = prices.sui * price,
            "hasui_sui" => prices.hasui = prices.sui * price,
            "afsui_sui" => prices.afsui = prices.sui * price,
            other => tracing::debug!(feed = other, "Ignoring unknown price feed"),
        }
    }
    prices
}
