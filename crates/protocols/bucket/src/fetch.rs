//! Bucket State Fetching from the fullnode
//!
//! Readers walk the protocol object's dynamic fields, bottle tables, owned
//! contributor tokens and oracle feeds, and reshape them into views.

use bucket_core::{ObjectId, ProtocolError, SuiAddress};
use sui_rpc_client::{
    ChainClient, Coin, DynamicFieldInfo, DynamicFieldName, EventFilter, EventId,
    ObjectDataOptions, ObjectFilter, ObjectResponseQuery, SuiExecutionResult, SuiObjectResponse,
};
use sui_tx::object_utils::{field_string_or, map_rpc_error};
use sui_tx::{coin_type_from_object_type, same_type, type_params, ObjectRef};

use crate::constants::{ProtocolIds, UNLAUNCHED_COLLATERAL};
use crate::state::{
    bottle_table_id, derive_prices, parse_bottle_events, parse_bucket, parse_bucket_constants,
    parse_price_feed, parse_tank, parse_user_bottle, sum_tank_results, BucketConstants,
    BucketInfo, PaginatedBottleSummary, TankInfo, TokenPrices, UserBottleInfo, UserTankInfo,
    UserTankList,
};
use crate::tx_builder::{build_constants_inspect_tx, build_tank_inspect_tx};

/// BUCK amounts in tanks are always 9 decimals
const BUCK_DECIMALS: usize = 9;

// =============================================================================
// Shared lookups
// =============================================================================

/// All dynamic fields of the protocol object, following every page
async fn protocol_fields(
    client: &dyn ChainClient,
    ids: &ProtocolIds,
) -> Result<Vec<DynamicFieldInfo>, ProtocolError> {
    let mut fields = Vec::new();
    let mut cursor = None;
    loop {
        let page = client
            .get_dynamic_fields(&ids.protocol_id, cursor, None)
            .await
            .map_err(|e| map_rpc_error(e, "suix_getDynamicFields"))?;
        fields.extend(page.data);
        match page.next_cursor {
            Some(next) if page.has_next_page => cursor = Some(next),
            _ => break,
        }
    }
    Ok(fields)
}

/// Objects behind the protocol's dynamic fields whose type contains `marker`
async fn protocol_objects(
    client: &dyn ChainClient,
    ids: &ProtocolIds,
    marker: &str,
) -> Result<Vec<SuiObjectResponse>, ProtocolError> {
    let object_ids: Vec<ObjectId> = protocol_fields(client, ids)
        .await?
        .into_iter()
        .filter(|f| f.object_type.contains(marker))
        .map(|f| f.object_id)
        .collect();

    client
        .multi_get_objects(&object_ids, ObjectDataOptions::content())
        .await
        .map_err(|e| map_rpc_error(e, "sui_multiGetObjects"))
}

/// Every coin of `coin_type` owned by `owner`
pub async fn fetch_coins(
    client: &dyn ChainClient,
    owner: &SuiAddress,
    coin_type: &str,
) -> Result<Vec<Coin>, ProtocolError> {
    let mut coins = Vec::new();
    let mut cursor = None;
    loop {
        let page = client
            .get_coins(owner, Some(coin_type), cursor, None)
            .await
            .map_err(|e| map_rpc_error(e, "suix_getCoins"))?;
        coins.extend(page.data);
        match page.next_cursor {
            Some(next) if page.has_next_page => cursor = Some(next),
            _ => break,
        }
    }
    Ok(coins)
}

async fn dev_inspect(
    client: &dyn ChainClient,
    sender: &SuiAddress,
    tx: &sui_tx::TransactionBlock,
) -> Result<Vec<SuiExecutionResult>, ProtocolError> {
    let response = client
        .dev_inspect_transaction_block(sender, tx)
        .await
        .map_err(|e| map_rpc_error(e, "sui_devInspectTransactionBlock"))?;

    if let Some(error) = response.error {
        return Err(ProtocolError::UpstreamFailed {
            call: "sui_devInspectTransactionBlock".to_string(),
            message: error,
        });
    }
    Ok(response.results.unwrap_or_default())
}

fn build_error(err: bucket_core::TxError) -> ProtocolError {
    ProtocolError::StateUnavailable {
        reason: format!("inspection transaction: {}", err),
    }
}

// =============================================================================
// Readers
// =============================================================================

/// Confirm the fullnode answers and the protocol object exists
pub async fn check_protocol_object(
    client: &dyn ChainClient,
    ids: &ProtocolIds,
) -> Result<(), ProtocolError> {
    let response = client
        .get_object(&ids.protocol_id, ObjectDataOptions::owner())
        .await
        .map_err(|e| map_rpc_error(e, "sui_getObject"))?;
    match response.data {
        Some(_) => Ok(()),
        None => Err(ProtocolError::StateUnavailable {
            reason: format!("protocol object {} not found", ids.protocol_id),
        }),
    }
}

/// One page of `bucket_events::<event_name>` bottle ids
pub async fn fetch_bottles(
    client: &dyn ChainClient,
    ids: &ProtocolIds,
    event_name: &str,
    cursor: Option<EventId>,
) -> Result<PaginatedBottleSummary, ProtocolError> {
    let filter = EventFilter::MoveEventType(format!(
        "{}::bucket_events::{}",
        ids.package_id, event_name
    ));
    let page = client
        .query_events(&filter, cursor, None, false)
        .await
        .map_err(|e| map_rpc_error(e, "suix_queryEvents"))?;

    Ok(PaginatedBottleSummary {
        data: parse_bottle_events(&page.data),
        next_cursor: page.next_cursor,
        has_next_page: page.has_next_page,
    })
}

pub async fn fetch_bucket_constants(
    client: &dyn ChainClient,
    ids: &ProtocolIds,
    sender: &SuiAddress,
) -> Result<BucketConstants, ProtocolError> {
    let tx = build_constants_inspect_tx(ids).map_err(build_error)?;
    let results = dev_inspect(client, sender, &tx).await?;
    parse_bucket_constants(&results)
}

pub async fn fetch_all_buckets(
    client: &dyn ChainClient,
    ids: &ProtocolIds,
) -> Result<Vec<BucketInfo>, ProtocolError> {
    let protocol = client
        .get_object(&ids.protocol_id, ObjectDataOptions::content())
        .await
        .map_err(|e| map_rpc_error(e, "sui_getObject"))?;
    let fields = protocol
        .fields()
        .ok_or_else(|| ProtocolError::StateUnavailable {
            reason: format!("protocol object {} has no content", ids.protocol_id),
        })?;
    let min_bottle_size = field_string_or(fields, &["min_bottle_size"], "");

    let buckets = protocol_objects(client, ids, "Bucket").await?;
    Ok(buckets
        .iter()
        .filter_map(|object| {
            let bucket = parse_bucket(object, &min_bottle_size, ids);
            if bucket.is_none() {
                tracing::debug!(object_type = ?object.object_type(), "Skipping unknown bucket");
            }
            bucket
        })
        .collect())
}

pub async fn fetch_all_tanks(
    client: &dyn ChainClient,
    ids: &ProtocolIds,
) -> Result<Vec<TankInfo>, ProtocolError> {
    let tanks = protocol_objects(client, ids, "Tank").await?;
    Ok(tanks.iter().map(|t| parse_tank(t, ids)).collect())
}

pub async fn fetch_user_bottles(
    client: &dyn ChainClient,
    ids: &ProtocolIds,
    address: &SuiAddress,
) -> Result<Vec<UserBottleInfo>, ProtocolError> {
    let buckets = protocol_objects(client, ids, "Bucket").await?;
    let name = DynamicFieldName::address(address);

    let mut bottles = Vec::new();
    for bucket in &buckets {
        let Some(token) = bucket
            .object_type()
            .and_then(coin_type_from_object_type)
            .and_then(|t| ids.symbol_for_type(&t).map(str::to_string))
        else {
            continue;
        };
        if UNLAUNCHED_COLLATERAL.contains(&token.as_str()) {
            continue;
        }
        let Some(table_id) = bottle_table_id(bucket) else {
            tracing::warn!(token = %token, "Bucket without bottle table");
            continue;
        };

        let entry = client
            .get_dynamic_field_object(&ObjectId::new(&table_id), &name)
            .await
            .map_err(|e| map_rpc_error(e, "suix_getDynamicFieldObject"))?;
        match parse_user_bottle(&entry, &token) {
            Some(bottle) => bottles.push(bottle),
            None => tracing::debug!(token = %token, address = %address, "No bottle"),
        }
    }
    Ok(bottles)
}

/// Contributor tokens owned by `address` for any of `tank_types`
async fn contributor_tokens(
    client: &dyn ChainClient,
    ids: &ProtocolIds,
    address: &SuiAddress,
    tank_types: &[String],
) -> Result<Vec<SuiObjectResponse>, ProtocolError> {
    let buck = ids.buck_type();
    let filters = tank_types
        .iter()
        .map(|t| {
            ObjectFilter::StructType(format!(
                "{}::tank::ContributorToken<{}, {}>",
                ids.contributor_token_package, buck, t
            ))
        })
        .collect();
    let query = ObjectResponseQuery {
        filter: Some(ObjectFilter::MatchAny(filters)),
        options: Some(ObjectDataOptions::content()),
    };

    let mut tokens = Vec::new();
    let mut cursor = None;
    loop {
        let page = client
            .get_owned_objects(address, &query, cursor, None)
            .await
            .map_err(|e| map_rpc_error(e, "suix_getOwnedObjects"))?;
        tokens.extend(page.data);
        match page.next_cursor {
            Some(next) if page.has_next_page => cursor = Some(next),
            _ => break,
        }
    }
    Ok(tokens)
}

/// Sum one `tank::*` getter over `tokens`; zero without tokens
async fn tank_amount(
    client: &dyn ChainClient,
    ids: &ProtocolIds,
    tank_type: &str,
    function: &str,
    tokens: &[ObjectRef],
    decimals: usize,
) -> Result<f64, ProtocolError> {
    if tokens.is_empty() {
        return Ok(0.0);
    }
    let tx = build_tank_inspect_tx(ids, tank_type, function, tokens).map_err(build_error)?;
    let results = dev_inspect(client, &SuiAddress::from(&ids.protocol_id), &tx).await?;
    Ok(sum_tank_results(&results, decimals))
}

pub async fn fetch_user_tanks(
    client: &dyn ChainClient,
    ids: &ProtocolIds,
    address: &SuiAddress,
) -> Result<UserTankList, ProtocolError> {
    let tank_types: Vec<String> = protocol_fields(client, ids)
        .await?
        .into_iter()
        .filter(|f| f.object_type.contains("Tank"))
        .filter_map(|f| coin_type_from_object_type(&f.object_type))
        .collect();
    if tank_types.is_empty() {
        return Ok(UserTankList::new());
    }

    let owned = contributor_tokens(client, ids, address, &tank_types).await?;

    let mut tanks = UserTankList::new();
    for tank_type in &tank_types {
        let tokens: Vec<ObjectRef> = owned
            .iter()
            .filter(|o| {
                o.object_type()
                    .and_then(|t| type_params(t).get(1).map(|p| same_type(p, tank_type)))
                    .unwrap_or(false)
            })
            .filter_map(|o| o.data.as_ref().and_then(|d| d.object_ref()))
            .collect();

        let decimals = usize::from(ids.decimals_for_type(tank_type));
        let total_buck =
            tank_amount(client, ids, tank_type, "get_token_weight", &tokens, BUCK_DECIMALS).await?;
        let total_earned = tank_amount(
            client,
            ids,
            tank_type,
            "get_collateral_reward_amount",
            &tokens,
            decimals,
        )
        .await?;

        let key = ids
            .symbol_for_type(tank_type)
            .map(str::to_string)
            .unwrap_or_else(|| tank_type.clone());
        tanks.insert(
            key,
            UserTankInfo {
                total_buck,
                total_earned,
            },
        );
    }
    Ok(tanks)
}

pub async fn fetch_prices(
    client: &dyn ChainClient,
    ids: &ProtocolIds,
) -> Result<TokenPrices, ProtocolError> {
    if ids.price_feeds.is_empty() {
        return Err(ProtocolError::StateUnavailable {
            reason: "no price feeds configured for this deployment".to_string(),
        });
    }

    let feed_ids: Vec<ObjectId> = ids.price_feeds.iter().map(|f| f.object_id.clone()).collect();
    let objects = client
        .multi_get_objects(&feed_ids, ObjectDataOptions::content())
        .await
        .map_err(|e| map_rpc_error(e, "sui_multiGetObjects"))?;

    let readings: Vec<(&str, f64)> = ids
        .price_feeds
        .iter()
        .zip(objects.iter())
        .filter_map(|(feed, object)| match parse_price_feed(object) {
            Some(price) => Some((feed.name.as_str(), price)),
            None => {
                tracing::warn!(feed = %feed.name, object = %feed.object_id, "Unreadable price feed");
                None
            }
        })
        .collect();
    if readings.is_empty() {
        return Err(ProtocolError::StateUnavailable {
            reason: format!("none of the {} price feeds could be read", ids.price_feeds.len()),
        });
    }
    Ok(derive_prices(readings))
}
