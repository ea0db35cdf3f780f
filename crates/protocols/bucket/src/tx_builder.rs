//! Bucket Transaction Builder
//!
//! Builds unsigned programmable transactions for Bucket move calls.
//!
//! # Important Notes
//!
//! - Builders never touch the chain; object inputs stay unresolved until the
//!   wallet or devInspect resolves them
//! - The insertion hint is a `vector<address>` holding zero or one address
//! - The clock is always passed as an immutable shared object

use bucket_core::{constants::SUI_CLOCK_OBJECT_ID, ObjectId, SuiAddress, TxError};
use sui_rpc_client::Coin;
use sui_tx::{Argument, ObjectRef, TransactionBlock};

use crate::constants::ProtocolIds;

/// One `tank::*` call with the `[BUCK, asset]` type arguments.
fn tank_call(
    ids: &ProtocolIds,
    function: &str,
    asset_type: &str,
    tank_id: &ObjectId,
    extra: impl FnOnce(&mut TransactionBlock) -> Result<Vec<Argument>, TxError>,
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    let buck = ids.buck_type();
    let mut args = vec![tx.object(tank_id)?];
    args.extend(extra(&mut tx)?);
    tx.move_call(&ids.target("tank", function), &[buck.as_str(), asset_type], args)?;
    Ok(tx)
}

fn insertion_arg(
    tx: &mut TransactionBlock,
    insertion: Option<&SuiAddress>,
) -> Result<Argument, TxError> {
    match insertion {
        Some(address) => tx.pure_addresses(std::slice::from_ref(address)),
        None => tx.pure_addresses(&[]),
    }
}

fn clock(tx: &mut TransactionBlock) -> Result<Argument, TxError> {
    tx.object(&ObjectId::new(SUI_CLOCK_OBJECT_ID))
}

// =============================================================================
// Tank
// =============================================================================

/// Deposit BUCK into a tank
pub fn deposit_to_tank(
    ids: &ProtocolIds,
    asset_type: &str,
    tank_id: &ObjectId,
    buck_coin: &ObjectId,
) -> Result<TransactionBlock, TxError> {
    tank_call(ids, "deposit", asset_type, tank_id, |tx| Ok(vec![tx.object(buck_coin)?]))
}

/// Offset debt against the BUCK held in a tank
pub fn absorb_from_tank(
    ids: &ProtocolIds,
    asset_type: &str,
    tank_id: &ObjectId,
    collateral_coin: &ObjectId,
    debt_amount: u64,
) -> Result<TransactionBlock, TxError> {
    tank_call(ids, "absorb", asset_type, tank_id, |tx| {
        Ok(vec![tx.object(collateral_coin)?, tx.pure_u64(debt_amount)?])
    })
}

/// Withdraw BUCK and collateral gain
pub fn withdraw_from_tank(
    ids: &ProtocolIds,
    asset_type: &str,
    tank_id: &ObjectId,
    contributor_token: &ObjectId,
) -> Result<TransactionBlock, TxError> {
    tank_call(ids, "withdraw", asset_type, tank_id, |tx| {
        Ok(vec![tx.object(contributor_token)?])
    })
}

/// Claim collateral gain and BKT reward
pub fn claim_from_tank(
    ids: &ProtocolIds,
    asset_type: &str,
    tank_id: &ObjectId,
    contributor_token: &ObjectId,
) -> Result<TransactionBlock, TxError> {
    tank_call(ids, "claim", asset_type, tank_id, |tx| {
        Ok(vec![tx.object(contributor_token)?])
    })
}

/// Claim only the BKT reward earned since the last snapshot
pub fn claim_bkt(
    ids: &ProtocolIds,
    asset_type: &str,
    tank_id: &ObjectId,
    contributor_token: &ObjectId,
) -> Result<TransactionBlock, TxError> {
    tank_call(ids, "claim_bkt", asset_type, tank_id, |tx| {
        Ok(vec![tx.object(contributor_token)?])
    })
}

// =============================================================================
// Bottles
// =============================================================================

pub fn borrow(
    ids: &ProtocolIds,
    asset_type: &str,
    protocol_id: &ObjectId,
    collateral_coin: &ObjectId,
    buck_output_amount: u64,
    insertion: Option<&SuiAddress>,
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    let args = vec![
        tx.object(protocol_id)?,
        tx.object(&ids.oracle_id)?,
        clock(&mut tx)?,
        tx.object(collateral_coin)?,
        tx.pure_u64(buck_output_amount)?,
        insertion_arg(&mut tx, insertion)?,
    ];
    tx.move_call(&ids.target("buck", "borrow"), &[asset_type], args)?;
    Ok(tx)
}

pub fn top_up(
    ids: &ProtocolIds,
    asset_type: &str,
    protocol_id: &ObjectId,
    collateral_coin: &ObjectId,
    for_address: &SuiAddress,
    insertion: Option<&SuiAddress>,
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    let args = vec![
        tx.object(protocol_id)?,
        tx.object(collateral_coin)?,
        tx.pure_address(for_address)?,
        insertion_arg(&mut tx, insertion)?,
    ];
    tx.move_call(&ids.target("buck", "top_up"), &[asset_type], args)?;
    Ok(tx)
}

pub fn withdraw(
    ids: &ProtocolIds,
    asset_type: &str,
    protocol_id: &ObjectId,
    oracle_id: &ObjectId,
    collateral_amount: u64,
    insertion: Option<&SuiAddress>,
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    let args = vec![
        tx.object(protocol_id)?,
        tx.object(oracle_id)?,
        clock(&mut tx)?,
        tx.pure_u64(collateral_amount)?,
        insertion_arg(&mut tx, insertion)?,
    ];
    tx.move_call(&ids.target("buck", "withdraw"), &[asset_type], args)?;
    Ok(tx)
}

pub fn repay(
    ids: &ProtocolIds,
    asset_type: &str,
    protocol_id: &ObjectId,
    buck_coin: &ObjectId,
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    let args = vec![tx.object(protocol_id)?, tx.object(buck_coin)?];
    tx.move_call(&ids.target("buck", "repay"), &[asset_type], args)?;
    Ok(tx)
}

pub fn redeem(
    ids: &ProtocolIds,
    asset_type: &str,
    protocol_id: &ObjectId,
    oracle_id: &ObjectId,
    buck_coin: &ObjectId,
    insertion: Option<&SuiAddress>,
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    let args = vec![
        tx.object(protocol_id)?,
        tx.object(oracle_id)?,
        clock(&mut tx)?,
        tx.object(buck_coin)?,
        insertion_arg(&mut tx, insertion)?,
    ];
    tx.move_call(&ids.target("buck", "redeem"), &[asset_type], args)?;
    Ok(tx)
}

// =============================================================================
// Well (BKT staking)
// =============================================================================

pub fn stake(
    ids: &ProtocolIds,
    asset_type: &str,
    well_id: &ObjectId,
    bkt_coin: &ObjectId,
    lock_time: u64,
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    let args = vec![
        tx.object(well_id)?,
        tx.object(bkt_coin)?,
        tx.pure_u64(lock_time)?,
        clock(&mut tx)?,
    ];
    tx.move_call(&ids.target("well", "stake"), &[asset_type], args)?;
    Ok(tx)
}

pub fn unstake(
    ids: &ProtocolIds,
    asset_type: &str,
    well_id: &ObjectId,
    staked_bkt: &ObjectId,
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    let args = vec![tx.object(well_id)?, tx.object(staked_bkt)?, clock(&mut tx)?];
    tx.move_call(&ids.target("well", "unstake"), &[asset_type], args)?;
    Ok(tx)
}

pub fn force_unstake(
    ids: &ProtocolIds,
    asset_type: &str,
    well_id: &ObjectId,
    bkt_treasury: &ObjectId,
    staked_bkt: &ObjectId,
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    let args = vec![
        tx.object(well_id)?,
        tx.object(bkt_treasury)?,
        tx.object(staked_bkt)?,
        clock(&mut tx)?,
    ];
    tx.move_call(&ids.target("well", "force_unstake"), &[asset_type], args)?;
    Ok(tx)
}

pub fn claim_from_well(
    ids: &ProtocolIds,
    asset_type: &str,
    well_id: &ObjectId,
    staked_bkt: &ObjectId,
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    let args = vec![tx.object(well_id)?, tx.object(staked_bkt)?];
    tx.move_call(&ids.target("well", "claim"), &[asset_type], args)?;
    Ok(tx)
}

// =============================================================================
// Composite flows
// =============================================================================

/// Most wallet coins merged into one payment
pub const MAX_MERGED_COINS: usize = 256;

/// Pick coins of `coin_type` in wallet order until their balance covers
/// `amount`, merge them into the first and split `amount` off it.
fn split_from_wallet(
    tx: &mut TransactionBlock,
    coins: &[Coin],
    coin_type: &str,
    amount: u64,
) -> Result<Argument, TxError> {
    let mut selected: Vec<ObjectRef> = Vec::new();
    let mut covered: u128 = 0;
    for coin in coins.iter().filter(|c| sui_tx::same_type(&c.coin_type, coin_type)) {
        if !selected.is_empty() && covered >= u128::from(amount) {
            break;
        }
        if selected.len() == MAX_MERGED_COINS {
            return Err(TxError::BuildFailed {
                message: format!(
                    "{} {} needs more than {} coins",
                    amount, coin_type, MAX_MERGED_COINS
                ),
            });
        }
        let balance: u128 = coin.balance.parse().map_err(|_| TxError::BuildFailed {
            message: format!("Coin {} has an invalid balance", coin.coin_object_id),
        })?;
        let object_ref = coin.object_ref().ok_or_else(|| TxError::BuildFailed {
            message: format!("Coin {} has an invalid version", coin.coin_object_id),
        })?;
        covered += balance;
        selected.push(object_ref);
    }

    let mut refs = selected.into_iter();
    let main = refs.next().ok_or_else(|| TxError::NoCoins {
        coin_type: coin_type.to_string(),
    })?;
    if covered < u128::from(amount) {
        return Err(TxError::BuildFailed {
            message: format!(
                "Insufficient {} balance: {} available, {} needed",
                coin_type, covered, amount
            ),
        });
    }

    let main = tx.object_ref(main)?;
    let others = refs
        .map(|r| tx.object_ref(r))
        .collect::<Result<Vec<Argument>, TxError>>()?;
    if !others.is_empty() {
        tx.merge_coins(main, others)?;
    }

    let amount = tx.pure_u64(amount)?;
    Ok(nested(tx.split_coins(main, vec![amount])?))
}

/// First coin produced by a `SplitCoins` command
fn nested(result: Argument) -> Argument {
    match result {
        Argument::Result(i) => Argument::NestedResult(i, 0),
        other => other,
    }
}

/// Refresh the Bucket oracle price of `collateral_type` from Supra
fn update_price(
    tx: &mut TransactionBlock,
    ids: &ProtocolIds,
    collateral_type: &str,
) -> Result<(), TxError> {
    let supra_id = ids
        .coin_by_type(collateral_type)
        .and_then(|c| c.supra_id)
        .ok_or_else(|| TxError::BuildFailed {
            message: format!("No Supra price id for {}", collateral_type),
        })?;

    let args = vec![
        tx.object(&ids.oracle_id)?,
        clock(tx)?,
        tx.object(&ids.supra_handler_id)?,
        tx.pure_u32(supra_id)?,
    ];
    tx.move_call(&ids.supra_update_target, &[collateral_type], args)?;
    Ok(())
}

/// Open or grow a bottle.
///
/// SUI collateral is split from the gas coin; other collateral comes from
/// `wallet_coins`. A zero `borrow_amount` only tops up collateral.
pub fn build_borrow_tx(
    ids: &ProtocolIds,
    is_new_bottle: bool,
    collateral_type: &str,
    collateral_amount: u64,
    borrow_amount: u64,
    wallet: &SuiAddress,
    wallet_coins: &[Coin],
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();

    let collateral = if ProtocolIds::is_sui(collateral_type) {
        let amount = tx.pure_u64(collateral_amount)?;
        let gas = tx.gas();
        nested(tx.split_coins(gas, vec![amount])?)
    } else {
        split_from_wallet(&mut tx, wallet_coins, collateral_type, collateral_amount)?
    };

    let insertion = if is_new_bottle { None } else { Some(wallet) };
    let operations = |function: &str| {
        format!(
            "{}::bucket_operations::{}",
            ids.bucket_operations_package, function
        )
    };

    if borrow_amount == 0 {
        let args = vec![
            tx.object(&ids.protocol_id)?,
            collateral,
            tx.pure_address(wallet)?,
            insertion_arg(&mut tx, insertion)?,
        ];
        tx.move_call(&operations("top_up"), &[collateral_type], args)?;
    } else {
        update_price(&mut tx, ids, collateral_type)?;
        let args = vec![
            tx.object(&ids.protocol_id)?,
            tx.object(&ids.oracle_id)?,
            clock(&mut tx)?,
            collateral,
            tx.pure_u64(borrow_amount)?,
            insertion_arg(&mut tx, insertion)?,
        ];
        tx.move_call(&operations("borrow"), &[collateral_type], args)?;
    }

    Ok(tx)
}

/// Repay debt with BUCK from `buck_coins` and withdraw collateral
pub fn build_repay_tx(
    ids: &ProtocolIds,
    collateral_type: &str,
    repay_amount: u64,
    withdraw_amount: u64,
    wallet: &SuiAddress,
    buck_coins: &[Coin],
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    let buck = split_from_wallet(&mut tx, buck_coins, &ids.buck_type(), repay_amount)?;

    update_price(&mut tx, ids, collateral_type)?;

    let args = vec![
        tx.object(&ids.protocol_id)?,
        tx.object(&ids.oracle_id)?,
        clock(&mut tx)?,
        buck,
        tx.pure_u64(withdraw_amount)?,
        insertion_arg(&mut tx, Some(wallet))?,
    ];
    tx.move_call(
        &format!(
            "{}::bucket_operations::repay_and_withdraw",
            ids.bucket_operations_package
        ),
        &[collateral_type],
        args,
    )?;
    Ok(tx)
}

// =============================================================================
// Read-only inspections
// =============================================================================

/// The eight `constants::*` getters, in the order `parse_bucket_constants` expects
pub const CONSTANT_GETTERS: [&str; 8] = [
    "fee_precision",
    "liquidation_rebate",
    "flash_loan_fee",
    "buck_decimal",
    "max_lock_time",
    "min_lock_time",
    "min_fee",
    "max_fee",
];

pub fn build_constants_inspect_tx(ids: &ProtocolIds) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    for getter in CONSTANT_GETTERS {
        tx.move_call(&ids.target("constants", getter), &[], vec![])?;
    }
    Ok(tx)
}

/// `buck::borrow_tank` followed by one `tank::<function>` call per token
pub fn build_tank_inspect_tx(
    ids: &ProtocolIds,
    tank_type: &str,
    function: &str,
    tokens: &[ObjectRef],
) -> Result<TransactionBlock, TxError> {
    let mut tx = TransactionBlock::new();
    let protocol = tx.object(&ids.protocol_id)?;
    let tank = tx.move_call(
        &format!("{}::buck::borrow_tank", ids.core_package),
        &[tank_type],
        vec![protocol],
    )?;

    let buck = ids.buck_type();
    let target = format!("{}::tank::{}", ids.core_package, function);
    for token in tokens {
        let token = tx.object_ref(token.clone())?;
        tx.move_call(&target, &[buck.as_str(), tank_type], vec![tank, token])?;
    }
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucket_core::{constants::SUI_COIN_TYPE, Network};
    use sui_tx::{CallArg, Command, MoveCall, ObjectArg};

    fn ids() -> ProtocolIds {
        ProtocolIds::for_network(Network::Mainnet).unwrap()
    }

    fn only_call(tx: &TransactionBlock) -> &MoveCall {
        let calls: Vec<_> = tx.move_calls().collect();
        assert_eq!(calls.len(), 1);
        calls[0]
    }

    fn coin(coin_type: &str, id: &str) -> Coin {
        Coin {
            coin_type: coin_type.to_string(),
            coin_object_id: ObjectId::new(id),
            version: "3".to_string(),
            digest: "11111111111111111111111111111111".to_string(),
            balance: "100".to_string(),
        }
    }

    fn input_object_id(tx: &TransactionBlock, arg: Argument) -> ObjectId {
        match arg {
            Argument::Input(i) => match &tx.inputs[i as usize] {
                CallArg::Object(o) => o.object_id().clone(),
                other => panic!("not an object input: {:?}", other),
            },
            other => panic!("not an input: {:?}", other),
        }
    }

    #[test]
    fn test_deposit_to_tank() {
        let ids = ids();
        let tx = deposit_to_tank(&ids, SUI_COIN_TYPE, &ObjectId::new("0xa1"), &ObjectId::new("0xb1"))
            .unwrap();
        let call = only_call(&tx);

        assert_eq!(call.package, ids.package_id);
        assert_eq!(call.module, "tank");
        assert_eq!(call.function, "deposit");
        assert_eq!(call.type_arguments, vec![ids.buck_type(), SUI_COIN_TYPE.to_string()]);
        assert_eq!(input_object_id(&tx, call.arguments[0]), ObjectId::new("0xa1"));
        assert_eq!(input_object_id(&tx, call.arguments[1]), ObjectId::new("0xb1"));
    }

    #[test]
    fn test_absorb_argument_order() {
        let tx = absorb_from_tank(&ids(), SUI_COIN_TYPE, &ObjectId::new("0xa1"), &ObjectId::new("0xc1"), 42)
            .unwrap();
        let call = only_call(&tx);
        assert_eq!(call.function, "absorb");
        assert_eq!(call.arguments.len(), 3);
        assert_eq!(tx.inputs[2], CallArg::Pure(42u64.to_le_bytes().to_vec()));
    }

    #[test]
    fn test_tank_token_calls() {
        let ids = ids();
        let tank = ObjectId::new("0xa1");
        let token = ObjectId::new("0xd1");
        for (tx, function) in [
            (withdraw_from_tank(&ids, SUI_COIN_TYPE, &tank, &token).unwrap(), "withdraw"),
            (claim_from_tank(&ids, SUI_COIN_TYPE, &tank, &token).unwrap(), "claim"),
            (claim_bkt(&ids, SUI_COIN_TYPE, &tank, &token).unwrap(), "claim_bkt"),
        ] {
            let call = only_call(&tx);
            assert_eq!(call.function, function);
            assert_eq!(call.type_arguments.len(), 2);
            assert_eq!(input_object_id(&tx, call.arguments[1]), token);
        }
    }

    #[test]
    fn test_borrow_argument_order() {
        let ids = ids();
        let wallet = SuiAddress::new("0x77");
        let tx = borrow(
            &ids,
            SUI_COIN_TYPE,
            &ids.protocol_id,
            &ObjectId::new("0xc1"),
            1_000,
            Some(&wallet),
        )
        .unwrap();
        let call = only_call(&tx);

        assert_eq!(call.target(), ids.target("buck", "borrow"));
        assert_eq!(call.type_arguments, vec![SUI_COIN_TYPE.to_string()]);
        assert_eq!(input_object_id(&tx, call.arguments[0]), ids.protocol_id);
        assert_eq!(input_object_id(&tx, call.arguments[1]), ids.oracle_id);
        assert_eq!(input_object_id(&tx, call.arguments[2]), ObjectId::new("0x6"));
        assert_eq!(input_object_id(&tx, call.arguments[3]), ObjectId::new("0xc1"));
        assert_eq!(tx.inputs[4], CallArg::Pure(1_000u64.to_le_bytes().to_vec()));
        match &tx.inputs[5] {
            CallArg::Pure(bytes) => {
                assert_eq!(bytes.len(), 33);
                assert_eq!(bytes[0], 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        match &tx.inputs[2] {
            CallArg::Object(ObjectArg::Unresolved { mutable, .. }) => assert!(!mutable),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_insertion_hint() {
        let ids = ids();
        let tx = withdraw(&ids, SUI_COIN_TYPE, &ids.protocol_id, &ids.oracle_id, 5, None).unwrap();
        let call = only_call(&tx);
        assert_eq!(call.function, "withdraw");
        assert_eq!(call.arguments.len(), 5);
        assert_eq!(tx.inputs.last(), Some(&CallArg::Pure(vec![0])));
    }

    #[test]
    fn test_top_up_repay_redeem() {
        let ids = ids();
        let coin_id = ObjectId::new("0xc1");
        let owner = SuiAddress::new("0x77");

        let tx = top_up(&ids, SUI_COIN_TYPE, &ids.protocol_id, &coin_id, &owner, None).unwrap();
        assert_eq!(only_call(&tx).function, "top_up");
        assert_eq!(only_call(&tx).arguments.len(), 4);

        let tx = repay(&ids, SUI_COIN_TYPE, &ids.protocol_id, &coin_id).unwrap();
        assert_eq!(only_call(&tx).function, "repay");
        assert_eq!(only_call(&tx).arguments.len(), 2);

        let tx = redeem(&ids, SUI_COIN_TYPE, &ids.protocol_id, &ids.oracle_id, &coin_id, None).unwrap();
        let call = only_call(&tx);
        assert_eq!(call.function, "redeem");
        assert_eq!(input_object_id(&tx, call.arguments[2]), ObjectId::new("0x6"));
        assert_eq!(input_object_id(&tx, call.arguments[3]), coin_id);
    }

    #[test]
    fn test_well_calls() {
        let ids = ids();
        let well = ObjectId::new("0xe1");
        let staked = ObjectId::new("0xe2");

        let tx = stake(&ids, SUI_COIN_TYPE, &well, &ObjectId::new("0xe3"), 86_400).unwrap();
        let call = only_call(&tx);
        assert_eq!(call.target(), ids.target("well", "stake"));
        assert_eq!(input_object_id(&tx, call.arguments[3]), ObjectId::new("0x6"));

        let tx = unstake(&ids, SUI_COIN_TYPE, &well, &staked).unwrap();
        assert_eq!(only_call(&tx).arguments.len(), 3);

        let tx = force_unstake(&ids, SUI_COIN_TYPE, &well, &ObjectId::new("0xe4"), &staked).unwrap();
        let call = only_call(&tx);
        assert_eq!(call.function, "force_unstake");
        assert_eq!(input_object_id(&tx, call.arguments[1]), ObjectId::new("0xe4"));

        let tx = claim_from_well(&ids, SUI_COIN_TYPE, &well, &staked).unwrap();
        assert_eq!(only_call(&tx).function, "claim");
    }

    #[test]
    fn test_borrow_tx_with_sui_splits_gas() {
        let ids = ids();
        let wallet = SuiAddress::new("0x77");
        let tx = build_borrow_tx(&ids, true, SUI_COIN_TYPE, 10, 5, &wallet, &[]).unwrap();

        assert!(matches!(&tx.commands[0], Command::SplitCoins(Argument::GasCoin, _)));
        let calls: Vec<_> = tx.move_calls().collect();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].module, "bucket_oracle");
        assert_eq!(calls[0].function, "update_price");
        assert_eq!(calls[0].arguments.len(), 4);
        assert_eq!(calls[1].function, "borrow");
        assert_eq!(calls[1].module, "bucket_operations");
        assert_eq!(calls[1].arguments[3], Argument::NestedResult(0, 0));
        // new bottle: empty insertion hint
        assert_eq!(tx.inputs.last(), Some(&CallArg::Pure(vec![0])));
    }

    #[test]
    fn test_borrow_tx_zero_borrow_tops_up() {
        let ids = ids();
        let wallet = SuiAddress::new("0x77");
        let usdc = ids.coin_by_symbol("USDC").unwrap().coin_type.clone();
        let coins = vec![
            coin(&usdc, "0xf1"),
            coin(SUI_COIN_TYPE, "0xf3"),
            coin(&usdc, "0xf2"),
            coin(&usdc, "0xf4"),
        ];

        // two 100 coins cover 150; the third stays out
        let tx = build_borrow_tx(&ids, false, &usdc, 150, 0, &wallet, &coins).unwrap();

        match &tx.commands[0] {
            Command::MergeCoins(_, sources) => assert_eq!(sources.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(&tx.commands[1], Command::SplitCoins(_, _)));
        let call = only_call(&tx);
        assert_eq!(call.function, "top_up");
        assert_eq!(call.arguments[1], Argument::NestedResult(1, 0));
        // existing bottle: wallet as insertion hint
        match tx.inputs.last() {
            Some(CallArg::Pure(bytes)) => assert_eq!(bytes.len(), 33),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_borrow_tx_without_coins() {
        let ids = ids();
        let usdc = ids.coin_by_symbol("USDC").unwrap().coin_type.clone();
        let err = build_borrow_tx(&ids, true, &usdc, 10, 1, &SuiAddress::new("0x77"), &[]).unwrap_err();
        assert!(matches!(err, TxError::NoCoins { .. }));
    }

    #[test]
    fn test_wallet_coins_cover_amount() {
        let ids = ids();
        let wallet = SuiAddress::new("0x77");
        let usdc = ids.coin_by_symbol("USDC").unwrap().coin_type.clone();

        let coins = vec![coin(&usdc, "0xf1"), coin(&usdc, "0xf2")];
        let tx = build_borrow_tx(&ids, true, &usdc, 100, 0, &wallet, &coins).unwrap();
        assert!(matches!(&tx.commands[0], Command::SplitCoins(_, _)));
        assert!(!tx.inputs.iter().any(|i| matches!(
            i,
            CallArg::Object(ObjectArg::ImmOrOwned(r)) if r.object_id == ObjectId::new("0xf2")
        )));

        let err = build_borrow_tx(&ids, true, &usdc, 201, 0, &wallet, &coins).unwrap_err();
        assert!(matches!(err, TxError::BuildFailed { .. }));
    }

    #[test]
    fn test_merge_is_capped() {
        let ids = ids();
        let usdc = ids.coin_by_symbol("USDC").unwrap().coin_type.clone();
        let coins: Vec<Coin> = (0..MAX_MERGED_COINS + 10)
            .map(|i| coin(&usdc, &format!("0x{:x}", 0x1000 + i)))
            .collect();

        let covered = 100 * MAX_MERGED_COINS as u64;
        let tx = build_borrow_tx(&ids, true, &usdc, covered, 0, &SuiAddress::new("0x77"), &coins)
            .unwrap();
        match &tx.commands[0] {
            Command::MergeCoins(_, sources) => assert_eq!(sources.len(), MAX_MERGED_COINS - 1),
            other => panic!("unexpected {:?}", other),
        }

        let err = build_borrow_tx(&ids, true, &usdc, covered + 1, 0, &SuiAddress::new("0x77"), &coins)
            .unwrap_err();
        match err {
            TxError::BuildFailed { message } => assert!(message.contains("coins")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_repay_tx() {
        let ids = ids();
        let wallet = SuiAddress::new("0x77");
        let coins = vec![coin(&ids.buck_type(), "0xf1")];

        let tx = build_repay_tx(&ids, SUI_COIN_TYPE, 100, 50, &wallet, &coins).unwrap();
        assert!(matches!(&tx.commands[0], Command::SplitCoins(_, _)));
        let calls: Vec<_> = tx.move_calls().collect();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].function, "repay_and_withdraw");
        assert_eq!(calls[1].arguments[3], Argument::NestedResult(0, 0));
        assert_eq!(calls[1].arguments.len(), 6);
    }

    #[test]
    fn test_repay_tx_unknown_collateral() {
        let ids = ids();
        let coins = vec![coin(&ids.buck_type(), "0xf1")];
        let err = build_repay_tx(&ids, "0x9::x::X", 1, 1, &SuiAddress::new("0x77"), &coins).unwrap_err();
        assert!(matches!(err, TxError::BuildFailed { .. }));
    }

    #[test]
    fn test_constants_inspect_order() {
        let tx = build_constants_inspect_tx(&ids()).unwrap();
        let functions: Vec<_> = tx.move_calls().map(|c| c.function.as_str()).collect();
        assert_eq!(functions, CONSTANT_GETTERS.to_vec());
        assert!(tx.inputs.is_empty());
    }

    #[test]
    fn test_tank_inspect_tx() {
        let ids = ids();
        let tokens = vec![
            ObjectRef {
                object_id: ObjectId::new("0xd1"),
                version: 1,
                digest: "11111111111111111111111111111111".into(),
            },
            ObjectRef {
                object_id: ObjectId::new("0xd2"),
                version: 1,
                digest: "11111111111111111111111111111111".into(),
            },
        ];
        let tx = build_tank_inspect_tx(&ids, SUI_COIN_TYPE, "get_token_weight", &tokens).unwrap();
        let calls: Vec<_> = tx.move_calls().collect();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].function, "borrow_tank");
        assert_eq!(calls[0].type_arguments, vec![SUI_COIN_TYPE.to_string()]);
        assert_eq!(calls[2].arguments[0], Argument::Result(0));
        assert_eq!(calls[2].type_arguments[0], ids.buck_type());
    }
}
