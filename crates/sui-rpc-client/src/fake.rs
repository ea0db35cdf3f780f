//! In-memory `ChainClient` for tests
//!
//! Objects, dynamic fields, events, coins and devInspect responses are seeded
//! up front; every devInspect request is recorded for later assertions.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use bucket_core::{ObjectId, RpcError, SuiAddress};
use serde_json::Value;
use sui_tx::TransactionBlock;

use crate::types::*;
use crate::{ChainClient, Result};

#[derive(Default)]
struct State {
    objects: HashMap<ObjectId, SuiObjectResponse>,
    dynamic_fields: HashMap<ObjectId, Vec<DynamicFieldInfo>>,
    dynamic_field_objects: HashMap<(ObjectId, String), SuiObjectResponse>,
    owned: HashMap<SuiAddress, Vec<SuiObjectResponse>>,
    events: HashMap<String, Vec<SuiEvent>>,
    coins: HashMap<SuiAddress, Vec<Coin>>,
    inspect_responses: VecDeque<DevInspectResults>,
    inspected: Vec<(SuiAddress, TransactionBlock)>,
    failing: HashSet<String>,
    page_size: Option<usize>,
}

/// Seedable fake fullnode
#[derive(Default)]
pub struct FakeChain {
    state: Mutex<State>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut state)
    }

    /// Limit every paginated response to `size` items
    pub fn set_page_size(&self, size: usize) {
        self.with_state(|s| s.page_size = Some(size));
    }

    /// Make every call to `method` (JSON-RPC name) fail
    pub fn fail(&self, method: &str) {
        self.with_state(|s| {
            s.failing.insert(method.to_string());
        });
    }

    /// Seed a Move object with the given type and fields
    pub fn insert_object(&self, object_id: &ObjectId, object_type: &str, fields: Value) {
        let response = move_object(object_id, object_type, fields);
        self.with_state(|s| {
            s.objects.insert(object_id.clone(), response);
        });
    }

    /// Seed a dynamic field of `parent`; the child object is inserted too
    pub fn insert_dynamic_field(
        &self,
        parent_id: &ObjectId,
        object_id: &ObjectId,
        object_type: &str,
        fields: Value,
    ) {
        self.insert_object(object_id, object_type, fields);
        let info = DynamicFieldInfo {
            name: DynamicFieldName {
                name_type: "0x1::type_name::TypeName".to_string(),
                value: Value::Null,
            },
            object_type: object_type.to_string(),
            object_id: object_id.clone(),
            version: Value::from(1),
            digest: String::new(),
        };
        self.with_state(|s| s.dynamic_fields.entry(parent_id.clone()).or_default().push(info));
    }

    /// Seed the value stored under an address key of a table
    pub fn insert_table_entry(&self, table_id: &ObjectId, key: &SuiAddress, fields: Value) {
        let response = move_object(
            &ObjectId::new(key.as_str()),
            "0x2::dynamic_field::Field",
            fields,
        );
        self.with_state(|s| {
            s.dynamic_field_objects
                .insert((table_id.clone(), key.to_string()), response);
        });
    }

    pub fn insert_owned(&self, owner: &SuiAddress, object: SuiObjectResponse) {
        self.with_state(|s| s.owned.entry(owner.clone()).or_default().push(object));
    }

    pub fn insert_event(&self, event_type: &str, parsed_json: Value) {
        self.with_state(|s| {
            let events = s.events.entry(event_type.to_string()).or_default();
            let seq = events.len();
            events.push(SuiEvent {
                id: EventId {
                    tx_digest: format!("tx{}", seq),
                    event_seq: seq.to_string(),
                },
                package_id: None,
                transaction_module: None,
                sender: None,
                event_type: event_type.to_string(),
                parsed_json,
                timestamp_ms: None,
            });
        });
    }

    pub fn insert_coin(&self, owner: &SuiAddress, coin_type: &str, object_id: &ObjectId, balance: u64) {
        let coin = Coin {
            coin_type: coin_type.to_string(),
            coin_object_id: object_id.clone(),
            version: "1".to_string(),
            digest: "11111111111111111111111111111111".to_string(),
            balance: balance.to_string(),
        };
        self.with_state(|s| s.coins.entry(owner.clone()).or_default().push(coin));
    }

    /// Queue the response for the next devInspect call
    pub fn push_inspect_response(&self, results: Vec<SuiExecutionResult>) {
        self.with_state(|s| {
            s.inspect_responses.push_back(DevInspectResults {
                results: Some(results),
                ..Default::default()
            })
        });
    }

    /// devInspect requests seen so far, in order
    pub fn inspected(&self) -> Vec<(SuiAddress, TransactionBlock)> {
        self.with_state(|s| s.inspected.clone())
    }

    fn check(&self, method: &str) -> Result<()> {
        if self.with_state(|s| s.failing.contains(method)) {
            return Err(RpcError::ApiError {
                message: format!("{} failed", method),
            });
        }
        Ok(())
    }

    fn paginate<T: Clone>(&self, items: &[T], cursor: Option<String>) -> Page<T> {
        let start = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        let size = self.with_state(|s| s.page_size).unwrap_or(usize::MAX);
        let end = start.saturating_add(size).min(items.len());
        let data = items.get(start..end).map(|s| s.to_vec()).unwrap_or_default();
        let has_next_page = end < items.len();
        Page {
            data,
            next_cursor: has_next_page.then(|| end.to_string()),
            has_next_page,
        }
    }
}

/// Build a `moveObject` response with the given type and fields
pub fn move_object(object_id: &ObjectId, object_type: &str, fields: Value) -> SuiObjectResponse {
    SuiObjectResponse {
        data: Some(SuiObjectData {
            object_id: object_id.clone(),
            version: "1".to_string(),
            digest: "11111111111111111111111111111111".to_string(),
            object_type: Some(object_type.to_string()),
            owner: Some(Owner::AddressOwner("0x0".to_string())),
            content: Some(SuiParsedData {
                data_type: "moveObject".to_string(),
                object_type: Some(object_type.to_string()),
                fields,
            }),
        }),
        error: None,
    }
}

fn not_found(object_id: &ObjectId) -> SuiObjectResponse {
    SuiObjectResponse {
        data: None,
        error: Some(serde_json::json!({ "code": "notExists", "object_id": object_id })),
    }
}

fn matches_filter(object: &SuiObjectResponse, filter: &ObjectFilter) -> bool {
    match filter {
        ObjectFilter::MatchAny(filters) => filters.iter().any(|f| matches_filter(object, f)),
        ObjectFilter::StructType(expected) => object
            .object_type()
            .map(|t| sui_tx::same_type(t, expected))
            .unwrap_or(false),
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn get_object(
        &self,
        object_id: &ObjectId,
        _options: ObjectDataOptions,
    ) -> Result<SuiObjectResponse> {
        self.check("sui_getObject")?;
        Ok(self
            .with_state(|s| s.objects.get(object_id).cloned())
            .unwrap_or_else(|| not_found(object_id)))
    }

    async fn multi_get_objects(
        &self,
        object_ids: &[ObjectId],
        _options: ObjectDataOptions,
    ) -> Result<Vec<SuiObjectResponse>> {
        self.check("sui_multiGetObjects")?;
        Ok(self.with_state(|s| {
            object_ids
                .iter()
                .map(|id| s.objects.get(id).cloned().unwrap_or_else(|| not_found(id)))
                .collect()
        }))
    }

    async fn get_dynamic_fields(
        &self,
        parent_id: &ObjectId,
        cursor: Option<String>,
        _limit: Option<usize>,
    ) -> Result<Page<DynamicFieldInfo>> {
        self.check("suix_getDynamicFields")?;
        let fields = self.with_state(|s| s.dynamic_fields.get(parent_id).cloned().unwrap_or_default());
        Ok(self.paginate(&fields, cursor))
    }

    async fn get_dynamic_field_object(
        &self,
        parent_id: &ObjectId,
        name: &DynamicFieldName,
    ) -> Result<SuiObjectResponse> {
        self.check("suix_getDynamicFieldObject")?;
        let key = match &name.value {
            Value::String(s) => SuiAddress::new(s).to_string(),
            other => other.to_string(),
        };
        Ok(self
            .with_state(|s| s.dynamic_field_objects.get(&(parent_id.clone(), key)).cloned())
            .unwrap_or_else(|| not_found(parent_id)))
    }

    async fn get_owned_objects(
        &self,
        owner: &SuiAddress,
        query: &ObjectResponseQuery,
        cursor: Option<String>,
        _limit: Option<usize>,
    ) -> Result<Page<SuiObjectResponse>> {
        self.check("suix_getOwnedObjects")?;
        let owned: Vec<_> = self
            .with_state(|s| s.owned.get(owner).cloned().unwrap_or_default())
            .into_iter()
            .filter(|o| query.filter.as_ref().map_or(true, |f| matches_filter(o, f)))
            .collect();
        Ok(self.paginate(&owned, cursor))
    }

    async fn query_events(
        &self,
        filter: &EventFilter,
        cursor: Option<EventId>,
        _limit: Option<usize>,
        _descending: bool,
    ) -> Result<Page<SuiEvent, EventId>> {
        self.check("suix_queryEvents")?;
        let EventFilter::MoveEventType(event_type) = filter;
        let events = self.with_state(|s| {
            s.events
                .iter()
                .find(|(t, _)| sui_tx::same_type(t, event_type))
                .map(|(_, e)| e.clone())
                .unwrap_or_default()
        });

        let page = self.paginate(&events, cursor.map(|c| c.event_seq));
        let next_cursor = page
            .next_cursor
            .as_ref()
            .and_then(|_| page.data.last().map(|e| e.id.clone()))
            .map(|last| EventId {
                event_seq: (last.event_seq.parse::<usize>().unwrap_or(0) + 1).to_string(),
                ..last
            });

        Ok(Page {
            data: page.data,
            next_cursor,
            has_next_page: page.has_next_page,
        })
    }

    async fn get_coins(
        &self,
        owner: &SuiAddress,
        coin_type: Option<&str>,
        cursor: Option<String>,
        _limit: Option<usize>,
    ) -> Result<Page<Coin>> {
        self.check("suix_getCoins")?;
        let coin_type = coin_type.unwrap_or(bucket_core::constants::SUI_COIN_TYPE);
        let coins: Vec<_> = self
            .with_state(|s| s.coins.get(owner).cloned().unwrap_or_default())
            .into_iter()
            .filter(|c| sui_tx::same_type(&c.coin_type, coin_type))
            .collect();
        Ok(self.paginate(&coins, cursor))
    }

    async fn dev_inspect_transaction_block(
        &self,
        sender: &SuiAddress,
        tx: &TransactionBlock,
    ) -> Result<DevInspectResults> {
        self.check("sui_devInspectTransactionBlock")?;
        self.with_state(|s| {
            s.inspected.push((sender.clone(), tx.clone()));
            Ok(s.inspect_responses.pop_front().unwrap_or_default())
        })
    }
}
