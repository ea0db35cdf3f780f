//! Sui JSON-RPC request and response models
//!
//! Only the fields this workspace reads are modelled; unknown fields are ignored.

use bucket_core::{ObjectId, SuiAddress};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sui_tx::ObjectRef;

/// Which parts of an object the fullnode should return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDataOptions {
    pub show_type: bool,
    pub show_owner: bool,
    pub show_content: bool,
}

impl ObjectDataOptions {
    /// Type and parsed content
    pub fn content() -> Self {
        Self {
            show_type: true,
            show_owner: false,
            show_content: true,
        }
    }

    /// Owner only, enough to build an object reference
    pub fn owner() -> Self {
        Self {
            show_type: false,
            show_owner: true,
            show_content: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiObjectResponse {
    #[serde(default)]
    pub data: Option<SuiObjectData>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl SuiObjectResponse {
    /// Parsed Move fields, if the object exists and content was requested
    pub fn fields(&self) -> Option<&Value> {
        self.data.as_ref()?.content.as_ref().map(|c| &c.fields)
    }

    pub fn object_type(&self) -> Option<&str> {
        let data = self.data.as_ref()?;
        data.object_type
            .as_deref()
            .or_else(|| data.content.as_ref()?.object_type.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiObjectData {
    pub object_id: ObjectId,
    /// Decimal string, as returned by the fullnode
    pub version: String,
    pub digest: String,
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub content: Option<SuiParsedData>,
}

impl SuiObjectData {
    pub fn version_number(&self) -> Option<u64> {
        self.version.parse().ok()
    }

    pub fn object_ref(&self) -> Option<ObjectRef> {
        Some(ObjectRef {
            object_id: self.object_id.clone(),
            version: self.version_number()?,
            digest: self.digest.clone(),
        })
    }
}

/// Object ownership as reported with `showOwner`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    AddressOwner(String),
    ObjectOwner(String),
    Shared { initial_shared_version: u64 },
    Immutable,
}

/// Parsed object content (`showContent`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiParsedData {
    /// `moveObject` or `package`
    pub data_type: String,
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub fields: Value,
}

/// One page of a cursor-paginated query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T, C = String> {
    pub data: Vec<T>,
    pub next_cursor: Option<C>,
    #[serde(default)]
    pub has_next_page: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicFieldName {
    #[serde(rename = "type")]
    pub name_type: String,
    pub value: Value,
}

impl DynamicFieldName {
    /// Key of type `address`, used by bottle tables
    pub fn address(address: &SuiAddress) -> Self {
        Self {
            name_type: "address".to_string(),
            value: Value::String(address.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldInfo {
    pub name: DynamicFieldName,
    pub object_type: String,
    pub object_id: ObjectId,
    #[serde(default)]
    pub version: Value,
    #[serde(default)]
    pub digest: String,
}

/// Owned-object query (`suix_getOwnedObjects`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectResponseQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ObjectFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ObjectDataOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectFilter {
    MatchAny(Vec<ObjectFilter>),
    StructType(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventFilter {
    MoveEventType(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    pub tx_digest: String,
    pub event_seq: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiEvent {
    pub id: EventId,
    #[serde(default)]
    pub package_id: Option<ObjectId>,
    #[serde(default)]
    pub transaction_module: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub parsed_json: Value,
    #[serde(default)]
    pub timestamp_ms: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_type: String,
    pub coin_object_id: ObjectId,
    pub version: String,
    pub digest: String,
    pub balance: String,
}

impl Coin {
    pub fn object_ref(&self) -> Option<ObjectRef> {
        Some(ObjectRef {
            object_id: self.coin_object_id.clone(),
            version: self.version.parse().ok()?,
            digest: self.digest.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevInspectResults {
    #[serde(default)]
    pub effects: Value,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<SuiExecutionResult>>,
    #[serde(default)]
    pub events: Vec<Value>,
}

/// Outcome of one command in a simulated transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiExecutionResult {
    #[serde(default)]
    pub mutable_reference_outputs: Vec<Value>,
    /// `(bcs bytes, move type)` per returned value
    #[serde(default)]
    pub return_values: Vec<(Vec<u8>, String)>,
}

impl SuiExecutionResult {
    pub fn with_return(bytes: Vec<u8>, move_type: &str) -> Self {
        Self {
            mutable_reference_outputs: Vec::new(),
            return_values: vec![(bytes, move_type.to_string())],
        }
    }

    /// Bytes of the first return value
    pub fn first_return_bytes(&self) -> Option<&[u8]> {
        self.return_values.first().map(|(bytes, _)| bytes.as_slice())
    }
}
