//! sui-rpc-client: Chain access for the Bucket client
//!
//! Defines the `ChainClient` capability that protocol code depends on, the
//! JSON-RPC models it exchanges, and `RpcClient`, the fullnode implementation.

pub mod rpc;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod fake;

use async_trait::async_trait;
use bucket_core::{ObjectId, RpcError, SuiAddress};
use sui_tx::{CallArg, ObjectArg, TransactionBlock};

pub use rpc::RpcClient;
pub use types::*;

/// Result type for chain client operations
pub type Result<T> = std::result::Result<T, RpcError>;

/// Read and simulate access to a Sui fullnode
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_object(
        &self,
        object_id: &ObjectId,
        options: ObjectDataOptions,
    ) -> Result<SuiObjectResponse>;

    /// Responses are returned in the order of `object_ids`
    async fn multi_get_objects(
        &self,
        object_ids: &[ObjectId],
        options: ObjectDataOptions,
    ) -> Result<Vec<SuiObjectResponse>>;

    async fn get_dynamic_fields(
        &self,
        parent_id: &ObjectId,
        cursor: Option<String>,
        limit: Option<usize>,
    ) -> Result<Page<DynamicFieldInfo>>;

    async fn get_dynamic_field_object(
        &self,
        parent_id: &ObjectId,
        name: &DynamicFieldName,
    ) -> Result<SuiObjectResponse>;

    async fn get_owned_objects(
        &self,
        owner: &SuiAddress,
        query: &ObjectResponseQuery,
        cursor: Option<String>,
        limit: Option<usize>,
    ) -> Result<Page<SuiObjectResponse>>;

    async fn query_events(
        &self,
        filter: &EventFilter,
        cursor: Option<EventId>,
        limit: Option<usize>,
        descending: bool,
    ) -> Result<Page<SuiEvent, EventId>>;

    async fn get_coins(
        &self,
        owner: &SuiAddress,
        coin_type: Option<&str>,
        cursor: Option<String>,
        limit: Option<usize>,
    ) -> Result<Page<Coin>>;

    async fn dev_inspect_transaction_block(
        &self,
        sender: &SuiAddress,
        tx: &TransactionBlock,
    ) -> Result<DevInspectResults>;
}

/// Fill in unresolved object inputs from `sui_multiGetObjects` responses.
///
/// Shared objects keep the mutability requested by the builder; owned and
/// immutable objects become full references.
pub fn resolve_inputs(
    tx: &TransactionBlock,
    objects: &[SuiObjectResponse],
) -> Result<TransactionBlock> {
    let mut resolved = tx.clone();

    for input in resolved.inputs.iter_mut() {
        let (object_id, mutable) = match input {
            CallArg::Object(ObjectArg::Unresolved { object_id, mutable }) => {
                (object_id.clone(), *mutable)
            }
            _ => continue,
        };

        let data = objects
            .iter()
            .filter_map(|o| o.data.as_ref())
            .find(|d| d.object_id == object_id)
            .ok_or_else(|| RpcError::ObjectNotFound {
                object_id: object_id.to_string(),
            })?;

        let arg = match &data.owner {
            Some(Owner::Shared {
                initial_shared_version,
            }) => ObjectArg::Shared {
                object_id,
                initial_shared_version: *initial_shared_version,
                mutable,
            },
            _ => ObjectArg::ImmOrOwned(data.object_ref().ok_or_else(|| {
                RpcError::ParseError(format!("Invalid version for object {}", object_id))
            })?),
        };
        *input = CallArg::Object(arg);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(id: &str, owner: Owner) -> SuiObjectResponse {
        SuiObjectResponse {
            data: Some(SuiObjectData {
                object_id: ObjectId::new(id),
                version: "7".to_string(),
                digest: "11111111111111111111111111111111".to_string(),
                object_type: None,
                owner: Some(owner),
                content: None,
            }),
            error: None,
        }
    }

    #[test]
    fn test_resolve_shared_and_owned() {
        let mut tx = TransactionBlock::new();
        tx.object(&ObjectId::new("0x6")).unwrap();
        tx.object(&ObjectId::new("0xa")).unwrap();
        tx.pure_u64(1).unwrap();

        let resolved = resolve_inputs(
            &tx,
            &[
                object("0xa", Owner::AddressOwner("0x1".into())),
                object(
                    "0x6",
                    Owner::Shared {
                        initial_shared_version: 1,
                    },
                ),
            ],
        )
        .unwrap();

        assert!(resolved.unresolved_objects().is_empty());
        assert_eq!(
            resolved.inputs[0],
            CallArg::Object(ObjectArg::Shared {
                object_id: ObjectId::new("0x6"),
                initial_shared_version: 1,
                mutable: false,
            })
        );
        match &resolved.inputs[1] {
            CallArg::Object(ObjectArg::ImmOrOwned(r)) => assert_eq!(r.version, 7),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(resolved.inputs[2], tx.inputs[2]);
    }

    #[test]
    fn test_resolve_missing_object() {
        let mut tx = TransactionBlock::new();
        tx.object(&ObjectId::new("0xb")).unwrap();
        let err = resolve_inputs(&tx, &[SuiObjectResponse::default()]).unwrap_err();
        assert!(matches!(err, RpcError::ObjectNotFound { .. }));
    }
}
