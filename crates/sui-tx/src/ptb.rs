//! Programmable Transaction Block structures
//!
//! An unsigned, unresolved transaction description: ordered inputs plus
//! ordered commands. Object inputs may be left unresolved; the chain client
//! fills in versions/digests before serialization.

use bucket_core::{constants, ObjectId, SuiAddress, TxError};
use serde::{Deserialize, Serialize};

use crate::bcs::BcsWriter;

/// Reference to a command input or result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

/// Fully-qualified object reference (owned or immutable object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: u64,
    /// Base58 object digest
    pub digest: String,
}

/// Object input, possibly still waiting for resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectArg {
    Unresolved {
        object_id: ObjectId,
        mutable: bool,
    },
    ImmOrOwned(ObjectRef),
    Shared {
        object_id: ObjectId,
        initial_shared_version: u64,
        mutable: bool,
    },
}

impl ObjectArg {
    pub fn object_id(&self) -> &ObjectId {
        match self {
            Self::Unresolved { object_id, .. } | Self::Shared { object_id, .. } => object_id,
            Self::ImmOrOwned(r) => &r.object_id,
        }
    }
}

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallArg {
    /// BCS-encoded pure value
    Pure(Vec<u8>),
    Object(ObjectArg),
}

/// A `package::module::function` invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Argument>,
}

impl MoveCall {
    /// Target string as passed to `move_call`, with the package normalized
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

/// Transaction command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    MoveCall(MoveCall),
    SplitCoins(Argument, Vec<Argument>),
    MergeCoins(Argument, Vec<Argument>),
}

/// Unsigned programmable transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBlock {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl TransactionBlock {
    /// Create a new empty transaction
    pub fn new() -> Self {
        Self::default()
    }

    /// The gas coin of the eventual sender
    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    /// Add an object input by ID. The same object is only added once.
    ///
    /// The clock is passed by immutable reference; everything else mutable.
    pub fn object(&mut self, object_id: &ObjectId) -> Result<Argument, TxError> {
        let clock = ObjectId::new(constants::SUI_CLOCK_OBJECT_ID);
        let mutable = *object_id != clock;
        self.object_input(ObjectArg::Unresolved {
            object_id: object_id.clone(),
            mutable,
        })
    }

    /// Add an owned object input with a known version and digest
    pub fn object_ref(&mut self, object_ref: ObjectRef) -> Result<Argument, TxError> {
        self.object_input(ObjectArg::ImmOrOwned(object_ref))
    }

    fn object_input(&mut self, arg: ObjectArg) -> Result<Argument, TxError> {
        let existing = self.inputs.iter().position(|input| match input {
            CallArg::Object(o) => o.object_id() == arg.object_id(),
            CallArg::Pure(_) => false,
        });

        match existing {
            Some(index) => {
                // a concrete reference beats an unresolved one
                if !matches!(arg, ObjectArg::Unresolved { .. }) {
                    self.inputs[index] = CallArg::Object(arg);
                }
                Ok(Argument::Input(to_index(index, "input")?))
            }
            None => self.push_input(CallArg::Object(arg)),
        }
    }

    /// Add a raw BCS-encoded pure input
    pub fn pure_bytes(&mut self, bytes: Vec<u8>) -> Result<Argument, TxError> {
        self.push_input(CallArg::Pure(bytes))
    }

    pub fn pure_u32(&mut self, value: u32) -> Result<Argument, TxError> {
        self.pure_bytes(value.to_le_bytes().to_vec())
    }

    pub fn pure_u64(&mut self, value: u64) -> Result<Argument, TxError> {
        self.pure_bytes(value.to_le_bytes().to_vec())
    }

    pub fn pure_address(&mut self, address: &SuiAddress) -> Result<Argument, TxError> {
        let bytes = address_bytes(address.as_str())?;
        self.pure_bytes(bytes.to_vec())
    }

    /// Add a `vector<address>` input
    pub fn pure_addresses(&mut self, addresses: &[SuiAddress]) -> Result<Argument, TxError> {
        let mut writer = BcsWriter::new();
        writer.write_uleb128(addresses.len() as u64);
        for address in addresses {
            writer.write_bytes(&address_bytes(address.as_str())?);
        }
        self.pure_bytes(writer.into_bytes())
    }

    /// Append a move call. `target` is `package::module::function`.
    pub fn move_call(
        &mut self,
        target: &str,
        type_arguments: &[&str],
        arguments: Vec<Argument>,
    ) -> Result<Argument, TxError> {
        let mut parts = target.split("::");
        let (package, module, function) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(m), Some(f), None) if !p.is_empty() && !m.is_empty() && !f.is_empty() => {
                (p, m, f)
            }
            _ => {
                return Err(TxError::InvalidTarget {
                    target: target.to_string(),
                })
            }
        };
        address_bytes(package)?;

        self.push_command(Command::MoveCall(MoveCall {
            package: ObjectId::new(package),
            module: module.to_string(),
            function: function.to_string(),
            type_arguments: type_arguments.iter().map(|t| t.to_string()).collect(),
            arguments,
        }))
    }

    /// Split `amounts` off `coin`; each new coin is a nested result
    pub fn split_coins(
        &mut self,
        coin: Argument,
        amounts: Vec<Argument>,
    ) -> Result<Argument, TxError> {
        self.push_command(Command::SplitCoins(coin, amounts))
    }

    pub fn merge_coins(
        &mut self,
        destination: Argument,
        sources: Vec<Argument>,
    ) -> Result<Argument, TxError> {
        self.push_command(Command::MergeCoins(destination, sources))
    }

    /// Move calls in command order
    pub fn move_calls(&self) -> impl Iterator<Item = &MoveCall> {
        self.commands.iter().filter_map(|c| match c {
            Command::MoveCall(call) => Some(call),
            _ => None,
        })
    }

    /// Object IDs of inputs that still need resolution
    pub fn unresolved_objects(&self) -> Vec<ObjectId> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                CallArg::Object(ObjectArg::Unresolved { object_id, .. }) => {
                    Some(object_id.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    fn push_input(&mut self, input: CallArg) -> Result<Argument, TxError> {
        let index = to_index(self.inputs.len(), "input")?;
        self.inputs.push(input);
        Ok(Argument::Input(index))
    }

    fn push_command(&mut self, command: Command) -> Result<Argument, TxError> {
        let index = to_index(self.commands.len(), "command")?;
        self.commands.push(command);
        Ok(Argument::Result(index))
    }
}

/// Arguments address inputs and results with a `u16`
fn to_index(index: usize, kind: &str) -> Result<u16, TxError> {
    u16::try_from(index).map_err(|_| TxError::BuildFailed {
        message: format!("Too many {}s: index {} does not fit in u16", kind, index),
    })
}

fn address_bytes(address: &str) -> Result<[u8; 32], TxError> {
    bucket_core::sui_address_bytes(address).ok_or_else(|| TxError::InvalidAddress {
        address: address.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_inputs_are_deduplicated() {
        let mut tx = TransactionBlock::new();
        let a = tx.object(&ObjectId::new("0xaa")).unwrap();
        let b = tx.pure_u64(7).unwrap();
        let c = tx.object(&ObjectId::new("0x00aa")).unwrap();

        assert_eq!(a, Argument::Input(0));
        assert_eq!(b, Argument::Input(1));
        assert_eq!(c, Argument::Input(0));
        assert_eq!(tx.inputs.len(), 2);
    }

    #[test]
    fn test_clock_is_immutable() {
        let mut tx = TransactionBlock::new();
        tx.object(&ObjectId::new("0x6")).unwrap();
        tx.object(&ObjectId::new("0x7")).unwrap();

        match &tx.inputs[0] {
            CallArg::Object(ObjectArg::Unresolved { mutable, .. }) => assert!(!mutable),
            other => panic!("unexpected input {:?}", other),
        }
        match &tx.inputs[1] {
            CallArg::Object(ObjectArg::Unresolved { mutable, .. }) => assert!(mutable),
            other => panic!("unexpected input {:?}", other),
        }
        assert_eq!(tx.unresolved_objects().len(), 2);
    }

    #[test]
    fn test_object_ref_replaces_unresolved() {
        let mut tx = TransactionBlock::new();
        let id = ObjectId::new("0xbeef");
        tx.object(&id).unwrap();
        let arg = tx
            .object_ref(ObjectRef {
                object_id: id.clone(),
                version: 3,
                digest: "11111111111111111111111111111111".to_string(),
            })
            .unwrap();

        assert_eq!(arg, Argument::Input(0));
        assert!(tx.unresolved_objects().is_empty());
    }

    #[test]
    fn test_pure_encodings() {
        let mut tx = TransactionBlock::new();
        tx.pure_u64(1).unwrap();
        tx.pure_u32(2).unwrap();
        tx.pure_addresses(&[]).unwrap();
        tx.pure_addresses(&[SuiAddress::new("0x1")]).unwrap();

        assert_eq!(tx.inputs[0], CallArg::Pure(vec![1, 0, 0, 0, 0, 0, 0, 0]));
        assert_eq!(tx.inputs[1], CallArg::Pure(vec![2, 0, 0, 0]));
        assert_eq!(tx.inputs[2], CallArg::Pure(vec![0]));
        match &tx.inputs[3] {
            CallArg::Pure(bytes) => {
                assert_eq!(bytes.len(), 33);
                assert_eq!(bytes[0], 1);
                assert_eq!(bytes[32], 1);
            }
            other => panic!("unexpected input {:?}", other),
        }
    }

    #[test]
    fn test_move_call_results_and_targets() {
        let mut tx = TransactionBlock::new();
        let first = tx
            .move_call("0x2::coin::zero", &["0x2::sui::SUI"], vec![])
            .unwrap();
        let second = tx.move_call("0x2::coin::value", &[], vec![first]).unwrap();

        assert_eq!(first, Argument::Result(0));
        assert_eq!(second, Argument::Result(1));

        let calls: Vec<_> = tx.move_calls().collect();
        assert_eq!(calls[0].module, "coin");
        assert_eq!(calls[0].function, "zero");
        assert_eq!(calls[0].type_arguments, vec!["0x2::sui::SUI"]);
        assert_eq!(calls[1].arguments, vec![Argument::Result(0)]);
        assert!(calls[1].target().ends_with("0002::coin::value"));
    }

    #[test]
    fn test_invalid_targets() {
        let mut tx = TransactionBlock::new();
        assert!(matches!(
            tx.move_call("0x2::coin", &[], vec![]),
            Err(TxError::InvalidTarget { .. })
        ));
        assert!(matches!(
            tx.move_call("0x2::coin::zero::extra", &[], vec![]),
            Err(TxError::InvalidTarget { .. })
        ));
        assert!(matches!(
            tx.move_call("0xzz::coin::zero", &[], vec![]),
            Err(TxError::InvalidAddress { .. })
        ));
        assert!(tx.commands.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let mut tx = TransactionBlock::new();
        let coin = tx.split_coins(Argument::GasCoin, vec![Argument::Input(0)]).unwrap();
        tx.merge_coins(coin, vec![]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&tx.to_json().unwrap()).unwrap();
        assert_eq!(json["commands"][0]["splitCoins"][0], "GasCoin");
        assert_eq!(json["commands"][1]["mergeCoins"][0]["Result"], 0);
    }

    #[test]
    fn test_input_index_overflow() {
        let mut tx = TransactionBlock::new();
        for i in 0..=u16::MAX as u64 {
            tx.pure_u64(i).unwrap();
        }
        assert_eq!(tx.inputs.len(), 65_536);
        assert!(matches!(tx.pure_u64(0), Err(TxError::BuildFailed { .. })));
        assert_eq!(tx.inputs.len(), 65_536);
    }
}
