//! BCS serialization of transaction kinds
//!
//! Produces the `TransactionKind::ProgrammableTransaction` bytes accepted by
//! `sui_devInspectTransactionBlock`. Every object input must be resolved first.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bucket_core::{sui_address_bytes, ObjectId, TxError};

use crate::ptb::{Argument, CallArg, Command, MoveCall, ObjectArg, ObjectRef, TransactionBlock};

/// Append-only BCS byte writer
#[derive(Debug, Default)]
pub struct BcsWriter {
    buf: Vec<u8>,
}

impl BcsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Variable-length unsigned integer used for lengths and enum tags
    pub fn write_uleb128(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }

    /// Raw bytes, no length prefix
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Length-prefixed byte vector
    pub fn write_byte_vec(&mut self, bytes: &[u8]) {
        self.write_uleb128(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    pub fn write_str(&mut self, value: &str) {
        self.write_byte_vec(value.as_bytes());
    }

    pub fn write_address(&mut self, address: &str) -> Result<(), TxError> {
        let bytes = sui_address_bytes(address).ok_or_else(|| TxError::InvalidAddress {
            address: address.to_string(),
        })?;
        self.write_bytes(&bytes);
        Ok(())
    }
}

/// Move type tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(StructTag),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructTag {
    pub address: ObjectId,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl TypeTag {
    /// Parse a type string such as `0x2::coin::Coin<0x2::sui::SUI>` or `vector<u8>`.
    pub fn parse(input: &str) -> Result<Self, TxError> {
        let invalid = || TxError::InvalidTypeTag {
            type_tag: input.to_string(),
        };
        let mut parser = TypeParser { rest: input };
        let tag = parser.parse_tag().ok_or_else(invalid)?;
        if !parser.rest.trim().is_empty() {
            return Err(invalid());
        }
        Ok(tag)
    }

    pub fn encode(&self, writer: &mut BcsWriter) -> Result<(), TxError> {
        match self {
            Self::Bool => writer.write_uleb128(0),
            Self::U8 => writer.write_uleb128(1),
            Self::U64 => writer.write_uleb128(2),
            Self::U128 => writer.write_uleb128(3),
            Self::Address => writer.write_uleb128(4),
            Self::Signer => writer.write_uleb128(5),
            Self::Vector(inner) => {
                writer.write_uleb128(6);
                inner.encode(writer)?;
            }
            Self::Struct(tag) => {
                writer.write_uleb128(7);
                writer.write_address(tag.address.as_str())?;
                writer.write_str(&tag.module);
                writer.write_str(&tag.name);
                writer.write_uleb128(tag.type_params.len() as u64);
                for param in &tag.type_params {
                    param.encode(writer)?;
                }
            }
            Self::U16 => writer.write_uleb128(8),
            Self::U32 => writer.write_uleb128(9),
            Self::U256 => writer.write_uleb128(10),
        }
        Ok(())
    }
}

struct TypeParser<'a> {
    rest: &'a str,
}

impl<'a> TypeParser<'a> {
    fn parse_tag(&mut self) -> Option<TypeTag> {
        self.rest = self.rest.trim_start();
        let end = self
            .rest
            .find(|c: char| c == '<' || c == '>' || c == ',')
            .unwrap_or(self.rest.len());
        let head = self.rest[..end].trim();
        self.rest = &self.rest[end..];

        let primitive = match head {
            "bool" => Some(TypeTag::Bool),
            "u8" => Some(TypeTag::U8),
            "u16" => Some(TypeTag::U16),
            "u32" => Some(TypeTag::U32),
            "u64" => Some(TypeTag::U64),
            "u128" => Some(TypeTag::U128),
            "u256" => Some(TypeTag::U256),
            "address" => Some(TypeTag::Address),
            "signer" => Some(TypeTag::Signer),
            _ => None,
        };
        if primitive.is_some() {
            return primitive;
        }

        let params = if self.rest.starts_with('<') {
            self.parse_params()?
        } else {
            Vec::new()
        };

        if head == "vector" {
            let mut params = params;
            return match (params.pop(), params.is_empty()) {
                (Some(inner), true) => Some(TypeTag::Vector(Box::new(inner))),
                _ => None,
            };
        }

        let mut parts = head.split("::");
        let (address, module, name) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || module.is_empty() || name.is_empty() {
            return None;
        }
        sui_address_bytes(address)?;

        Some(TypeTag::Struct(StructTag {
            address: ObjectId::new(address),
            module: module.to_string(),
            name: name.to_string(),
            type_params: params,
        }))
    }

    fn parse_params(&mut self) -> Option<Vec<TypeTag>> {
        // consume '<'
        self.rest = &self.rest[1..];
        let mut params = Vec::new();
        loop {
            params.push(self.parse_tag()?);
            self.rest = self.rest.trim_start();
            if let Some(rest) = self.rest.strip_prefix(',') {
                self.rest = rest;
            } else if let Some(rest) = self.rest.strip_prefix('>') {
                self.rest = rest;
                return Some(params);
            } else {
                return None;
            }
        }
    }
}

/// Encode a transaction as BCS `TransactionKind` bytes.
pub fn encode_transaction_kind(tx: &TransactionBlock) -> Result<Vec<u8>, TxError> {
    let mut writer = BcsWriter::new();
    // TransactionKind::ProgrammableTransaction
    writer.write_uleb128(0);

    writer.write_uleb128(tx.inputs.len() as u64);
    for input in &tx.inputs {
        encode_call_arg(&mut writer, input)?;
    }

    writer.write_uleb128(tx.commands.len() as u64);
    for command in &tx.commands {
        encode_command(&mut writer, command)?;
    }

    Ok(writer.into_bytes())
}

/// Base64 form of `encode_transaction_kind`, as sent over JSON-RPC.
pub fn transaction_kind_base64(tx: &TransactionBlock) -> Result<String, TxError> {
    Ok(STANDARD.encode(encode_transaction_kind(tx)?))
}

fn encode_call_arg(writer: &mut BcsWriter, arg: &CallArg) -> Result<(), TxError> {
    match arg {
        CallArg::Pure(bytes) => {
            writer.write_uleb128(0);
            writer.write_byte_vec(bytes);
        }
        CallArg::Object(object) => {
            writer.write_uleb128(1);
            match object {
                ObjectArg::ImmOrOwned(object_ref) => {
                    writer.write_uleb128(0);
                    encode_object_ref(writer, object_ref)?;
                }
                ObjectArg::Shared {
                    object_id,
                    initial_shared_version,
                    mutable,
                } => {
                    writer.write_uleb128(1);
                    writer.write_address(object_id.as_str())?;
                    writer.write_u64(*initial_shared_version);
                    writer.write_bool(*mutable);
                }
                ObjectArg::Unresolved { object_id, .. } => {
                    return Err(TxError::UnresolvedObject {
                        object_id: object_id.to_string(),
                    })
                }
            }
        }
    }
    Ok(())
}

fn encode_object_ref(writer: &mut BcsWriter, object_ref: &ObjectRef) -> Result<(), TxError> {
    writer.write_address(object_ref.object_id.as_str())?;
    writer.write_u64(object_ref.version);
    let digest = bs58::decode(&object_ref.digest)
        .into_vec()
        .map_err(|e| TxError::SerializationFailed {
            message: format!("Invalid digest {}: {}", object_ref.digest, e),
        })?;
    writer.write_byte_vec(&digest);
    Ok(())
}

fn encode_command(writer: &mut BcsWriter, command: &Command) -> Result<(), TxError> {
    match command {
        Command::MoveCall(call) => {
            writer.write_uleb128(0);
            encode_move_call(writer, call)?;
        }
        Command::SplitCoins(coin, amounts) => {
            writer.write_uleb128(2);
            encode_argument(writer, coin);
            encode_arguments(writer, amounts);
        }
        Command::MergeCoins(destination, sources) => {
            writer.write_uleb128(3);
            encode_argument(writer, destination);
            encode_arguments(writer, sources);
        }
    }
    Ok(())
}

fn encode_move_call(writer: &mut BcsWriter, call: &MoveCall) -> Result<(), TxError> {
    writer.write_address(call.package.as_str())?;
    writer.write_str(&call.module);
    writer.write_str(&call.function);
    writer.write_uleb128(call.type_arguments.len() as u64);
    for type_arg in &call.type_arguments {
        TypeTag::parse(type_arg)?.encode(writer)?;
    }
    encode_arguments(writer, &call.arguments);
    Ok(())
}

fn encode_arguments(writer: &mut BcsWriter, args: &[Argument]) {
    writer.write_uleb128(args.len() as u64);
    for arg in args {
        encode_argument(writer, arg);
    }
}

fn encode_argument(writer: &mut BcsWriter, arg: &Argument) {
    match arg {
        Argument::GasCoin => writer.write_uleb128(0),
        Argument::Input(i) => {
            writer.write_uleb128(1);
            writer.write_u16(*i);
        }
        Argument::Result(i) => {
            writer.write_uleb128(2);
            writer.write_u16(*i);
        }
        Argument::NestedResult(i, j) => {
            writer.write_uleb128(3);
            writer.write_u16(*i);
            writer.write_u16(*j);
        }
    }
}
