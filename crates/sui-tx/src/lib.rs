//! sui-tx: Transaction building utilities for Sui
//!
//! Provides the programmable transaction descriptor, its BCS encoding, and the
//! numeric codec used to turn devInspect return bytes into display amounts.

pub mod bcs;
pub mod codec;
pub mod move_type;
pub mod object_utils;
pub mod ptb;

pub use bcs::{encode_transaction_kind, transaction_kind_base64, BcsWriter, StructTag, TypeTag};
pub use codec::{
    bytes_to_uint, decode_u128, decode_u64, decode_u8, format_units, parse_units,
    to_display_amount, CodecError,
};
pub use move_type::{coin_type_from_object_type, normalize_type, same_type, type_params};
pub use ptb::*;
