//! Clarity value codec.
//!
//! The chain's contract-call interface speaks self-describing tagged values
//! ([`WireValue`]). Application code speaks plain JSON. This module converts
//! between the two:
//!
//! - [`decode`] / [`decode_strict`]: wire → [`DecodedValue`], recursive over
//!   tuples, lists, optionals and responses. The permissive entry point never
//!   fails; unrecognized tags pass their payload through untouched.
//! - [`encode`] / [`encode_all`]: JSON + explicit type descriptor →
//!   [`WireValue`], used to build contract-call arguments.
//!
//! Tag dispatch is ordered: parameterized descriptors such as
//! `"(string-ascii 46)"` or `"(tuple (event-id uint) ...)"` are matched by
//! prefix before the bare-tag forms, and response-shaped values are detected
//! before either (by tag prefix or by the sibling `success` field; producers
//! populate one or the other, so both signals are checked).

mod decode;
mod encode;
mod errors;
mod model;
mod wire;

pub use decode::{decode, decode_strict};
pub use encode::{encode, encode_all, EncodeRequest};
pub use errors::{CodecError, ContractError};
pub use model::DecodedValue;
pub use wire::{tags, WireValue};
