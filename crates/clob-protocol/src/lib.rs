//! clob-protocol
//!
//! Wire-level schema for the matching engine gateway: typed JSON requests
//! and events plus newline-delimited framing. This crate is purely about
//! bytes on the wire; all matching semantics live in `clob-core`.

pub mod codec;
pub mod wire;

pub use codec::{decode_request, encode_event, ProtocolError};
pub use wire::{Accepted, BboUpdate, ClientRequest, DepthLevels, OrderRequest, ServerEvent};
