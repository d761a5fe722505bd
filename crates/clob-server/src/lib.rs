//! clob-server
//!
//! Multi-client async TCP gateway for the matching engine. Clients speak
//! newline-delimited JSON (`clob-protocol`); the engine core does all the
//! matching. Trades and BBO updates fan out to every connected client.

pub mod client;
pub mod config;
pub mod events;
pub mod server;
pub mod types;
