// fmgbatch-api: Async Rust client for the FortiManager JSON-RPC API

pub mod error;
pub mod jsonrpc;
pub mod transport;

pub use error::Error;
pub use jsonrpc::models::{Scope, Status};
pub use jsonrpc::FmgClient;
pub use transport::{TlsMode, TransportConfig};
