// JSON-RPC client modules
//
// Hand-written client for the FortiManager `/jsonrpc` endpoint. Every call
// is wrapped in the `{ method, params: [{ url, data }], session, id }`
// request envelope and answered with `{ result: [{ status, data }] }`.

pub mod auth;
pub mod client;
pub mod models;
pub mod policies;

pub use client::FmgClient;
