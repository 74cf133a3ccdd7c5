//! API client: HTTP transport, in-process transport and typed calls

pub mod api;
pub mod client;
pub mod invoker;
