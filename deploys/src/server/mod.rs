//! HTTP transport

pub mod handlers;
pub mod serve;
pub mod state;
