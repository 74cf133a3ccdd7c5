//! Deploys control plane library
//!
//! Resource store, revisions and the location-agent command protocol behind an
//! HTTP API, plus the client and CLI that call it.

pub mod app;
pub mod cli;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod server;
pub mod services;
pub mod storage;
pub mod store;
pub mod utils;
pub mod validate;
pub mod workers;
