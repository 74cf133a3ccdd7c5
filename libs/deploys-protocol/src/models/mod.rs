//! Protocol models

pub mod command;
pub mod envelope;
pub mod error_code;
pub mod result;
pub mod spec;
pub mod status;
