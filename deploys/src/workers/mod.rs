//! Background workers

pub mod snapshot;
