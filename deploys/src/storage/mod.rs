//! Settings, storage paths and the location registry

pub mod layout;
pub mod registry;
pub mod settings;
