//! Process lifecycle

pub mod options;
pub mod run;
