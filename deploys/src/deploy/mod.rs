//! Desired-state lifecycle: actions, revisions, commands and results

pub mod commands;
pub mod fsm;
pub mod reconciler;
pub mod revision;
