//! Finite state machine for resource actions
//!
//! Every resource carries one action (`deploy`, `pause`, `delete`) and the
//! status of its last command. New actions are admitted against the
//! outstanding one, agent results close it.

use chrono::{DateTime, Utc};
use deploys_protocol::{Action, CommandKind, CommandResult, ErrorCode, Status};

use crate::store::record::{ActionRecord, PendingCommand, ResourceMeta};

/// Oldest history entries are dropped past this length
pub const HISTORY_LIMIT: usize = 50;

/// Where a resource stands for admission purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    /// A command was issued and its result has not arrived
    Outstanding(Action),

    /// Last action was a delete that did not remove the resource
    Deleted,

    /// Paused successfully
    Paused,

    Idle,
}

/// Outcome of admitting a new action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Issue a new command
    Install,

    /// Cancel the outstanding command, then issue a new one
    Supersede,

    /// The same action is already outstanding
    Noop,
}

/// Outcome of applying an agent result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Status advanced to a terminal value
    Status(Status),

    /// A removal succeeded; the record must be dropped
    Removed,

    /// Not the outstanding command
    Stale,
}

/// Action state machine over one resource's metadata
#[derive(Debug)]
pub struct ActionFsm<'a> {
    meta: &'a mut ResourceMeta,
}

impl<'a> ActionFsm<'a> {
    pub fn new(meta: &'a mut ResourceMeta) -> Self {
        Self { meta }
    }

    pub fn state(&self) -> ActionState {
        state_of(self.meta)
    }

    /// Check `action` against the admission table
    pub fn admit(&self, action: Action) -> Result<Admission, ErrorCode> {
        admit(self.state(), action)
    }

    /// Issue a command for `action`, cancelling any outstanding one.
    ///
    /// Returns the cancelled command, if there was one.
    pub fn install(
        &mut self,
        action: Action,
        kind: CommandKind,
        revision: Option<u64>,
        now: DateTime<Utc>,
    ) -> Option<PendingCommand> {
        let cancelled = self.meta.pending.take();
        if cancelled.is_some() {
            if let Some(last) = self.meta.history.last_mut() {
                if last.status == Status::Pending {
                    last.status = Status::Cancelled;
                }
            }
        }

        self.meta.action = action;
        self.meta.status = Status::Pending;
        self.meta.message = None;
        self.meta.pending = Some(PendingCommand {
            kind,
            revision,
            issued_at: now,
        });
        self.meta.history.push(ActionRecord {
            action,
            kind,
            revision,
            status: Status::Pending,
            at: now,
        });
        if self.meta.history.len() > HISTORY_LIMIT {
            let excess = self.meta.history.len() - HISTORY_LIMIT;
            self.meta.history.drain(..excess);
        }

        cancelled
    }

    /// Apply an agent result if it answers the outstanding command
    pub fn apply(&mut self, result: &CommandResult, now: DateTime<Utc>) -> Applied {
        let Some(pending) = &self.meta.pending else {
            return Applied::Stale;
        };
        if pending.kind != result.kind
            || (result.kind.is_deployment() && pending.revision != result.revision)
        {
            return Applied::Stale;
        }

        let status = match (result.success, result.cleanup_pending) {
            (true, _) => Status::Success,
            (false, true) if result.kind.is_removal() => Status::ErrorPendingCleanupResource,
            (false, _) => Status::Error,
        };

        self.meta.pending = None;
        self.meta.status = status;
        if result.success {
            self.meta.success_at = Some(now);
            self.meta.message = None;
        } else {
            self.meta.message = result.message.clone();
        }
        if let Some(last) = self.meta.history.last_mut() {
            if last.status == Status::Pending {
                last.status = status;
            }
        }

        if result.success && result.kind.is_removal() {
            Applied::Removed
        } else {
            Applied::Status(status)
        }
    }
}

pub fn state_of(meta: &ResourceMeta) -> ActionState {
    match (&meta.pending, meta.action, meta.status) {
        (Some(_), action, _) => ActionState::Outstanding(action),
        (None, Action::Delete, _) => ActionState::Deleted,
        (None, Action::Pause, Status::Success) => ActionState::Paused,
        _ => ActionState::Idle,
    }
}

/// The admission table
pub fn admit(state: ActionState, requested: Action) -> Result<Admission, ErrorCode> {
    use ActionState::*;

    match (state, requested) {
        // Deploy outstanding
        (Outstanding(Action::Deploy), Action::Deploy | Action::Delete) => Ok(Admission::Supersede),
        (Outstanding(Action::Deploy), Action::Pause) => Err(ErrorCode::CanNotPause),

        // Pause outstanding
        (Outstanding(Action::Pause), Action::Deploy | Action::Delete) => Ok(Admission::Supersede),
        (Outstanding(Action::Pause), Action::Pause) => Ok(Admission::Noop),

        // Delete outstanding
        (Outstanding(Action::Delete), Action::Deploy) => Err(ErrorCode::CanNotDeploy),
        (Outstanding(Action::Delete), Action::Pause) => Err(ErrorCode::CanNotPause),
        (Outstanding(Action::Delete), Action::Delete) => Ok(Admission::Noop),

        (Deleted, Action::Deploy) => Err(ErrorCode::CanNotDeploy),
        (Deleted, Action::Pause) => Err(ErrorCode::CanNotPause),
        (Deleted, Action::Delete) => Ok(Admission::Install),

        (Paused, Action::Pause) => Err(ErrorCode::CanNotPause),
        (Paused, _) | (Idle, _) => Ok(Admission::Install),
    }
}
