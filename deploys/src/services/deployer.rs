//! Location agent protocol

use chrono::Utc;
use deploys_protocol::{Empty, GetCommandsRequest, GetCommandsResult, SetResultsRequest};
use tracing::{debug, info};

use super::ControlPlane;
use crate::deploy::commands::outstanding;
use crate::deploy::reconciler::reconcile;
use crate::errors::ControlError;

impl ControlPlane {
    /// Every unacknowledged command of a location. Commands are redelivered
    /// on each call until their result arrives.
    pub fn deployer_get_commands(
        &self,
        req: GetCommandsRequest,
    ) -> Result<GetCommandsResult, ControlError> {
        self.registry.get(&req.location)?;
        let commands = self.store.read(|s| outstanding(s, &req.location));
        debug!("Location {} has {} outstanding commands", req.location, commands.len());
        Ok(GetCommandsResult { commands })
    }

    /// Apply agent results. Unknown, mismatched or repeated results are dropped.
    pub fn deployer_set_results(&self, req: SetResultsRequest) -> Result<Empty, ControlError> {
        self.registry.get(&req.location)?;
        if req.results.is_empty() {
            return Ok(Empty {});
        }

        let summary = self
            .store
            .update(|s| reconcile(s, &req.location, &req.results, Utc::now()));
        info!(
            "Location {} reported {} results: {} applied, {} removed, {} stale",
            req.location,
            req.results.len(),
            summary.applied,
            summary.removed,
            summary.stale
        );
        Ok(Empty {})
    }
}
