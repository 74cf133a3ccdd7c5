//! Server state

use chrono::{DateTime, Utc};

use crate::services::ControlPlane;

/// Server state shared across handlers
pub struct ServerState {
    pub control: ControlPlane,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(control: ControlPlane) -> Self {
        Self {
            control,
            started_at: Utc::now(),
        }
    }
}
