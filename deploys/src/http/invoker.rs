//! Transport seam between typed API calls and the control plane

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ControlError;
use crate::server::handlers::dispatch;
use crate::services::ControlPlane;

/// Sends one method call and returns its `result`, or the decoded error
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, method: &str, body: Value) -> Result<Value, ControlError>;
}

/// Calls a control plane in the same process, as `actor`
pub struct LocalInvoker {
    control: ControlPlane,
    actor: String,
}

impl LocalInvoker {
    pub fn new(control: ControlPlane, actor: impl Into<String>) -> Self {
        Self {
            control,
            actor: actor.into(),
        }
    }
}

#[async_trait]
impl Invoker for LocalInvoker {
    async fn invoke(&self, method: &str, body: Value) -> Result<Value, ControlError> {
        let body = serde_json::to_vec(&body)?;
        dispatch(&self.control, method, &self.actor, &body)
    }
}
