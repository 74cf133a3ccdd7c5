//! Location lookups

use super::ControlPlane;
use crate::errors::ControlError;
use crate::models::location::{Location, LocationGet, LocationList, LocationListResult};

impl ControlPlane {
    pub fn location_list(&self, req: LocationList) -> Result<LocationListResult, ControlError> {
        self.validate(req)?;
        Ok(LocationListResult {
            locations: self.registry.list(),
        })
    }

    pub fn location_get(&self, req: LocationGet) -> Result<Location, ControlError> {
        let req = self.validate(req)?;
        self.registry.get(&req.id).cloned()
    }
}
