//! Read-only lookup of locations and route target schemes

use std::collections::BTreeMap;

use deploys_protocol::ErrorCode;

use crate::errors::ControlError;
use crate::models::location::Location;
use crate::storage::settings::Settings;

/// Location feature a resource may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    WorkloadIdentity,
    Disk,
}

/// Immutable after construction
#[derive(Debug, Clone)]
pub struct LocationRegistry {
    locations: BTreeMap<String, Location>,
    route_target_prefixes: Vec<String>,
}

impl LocationRegistry {
    pub fn new(locations: Vec<Location>, route_target_prefixes: Vec<String>) -> Self {
        Self {
            locations: locations.into_iter().map(|l| (l.id.clone(), l)).collect(),
            route_target_prefixes,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.locations.clone(),
            settings.route_target_prefixes.clone(),
        )
    }

    pub fn get(&self, id: &str) -> Result<&Location, ControlError> {
        self.locations
            .get(id)
            .ok_or(ControlError::Conflict(ErrorCode::LocationNotAvailable))
    }

    pub fn list(&self) -> Vec<Location> {
        self.locations.values().cloned().collect()
    }

    /// Fails with `locationNotSupport` when the location lacks the feature
    pub fn require(&self, id: &str, feature: Feature) -> Result<&Location, ControlError> {
        let location = self.get(id)?;
        let supported = match feature {
            Feature::WorkloadIdentity => location.features.workload_identity,
            Feature::Disk => location.features.disk,
        };
        if !supported {
            return Err(ControlError::Conflict(ErrorCode::LocationNotSupport));
        }
        Ok(location)
    }

    pub fn valid_route_target(&self, target: &str) -> bool {
        self.route_target_prefixes
            .iter()
            .any(|p| target.starts_with(p.as_str()) && target.len() > p.len())
    }
}
