//! Stable error codes shared by server and clients

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    InvalidRequest,
    Validation,
    MethodNotFound,
    Unauthorized,
    Forbidden,
    Internal,
    LocationNotAvailable,
    LocationNotSupport,
    DeploymentNotFound,
    RevisionNotFound,
    CanNotDeploy,
    CanNotDelete,
    CanNotPause,
    CanNotResume,
    NameNotAvailable,
    WorkloadIdentityNotFound,
    CanMapOnlyService,
    TypeNotAllowChange,
    DiskNotFound,
    DiskSizeMustScaleUp,
    PullSecretNotFound,
    RouteNotFound,
    MaximumDeploymentReach,
}

impl ErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "api: invalid request",
            ErrorCode::Validation => "api: validate error",
            ErrorCode::MethodNotFound => "api: method not found",
            ErrorCode::Unauthorized => "api: unauthorized",
            ErrorCode::Forbidden => "api: forbidden",
            ErrorCode::Internal => "api: internal error",
            ErrorCode::LocationNotAvailable => "api: location not available",
            ErrorCode::LocationNotSupport => "api: location not support",
            ErrorCode::DeploymentNotFound => "api: deployment not found",
            ErrorCode::RevisionNotFound => "api: revision not found",
            ErrorCode::CanNotDeploy => "api: can not deploy",
            ErrorCode::CanNotDelete => "api: can not delete",
            ErrorCode::CanNotPause => "api: can not pause",
            ErrorCode::CanNotResume => "api: can not resume",
            ErrorCode::NameNotAvailable => "api: name not available",
            ErrorCode::WorkloadIdentityNotFound => "api: workload identity not found",
            ErrorCode::CanMapOnlyService => {
                "api: can not map to deployment other than service type"
            }
            ErrorCode::TypeNotAllowChange => "api: type not allow to change",
            ErrorCode::DiskNotFound => "api: disk not found",
            ErrorCode::DiskSizeMustScaleUp => "api: disk size must scale up",
            ErrorCode::PullSecretNotFound => "api: pull secret not found",
            ErrorCode::RouteNotFound => "api: route not found",
            ErrorCode::MaximumDeploymentReach => "api: maximum deployment reach",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::InvalidRequest | ErrorCode::Validation => 400,
            ErrorCode::Unauthorized => 401,
            ErrorCode::Forbidden => 403,
            ErrorCode::MethodNotFound
            | ErrorCode::DeploymentNotFound
            | ErrorCode::RevisionNotFound
            | ErrorCode::WorkloadIdentityNotFound
            | ErrorCode::DiskNotFound
            | ErrorCode::PullSecretNotFound
            | ErrorCode::RouteNotFound => 404,
            ErrorCode::Internal => 500,
            ErrorCode::LocationNotAvailable
            | ErrorCode::LocationNotSupport
            | ErrorCode::CanNotDeploy
            | ErrorCode::CanNotDelete
            | ErrorCode::CanNotPause
            | ErrorCode::CanNotResume
            | ErrorCode::NameNotAvailable
            | ErrorCode::CanMapOnlyService
            | ErrorCode::TypeNotAllowChange
            | ErrorCode::DiskSizeMustScaleUp
            | ErrorCode::MaximumDeploymentReach => 409,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.http_status() == 404
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
