//! Typed API calls over any [`Invoker`]

use std::sync::Arc;

use deploys_protocol::{
    Command, CommandResult, Empty, GetCommandsRequest, GetCommandsResult, SetResultsRequest,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::ControlError;
use crate::http::invoker::Invoker;
use crate::models::deployment::{
    DeploymentDelete, DeploymentDeploy, DeploymentGet, DeploymentGetResult, DeploymentList,
    DeploymentListResult, DeploymentPause, DeploymentResume, DeploymentRevisions,
    DeploymentRevisionsResult, DeploymentRollback,
};
use crate::models::disk::{DiskCreate, DiskDelete, DiskGet, DiskItem, DiskList, DiskListResult, DiskUpdate};
use crate::models::location::{Location, LocationGet, LocationList, LocationListResult};
use crate::models::pullsecret::{
    PullSecretCreate, PullSecretDelete, PullSecretGet, PullSecretItem, PullSecretList,
    PullSecretListResult,
};
use crate::models::route::{RouteCreate, RouteDelete, RouteGet, RouteItem, RouteList, RouteListResult};
use crate::models::workload_identity::{
    WorkloadIdentityCreate, WorkloadIdentityDelete, WorkloadIdentityGet, WorkloadIdentityItem,
    WorkloadIdentityList, WorkloadIdentityListResult,
};

/// Control plane API client
#[derive(Clone)]
pub struct Api {
    invoker: Arc<dyn Invoker>,
}

impl Api {
    pub fn new(invoker: Arc<dyn Invoker>) -> Self {
        Self { invoker }
    }

    /// Call a method with a typed request and decode its result
    pub async fn call<Req, Res>(&self, method: &str, req: &Req) -> Result<Res, ControlError>
    where
        Req: Serialize + ?Sized + Sync,
        Res: DeserializeOwned,
    {
        let body = serde_json::to_value(req)?;
        let result = self.invoker.invoke(method, body).await?;
        Ok(serde_json::from_value(result)?)
    }

    // ================================ DEPLOYER =================================== //

    pub async fn get_commands(&self, location: &str) -> Result<Vec<Command>, ControlError> {
        let req = GetCommandsRequest {
            location: location.to_string(),
        };
        let result: GetCommandsResult = self.call("deployer.getCommands", &req).await?;
        Ok(result.commands)
    }

    pub async fn set_results(
        &self,
        location: &str,
        results: Vec<CommandResult>,
    ) -> Result<(), ControlError> {
        let req = SetResultsRequest {
            location: location.to_string(),
            results,
        };
        let _: Empty = self.call("deployer.setResults", &req).await?;
        Ok(())
    }

    // =============================== DEPLOYMENT ================================== //

    pub async fn deployment_deploy(&self, req: &DeploymentDeploy) -> Result<(), ControlError> {
        let _: Empty = self.call("deployment.deploy", req).await?;
        Ok(())
    }

    pub async fn deployment_get(
        &self,
        req: &DeploymentGet,
    ) -> Result<DeploymentGetResult, ControlError> {
        self.call("deployment.get", req).await
    }

    pub async fn deployment_list(
        &self,
        req: &DeploymentList,
    ) -> Result<DeploymentListResult, ControlError> {
        self.call("deployment.list", req).await
    }

    pub async fn deployment_revisions(
        &self,
        req: &DeploymentRevisions,
    ) -> Result<DeploymentRevisionsResult, ControlError> {
        self.call("deployment.revisions", req).await
    }

    pub async fn deployment_resume(&self, req: &DeploymentResume) -> Result<(), ControlError> {
        let _: Empty = self.call("deployment.resume", req).await?;
        Ok(())
    }

    pub async fn deployment_pause(&self, req: &DeploymentPause) -> Result<(), ControlError> {
        let _: Empty = self.call("deployment.pause", req).await?;
        Ok(())
    }

    pub async fn deployment_rollback(&self, req: &DeploymentRollback) -> Result<(), ControlError> {
        let _: Empty = self.call("deployment.rollback", req).await?;
        Ok(())
    }

    pub async fn deployment_delete(&self, req: &DeploymentDelete) -> Result<(), ControlError> {
        let _: Empty = self.call("deployment.delete", req).await?;
        Ok(())
    }

    // ================================== DISK ===================================== //

    pub async fn disk_create(&self, req: &DiskCreate) -> Result<(), ControlError> {
        let _: Empty = self.call("disk.create", req).await?;
        Ok(())
    }

    pub async fn disk_get(&self, req: &DiskGet) -> Result<DiskItem, ControlError> {
        self.call("disk.get", req).await
    }

    pub async fn disk_list(&self, req: &DiskList) -> Result<DiskListResult, ControlError> {
        self.call("disk.list", req).await
    }

    pub async fn disk_update(&self, req: &DiskUpdate) -> Result<(), ControlError> {
        let _: Empty = self.call("disk.update", req).await?;
        Ok(())
    }

    pub async fn disk_delete(&self, req: &DiskDelete) -> Result<(), ControlError> {
        let _: Empty = self.call("disk.delete", req).await?;
        Ok(())
    }

    // =============================== PULL SECRET ================================= //

    pub async fn pullsecret_create(&self, req: &PullSecretCreate) -> Result<(), ControlError> {
        let _: Empty = self.call("pullsecret.create", req).await?;
        Ok(())
    }

    pub async fn pullsecret_get(&self, req: &PullSecretGet) -> Result<PullSecretItem, ControlError> {
        self.call("pullsecret.get", req).await
    }

    pub async fn pullsecret_list(
        &self,
        req: &PullSecretList,
    ) -> Result<PullSecretListResult, ControlError> {
        self.call("pullsecret.list", req).await
    }

    pub async fn pullsecret_delete(&self, req: &PullSecretDelete) -> Result<(), ControlError> {
        let _: Empty = self.call("pullsecret.delete", req).await?;
        Ok(())
    }

    // ============================ WORKLOAD IDENTITY ============================== //

    pub async fn workload_identity_create(
        &self,
        req: &WorkloadIdentityCreate,
    ) -> Result<(), ControlError> {
        let _: Empty = self.call("workloadidentity.create", req).await?;
        Ok(())
    }

    pub async fn workload_identity_get(
        &self,
        req: &WorkloadIdentityGet,
    ) -> Result<WorkloadIdentityItem, ControlError> {
        self.call("workloadidentity.get", req).await
    }

    pub async fn workload_identity_list(
        &self,
        req: &WorkloadIdentityList,
    ) -> Result<WorkloadIdentityListResult, ControlError> {
        self.call("workloadidentity.list", req).await
    }

    pub async fn workload_identity_delete(
        &self,
        req: &WorkloadIdentityDelete,
    ) -> Result<(), ControlError> {
        let _: Empty = self.call("workloadidentity.delete", req).await?;
        Ok(())
    }

    // ================================= ROUTE ===================================== //

    pub async fn route_create(&self, req: &RouteCreate) -> Result<(), ControlError> {
        let _: Empty = self.call("route.create", req).await?;
        Ok(())
    }

    pub async fn route_get(&self, req: &RouteGet) -> Result<RouteItem, ControlError> {
        self.call("route.get", req).await
    }

    pub async fn route_list(&self, req: &RouteList) -> Result<RouteListResult, ControlError> {
        self.call("route.list", req).await
    }

    pub async fn route_delete(&self, req: &RouteDelete) -> Result<(), ControlError> {
        let _: Empty = self.call("route.delete", req).await?;
        Ok(())
    }

    // ================================ LOCATION =================================== //

    pub async fn location_list(&self) -> Result<LocationListResult, ControlError> {
        self.call("location.list", &LocationList {}).await
    }

    pub async fn location_get(&self, id: &str) -> Result<Location, ControlError> {
        let req = LocationGet { id: id.to_string() };
        self.call("location.get", &req).await
    }
}
