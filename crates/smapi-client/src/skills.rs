//! Skill Management API operations
//!
//! Each operation is a route plus its documented response table; all the
//! request/response machinery lives in `ServiceInvoker`.

use std::sync::Arc;

use common::ClientConfig;
use smapi_auth::{Credentials, TokenProvider};
use tracing::info;
use transport::{ReqwestTransport, Transport};

use crate::error::{Error, Result, ServiceError, ServiceErrorKind};
use crate::invoker::ServiceInvoker;
use crate::models::{ErrorBody, ListSkillResponse, SkillManifestEnvelope, SkillStatus, Versioned};
use crate::pagination::PageRequest;
use crate::request::RequestBuilder;
use crate::response::{InvocationResult, ResponseEntry, ResponseTable};
use crate::route::RouteDescriptor;

const GET_SKILL_STATUS: &ResponseTable = &[
    ResponseEntry::typed(200, "Returns status for skill resource and sub-resources."),
    ResponseEntry::typed(400, "Server cannot process the request due to a client error."),
    ResponseEntry::typed(401, "The auth token is invalid/expired or doesn't have access to the resource."),
    ResponseEntry::typed(404, "The resource being requested is not found."),
    ResponseEntry::typed(429, "Exceeds the permitted request limit. Throttling criteria includes total requests, per API, ClientId, and CustomerId."),
    ResponseEntry::typed(500, "Internal Server Error."),
    ResponseEntry::typed(503, "Service Unavailable."),
];

const LIST_SKILLS_FOR_VENDOR: &ResponseTable = &[
    ResponseEntry::typed(200, "Returns list of skills for the vendor."),
    ResponseEntry::typed(400, "Server cannot process the request due to a client error."),
    ResponseEntry::typed(401, "The auth token is invalid/expired or doesn't have access to the resource."),
    ResponseEntry::typed(403, "The operation being requested is not allowed."),
    ResponseEntry::typed(429, "Exceeds the permitted request limit. Throttling criteria includes total requests, per API, ClientId, and CustomerId."),
    ResponseEntry::typed(500, "Internal Server Error."),
    ResponseEntry::typed(503, "Service Unavailable."),
];

const GET_SKILL_MANIFEST: &ResponseTable = &[
    ResponseEntry::typed(200, "Response contains the latest version of skill manifest."),
    ResponseEntry::empty(303, "See Other"),
    ResponseEntry::typed(400, "Server cannot process the request due to a client error."),
    ResponseEntry::typed(401, "The auth token is invalid/expired or doesn't have access to the resource."),
    ResponseEntry::typed(403, "The operation being requested is not allowed."),
    ResponseEntry::typed(404, "The resource being requested is not found."),
    ResponseEntry::typed(429, "Exceeds the permitted request limit. Throttling criteria includes total requests, per API, ClientId, and CustomerId."),
    ResponseEntry::typed(500, "Internal Server Error."),
    ResponseEntry::typed(503, "Service Unavailable."),
];

const UPDATE_SKILL_MANIFEST: &ResponseTable = &[
    ResponseEntry::empty(202, "Accepted; Returns a URL to track the status in 'Location' header."),
    ResponseEntry::typed(400, "Server cannot process the request due to a client error."),
    ResponseEntry::typed(401, "The auth token is invalid/expired or doesn't have access to the resource."),
    ResponseEntry::typed(403, "The operation being requested is not allowed."),
    ResponseEntry::typed(404, "The resource being requested is not found."),
    ResponseEntry::typed(409, "The request could not be completed due to a conflict with the current state of the target resource."),
    ResponseEntry::typed(412, "Precondition failed."),
    ResponseEntry::typed(429, "Exceeds the permitted request limit. Throttling criteria includes total requests, per API, ClientId, and CustomerId."),
    ResponseEntry::typed(500, "Internal Server Error."),
    ResponseEntry::typed(503, "Service Unavailable."),
];

const DELETE_SKILL: &ResponseTable = &[
    ResponseEntry::empty(204, "Success. No content."),
    ResponseEntry::typed(400, "Server cannot process the request due to a client error."),
    ResponseEntry::typed(401, "The auth token is invalid/expired or doesn't have access to the resource."),
    ResponseEntry::typed(403, "The operation being requested is not allowed."),
    ResponseEntry::typed(404, "The resource being requested is not found."),
    ResponseEntry::typed(409, "The request could not be completed due to a conflict with the current state of the target resource."),
    ResponseEntry::typed(429, "Exceeds the permitted request limit. Throttling criteria includes total requests, per API, ClientId, and CustomerId."),
    ResponseEntry::typed(500, "Internal Server Error."),
    ResponseEntry::typed(503, "Service Unavailable."),
];

#[derive(Clone)]
pub struct SkillManagementClient {
    invoker: ServiceInvoker,
}

impl SkillManagementClient {
    pub fn new(invoker: ServiceInvoker) -> Self {
        Self { invoker }
    }

    /// Wire a reqwest transport, a token provider and an invoker from config.
    pub fn from_config(config: &ClientConfig, credentials: Credentials) -> common::Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(
            ReqwestTransport::new(config.transport.timeout(), config.transport.connect_timeout())
                .map_err(|e| common::Error::Config(format!("failed to build HTTP client: {e}")))?,
        );

        let tokens = TokenProvider::new(credentials, transport.clone())
            .map_err(|e| common::Error::Config(e.to_string()))?
            .with_endpoint(config.auth.token_endpoint.clone())
            .with_skew(config.auth.refresh_skew());

        let mut builder = RequestBuilder::new(config.api.endpoint.clone());
        if let Some(suffix) = &config.api.user_agent {
            builder = builder.with_user_agent_suffix(suffix);
        }

        info!(
            endpoint = %config.api.endpoint,
            token_endpoint = %config.auth.token_endpoint,
            "skill management client configured"
        );
        Ok(Self::new(ServiceInvoker::new(builder, Arc::new(tokens), transport)))
    }

    pub fn invoker(&self) -> &ServiceInvoker {
        &self.invoker
    }

    /// Build status of the skill's resources. An empty `resources` asks for all.
    pub async fn get_skill_status(&self, skill_id: &str, resources: &[&str]) -> Result<SkillStatus> {
        let route = RouteDescriptor::get("/v1/skills/{skillId}/status")
            .path_param("skillId", skill_id)
            .query_list("resource", resources.iter().copied());
        let result = self
            .invoker
            .invoke::<_, SkillStatus, ErrorBody>(route, GET_SKILL_STATUS)
            .await?;
        require_payload(result)
    }

    /// One page of the vendor's skills, optionally filtered by skill id.
    pub async fn list_skills_for_vendor(
        &self,
        vendor_id: &str,
        skill_ids: &[&str],
        page: &PageRequest,
    ) -> Result<ListSkillResponse> {
        let route = RouteDescriptor::get("/v1/skills")
            .query("vendorId", vendor_id)
            .query_list("skillId", skill_ids.iter().copied())
            .page(page);
        let result = self
            .invoker
            .invoke::<_, ListSkillResponse, ErrorBody>(route, LIST_SKILLS_FOR_VENDOR)
            .await?;
        require_payload(result)
    }

    /// Current manifest together with the entity tag to update it against.
    pub async fn get_skill_manifest(
        &self,
        skill_id: &str,
        stage: &str,
    ) -> Result<Versioned<SkillManifestEnvelope>> {
        let route = RouteDescriptor::get("/v1/skills/{skillId}/stages/{stage}/manifest")
            .path_param("skillId", skill_id)
            .path_param("stage", stage);
        let result = self
            .invoker
            .invoke::<_, SkillManifestEnvelope, ErrorBody>(route, GET_SKILL_MANIFEST)
            .await?;
        let etag = result.etag().map(str::to_string);
        Ok(Versioned {
            value: require_payload(result)?,
            etag,
        })
    }

    /// Replace the manifest. With `if_match`, a stale tag fails with 412.
    pub async fn update_skill_manifest(
        &self,
        skill_id: &str,
        stage: &str,
        manifest: &SkillManifestEnvelope,
        if_match: Option<&str>,
    ) -> Result<()> {
        let route = RouteDescriptor::put("/v1/skills/{skillId}/stages/{stage}/manifest")
            .path_param("skillId", skill_id)
            .path_param("stage", stage)
            .if_match(if_match)
            .body(manifest);
        self.invoker
            .invoke::<_, serde_json::Value, ErrorBody>(route, UPDATE_SKILL_MANIFEST)
            .await?;
        Ok(())
    }

    pub async fn delete_skill(&self, skill_id: &str) -> Result<()> {
        let route = RouteDescriptor::delete("/v1/skills/{skillId}").path_param("skillId", skill_id);
        self.invoker
            .invoke::<_, serde_json::Value, ErrorBody>(route, DELETE_SKILL)
            .await?;
        Ok(())
    }
}

/// Payload of an operation whose success response always has a body.
fn require_payload<T>(result: InvocationResult<T>) -> Result<T> {
    let InvocationResult {
        status,
        headers,
        payload,
        body,
    } = result;
    payload.ok_or_else(|| {
        Error::Service(ServiceError {
            kind: ServiceErrorKind::Decode,
            status: Some(status),
            headers,
            body,
            payload: None,
            message: format!("expected a response body with status {status}"),
        })
    })
}
