//! Dispatcher: uniform entry point from a model tool call to a backend call.
//!
//! ```text
//! invoke(request)
//!   ├─ name not routed ──────────────► UnknownTool   (no I/O)
//!   ├─ arguments rejected ───────────► InvalidArguments (no I/O)
//!   ├─ credentials missing/blank ────► Unconfigured  (no I/O)
//!   └─ backend.call ─► normalize ────► Completed(result)
//! ```
//!
//! A dispatcher is immutable after [`DispatcherBuilder::build`]; clones share
//! the registry, route table, backend and credentials provider.

pub mod builder;
mod normalize;
pub mod routes;

use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backend::{Backend, BackendOutcome, BackendRequest};
use crate::config::CredentialsProvider;
use crate::registry::{ToolRegistry, ValidationError};
use crate::types::{FunctionCallRequest, FunctionCallResult, ToolDefinition};

pub use builder::DispatcherBuilder;
pub use routes::{FieldMap, OperationTable, ResponseShape, ToolRoute};

#[derive(Clone)]
pub struct Dispatcher {
    pub(crate) registry: Arc<ToolRegistry>,
    pub(crate) routes: Arc<OperationTable>,
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) credentials: Arc<dyn CredentialsProvider>,
    pub(crate) validate_arguments: bool,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Catalog to advertise when the model session starts.
    pub fn tools(&self) -> &[ToolDefinition] {
        self.registry.list()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn routes(&self) -> &OperationTable {
        &self.routes
    }

    /// Run one tool call to completion. Never fails: every failure is a result.
    pub async fn invoke(&self, request: &FunctionCallRequest) -> FunctionCallResult {
        let call_id = request
            .call_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        info!(tool = %request.name, call_id = %call_id, "Handling function call");

        let Some(route) = self.routes.get(&request.name) else {
            debug!(tool = %request.name, call_id = %call_id, "Tool not recognized");
            return FunctionCallResult::unknown_tool();
        };

        let prepared = match self.prepare(route, request) {
            Ok(prepared) => prepared,
            Err(e) => {
                info!(
                    tool = %request.name,
                    call_id = %call_id,
                    error = %e,
                    "Rejected tool arguments"
                );
                return FunctionCallResult::invalid_arguments(e.detail());
            }
        };

        let Some(credentials) = self.credentials.credentials().filter(|c| c.is_complete()) else {
            error!(tool = %request.name, call_id = %call_id, "Backend credentials not configured");
            return FunctionCallResult::unconfigured();
        };

        debug!(
            tool = %request.name,
            call_id = %call_id,
            method = prepared.method(),
            path = prepared.path(),
            idempotent = route.operation.is_idempotent(),
            "Calling backend"
        );
        let outcome = self.backend.call(&credentials, &prepared).await;
        self.complete(route, &call_id, outcome)
    }

    /// Like [`invoke`](Self::invoke), but gives up as soon as `cancel` fires.
    ///
    /// Dropping the in-flight call closes its connection; the call is never
    /// re-issued, so an abandoned booking can at most have been sent once.
    pub async fn invoke_cancellable(
        &self,
        request: &FunctionCallRequest,
        cancel: &CancellationToken,
    ) -> FunctionCallResult {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(tool = %request.name, call_id = ?request.call_id, "Function call cancelled");
                FunctionCallResult::cancelled()
            }
            result = self.invoke(request) => result,
        }
    }

    /// Run several calls of the same model turn concurrently.
    /// Results are returned in request order.
    pub async fn invoke_all(&self, requests: &[FunctionCallRequest]) -> Vec<FunctionCallResult> {
        join_all(requests.iter().map(|r| self.invoke(r))).await
    }

    fn prepare(
        &self,
        route: &ToolRoute,
        request: &FunctionCallRequest,
    ) -> Result<BackendRequest, ValidationError> {
        if self.validate_arguments {
            self.registry.validate(&request.name, &request.arguments)?;
        }
        route.operation.prepare(&request.name, &request.arguments)
    }

    fn complete(
        &self,
        route: &ToolRoute,
        call_id: &str,
        outcome: BackendOutcome,
    ) -> FunctionCallResult {
        match outcome {
            BackendOutcome::Ok(payload) => match normalize::apply(&route.shape, payload) {
                Ok(result) => {
                    debug!(
                        tool = %route.tool,
                        call_id = %call_id,
                        kind = result.failure_kind().map(|k| k.name()).unwrap_or("success"),
                        "Function call completed"
                    );
                    result
                }
                Err(problem) => {
                    warn!(
                        tool = %route.tool,
                        call_id = %call_id,
                        problem = %problem,
                        "Unexpected backend payload"
                    );
                    FunctionCallResult::unavailable()
                }
            },
            BackendOutcome::HttpError { status, body } => {
                warn!(
                    tool = %route.tool,
                    call_id = %call_id,
                    status,
                    body = %body,
                    "Backend responded with failure status"
                );
                FunctionCallResult::backend_status(status)
            }
            BackendOutcome::TransportError(message) => {
                warn!(
                    tool = %route.tool,
                    call_id = %call_id,
                    error = %message,
                    "Backend unreachable"
                );
                FunctionCallResult::unavailable()
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("routes", &self.routes.len())
            .field("validate_arguments", &self.validate_arguments)
            .finish()
    }
}
