use std::sync::Arc;

use super::{Dispatcher, OperationTable};
use crate::backend::{Backend, HttpBackend};
use crate::config::{CredentialsProvider, EnvCredentials, TransportConfig};
use crate::registry::ToolRegistry;
use crate::Result;

/// Builder for [`Dispatcher`].
///
/// Everything has a default: the built-in catalog and routes, credentials
/// from `SUPABASE_URL` / `SUPABASE_ANON_KEY`, an HTTP backend configured by
/// [`TransportConfig::from_env`], and argument validation switched on.
pub struct DispatcherBuilder {
    registry: Option<ToolRegistry>,
    routes: Option<OperationTable>,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    backend: Option<Arc<dyn Backend>>,
    transport: Option<TransportConfig>,
    validate_arguments: Option<bool>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            routes: None,
            credentials: None,
            backend: None,
            transport: None,
            validate_arguments: None,
        }
    }

    /// Replace the built-in tool catalog.
    pub fn registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the built-in route table. Must cover exactly the registry's tools.
    pub fn routes(mut self, routes: OperationTable) -> Self {
        self.routes = Some(routes);
        self
    }

    pub fn credentials(mut self, provider: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    /// Use a custom backend instead of the HTTP one (ignores [`transport`](Self::transport)).
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn transport(mut self, config: TransportConfig) -> Self {
        self.transport = Some(config);
        self
    }

    /// Check arguments against the tool's parameter schema before dispatch.
    ///
    /// Defaults to on; `VOICE_DISPATCH_SKIP_VALIDATION=1` turns it off when not
    /// set explicitly. Filters still reject calls missing the arguments they need.
    pub fn validate_arguments(mut self, enable: bool) -> Self {
        self.validate_arguments = Some(enable);
        self
    }

    /// Build the dispatcher, verifying routes against the catalog.
    pub fn build(self) -> Result<Dispatcher> {
        let registry = match self.registry {
            Some(r) => r,
            None => ToolRegistry::standard()?,
        };
        let routes = match self.routes {
            Some(r) => r,
            None => OperationTable::standard()?,
        };
        routes.verify_against(&registry)?;

        let backend: Arc<dyn Backend> = match self.backend {
            Some(b) => b,
            None => {
                let config = self.transport.unwrap_or_else(TransportConfig::from_env);
                Arc::new(HttpBackend::new(&config)?)
            }
        };

        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(EnvCredentials::supabase()));

        let validate_arguments = self.validate_arguments.unwrap_or_else(|| {
            std::env::var("VOICE_DISPATCH_SKIP_VALIDATION").ok().as_deref() != Some("1")
        });

        Ok(Dispatcher {
            registry: Arc::new(registry),
            routes: Arc::new(routes),
            backend,
            credentials,
            validate_arguments,
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
