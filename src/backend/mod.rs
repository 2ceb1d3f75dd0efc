//! Backend adapter: turns an abstract [`BackendOperation`] plus tool arguments
//! into one HTTP request, and the transport result into a [`BackendOutcome`].
//!
//! Two call shapes exist, with different side-effect profiles:
//!
//! | Operation         | HTTP                              | Idempotent |
//! |-------------------|-----------------------------------|------------|
//! | `FilteredRead`    | `GET {base}/rest/v1/<collection>` | yes        |
//! | `RemoteProcedure` | `POST {base}/<endpoint>`          | no         |
//!
//! The adapter performs exactly one request per call and never logs; the
//! dispatcher decides what to log and what the model gets to see.

pub mod http;
pub mod query;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::Credentials;
use crate::registry::ValidationError;

pub use http::HttpBackend;
pub use query::{Filter, ReadQuery};

/// Path prefix of the data-query API.
pub const REST_PREFIX: &str = "rest/v1";

/// Concrete backend action behind a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOperation {
    /// Filtered read against a collection.
    FilteredRead(ReadQuery),
    /// POST the arguments as JSON to a server-side function, e.g.
    /// `functions/v1/book-appointment` or `rest/v1/rpc/<name>`.
    RemoteProcedure { endpoint: String },
}

impl BackendOperation {
    pub fn read(query: ReadQuery) -> Self {
        Self::FilteredRead(query)
    }

    /// Edge function hosted under `functions/v1/<name>`.
    pub fn edge_function(name: &str) -> Self {
        Self::RemoteProcedure {
            endpoint: format!("functions/v1/{}", name.trim_matches('/')),
        }
    }

    /// Database function exposed under `rest/v1/rpc/<name>`.
    pub fn rpc(name: &str) -> Self {
        Self::RemoteProcedure {
            endpoint: format!("{REST_PREFIX}/rpc/{}", name.trim_matches('/')),
        }
    }

    /// Reads are safe to repeat; procedures may book, send or charge.
    pub fn is_idempotent(&self) -> bool {
        matches!(self, Self::FilteredRead(_))
    }

    /// Shape the outbound request for `arguments` (`tool` names the call in errors).
    pub fn prepare(
        &self,
        tool: &str,
        arguments: &Map<String, Value>,
    ) -> Result<BackendRequest, ValidationError> {
        match self {
            Self::FilteredRead(query) => {
                let pairs = query
                    .query_pairs(arguments)
                    .map_err(|issues| ValidationError::new(tool, issues))?;
                Ok(BackendRequest::Read {
                    path: format!("{REST_PREFIX}/{}", query.collection.trim_matches('/')),
                    query: pairs,
                })
            }
            Self::RemoteProcedure { endpoint } => Ok(BackendRequest::Procedure {
                path: endpoint.trim_start_matches('/').to_string(),
                body: Value::Object(arguments.clone()),
            }),
        }
    }
}

/// A fully shaped request, relative to the credentials' base URL.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendRequest {
    Read {
        path: String,
        query: Vec<(String, String)>,
    },
    Procedure {
        path: String,
        body: Value,
    },
}

impl BackendRequest {
    pub fn method(&self) -> &'static str {
        match self {
            Self::Read { .. } => "GET",
            Self::Procedure { .. } => "POST",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Read { path, .. } | Self::Procedure { path, .. } => path,
        }
    }
}

/// Result of one backend round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome {
    /// 2xx with a parsed JSON body (`Null` for an empty body).
    Ok(Value),
    /// Non-success status with the raw body text, never re-parsed.
    HttpError { status: u16, body: String },
    /// The request did not produce a usable response.
    TransportError(String),
}

/// Executes prepared requests. Implementations must issue at most one
/// request per call and must not retry.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn call(&self, credentials: &Credentials, request: &BackendRequest) -> BackendOutcome;
}
