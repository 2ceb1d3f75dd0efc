//! # voice-tool-dispatch
//!
//! 语音助手的工具调用分发层：工具目录、路由与后端适配器。
//!
//! Tool-call dispatch layer for a realtime voice assistant. The model session
//! emits function calls (name + JSON arguments); this crate routes each one to
//! a backend operation, performs the HTTP round trip, and hands back a
//! normalized result the conversation engine can re-inject into the dialogue.
//!
//! ## Overview
//!
//! - **Static routing**: tool name → tagged [`BackendOperation`] lookup table,
//!   verified against the advertised catalog at startup
//! - **Two call shapes**: filtered reads (`GET` with query filters) and remote
//!   procedures / edge functions (`POST` with a JSON body)
//! - **Never throws**: every failure path of [`Dispatcher::invoke`] resolves to
//!   a [`FunctionCallResult`]
//! - **Stateless**: concurrent calls share only read-only state; credentials are
//!   read through a [`CredentialsProvider`] on every call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voice_tool_dispatch::{Credentials, Dispatcher, FunctionCallRequest, SharedCredentials};
//!
//! #[tokio::main]
//! async fn main() -> voice_tool_dispatch::Result<()> {
//!     let dispatcher = Dispatcher::builder()
//!         .credentials(Arc::new(SharedCredentials::new(Credentials::new(
//!             "https://project.supabase.co",
//!             "anon-key",
//!         ))))
//!         .build()?;
//!
//!     // Advertise `dispatcher.tools()` to the session, then for each call:
//!     let call = FunctionCallRequest::from_value(
//!         "find_available_slots",
//!         serde_json::json!({"date": "2025-03-01"}),
//!     )?;
//!     let result = dispatcher.invoke(&call).await;
//!     println!("{}", serde_json::to_string(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | Tool catalog and argument validation |
//! | [`dispatch`] | Dispatcher, route table, result normalization |
//! | [`backend`] | Request shaping and the HTTP adapter |
//! | [`config`] | Credentials providers and transport settings |
//! | [`types`] | Tool definitions, call requests, call results |
//! | [`failure`] | Failure taxonomy of a single call |

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod failure;
pub mod registry;
pub mod types;

pub use backend::{Backend, BackendOperation, BackendOutcome, BackendRequest, HttpBackend};
pub use config::{
    Credentials, CredentialsProvider, EnvCredentials, SharedCredentials, TransportConfig,
};
pub use dispatch::{Dispatcher, DispatcherBuilder, OperationTable, ResponseShape, ToolRoute};
pub use failure::FailureKind;
pub use registry::{ToolRegistry, ValidationError};
pub use types::{FunctionCallRequest, FunctionCallResult, ToolDefinition};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
