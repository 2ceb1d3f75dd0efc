//! 类型系统模块：工具定义、调用请求与调用结果。
//!
//! # Types Module
//!
//! Wire-level types exchanged with the realtime model session.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ToolDefinition`] | Tool advertised to the session at startup |
//! | [`FunctionCallRequest`] | One tool invocation emitted by the model |
//! | [`FunctionCallResult`] | Normalized outcome re-injected into the dialogue |
//!
//! ## Example
//!
//! ```rust
//! use voice_tool_dispatch::types::{FunctionCallRequest, ToolDefinition};
//!
//! let tool = ToolDefinition::function(
//!     "get_practice_status",
//!     "Controlla lo stato di una pratica",
//!     serde_json::json!({
//!         "type": "object",
//!         "properties": {"practice_id": {"type": "string"}},
//!         "required": ["practice_id"]
//!     }),
//! );
//! assert_eq!(tool.required_fields(), vec!["practice_id"]);
//!
//! let call = FunctionCallRequest::from_value(
//!     "get_practice_status",
//!     serde_json::json!({"practice_id": "P-19"}),
//! ).unwrap();
//! assert_eq!(call.arguments["practice_id"], "P-19");
//! ```

pub mod result;
pub mod tool;

pub use result::FunctionCallResult;
pub use tool::{FunctionCallRequest, ToolDefinition};
