//! Normalized tool call result re-injected into the conversation

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::failure::FailureKind;

/// Model-facing messages. The assistant talks Italian.
pub mod messages {
    pub const UNKNOWN_TOOL: &str = "Funzione non trovata";
    pub const UNCONFIGURED: &str = "Sistema non configurato";
    pub const BACKEND_STATUS: &str = "Il servizio ha restituito un errore";
    pub const UNAVAILABLE: &str = "Servizio temporaneamente non disponibile";
    pub const CANCELLED: &str = "Richiesta annullata";
    pub const INVALID_ARGUMENTS: &str = "Argomenti non validi";
}

/// Outcome of one dispatched tool call.
///
/// | Variant       | JSON                                  |
/// |---------------|---------------------------------------|
/// | `Success`     | `{"success": true, ...data}`          |
/// | `Passthrough` | the backend's JSON object, untouched  |
/// | `Failure`     | `{"success": false, "message": ...}`  |
/// | `Error`       | `{"error": ..., "status"?: ...}`      |
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionCallResult {
    Success {
        data: Map<String, Value>,
    },
    Passthrough(Value),
    Failure {
        kind: FailureKind,
        message: String,
    },
    Error {
        kind: FailureKind,
        error: String,
        status: Option<u16>,
    },
}

impl FunctionCallResult {
    /// `{"success": true, <key>: <value>}`
    pub fn success_with(key: impl Into<String>, value: Value) -> Self {
        let mut data = Map::new();
        data.insert(key.into(), value);
        Self::Success { data }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn error(kind: FailureKind, error: impl Into<String>) -> Self {
        Self::Error {
            kind,
            error: error.into(),
            status: None,
        }
    }

    pub fn unknown_tool() -> Self {
        Self::error(FailureKind::UnknownTool, messages::UNKNOWN_TOOL)
    }

    pub fn unconfigured() -> Self {
        Self::error(FailureKind::Unconfigured, messages::UNCONFIGURED)
    }

    pub fn cancelled() -> Self {
        Self::error(FailureKind::Cancelled, messages::CANCELLED)
    }

    pub fn backend_status(status: u16) -> Self {
        Self::Error {
            kind: FailureKind::BackendStatus,
            error: messages::BACKEND_STATUS.to_string(),
            status: Some(status),
        }
    }

    pub fn unavailable() -> Self {
        Self::error(FailureKind::Transport, messages::UNAVAILABLE)
    }

    pub fn invalid_arguments(detail: impl std::fmt::Display) -> Self {
        Self::failure(
            FailureKind::InvalidArguments,
            format!("{}: {}", messages::INVALID_ARGUMENTS, detail),
        )
    }

    /// The failure category, or `None` for `Success` / `Passthrough`.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } | Self::Passthrough(_) => None,
            Self::Failure { kind, .. } | Self::Error { kind, .. } => Some(*kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure_kind().is_none()
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Success { data } => {
                let mut out = Map::with_capacity(data.len() + 1);
                out.insert("success".to_string(), Value::Bool(true));
                for (k, v) in data {
                    if k != "success" {
                        out.insert(k.clone(), v.clone());
                    }
                }
                Value::Object(out)
            }
            Self::Passthrough(value) => value.clone(),
            Self::Failure { message, .. } => json!({ "success": false, "message": message }),
            Self::Error { error, status, .. } => match status {
                Some(code) => json!({ "error": error, "status": code }),
                None => json!({ "error": error }),
            },
        }
    }

    /// Realtime `conversation.item.create` event carrying this result as a
    /// `function_call_output` for `call_id`.
    pub fn to_conversation_item(&self, call_id: &str) -> Value {
        json!({
            "type": "conversation.item.create",
            "item": {
                "type": "function_call_output",
                "call_id": call_id,
                "output": self.to_value().to_string(),
            }
        })
    }
}

impl Serialize for FunctionCallResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
