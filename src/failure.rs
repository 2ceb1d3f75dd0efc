//! 调用失败分类：每一次工具调用失败都落入以下类别之一。
//!
//! Failure taxonomy for dispatched tool calls.
//!
//! Every failure path of [`Dispatcher::invoke`](crate::Dispatcher::invoke) is
//! tagged with exactly one [`FailureKind`]. The kind never reaches the model
//! session (the serialized result only carries the message and, for backend
//! failures, the status code); it exists so callers can route on it.
//!
//! | Kind               | Raised by        | Network I/O | Logged          |
//! |--------------------|------------------|-------------|-----------------|
//! | `UnknownTool`      | dispatcher       | none        | debug           |
//! | `InvalidArguments` | registry/adapter | none        | info            |
//! | `Unconfigured`     | dispatcher       | none        | error           |
//! | `NotFound`         | normalization    | one request | no              |
//! | `BackendStatus`    | adapter          | one request | warn + body     |
//! | `Transport`        | adapter          | attempted   | warn            |
//! | `Cancelled`        | caller token     | aborted     | info            |

use std::fmt;

/// Failure category of a single tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The requested tool name has no route.
    UnknownTool,
    /// Missing or mistyped arguments; the model can retry with corrected input.
    InvalidArguments,
    /// Backend URL or key missing. A deployment defect, not a transient condition.
    Unconfigured,
    /// The backend answered but the requested record does not exist.
    NotFound,
    /// The backend answered with a non-success HTTP status.
    BackendStatus,
    /// DNS, connect, timeout or malformed-response failure.
    Transport,
    /// The caller abandoned the call before the backend answered.
    Cancelled,
}

impl FailureKind {
    /// Returns the stable snake_case name (e.g., `"unknown_tool"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::UnknownTool => "unknown_tool",
            Self::InvalidArguments => "invalid_arguments",
            Self::Unconfigured => "unconfigured",
            Self::NotFound => "not_found",
            Self::BackendStatus => "backend_status",
            Self::Transport => "transport",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the model session can fix the call by changing its own input.
    #[inline]
    pub fn is_caller_correctable(&self) -> bool {
        matches!(self, Self::UnknownTool | Self::InvalidArguments)
    }

    /// Whether the failure happened before any request left the process.
    #[inline]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool | Self::InvalidArguments | Self::Unconfigured
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
