//! Error types for rendering, reconciliation and commit.
//!
//! Every failure aborts the generation under construction. The last
//! committed generation is never touched by a failed one.

use std::fmt;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RecastError>;

// =============================================================================
// RecastError
// =============================================================================

/// Errors reported by the reconciler, the hook manager and the commit phase.
#[derive(Debug, Error)]
pub enum RecastError {
    /// `use_state` was called while no component function was rendering.
    #[error("use_state called outside of an active component render")]
    NoActiveRenderContext,

    /// A component called its hooks in a different count or shape than
    /// during the previous committed generation.
    #[error("component `{component}` changed its hook sequence: {mismatch}")]
    InconsistentHookSequence {
        component: String,
        mismatch: HookMismatch,
    },

    /// An element type that cannot be classified as host tag or component.
    #[error("invalid element type `{tag}`")]
    InvalidElementType { tag: String },

    /// A host adapter operation failed.
    #[error("host mutation `{op}` failed")]
    HostMutationFailed {
        op: HostOp,
        #[source]
        source: HostError,
    },
}

impl RecastError {
    pub(crate) fn host(op: HostOp) -> impl FnOnce(HostError) -> Self {
        move |source| Self::HostMutationFailed { op, source }
    }
}

/// How a component's hook sequence drifted between generations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookMismatch {
    /// More hooks were called than the previous generation recorded.
    #[error("hook #{index} has no counterpart in the previous render")]
    Unexpected { index: usize },

    /// The hook at `index` holds a different value type.
    #[error("hook #{index} changed type from `{expected}` to `{found}`")]
    TypeChanged {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// Fewer or more hooks in total than the previous generation.
    #[error("expected {expected} hooks, found {found}")]
    CountChanged { expected: usize, found: usize },
}

// =============================================================================
// Host errors
// =============================================================================

/// Failure raised by a [`HostAdapter`](crate::host::HostAdapter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Host adapter operation, used to label [`RecastError::HostMutationFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOp {
    CreateNode,
    CreateTextNode,
    SetAttribute,
    ClearAttribute,
    AddListener,
    RemoveListener,
    AppendChild,
    InsertBefore,
    RemoveChild,
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateNode => "create_node",
            Self::CreateTextNode => "create_text_node",
            Self::SetAttribute => "set_attribute",
            Self::ClearAttribute => "clear_attribute",
            Self::AddListener => "add_listener",
            Self::RemoveListener => "remove_listener",
            Self::AppendChild => "append_child",
            Self::InsertBefore => "insert_before",
            Self::RemoveChild => "remove_child",
        };
        f.write_str(name)
    }
}
