//! Planned actions.

use std::fmt;

use crate::error::ReconError;

/// One planned step against a remote resource.
///
/// `P` is the create payload and `I` the identity used to address the
/// resource for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<P, I> {
    /// Create the resource with this payload.
    Create(P),
    /// Delete the resource with this identity.
    Delete(I),
    /// Nothing to do.
    Noop,
    /// The request cannot be planned.
    Error(ReconError),
}

/// Payload-free tag of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Create.
    Create,
    /// Delete.
    Delete,
    /// No-op.
    Noop,
    /// Planning error.
    Error,
}

impl ActionKind {
    /// Returns the action name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Delete => "delete",
            ActionKind::Noop => "noop",
            ActionKind::Error => "error",
        }
    }

    /// Returns true for actions that change remote state.
    pub fn is_mutating(&self) -> bool {
        matches!(self, ActionKind::Create | ActionKind::Delete)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<P, I> Action<P, I> {
    /// Returns the tag of this action.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Create(_) => ActionKind::Create,
            Action::Delete(_) => ActionKind::Delete,
            Action::Noop => ActionKind::Noop,
            Action::Error(_) => ActionKind::Error,
        }
    }

    /// Returns true if this is a `Create`.
    pub fn is_create(&self) -> bool {
        matches!(self, Action::Create(_))
    }

    /// Returns true if this is an `Error`.
    pub fn is_error(&self) -> bool {
        matches!(self, Action::Error(_))
    }
}
