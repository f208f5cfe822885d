//! Plugin seam of the engine.
//!
//! A [`Resource`] tells the engine how to address one kind of remote object,
//! how to read it back (the State Fetcher) and how to create or delete it.
//! Everything else (planning, execution order, reporting) is owned by the
//! engine.

use std::fmt;

use async_trait::async_trait;

use crate::desired::{DesiredState, Operation};
use crate::error::ReconResult;
use crate::remote::RemoteState;

/// A kind of remote object managed by a plugin.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Transport handle the resource is reached through.
    type Transport: ?Sized + Send;
    /// Fields that address the resource, compared for equality.
    type Identity: Clone + fmt::Debug + PartialEq + Send + Sync;
    /// Data needed to create the resource.
    type Payload: Clone + fmt::Debug + Send + Sync;

    /// Returns the resource kind for logs (e.g. "user-role").
    fn kind(&self) -> &str;

    /// Extracts the identity required by `operation`.
    ///
    /// Fails when the required field combination is missing; the planner
    /// turns that failure into an `Error` action before any remote call.
    fn identity(&self, operation: Operation, desired: &DesiredState)
        -> ReconResult<Self::Identity>;

    /// Builds the create payload.
    fn payload(&self, identity: &Self::Identity, desired: &DesiredState)
        -> ReconResult<Self::Payload>;

    /// Chooses the identity passed to `delete`.
    ///
    /// Defaults to the identity derived from the desired state.
    fn delete_identity(&self, identity: &Self::Identity, _remote: &RemoteState) -> Self::Identity {
        identity.clone()
    }

    /// Reads the current remote state; `None` means the resource is absent.
    async fn fetch(
        &self,
        transport: &mut Self::Transport,
        identity: &Self::Identity,
    ) -> ReconResult<Option<RemoteState>>;

    /// Creates the resource.
    async fn create(&self, transport: &mut Self::Transport, payload: &Self::Payload)
        -> ReconResult<()>;

    /// Deletes the resource.
    async fn delete(&self, transport: &mut Self::Transport, identity: &Self::Identity)
        -> ReconResult<()>;
}
