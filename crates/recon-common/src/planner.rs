//! Action Planner.
//!
//! Pure functions from (operation, desired state, remote state) to actions.
//! Decisions compare identity presence only; fields outside the identity
//! are not reconciled when the resource already exists.

use crate::action::Action;
use crate::desired::{DesiredState, Operation};
use crate::error::ReconResult;
use crate::remote::RemoteState;
use crate::resource::Resource;

/// Action type produced for a resource.
pub type PlannedAction<R> = Action<<R as Resource>::Payload, <R as Resource>::Identity>;

/// Plans the single action for one resource.
///
/// Precedence: a failed identity extraction wins over everything else, then
/// the presence table:
///
/// | operation | remote  | action |
/// |-----------|---------|--------|
/// | present   | absent  | Create |
/// | present   | present | Noop   |
/// | absent    | present | Delete |
/// | absent    | absent  | Noop   |
pub fn plan<R: Resource + ?Sized>(
    resource: &R,
    operation: Operation,
    desired: &DesiredState,
    identity: &ReconResult<R::Identity>,
    remote: Option<&RemoteState>,
) -> PlannedAction<R> {
    let identity = match identity {
        Ok(identity) => identity,
        Err(e) => return Action::Error(e.clone()),
    };

    match (operation, remote) {
        (Operation::Present, None) => match resource.payload(identity, desired) {
            Ok(payload) => Action::Create(payload),
            Err(e) => Action::Error(e),
        },
        (Operation::Present, Some(_)) => Action::Noop,
        (Operation::Absent, Some(remote)) => Action::Delete(resource.delete_identity(identity, remote)),
        (Operation::Absent, None) => Action::Noop,
    }
}

/// Combines the independent plans of a paired topology.
///
/// A relation is created only when both sides plan `Create`; a one-sided
/// relation is left alone. Deletes and errors pass through per side.
pub fn plan_pair<P, I>(source: Action<P, I>, destination: Action<P, I>) -> (Action<P, I>, Action<P, I>) {
    if source.is_create() && destination.is_create() {
        return (source, destination);
    }
    (downgrade_create(source), downgrade_create(destination))
}

fn downgrade_create<P, I>(action: Action<P, I>) -> Action<P, I> {
    if action.is_create() {
        Action::Noop
    } else {
        action
    }
}
