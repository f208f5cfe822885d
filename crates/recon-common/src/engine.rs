//! Reconciliation Engine.
//!
//! Drives one invocation through fetch, plan, execute and report. Every
//! remote call is awaited before the next one is issued; nothing is spawned.

use tracing::{debug, info, instrument, warn};

use crate::action::Action;
use crate::desired::{DesiredState, Operation};
use crate::executor::{execute, ExecutionMode};
use crate::outcome::Outcome;
use crate::planner::{plan, plan_pair, PlannedAction};
use crate::resource::Resource;

/// One side of a paired topology: a resource and the handle it is reached
/// through.
pub struct Endpoint<'a, R: Resource + ?Sized> {
    /// Resource definition for this side.
    pub resource: &'a R,
    /// Transport handle owned by the caller for the invocation.
    pub transport: &'a mut R::Transport,
}

impl<'a, R: Resource + ?Sized> Endpoint<'a, R> {
    /// Pairs a resource with its transport.
    pub fn new(resource: &'a R, transport: &'a mut R::Transport) -> Self {
        Self {
            resource,
            transport,
        }
    }
}

/// Stateless driver for reconciliation passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    mode: ExecutionMode,
}

impl Reconciler {
    /// Creates a reconciler.
    pub fn new(mode: ExecutionMode) -> Self {
        Self { mode }
    }

    /// Returns the execution mode.
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Fetches remote state and plans the action for one side.
    ///
    /// A missing identity yields `Error` without touching the transport. A
    /// failed fetch is planned as `Error` as well.
    #[instrument(skip_all, fields(kind = %resource.kind(), operation = %operation))]
    pub async fn plan_side<R: Resource + ?Sized>(
        &self,
        resource: &R,
        transport: &mut R::Transport,
        operation: Operation,
        desired: &DesiredState,
    ) -> PlannedAction<R> {
        let identity = resource.identity(operation, desired);

        let remote = match &identity {
            Ok(identity) => match resource.fetch(transport, identity).await {
                Ok(remote) => remote,
                Err(e) => {
                    warn!(error = %e, "Failed to fetch remote state");
                    return Action::Error(e);
                }
            },
            Err(_) => None,
        };

        let action = plan(resource, operation, desired, &identity, remote.as_ref());
        debug!(
            present = remote.is_some(),
            action = %action.kind(),
            "Planned action"
        );
        action
    }

    /// Reconciles a single resource and reports the outcome.
    #[instrument(skip_all, fields(plugin = desired.plugin(), kind = %resource.kind()))]
    pub async fn reconcile<R: Resource + ?Sized>(
        &self,
        resource: &R,
        transport: &mut R::Transport,
        desired: &DesiredState,
    ) -> Outcome {
        let operation = desired.operation();
        let action = self.plan_side(resource, transport, operation, desired).await;
        let results = execute(resource, transport, vec![action], self.mode).await;

        let outcome = Outcome::from_results(&results);
        report(&outcome);
        outcome
    }

    /// Reconciles a relation spanning two endpoints.
    ///
    /// Both sides are fetched and planned independently, then combined with
    /// [`plan_pair`]. Both sides are attempted even when one fails; there is
    /// no rollback of a side that succeeded.
    #[instrument(skip_all, fields(plugin = desired.plugin()))]
    pub async fn reconcile_paired<R: Resource + ?Sized>(
        &self,
        source: Endpoint<'_, R>,
        destination: Endpoint<'_, R>,
        desired: &DesiredState,
    ) -> Outcome {
        let operation = desired.operation();

        let source_action = self
            .plan_side(source.resource, &mut *source.transport, operation, desired)
            .await;
        let destination_action = self
            .plan_side(destination.resource, &mut *destination.transport, operation, desired)
            .await;

        let (source_action, destination_action) = plan_pair(source_action, destination_action);
        debug!(
            source = %source_action.kind(),
            destination = %destination_action.kind(),
            "Planned paired actions"
        );

        let mut results = execute(
            source.resource,
            source.transport,
            vec![source_action],
            self.mode,
        )
        .await;
        results.extend(
            execute(
                destination.resource,
                destination.transport,
                vec![destination_action],
                self.mode,
            )
            .await,
        );

        let outcome = Outcome::from_results(&results);
        report(&outcome);
        outcome
    }
}

fn report(outcome: &Outcome) {
    match &outcome.error_message {
        Some(msg) => warn!(changed = outcome.changed, error = %msg, "Reconciliation failed"),
        None => info!(changed = outcome.changed, "Reconciliation complete"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{desired, MemoryResource, MemoryStore};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_present_is_idempotent() {
        let engine = Reconciler::default();
        let mut store = MemoryStore::new("svm1");
        let state = desired("ops", Operation::Present);

        let first = engine.reconcile(&MemoryResource, &mut store, &state).await;
        assert_eq!(first, Outcome { changed: true, error_message: None });

        let second = engine.reconcile(&MemoryResource, &mut store, &state).await;
        assert_eq!(second, Outcome::default());
        assert_eq!(store.roles.get("ops").map(String::as_str), Some("all"));
    }

    #[tokio::test]
    async fn test_absent_is_idempotent() {
        let engine = Reconciler::default();
        let mut store = MemoryStore::new("svm1").with_role("ops", "readonly");
        let state = desired("ops", Operation::Absent);

        assert!(engine.reconcile(&MemoryResource, &mut store, &state).await.changed);
        assert!(!engine.reconcile(&MemoryResource, &mut store, &state).await.changed);
        assert!(store.roles.is_empty());
    }

    #[tokio::test]
    async fn test_drift_not_corrected() {
        let engine = Reconciler::default();
        let mut store = MemoryStore::new("svm1").with_role("ops", "readonly");
        let outcome = engine
            .reconcile(&MemoryResource, &mut store, &desired("ops", Operation::Present))
            .await;
        assert!(!outcome.changed);
        assert_eq!(store.roles.get("ops").map(String::as_str), Some("readonly"));
    }

    #[tokio::test]
    async fn test_fetch_failure_reported() {
        let engine = Reconciler::default();
        let mut store = MemoryStore::new("svm1");
        store.fail_reads = true;
        let outcome = engine
            .reconcile(&MemoryResource, &mut store, &desired("ops", Operation::Present))
            .await;
        assert!(!outcome.changed);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("Transport failure on svm1: read timed out")
        );
        assert_eq!(store.calls, 1);
    }

    #[tokio::test]
    async fn test_check_mode_reports_without_mutating() {
        let engine = Reconciler::new(ExecutionMode::Check);
        let mut store = MemoryStore::new("svm1");
        let outcome = engine
            .reconcile(&MemoryResource, &mut store, &desired("ops", Operation::Present))
            .await;
        assert!(outcome.changed);
        assert!(store.roles.is_empty());
        assert_eq!(store.calls, 1);
    }

    #[tokio::test]
    async fn test_paired_creates_when_both_missing() {
        let engine = Reconciler::default();
        let mut east = MemoryStore::new("east");
        let mut west = MemoryStore::new("west");
        let outcome = engine
            .reconcile_paired(
                Endpoint::new(&MemoryResource, &mut east),
                Endpoint::new(&MemoryResource, &mut west),
                &desired("ops", Operation::Present),
            )
            .await;
        assert!(outcome.changed);
        assert!(east.roles.contains_key("ops"));
        assert!(west.roles.contains_key("ops"));
    }

    #[tokio::test]
    async fn test_paired_asymmetry_left_alone() {
        let engine = Reconciler::default();
        let mut east = MemoryStore::new("east");
        let mut west = MemoryStore::new("west").with_role("ops", "all");
        let outcome = engine
            .reconcile_paired(
                Endpoint::new(&MemoryResource, &mut east),
                Endpoint::new(&MemoryResource, &mut west),
                &desired("ops", Operation::Present),
            )
            .await;
        assert_eq!(outcome, Outcome::default());
        assert!(east.roles.is_empty());
        // One fetch per side, no writes.
        assert_eq!(east.calls + west.calls, 2);
    }

    #[tokio::test]
    async fn test_paired_partial_failure_attempts_both_sides() {
        let engine = Reconciler::default();
        let mut east = MemoryStore::new("east").with_role("ops", "all");
        let mut west = MemoryStore::new("west").with_role("ops", "all");
        east.fail_writes = true;
        let outcome = engine
            .reconcile_paired(
                Endpoint::new(&MemoryResource, &mut east),
                Endpoint::new(&MemoryResource, &mut west),
                &desired("ops", Operation::Absent),
            )
            .await;
        assert!(outcome.changed);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("Transport failure on east: write rejected")
        );
        assert!(west.roles.is_empty());
        assert!(east.roles.contains_key("ops"));
    }
}
