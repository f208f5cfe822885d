//! Action Executor.
//!
//! The only place in the engine that mutates remote state. Actions are
//! applied strictly in order; within one side the first failure aborts the
//! remaining actions.

use tracing::{debug, info, warn};

use crate::action::{Action, ActionKind};
use crate::planner::PlannedAction;
use crate::resource::Resource;

/// Whether mutating actions are applied or only reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Issue create/delete calls.
    #[default]
    Apply,
    /// Fetch and plan, but report create/delete as done without calling out.
    Check,
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// What was attempted.
    pub kind: ActionKind,
    /// Whether it succeeded.
    pub succeeded: bool,
    /// Failure detail, set only when `succeeded` is false.
    pub error_detail: Option<String>,
}

impl ExecutionResult {
    /// A successful result.
    pub fn ok(kind: ActionKind) -> Self {
        Self {
            kind,
            succeeded: true,
            error_detail: None,
        }
    }

    /// A failed result.
    pub fn failed(kind: ActionKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            succeeded: false,
            error_detail: Some(detail.into()),
        }
    }
}

/// Applies `actions` to one side through `transport`.
///
/// `Noop` and `Error` never touch the transport. The returned list is
/// shorter than `actions` when a failure aborted the rest.
pub async fn execute<R: Resource + ?Sized>(
    resource: &R,
    transport: &mut R::Transport,
    actions: Vec<PlannedAction<R>>,
    mode: ExecutionMode,
) -> Vec<ExecutionResult> {
    let total = actions.len();
    let mut results = Vec::with_capacity(total);

    for action in actions {
        let kind = action.kind();
        let result = match action {
            Action::Noop => ExecutionResult::ok(kind),
            Action::Error(e) => ExecutionResult::failed(kind, e.to_string()),
            Action::Create(_) | Action::Delete(_) if mode == ExecutionMode::Check => {
                info!(kind = resource.kind(), action = %kind, "Check mode, not applying");
                ExecutionResult::ok(kind)
            }
            Action::Create(payload) => {
                debug!(kind = resource.kind(), ?payload, "Creating");
                match resource.create(transport, &payload).await {
                    Ok(()) => ExecutionResult::ok(kind),
                    Err(e) => ExecutionResult::failed(kind, e.to_string()),
                }
            }
            Action::Delete(identity) => {
                debug!(kind = resource.kind(), ?identity, "Deleting");
                match resource.delete(transport, &identity).await {
                    Ok(()) => ExecutionResult::ok(kind),
                    Err(e) => ExecutionResult::failed(kind, e.to_string()),
                }
            }
        };

        let abort = !result.succeeded;
        results.push(result);
        if abort {
            warn!(
                kind = resource.kind(),
                action = %kind,
                skipped = total - results.len(),
                "Action failed, aborting remaining actions on this side"
            );
            break;
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconError;
    use crate::testing::{MemoryResource, MemoryStore};

    #[tokio::test]
    async fn test_create_and_delete_mutate() {
        let mut store = MemoryStore::new("svm1");
        let results = execute(
            &MemoryResource,
            &mut store,
            vec![Action::Create(("ops".to_string(), "all".to_string()))],
            ExecutionMode::Apply,
        )
        .await;
        assert_eq!(results, vec![ExecutionResult::ok(ActionKind::Create)]);
        assert!(store.roles.contains_key("ops"));

        let results = execute(
            &MemoryResource,
            &mut store,
            vec![Action::Delete("ops".to_string())],
            ExecutionMode::Apply,
        )
        .await;
        assert_eq!(results, vec![ExecutionResult::ok(ActionKind::Delete)]);
        assert!(store.roles.is_empty());
        assert_eq!(store.calls, 2);
    }

    #[tokio::test]
    async fn test_noop_and_error_skip_transport() {
        let mut store = MemoryStore::new("svm1");
        let results = execute(
            &MemoryResource,
            &mut store,
            vec![Action::Noop],
            ExecutionMode::Apply,
        )
        .await;
        assert_eq!(results, vec![ExecutionResult::ok(ActionKind::Noop)]);

        let results = execute(
            &MemoryResource,
            &mut store,
            vec![Action::Error(ReconError::missing_fields())],
            ExecutionMode::Apply,
        )
        .await;
        assert_eq!(
            results,
            vec![ExecutionResult::failed(
                ActionKind::Error,
                "missing-fields: missing required field combination"
            )]
        );
        assert_eq!(store.calls, 0);
    }

    #[tokio::test]
    async fn test_error_aborts_rest_of_side() {
        let mut store = MemoryStore::new("svm1");
        let results = execute(
            &MemoryResource,
            &mut store,
            vec![
                Action::Error(ReconError::missing_fields()),
                Action::Create(("ops".to_string(), "all".to_string())),
            ],
            ExecutionMode::Apply,
        )
        .await;
        assert_eq!(results.len(), 1);
        assert_eq!(store.calls, 0);
        assert!(store.roles.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_recorded() {
        let mut store = MemoryStore::new("svm1");
        store.fail_writes = true;
        let results = execute(
            &MemoryResource,
            &mut store,
            vec![
                Action::Create(("ops".to_string(), "all".to_string())),
                Action::Delete("ops".to_string()),
            ],
            ExecutionMode::Apply,
        )
        .await;
        assert_eq!(results.len(), 1);
        assert!(!results[0].succeeded);
        assert!(results[0]
            .error_detail
            .as_deref()
            .unwrap()
            .contains("write rejected"));
    }

    #[tokio::test]
    async fn test_check_mode_does_not_call_transport() {
        let mut store = MemoryStore::new("svm1");
        let results = execute(
            &MemoryResource,
            &mut store,
            vec![Action::Create(("ops".to_string(), "all".to_string()))],
            ExecutionMode::Check,
        )
        .await;
        assert_eq!(results, vec![ExecutionResult::ok(ActionKind::Create)]);
        assert_eq!(store.calls, 0);
        assert!(store.roles.is_empty());
    }
}
