//! Operation and Execute traits

use crate::ExecutionResult;
use async_trait::async_trait;
use serde_json::Value;

/// Metadata every operation carries: what it does and to what
///
/// Normally implemented through `#[operation(verb = ..., noun = ..., description = ...)]`.
pub trait Operation {
    /// The action, e.g. "move"
    fn verb(&self) -> &'static str;

    /// The thing acted upon, e.g. "task"
    fn noun(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Canonical "verb noun" string used in activity logs
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Execute an operation against a context
#[async_trait]
pub trait Execute<C, E>: Send + Sync
where
    C: Send + Sync,
{
    /// Run the operation
    async fn execute(&self, ctx: &C) -> ExecutionResult<Value, E>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation;

    #[operation(verb = "move", noun = "task", description = "Move a task")]
    struct MoveTask;

    #[operation(verb = "list", noun = "boards", description = "List boards")]
    struct ListBoards {
        #[allow(dead_code)]
        limit: usize,
    }

    struct Counter;

    #[async_trait]
    impl Execute<Counter, String> for MoveTask {
        async fn execute(&self, _ctx: &Counter) -> ExecutionResult<Value, String> {
            ExecutionResult::Unlogged {
                value: Value::from(self.op_string()),
            }
        }
    }

    #[test]
    fn test_macro_generates_metadata() {
        let op = MoveTask;
        assert_eq!(op.verb(), "move");
        assert_eq!(op.noun(), "task");
        assert_eq!(op.description(), "Move a task");
        assert_eq!(op.op_string(), "move task");

        let op = ListBoards { limit: 3 };
        assert_eq!(op.op_string(), "list boards");
    }

    #[tokio::test]
    async fn test_execute_dispatch() {
        let value = MoveTask.execute(&Counter).await.into_result().unwrap();
        assert_eq!(value, "move task");
    }
}
