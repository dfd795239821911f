//! KanbanOperationProcessor - runs commands and records what they did

use crate::context::KanbanContext;
use crate::error::KanbanError;
use rankboard_operations::{
    async_trait, Execute, ExecutionResult, LogEntry, Operation, OperationProcessor,
};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::warn;

/// Processor that writes log entries from mutating commands to the activity log
#[derive(Debug, Clone, Default)]
pub struct KanbanOperationProcessor {
    actor: Option<String>,
}

impl KanbanOperationProcessor {
    /// Create a processor with no actor attribution
    pub fn new() -> Self {
        Self { actor: None }
    }

    /// Create a processor that attributes every entry to `actor`
    pub fn with_actor(actor: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
        }
    }
}

#[async_trait]
impl OperationProcessor<KanbanContext, KanbanError> for KanbanOperationProcessor {
    async fn process<O>(&self, operation: &O, ctx: &KanbanContext) -> Result<Value, KanbanError>
    where
        O: Execute<KanbanContext, KanbanError> + Operation + Send + Sync,
    {
        let (result, log_entry) = operation.execute(ctx).await.split();

        if let Some(mut entry) = log_entry {
            entry.attribute_to(self.actor.as_deref());
            // The command already took effect; a lost log line must not undo it
            if let Err(e) = ctx.append_activity(&entry).await {
                warn!(op = %entry.op, error = %e, "failed to record activity");
            }
        }

        result
    }
}

/// Wrap the outcome of a mutating command
///
/// Successes become `Logged` with the command's serialized input and the result as output.
/// Failures are returned without a log entry.
pub(crate) fn logged<O>(
    operation: &O,
    started: Instant,
    result: crate::error::Result<Value>,
) -> ExecutionResult<Value, KanbanError>
where
    O: Operation + Serialize,
{
    match result {
        Ok(value) => {
            let input = serde_json::to_value(operation).unwrap_or(Value::Null);
            let log_entry = LogEntry::record(operation.op_string(), input, value.clone(), started);
            ExecutionResult::Logged { value, log_entry }
        }
        Err(error) => ExecutionResult::Failed {
            error,
            log_entry: None,
        },
    }
}
