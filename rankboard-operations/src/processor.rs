//! Operation processor trait

use crate::{Execute, Operation};
use async_trait::async_trait;
use serde_json::Value;

/// Runs operations against a context and takes care of what happens around them
///
/// Implementations decide where log entries go (activity log, per-entity log, nowhere)
/// and which actor they are attributed to.
#[async_trait]
pub trait OperationProcessor<C, E>: Send + Sync
where
    C: Send + Sync,
{
    /// Execute the operation, record its log entry if it produced one, and return the value
    async fn process<O>(&self, operation: &O, ctx: &C) -> Result<Value, E>
    where
        O: Execute<C, E> + Operation + Send + Sync;
}
