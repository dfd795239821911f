//! VerifyToken command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Resolve a session token to its user
#[operation(verb = "verify", noun = "token", description = "Check a session token")]
#[derive(Debug, Deserialize, Serialize)]
pub struct VerifyToken {
    #[serde(skip_serializing)]
    pub token: String,
}

impl VerifyToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        let user_id = ctx.authenticate(&self.token).await?;
        let user = ctx.ledger().get_user(&user_id)?;
        Ok(json!({ "user": user }))
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for VerifyToken {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        ExecutionResult::unlogged(self.apply(ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let ctx = KanbanContext::in_memory().unwrap();
        let err = VerifyToken::new("bogus")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap_err();
        assert!(matches!(err, KanbanError::Unauthorized));
    }
}
