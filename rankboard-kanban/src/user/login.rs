//! LoginUser command

use super::credentials::verify_password;
use super::session_response;
use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Exchange a username and password for a session token
#[operation(verb = "login", noun = "user", description = "Log in and receive a session token")]
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginUser {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl LoginUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        // Unknown user and wrong password are indistinguishable to the caller
        let user = ctx
            .ledger()
            .find_user_by_username(self.username.trim())?
            .ok_or(KanbanError::InvalidCredentials)?;
        verify_password(self.password.trim(), &user.password_hash)?;
        session_response(ctx, &user)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for LoginUser {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::SignupUser;

    #[tokio::test]
    async fn test_login() {
        let ctx = KanbanContext::in_memory().unwrap();
        SignupUser::new("alice_smith", "correct horse")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        let ok = LoginUser::new("alice_smith", "correct horse")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert!(ok["token"].is_string());

        for (username, password) in [("alice_smith", "wrong pass"), ("nobody_here", "correct horse")] {
            let err = LoginUser::new(username, password)
                .execute(&ctx)
                .await
                .into_result()
                .unwrap_err();
            assert!(matches!(err, KanbanError::InvalidCredentials));
        }
    }
}
