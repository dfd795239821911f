//! SignupUser command

use super::credentials::hash_password;
use super::{session_response, MIN_CREDENTIAL_LENGTH};
use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Register a new user and open a session
#[operation(verb = "signup", noun = "user", description = "Register a new user")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupUser {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

impl SignupUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            confirm_password: password.clone(),
            password,
        }
    }

    /// Override the confirmation, e.g. to exercise the mismatch check
    pub fn with_confirmation(mut self, confirm_password: impl Into<String>) -> Self {
        self.confirm_password = confirm_password.into();
        self
    }

    fn validate(&self) -> Result<(&str, &str)> {
        let username = self.username.trim();
        let password = self.password.trim();
        if username.chars().count() < MIN_CREDENTIAL_LENGTH {
            return Err(KanbanError::invalid_value(
                "username",
                format!("must be at least {MIN_CREDENTIAL_LENGTH} characters"),
            ));
        }
        if password.chars().count() < MIN_CREDENTIAL_LENGTH {
            return Err(KanbanError::invalid_value(
                "password",
                format!("must be at least {MIN_CREDENTIAL_LENGTH} characters"),
            ));
        }
        if password != self.confirm_password.trim() {
            return Err(KanbanError::invalid_value(
                "confirmPassword",
                "does not match password",
            ));
        }
        Ok((username, password))
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        let (username, password) = self.validate()?;
        let hash = hash_password(password)?;
        let user = ctx.ledger().create_user(username, &hash)?;
        session_response(ctx, &user)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for SignupUser {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signup_returns_token() {
        let ctx = KanbanContext::in_memory().unwrap();
        let result = SignupUser::new("alice_smith", "correct horse")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["user"]["username"], "alice_smith");
        assert!(result["user"].get("passwordHash").is_none());
        let token = result["token"].as_str().unwrap();
        assert!(ctx.authenticate(token).await.is_ok());
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let ctx = KanbanContext::in_memory().unwrap();

        let short = SignupUser::new("bob", "correct horse").execute(&ctx).await;
        assert!(matches!(
            short.into_result(),
            Err(KanbanError::InvalidValue { .. })
        ));

        let mismatch = SignupUser::new("alice_smith", "correct horse")
            .with_confirmation("battery staple")
            .execute(&ctx)
            .await;
        assert!(matches!(
            mismatch.into_result(),
            Err(KanbanError::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let ctx = KanbanContext::in_memory().unwrap();
        let op = SignupUser::new("alice_smith", "correct horse");
        op.execute(&ctx).await.into_result().unwrap();
        let again = op.execute(&ctx).await.into_result();
        assert!(matches!(again, Err(KanbanError::DuplicateId { .. })));
    }

    #[test]
    fn test_password_not_logged() {
        let op = SignupUser::new("alice_smith", "correct horse");
        let json = serde_json::to_string(&op).unwrap();
        assert!(!json.contains("horse"));
    }
}
