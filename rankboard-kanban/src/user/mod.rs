//! Account commands

pub mod credentials;
mod login;
mod signup;
mod verify;

pub use login::LoginUser;
pub use signup::SignupUser;
pub use verify::VerifyToken;

use crate::context::KanbanContext;
use crate::error::Result;
use crate::types::User;
use serde_json::{json, Value};

/// Shortest accepted username and password
pub const MIN_CREDENTIAL_LENGTH: usize = 8;

/// Issue a session for `user` and build the `{user, token}` response
fn session_response(ctx: &KanbanContext, user: &User) -> Result<Value> {
    let session = ctx
        .ledger()
        .create_session(&user.id, ctx.settings().session_ttl)?;
    Ok(json!({
        "user": user,
        "token": session.token,
        "expiresAt": session.expires_at,
    }))
}
