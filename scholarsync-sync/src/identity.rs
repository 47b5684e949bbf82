//! Identity provider collaborator.
//!
//! The provider is a black box that produces the current user record and
//! accepts login/logout requests. The session only ever looks at `id`, which
//! keys the user's remote document.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            avatar: None,
        }
    }
}

pub trait IdentityProvider {
    fn current(&self) -> Option<Identity>;

    /// Fire-and-forget signals; the outcome shows up as a `current()` change,
    /// which the embedder feeds to `PlannerSession::sync_identity`.
    fn request_login(&mut self);
    fn request_logout(&mut self);
}
