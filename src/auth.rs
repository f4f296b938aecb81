//! Admin gate: exchanges the shared admin secret for an [`AuthorizedContext`].
//!
//! Every mutating engine operation takes `&AuthorizedContext`; reads do not.

use crate::error::TournamentError;
use chrono::{DateTime, Utc};

/// Proof that the caller presented the admin secret. Only [`AdminGate`] can create one.
#[derive(Clone, Debug)]
pub struct AuthorizedContext {
    granted_at: DateTime<Utc>,
}

impl AuthorizedContext {
    pub fn granted_at(&self) -> DateTime<Utc> {
        self.granted_at
    }
}

#[derive(Clone, Debug)]
pub struct AdminGate {
    /// `None` locks every mutation.
    secret: Option<String>,
}

impl AdminGate {
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        Self {
            secret: (!secret.is_empty()).then_some(secret),
        }
    }

    /// A gate that refuses everyone.
    pub fn locked() -> Self {
        Self { secret: None }
    }

    pub fn is_locked(&self) -> bool {
        self.secret.is_none()
    }

    pub fn authorize(&self, presented: &str) -> Result<AuthorizedContext, TournamentError> {
        match &self.secret {
            Some(secret) if constant_time_eq(secret.as_bytes(), presented.as_bytes()) => {
                Ok(AuthorizedContext {
                    granted_at: Utc::now(),
                })
            }
            _ => Err(TournamentError::Unauthorized),
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
