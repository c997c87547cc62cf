use super::*;
use till_core::ID;

/// Token payload. Carries identity and validity window only; the role is
/// resolved from the directory on every request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// `None` when the expiry does not fit the claim's integer range.
    pub fn new(user: ID<Member>, now: i64, ttl: std::time::Duration) -> Option<Self> {
        i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .map(|exp| Self {
                sub: user.inner(),
                iat: now,
                exp,
            })
    }
    pub fn expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
    pub fn user(&self) -> ID<Member> {
        ID::from(self.sub)
    }
}
