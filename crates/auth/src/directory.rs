use super::*;
use till_core::ID;

/// Failures of the credential store. Never retried here.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email {0} is already registered")]
    Duplicate(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Credential store the auth core reads and writes accounts through.
/// Abstracts the backing store from the gates and handlers.
#[async_trait::async_trait]
pub trait Directory: Send + Sync {
    /// Case-insensitive lookup by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn find_by_id(&self, id: ID<Member>) -> Result<Option<Account>, StoreError>;
    /// Creates or replaces the account with the same id. Rejects an email
    /// held by another account, keeps `created` of an existing account and
    /// stamps `updated` with the current time.
    async fn save(&self, account: Account) -> Result<Account, StoreError>;
    /// Every member, oldest first.
    async fn list(&self) -> Result<Vec<Member>, StoreError>;
}
