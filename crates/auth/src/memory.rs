use super::*;
use std::collections::HashMap;
use till_core::ID;
use till_core::Unique;
use tokio::sync::RwLock;

/// In-process [`Directory`] for tests and database-less deployments.
#[derive(Debug, Default)]
pub struct Memory {
    accounts: RwLock<HashMap<ID<Member>, Account>>,
}

#[async_trait::async_trait]
impl Directory for Memory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let email = normalize(email);
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.member().email() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: ID<Member>) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn save(&self, mut account: Account) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;
        let id = account.id();
        let email = normalize(account.member().email());
        if accounts
            .values()
            .any(|a| a.id() != id && a.member().email() == email)
        {
            return Err(StoreError::Duplicate(email));
        }
        let now = chrono::Utc::now();
        let created = accounts
            .get(&id)
            .map(|a| a.member().created())
            .unwrap_or(account.member().created());
        account.member_mut().relocate(&email);
        account.member_mut().stamp(created, now);
        accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn list(&self) -> Result<Vec<Member>, StoreError> {
        let mut members = self
            .accounts
            .read()
            .await
            .values()
            .map(|a| a.member().clone())
            .collect::<Vec<_>>();
        members.sort_by_key(|m| (m.created(), m.id()));
        Ok(members)
    }
}
