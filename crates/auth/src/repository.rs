use super::*;
use std::sync::Arc;
use till_core::ID;
use till_core::Unique;
use till_database::*;
use tokio_postgres::Client;
use tokio_postgres::Row;
use tokio_postgres::error::SqlState;

const COLUMNS: &str = "id, name, email, hashword, role, active, created_at, updated_at";

fn hydrate(row: &Row) -> Result<Account, StoreError> {
    let role = row
        .get::<_, String>(4)
        .parse::<Role>()
        .map_err(StoreError::Unavailable)?;
    let member = Member::restore(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        row.get(1),
        row.get(2),
        role,
        row.get(5),
        row.get(6),
        row.get(7),
    );
    Ok(Account::new(member, row.get(3)))
}

fn unavailable(e: PgErr) -> StoreError {
    log::error!("users query failed: {}", e);
    StoreError::Unavailable(e.to_string())
}

#[async_trait::async_trait]
impl Directory for Arc<Client> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.query_opt(
            const_format::concatcp!("SELECT ", COLUMNS, " FROM ", USERS, " WHERE email = $1"),
            &[&normalize(email)],
        )
        .await
        .map_err(unavailable)?
        .as_ref()
        .map(hydrate)
        .transpose()
    }

    async fn find_by_id(&self, id: ID<Member>) -> Result<Option<Account>, StoreError> {
        self.query_opt(
            const_format::concatcp!("SELECT ", COLUMNS, " FROM ", USERS, " WHERE id = $1"),
            &[&id.inner()],
        )
        .await
        .map_err(unavailable)?
        .as_ref()
        .map(hydrate)
        .transpose()
    }

    async fn save(&self, account: Account) -> Result<Account, StoreError> {
        let member = account.member();
        let email = normalize(member.email());
        self.query_one(
            const_format::concatcp!(
                "INSERT INTO ",
                USERS,
                " (id, name, email, hashword, role, active, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, now())
                 ON CONFLICT (id) DO UPDATE SET
                    name       = EXCLUDED.name,
                    email      = EXCLUDED.email,
                    hashword   = EXCLUDED.hashword,
                    role       = EXCLUDED.role,
                    active     = EXCLUDED.active,
                    updated_at = now()
                 RETURNING ",
                COLUMNS
            ),
            &[
                &account.id().inner(),
                &member.name(),
                &email,
                &account.hashword(),
                &member.role().as_str(),
                &member.active(),
                &member.created(),
            ],
        )
        .await
        .map_err(|e| match e.code() {
            Some(code) if *code == SqlState::UNIQUE_VIOLATION => StoreError::Duplicate(email.clone()),
            _ => unavailable(e),
        })
        .and_then(|ref row| hydrate(row))
    }

    async fn list(&self) -> Result<Vec<Member>, StoreError> {
        self.query(
            const_format::concatcp!("SELECT ", COLUMNS, " FROM ", USERS, " ORDER BY created_at, id"),
            &[],
        )
        .await
        .map_err(unavailable)?
        .iter()
        .map(hydrate)
        .map(|account| account.map(Account::into_member))
        .collect()
    }
}
