use super::*;
use chrono::DateTime;
use chrono::Utc;
use till_core::ID;
use till_core::Unique;

/// Authenticated identity: the stored user record minus its password digest.
/// This is the only shape of a user that ever leaves the crate on the wire.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Member {
    id: ID<Self>,
    name: String,
    email: String,
    role: Role,
    active: bool,
    #[serde(rename = "created_at")]
    created: DateTime<Utc>,
    #[serde(rename = "updated_at")]
    updated: DateTime<Utc>,
}

impl Member {
    pub fn new(id: ID<Self>, name: String, email: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.trim().to_string(),
            email: normalize(&email),
            role,
            active: true,
            created: now,
            updated: now,
        }
    }
    /// Rebuilds a member from persisted fields, timestamps included.
    pub fn restore(
        id: ID<Self>,
        name: String,
        email: String,
        role: Role,
        active: bool,
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            role,
            active,
            created,
            updated,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn role(&self) -> Role {
        self.role
    }
    pub fn active(&self) -> bool {
        self.active
    }
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }
    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }
    pub fn rename(&mut self, name: &str) {
        self.name = name.trim().to_string();
    }
    pub fn relocate(&mut self, email: &str) {
        self.email = normalize(email);
    }
    pub fn assign(&mut self, role: Role) {
        self.role = role;
    }
    pub fn toggle(&mut self, active: bool) {
        self.active = active;
    }
    /// Store-side timestamp bookkeeping.
    pub fn stamp(&mut self, created: DateTime<Utc>, updated: DateTime<Utc>) {
        self.created = created;
        self.updated = updated;
    }
}

impl Unique for Member {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

/// Stored user record: a [`Member`] together with its password digest.
/// Deliberately not `Serialize`.
#[derive(Debug, Clone)]
pub struct Account {
    member: Member,
    hashword: String,
}

impl Account {
    pub fn new(member: Member, hashword: String) -> Self {
        Self { member, hashword }
    }
    pub fn member(&self) -> &Member {
        &self.member
    }
    pub fn member_mut(&mut self) -> &mut Member {
        &mut self.member
    }
    pub fn hashword(&self) -> &str {
        &self.hashword
    }
    pub fn rehash(&mut self, hashword: String) {
        self.hashword = hashword;
    }
    pub fn into_member(self) -> Member {
        self.member
    }
}

impl Unique<Member> for Account {
    fn id(&self) -> ID<Member> {
        self.member.id()
    }
}

/// Canonical form of an email address: trimmed and lowercased.
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

static EMAIL: std::sync::LazyLock<regex::Regex> =
    std::sync::LazyLock::new(|| regex::Regex::new(r"^\S+@\S+\.\S+$").expect("valid email pattern"));

/// Loose shape check: something, `@`, something, `.`, something.
pub fn plausible(email: &str) -> bool {
    EMAIL.is_match(email)
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use till_database::*;

    /// Schema implementation for Member (users table).
    /// Note: hashword is a database-only field, carried by Account.
    impl Schema for Member {
        fn name() -> &'static str {
            USERS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                USERS,
                " (
                    id          UUID PRIMARY KEY,
                    name        VARCHAR(128) NOT NULL,
                    email       VARCHAR(255) UNIQUE NOT NULL,
                    hashword    TEXT NOT NULL,
                    role        VARCHAR(16) NOT NULL DEFAULT 'seller'
                                CHECK (role IN ('admin', 'seller')),
                    active      BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_users_email ON ",
                USERS,
                " (email);
                 CREATE INDEX IF NOT EXISTS idx_users_active ON ",
                USERS,
                " (active);"
            )
        }
    }
}
