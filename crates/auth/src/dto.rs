use super::*;
use serde::Deserialize;
use serde::Serialize;

/// Wire envelope shared by every response: `success` plus either a
/// flattened payload or a human-readable message.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn ok(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

impl Envelope<Message> {
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            body: Message {
                message: message.into(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Member,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub user: Member,
}

#[derive(Debug, Serialize)]
pub struct Notice {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Member>,
}

#[derive(Debug, Serialize)]
pub struct Roster {
    pub count: usize,
    pub users: Vec<Member>,
}

impl From<Vec<Member>> for Roster {
    fn from(users: Vec<Member>) -> Self {
        Self {
            count: users.len(),
            users,
        }
    }
}
