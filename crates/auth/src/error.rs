use super::*;

/// Why an authentication attempt was turned away. Only ever logged;
/// every reason produces the same response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    NoToken,
    InvalidToken,
    Inactive,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoToken => f.write_str("no token"),
            Self::InvalidToken => f.write_str("invalid token"),
            Self::Inactive => f.write_str("user not found or inactive"),
        }
    }
}

/// Failures surfaced by the auth core and the handlers built on it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unauthenticated: {0}")]
    Unauthenticated(Reason),
    #[error("invalid credentials")]
    Credentials,
    #[error("role '{0}' is not allowed to access this resource")]
    Forbidden(Role),
    #[error("{0}")]
    Invalid(String),
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal: {0}")]
    Internal(String),
}

impl From<InvalidToken> for Error {
    fn from(_: InvalidToken) -> Self {
        Self::Unauthenticated(Reason::InvalidToken)
    }
}

impl Error {
    /// The message a client gets to see.
    pub fn public(&self) -> String {
        match self {
            Self::Unauthenticated(_) => "not authorized".to_string(),
            Self::Store(StoreError::Duplicate(_)) => "email already registered".to_string(),
            Self::Store(StoreError::Unavailable(_)) | Self::Internal(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(feature = "server")]
mod response {
    use super::*;
    use actix_web::HttpResponse;
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;

    impl ResponseError for Error {
        fn status_code(&self) -> StatusCode {
            match self {
                Error::Unauthenticated(_) | Error::Credentials => StatusCode::UNAUTHORIZED,
                Error::Forbidden(_) => StatusCode::FORBIDDEN,
                Error::Invalid(_) => StatusCode::BAD_REQUEST,
                Error::NotFound => StatusCode::NOT_FOUND,
                Error::Store(StoreError::Duplicate(_)) => StatusCode::CONFLICT,
                Error::Store(StoreError::Unavailable(_)) | Error::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
        fn error_response(&self) -> HttpResponse {
            match self.status_code() {
                StatusCode::INTERNAL_SERVER_ERROR => log::error!("{}", self),
                _ => log::debug!("{}", self),
            }
            HttpResponse::build(self.status_code()).json(Envelope::fail(self.public()))
        }
    }
}
