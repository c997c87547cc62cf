use super::*;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use till_core::ID;

/// Opaque token failure. Tampering, a foreign secret, garbage input and
/// expiry are deliberately indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid token")]
pub struct InvalidToken;

/// Issues and verifies HS256 bearer tokens under a process-wide secret.
pub struct Crypto {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: std::time::Duration,
}

impl Crypto {
    pub fn new(secret: &[u8], ttl: std::time::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
    pub fn issue(&self, user: ID<Member>) -> Result<String, InvalidToken> {
        self.issue_at(user, till_core::now())
    }
    pub fn issue_at(&self, user: ID<Member>, now: i64) -> Result<String, InvalidToken> {
        let ref claims = Claims::new(user, now, self.ttl).ok_or(InvalidToken)?;
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .inspect_err(|e| log::error!("token signing failed: {}", e))
            .map_err(|_| InvalidToken)
    }
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        self.verify_at(token, till_core::now())
    }
    /// Signature first, expiry second.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, InvalidToken> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Self::validation())
            .map(|data| data.claims)
            .map_err(|_| InvalidToken)
            .and_then(|claims| match claims.expired_at(now) {
                true => Err(InvalidToken),
                false => Ok(claims),
            })
    }
    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);
        validation
    }
}
