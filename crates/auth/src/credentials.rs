use super::*;
use till_core::EMAIL_MAX_LENGTH;
use till_core::ID;
use till_core::NAME_MAX_LENGTH;
use till_core::PASSWORD_MIN_LENGTH;
use till_core::Unique;

pub fn validate_name(name: &str) -> Result<(), Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Invalid("name must not be blank".into()));
    }
    match name.chars().count() > NAME_MAX_LENGTH {
        true => Err(Error::Invalid(format!(
            "name must be at most {} characters",
            NAME_MAX_LENGTH
        ))),
        false => Ok(()),
    }
}

pub fn validate_email(email: &str) -> Result<(), Error> {
    let email = email.trim();
    if email.chars().count() > EMAIL_MAX_LENGTH {
        return Err(Error::Invalid(format!(
            "email must be at most {} characters",
            EMAIL_MAX_LENGTH
        )));
    }
    match plausible(email) {
        true => Ok(()),
        false => Err(Error::Invalid("email is not valid".into())),
    }
}

pub fn validate_password(password: &str) -> Result<(), Error> {
    match password.chars().count() < PASSWORD_MIN_LENGTH {
        true => Err(Error::Invalid(format!(
            "password must be at least {} characters",
            PASSWORD_MIN_LENGTH
        ))),
        false => Ok(()),
    }
}

/// Creates an account, hashing the password on the way in.
pub async fn enroll(directory: &dyn Directory, req: RegisterRequest) -> Result<Account, Error> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(Error::Invalid("name, email and password are required".into()));
    }
    validate_name(&req.name)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    let hashword = password::hashed(req.password).await?;
    let member = Member::new(ID::default(), req.name, req.email, req.role.unwrap_or_default());
    let account = directory.save(Account::new(member, hashword)).await?;
    log::info!("enrolled {} as {}", account.id(), account.member().role());
    Ok(account)
}

/// Exchanges email and password for a bearer token. Unknown email, wrong
/// password and a deactivated account all fail the same way.
pub async fn signin(
    directory: &dyn Directory,
    crypto: &Crypto,
    req: LoginRequest,
) -> Result<AuthResponse, Error> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(Error::Invalid("email and password are required".into()));
    }
    let account = match directory.find_by_email(&req.email).await? {
        Some(account) => account,
        None => {
            password::verified(req.password, password::decoy().await).await;
            return Err(Error::Credentials);
        }
    };
    if !password::verified(req.password, account.hashword().to_string()).await {
        return Err(Error::Credentials);
    }
    if !account.member().active() {
        return Err(Error::Credentials);
    }
    let token = crypto
        .issue(account.id())
        .map_err(|e| Error::Internal(e.to_string()))?;
    log::info!("signed in {}", account.id());
    Ok(AuthResponse {
        token,
        user: account.into_member(),
    })
}
