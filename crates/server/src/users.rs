//! Administrative user management: registration, listing, profile
//! updates and logical deactivation. Mounted behind an admin-only guard.
use actix_web::HttpResponse;
use actix_web::web;
use till_auth::*;
use till_core::ID;

async fn lookup(directory: &dyn Directory, id: &str) -> Result<Account, Error> {
    let id = id.parse::<ID<Member>>().map_err(|_| Error::NotFound)?;
    directory.find_by_id(id).await?.ok_or(Error::NotFound)
}

pub async fn register(
    directory: web::Data<dyn Directory>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, Error> {
    let account = enroll(directory.get_ref(), req.into_inner()).await?;
    Ok(HttpResponse::Created().json(Envelope::ok(Notice {
        message: "user created".into(),
        user: Some(account.into_member()),
    })))
}

pub async fn list(directory: web::Data<dyn Directory>) -> Result<HttpResponse, Error> {
    let members = directory.list().await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(Roster::from(members))))
}

pub async fn fetch(
    directory: web::Data<dyn Directory>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let account = lookup(directory.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(Profile {
        user: account.into_member(),
    })))
}

/// Applies the fields present in the body. The password is re-hashed only
/// when a new one is supplied.
pub async fn update(
    directory: web::Data<dyn Directory>,
    path: web::Path<String>,
    req: web::Json<UpdateRequest>,
) -> Result<HttpResponse, Error> {
    let mut account = lookup(directory.get_ref(), &path).await?;
    let req = req.into_inner();
    if let Some(ref name) = req.name {
        validate_name(name)?;
        account.member_mut().rename(name);
    }
    if let Some(ref email) = req.email {
        validate_email(email)?;
        account.member_mut().relocate(email);
    }
    if let Some(role) = req.role {
        account.member_mut().assign(role);
    }
    if let Some(active) = req.active {
        account.member_mut().toggle(active);
    }
    if let Some(password) = req.password {
        validate_password(&password)?;
        account.rehash(password::hashed(password).await?);
    }
    let account = directory.save(account).await?;
    log::info!("updated user {}", account.member().email());
    Ok(HttpResponse::Ok().json(Envelope::ok(Notice {
        message: "user updated".into(),
        user: Some(account.into_member()),
    })))
}

/// Logical delete: the record stays, the account can no longer sign in or
/// pass the authentication gate.
pub async fn deactivate(
    directory: web::Data<dyn Directory>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let mut account = lookup(directory.get_ref(), &path).await?;
    account.member_mut().toggle(false);
    let account = directory.save(account).await?;
    log::info!("deactivated user {}", account.member().email());
    Ok(HttpResponse::Ok().json(Envelope::ok(Notice {
        message: "user deactivated".into(),
        user: None,
    })))
}
