use super::*;
use actix_web::FromRequest;
use actix_web::HttpMessage;
use actix_web::HttpRequest;
use actix_web::ResponseError;
use actix_web::body::EitherBody;
use actix_web::dev::Payload;
use actix_web::dev::Service;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::dev::Transform;
use actix_web::dev::forward_ready;
use actix_web::http::header::AUTHORIZATION;
use actix_web::http::header::HeaderMap;
use actix_web::web;
use futures::future::LocalBoxFuture;
use std::future::Ready;
use std::future::ready;
use std::rc::Rc;
use till_core::BEARER;

/// Token from an `Authorization: Bearer <token>` header, if well formed.
pub fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER))
        .filter(|token| !token.is_empty())
}

/// The authentication gate. Resolves the bearer token to a live, active
/// member with exactly one directory lookup.
pub async fn authenticate(
    headers: &HeaderMap,
    crypto: &Crypto,
    directory: &dyn Directory,
) -> Result<Member, Error> {
    let token = bearer(headers).ok_or(Error::Unauthenticated(Reason::NoToken))?;
    let claims = crypto.verify(token)?;
    directory
        .find_by_id(claims.user())
        .await?
        .map(Account::into_member)
        .filter(Member::active)
        .ok_or(Error::Unauthenticated(Reason::Inactive))
}

fn services(req: &HttpRequest) -> Result<(web::Data<Crypto>, web::Data<dyn Directory>), Error> {
    let crypto = req
        .app_data::<web::Data<Crypto>>()
        .cloned()
        .ok_or_else(|| Error::Internal("token service not configured".into()))?;
    let directory = req
        .app_data::<web::Data<dyn Directory>>()
        .cloned()
        .ok_or_else(|| Error::Internal("directory not configured".into()))?;
    Ok((crypto, directory))
}

/// Extractor for authenticated requests.
/// Reuses the member a [`Guard`] already resolved for this request,
/// otherwise runs the authentication gate itself.
#[derive(Debug)]
pub struct Auth(pub Member);

impl Auth {
    pub fn into_inner(self) -> Member {
        self.0
    }
}

impl FromRequest for Auth {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(member) = req.extensions().get::<Member>().cloned() {
            return Box::pin(ready(Ok(Auth(member))));
        }
        let req = req.clone();
        Box::pin(async move {
            let (crypto, directory) = services(&req)?;
            authenticate(req.headers(), &crypto, directory.get_ref())
                .await
                .inspect_err(|e| log::debug!("{} {}: {}", req.method(), req.path(), e))
                .map(Auth)
                .map_err(actix_web::Error::from)
        })
    }
}

/// Gate middleware for a route group: authentication, then the role check.
/// Authorization cannot be wired without authentication in front of it.
/// Admitted members are placed in the request extensions for [`Auth`].
#[derive(Debug, Clone)]
pub struct Guard {
    roles: Rc<Roles>,
}

impl Guard {
    pub fn allow(roles: &[Role]) -> Self {
        Self {
            roles: Rc::new(Roles::new(roles)),
        }
    }
    /// Any authenticated member.
    pub fn authenticated() -> Self {
        Self {
            roles: Rc::new(Roles::any()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Guard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Transform = Gate<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(Gate {
            service: Rc::new(service),
            roles: self.roles.clone(),
        }))
    }
}

/// Service produced by [`Guard`].
pub struct Gate<S> {
    service: Rc<S>,
    roles: Rc<Roles>,
}

impl<S> Gate<S> {
    async fn admit(req: &ServiceRequest, roles: &Roles) -> Result<Member, Error> {
        let (crypto, directory) = services(req.request())?;
        let member = authenticate(req.headers(), &crypto, directory.get_ref()).await?;
        roles.permits(&member)?;
        Ok(member)
    }
}

impl<S, B> Service<ServiceRequest> for Gate<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let roles = self.roles.clone();
        Box::pin(async move {
            match Self::admit(&req, &roles).await {
                Ok(member) => {
                    req.extensions_mut().insert(member);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(e) => {
                    log::debug!("{} {}: {}", req.method(), req.path(), e);
                    let response = e.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
