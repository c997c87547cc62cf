use super::*;
use actix_web::HttpResponse;
use actix_web::web;

pub async fn login(
    directory: web::Data<dyn Directory>,
    crypto: web::Data<Crypto>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, Error> {
    signin(directory.get_ref(), &crypto, req.into_inner())
        .await
        .map(|response| HttpResponse::Ok().json(Envelope::ok(response)))
}

pub async fn me(auth: Auth) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::ok(Profile {
        user: auth.into_inner(),
    }))
}
