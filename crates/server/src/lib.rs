//! Backend Server
//!
//! Wires the authentication core into an actix-web server: login and
//! "who am I" routes, admin-only user management, and a health check.
//!
//! ## Submodules
//!
//! - [`config`] — Flags and environment
//! - [`users`] — Administrative user management handlers

pub mod config;
pub mod users;

pub use config::Config;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;
use till_auth::*;
use till_core::ID;

async fn health(directory: web::Data<dyn Directory>) -> HttpResponse {
    match directory
        .find_by_id(ID::default())
        .await
        .inspect_err(|e| log::error!("health check failed: {}", e))
    {
        Ok(_) => HttpResponse::Ok().json(Envelope::ok(serde_json::json!({ "status": "ok" }))),
        Err(_) => HttpResponse::ServiceUnavailable().json(Envelope::fail("store unavailable")),
    }
}

async fn missing() -> HttpResponse {
    HttpResponse::NotFound().json(Envelope::fail("route not found"))
}

/// Malformed JSON bodies get the same envelope as every other failure.
pub fn json() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|e, _| Error::Invalid(format!("malformed request body: {}", e)).into())
}

/// Route table. Expects `web::Data<Crypto>` and `web::Data<dyn Directory>`
/// to be registered as app data.
#[rustfmt::skip]
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(health))
        .service(
            web::scope("/api/auth")
                .route("/login", web::post().to(till_auth::login))
                .service(
                    web::resource("/me")
                        .wrap(Guard::authenticated())
                        .route(web::get().to(till_auth::me)),
                ),
        )
        .service(
            web::scope("/api/users")
                .wrap(Guard::allow(&[Role::Admin]))
                .route("/register", web::post().to(users::register))
                .route("", web::get().to(users::list))
                .route("/{id}", web::get().to(users::fetch))
                .route("/{id}", web::put().to(users::update))
                .route("/{id}", web::delete().to(users::deactivate)),
        );
}

/// Picks the credential store: PostgreSQL when a URL is configured,
/// otherwise an in-memory directory.
pub async fn directory(config: &Config) -> anyhow::Result<Arc<dyn Directory>> {
    match config.database.as_deref() {
        Some(url) => {
            let client = till_database::db(url).await?;
            till_database::migrate::<Member>(&client).await?;
            Ok(Arc::new(client))
        }
        None => {
            log::warn!("DB_URL not set, accounts are kept in memory only");
            Ok(Arc::new(Memory::default()))
        }
    }
}

/// Creates the configured administrator unless the email is already taken.
pub async fn bootstrap(directory: &dyn Directory, config: &Config) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };
    if directory.find_by_email(email).await?.is_some() {
        log::info!("administrator {} already present", email);
        return Ok(());
    }
    let req = RegisterRequest {
        name: config.admin_name.clone(),
        email: email.clone(),
        password: password.clone(),
        role: Some(Role::Admin),
    };
    enroll(directory, req).await?;
    Ok(())
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate()?;
    let directory = directory(&config).await?;
    bootstrap(directory.as_ref(), &config).await?;
    password::decoy().await;
    let crypto = web::Data::new(Crypto::new(config.secret.as_bytes(), config.ttl));
    let directory = web::Data::from(directory);
    log::info!("starting server on {}", config.bind);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(crypto.clone())
            .app_data(directory.clone())
            .app_data(json())
            .configure(routes)
            .default_service(web::to(missing))
    })
    .workers(config.workers)
    .bind(&config.bind)?
    .run()
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test;
    use clap::Parser;
    use serde_json::Value;
    use serde_json::json;
    use till_core::Unique;

    fn config() -> Config {
        Config::try_parse_from([
            "till",
            "--secret",
            "test-secret",
            "--admin-name",
            "Root",
            "--admin-email",
            "root@x.com",
            "--admin-password",
            "rootpass",
        ])
        .unwrap()
    }

    async fn seeded() -> Arc<dyn Directory> {
        let directory: Arc<dyn Directory> = Arc::new(Memory::default());
        bootstrap(directory.as_ref(), &config()).await.unwrap();
        directory
    }

    macro_rules! app {
        ($directory:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(Crypto::new(b"test-secret", till_core::TOKEN_DURATION)))
                    .app_data(web::Data::from($directory.clone()))
                    .app_data(json())
                    .configure(routes)
                    .default_service(web::to(missing)),
            )
            .await
        };
    }

    macro_rules! login {
        ($app:expr, $email:expr, $password:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({ "email": $email, "password": $password }))
                .to_request();
            let res = test::call_service(&$app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
            let body: Value = test::read_body_json(res).await;
            body["token"].as_str().unwrap().to_string()
        }};
    }

    fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
        (AUTHORIZATION, format!("Bearer {}", token))
    }

    fn has_no_secret(user: &Value) -> bool {
        user.get("hashword").is_none() && user.get("password").is_none()
    }

    #[actix_web::test]
    async fn register_login_and_list_as_admin() {
        let directory = seeded().await;
        let app = app!(directory);
        let root = login!(app, "root@x.com", "rootpass");
        let req = test::TestRequest::post()
            .uri("/api/users/register")
            .insert_header(bearer(&root))
            .set_json(json!({ "name": "A", "email": "a@x.com", "password": "secret1", "role": "admin" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["role"], "admin");
        assert!(has_no_secret(&body["user"]));

        let token = login!(app, "a@x.com", "secret1");
        let req = test::TestRequest::get()
            .uri("/api/users")
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 2);
        let users = body["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(has_no_secret));
        assert!(users.iter().any(|u| u["email"] == "a@x.com"));
    }

    #[actix_web::test]
    async fn login_failures_are_generic() {
        let directory = seeded().await;
        let app = app!(directory);
        let mut bodies = Vec::new();
        for (email, password) in [("root@x.com", "wrongpass"), ("nobody@x.com", "rootpass")] {
            let req = test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({ "email": email, "password": password }))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            bodies.push(test::read_body_json::<Value, _>(res).await);
        }
        assert_eq!(bodies[0], bodies[1]);
        assert_eq!(bodies[0], json!({ "success": false, "message": "invalid credentials" }));
    }

    #[actix_web::test]
    async fn login_response_carries_summary() {
        let directory = seeded().await;
        let app = app!(directory);
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ROOT@x.com", "password": "rootpass" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["email"], "root@x.com");
        assert!(has_no_secret(&body["user"]));
    }

    #[actix_web::test]
    async fn me_requires_token() {
        let directory = seeded().await;
        let app = app!(directory);
        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
        let token = login!(app, "root@x.com", "rootpass");
        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["name"], "Root");
        assert!(has_no_secret(&body["user"]));
    }

    #[actix_web::test]
    async fn sellers_cannot_manage_users() {
        let directory = seeded().await;
        let app = app!(directory);
        let root = login!(app, "root@x.com", "rootpass");
        let req = test::TestRequest::post()
            .uri("/api/users/register")
            .insert_header(bearer(&root))
            .set_json(json!({ "name": "S", "email": "s@x.com", "password": "secret1" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["role"], "seller");
        let token = login!(app, "s@x.com", "secret1");
        let req = test::TestRequest::get()
            .uri("/api/users")
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body["message"],
            "role 'seller' is not allowed to access this resource"
        );
    }

    #[actix_web::test]
    async fn deactivation_locks_out_outstanding_tokens() {
        let directory = seeded().await;
        let app = app!(directory);
        let root = login!(app, "root@x.com", "rootpass");
        let req = test::TestRequest::post()
            .uri("/api/users/register")
            .insert_header(bearer(&root))
            .set_json(json!({ "name": "S", "email": "s@x.com", "password": "secret1" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["user"]["id"].as_str().unwrap().to_string();
        let token = login!(app, "s@x.com", "secret1");
        let req = test::TestRequest::delete()
            .uri(&format!("/api/users/{}", id))
            .insert_header(bearer(&root))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
        let req = test::TestRequest::get()
            .uri(&format!("/api/users/{}", id))
            .insert_header(bearer(&root))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["active"], false);
    }

    #[actix_web::test]
    async fn password_update_rehashes() {
        let directory = seeded().await;
        let app = app!(directory);
        let root = login!(app, "root@x.com", "rootpass");
        let before = directory.find_by_email("root@x.com").await.unwrap().unwrap();
        let id = before.id();
        let req = test::TestRequest::put()
            .uri(&format!("/api/users/{}", id))
            .insert_header(bearer(&root))
            .set_json(json!({ "name": "Root Two" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["name"], "Root Two");
        let after = directory.find_by_email("root@x.com").await.unwrap().unwrap();
        assert_eq!(before.hashword(), after.hashword());
        let req = test::TestRequest::put()
            .uri(&format!("/api/users/{}", id))
            .insert_header(bearer(&root))
            .set_json(json!({ "password": "newpass1" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "root@x.com", "password": "rootpass" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
        login!(app, "root@x.com", "newpass1");
    }

    #[actix_web::test]
    async fn validation_and_lookup_failures() {
        let directory = seeded().await;
        let app = app!(directory);
        let root = login!(app, "root@x.com", "rootpass");
        for (body, status) in [
            (json!({ "name": "B", "email": "b@x", "password": "secret1" }), StatusCode::BAD_REQUEST),
            (json!({ "name": "B", "email": "b@x.com", "password": "12345" }), StatusCode::BAD_REQUEST),
            (json!({ "email": "b@x.com", "password": "secret1" }), StatusCode::BAD_REQUEST),
            (json!({ "name": "B", "email": "ROOT@x.com", "password": "secret1" }), StatusCode::CONFLICT),
            (json!({ "name": "B", "email": "b@x.com", "password": "secret1", "role": "owner" }), StatusCode::BAD_REQUEST),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/users/register")
                .insert_header(bearer(&root))
                .set_json(body)
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), status);
            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["success"], false);
            assert!(body["message"].is_string());
        }
        for uri in [format!("/api/users/{}", ID::<Member>::default()), "/api/users/not-an-id".into()] {
            let req = test::TestRequest::get()
                .uri(&uri)
                .insert_header(bearer(&root))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
        }
    }

    #[actix_web::test]
    async fn me_admits_every_active_role() {
        let directory = seeded().await;
        let app = app!(directory);
        let root = login!(app, "root@x.com", "rootpass");
        let req = test::TestRequest::post()
            .uri("/api/users/register")
            .insert_header(bearer(&root))
            .set_json(json!({ "name": "S", "email": "s@x.com", "password": "secret1" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        let seller = login!(app, "s@x.com", "secret1");
        for (token, role) in [(&root, "admin"), (&seller, "seller")] {
            let req = test::TestRequest::get()
                .uri("/api/auth/me")
                .insert_header(bearer(token))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["user"]["role"], role);
        }
        for header in ["Bearer garbage".to_string(), format!("Token {}", seller)] {
            let req = test::TestRequest::get()
                .uri("/api/auth/me")
                .insert_header((AUTHORIZATION, header))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            let body: Value = test::read_body_json(res).await;
            assert_eq!(body, json!({ "success": false, "message": "not authorized" }));
        }
    }

    #[actix_web::test]
    async fn overlong_fields_are_400() {
        let directory = seeded().await;
        let app = app!(directory);
        let root = login!(app, "root@x.com", "rootpass");
        let name = "n".repeat(till_core::NAME_MAX_LENGTH + 1);
        let email = format!("{}@x.com", "e".repeat(till_core::EMAIL_MAX_LENGTH));
        for body in [
            json!({ "name": name, "email": "b@x.com", "password": "secret1" }),
            json!({ "name": "B", "email": email, "password": "secret1" }),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/users/register")
                .insert_header(bearer(&root))
                .set_json(body)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        }
        let id = directory.find_by_email("root@x.com").await.unwrap().unwrap().id();
        let req = test::TestRequest::put()
            .uri(&format!("/api/users/{}", id))
            .insert_header(bearer(&root))
            .set_json(json!({ "name": name }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "name must be at most 128 characters");
        assert_eq!(directory.list().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn health_and_unknown_routes() {
        let directory = seeded().await;
        let app = app!(directory);
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "success": true, "status": "ok" }));
        let req = test::TestRequest::get().uri("/api/sales").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn bootstrap_is_idempotent() {
        let directory = seeded().await;
        bootstrap(directory.as_ref(), &config()).await.unwrap();
        assert_eq!(directory.list().await.unwrap().len(), 1);
    }
}
