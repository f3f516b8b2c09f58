use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use loyalty_engine::{traits::AuthApiError, AuthApi};
use serde_json::json;

use super::{
    helpers::{call, get_request, post_json, user},
    mocks::{MockAuthManager, MockOrderManager},
};
use crate::{
    auth::AUTH_COOKIE_NAME,
    routes::{login, my_orders, register},
};

fn with_auth(auth: MockAuthManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(AuthApi::new(auth)))
            .route("/register", web::post().to(register::<MockAuthManager>))
            .route("/login", web::post().to(login::<MockAuthManager>));
    }
}

#[actix_web::test]
async fn registration_issues_a_token_in_header_and_cookie() {
    let _ = env_logger::try_init();
    let mut auth = MockAuthManager::new();
    auth.expect_create_user().returning(|login, hash| Ok(user(1, login, hash)));
    let req = TestRequest::post().uri("/register").set_json(json!({"login": "alice", "password": "hunter2"}));
    let res = call(req, with_auth(auth)).await;

    assert_eq!(res.status(), StatusCode::OK);
    let header = res.headers().get("Authorization").expect("Authorization header missing").to_str().unwrap();
    assert!(header.starts_with("Bearer "), "{header}");
    let cookie = res.response().cookies().find(|c| c.name() == AUTH_COOKIE_NAME).expect("auth cookie missing");
    assert!(!cookie.value().is_empty());
}

#[actix_web::test]
async fn a_taken_login_is_a_conflict() {
    let _ = env_logger::try_init();
    let mut auth = MockAuthManager::new();
    auth.expect_create_user().returning(|_, _| Err(AuthApiError::LoginTaken));
    let body = json!({"login": "alice", "password": "hunter2"});
    let (status, body) = post_json("", "/register", &body, with_auth(auth)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already taken"), "{body}");
}

#[actix_web::test]
async fn registration_requires_a_login_and_password() {
    let _ = env_logger::try_init();
    let body = json!({"login": "", "password": "hunter2"});
    let (status, _) = post_json("", "/register", &body, with_auth(MockAuthManager::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn an_unknown_login_is_unauthorized() {
    let _ = env_logger::try_init();
    let mut auth = MockAuthManager::new();
    auth.expect_fetch_user_by_login().returning(|_| Ok(None));
    let body = json!({"login": "mallory", "password": "hunter2"});
    let (status, body) = post_json("", "/login", &body, with_auth(auth)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Invalid login or password"), "{body}");
}

#[actix_web::test]
async fn a_tampered_token_is_unauthorized() {
    let _ = env_logger::try_init();
    let mut token = super::helpers::issue_token(1);
    let len = token.len();
    token.replace_range(len - 10..len - 5, "00000");
    let configure = |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(loyalty_engine::OrderFlowApi::new(MockOrderManager::new())))
            .route("/orders", web::get().to(my_orders::<MockOrderManager>));
    };
    let (status, body) = get_request(&token, "/orders", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("invalid"), "{body}");
}
