use actix_web::{
    body::{BoxBody, MessageBody},
    dev::ServiceResponse,
    http::{header, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, TimeZone, Utc};
use lpg_common::{Points, Secret};
use loyalty_engine::db_types::{Order, OrderNumber, OrderStatus, User, Withdrawal};
use serde::Serialize;

use crate::{
    auth::TokenIssuer,
    config::AuthConfig,
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Secret::new("endpoint-test-secret-do-not-reuse".to_string()),
        token_expiry: chrono::Duration::hours(1),
    }
}

pub fn issue_token(user_id: i64) -> String {
    TokenIssuer::new(&test_auth_config()).issue_token(user_id).expect("Failed to sign token")
}

pub async fn call(req: TestRequest, configure: impl FnOnce(&mut ServiceConfig)) -> ServiceResponse<BoxBody> {
    let issuer = TokenIssuer::new(&test_auth_config());
    let app = App::new().app_data(web::Data::new(issuer)).configure(configure);
    let service = test::init_service(app).await;
    test::call_service(&service, req.to_request()).await
}

pub async fn get_request(
    token: &str,
    path: &str,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = TestRequest::get().uri(path);
    if !token.is_empty() {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
    }
    into_parts(call(req, configure).await)
}

/// POSTs a raw text payload, the shape the order-upload endpoint consumes.
pub async fn post_text(
    token: &str,
    path: &str,
    body: &str,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = TestRequest::post().uri(path).set_payload(body.to_string());
    if !token.is_empty() {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
    }
    into_parts(call(req, configure).await)
}

pub async fn post_json<T: Serialize>(
    token: &str,
    path: &str,
    body: &T,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = TestRequest::post().uri(path).set_json(body);
    if !token.is_empty() {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
    }
    into_parts(call(req, configure).await)
}

fn into_parts(res: ServiceResponse<BoxBody>) -> (StatusCode, String) {
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 15, 10, 0, 0).unwrap()
}

pub fn order(id: i64, user_id: i64, number: &str, status: OrderStatus, accrual: Option<Points>) -> Order {
    Order { id, number: OrderNumber::from(number), user_id, status, accrual, uploaded_at: fixed_time() }
}

pub fn withdrawal(id: i64, user_id: i64, number: &str, amount: Points) -> Withdrawal {
    Withdrawal { id, user_id, order_number: OrderNumber::from(number), amount, processed_at: fixed_time() }
}

pub fn user(id: i64, login: &str, password_hash: &str) -> User {
    User { id, login: login.to_string(), password_hash: password_hash.to_string(), created_at: fixed_time() }
}
