//! Request handler definitions
//!
//! Define each route and its handler here. Handlers are generic over the ledger traits so that the endpoint tests
//! can run them against mocked backends; the server registers them with the concrete SQLite database.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause
//! the current worker to stop processing new requests. Any long, non-cpu-bound operation (I/O, database operations,
//! the accrual service) must therefore be expressed as futures, never as blocking calls.
use actix_web::{cookie::Cookie, get, web, HttpResponse, Responder};
use log::*;
use loyalty_engine::{
    traits::{AuthManagement, BalanceManagement, OrderManagement},
    AccountApi, AuthApi, OrderFlowApi, SubmitOutcome,
};

use crate::{
    auth::{JwtClaims, TokenIssuer, AUTH_COOKIE_NAME},
    data_objects::{Credentials, OrderSummary, WithdrawalRequest, WithdrawalSummary},
    errors::ServerError,
};

// ----------------------------------------------   Health   ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------    Auth    ----------------------------------------------------

/// Route handler for user registration.
///
/// A successful registration immediately authenticates the new user: the access token is returned both in the
/// `Authorization` header and in an http-only cookie.
pub async fn register<B: AuthManagement>(
    body: web::Json<Credentials>,
    api: web::Data<AuthApi<B>>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let Credentials { login, password } = body.into_inner();
    let login = login.trim().to_string();
    if login.is_empty() || password.is_empty() {
        return Err(ServerError::InvalidRequestBody("Login and password are required".to_string()));
    }
    let user = api.register(&login, &password).await?;
    debug!("💻️ Registered new user {login}");
    token_response(user.id, &issuer)
}

/// Route handler for login. Unknown logins and wrong passwords are deliberately indistinguishable.
pub async fn login<B: AuthManagement>(
    body: web::Json<Credentials>,
    api: web::Data<AuthApi<B>>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let Credentials { login, password } = body.into_inner();
    if login.is_empty() || password.is_empty() {
        return Err(ServerError::InvalidRequestBody("Login and password are required".to_string()));
    }
    let user = api.verify(&login, &password).await?;
    trace!("💻️ User {login} logged in");
    token_response(user.id, &issuer)
}

fn token_response(user_id: i64, issuer: &TokenIssuer) -> Result<HttpResponse, ServerError> {
    let token = issuer.issue_token(user_id)?;
    let cookie = Cookie::build(AUTH_COOKIE_NAME, token.clone()).path("/").http_only(true).finish();
    Ok(HttpResponse::Ok().insert_header(("Authorization", format!("Bearer {token}"))).cookie(cookie).finish())
}

// ----------------------------------------------   Orders   ----------------------------------------------------

/// Route handler for order upload. The body is the raw order number.
///
/// Returns 202 when the order is accepted for reconciliation, and 200 when the same user has already uploaded this
/// number. A number claimed by another user is a 409; a number that fails the Luhn check is a 422.
pub async fn submit_order<B: OrderManagement>(
    claims: JwtClaims,
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let number = String::from_utf8(body.to_vec())
        .map_err(|e| ServerError::InvalidRequestBody(format!("Order number must be UTF-8. {e}")))?;
    let number = number.trim();
    if number.is_empty() {
        return Err(ServerError::InvalidRequestBody("Empty order number".to_string()));
    }
    match api.submit_order(claims.user_id(), number).await? {
        SubmitOutcome::Accepted(order) => {
            debug!("💻️ Order {} accepted for reconciliation", order.number);
            Ok(HttpResponse::Accepted().finish())
        },
        SubmitOutcome::AlreadyUploaded(_) => Ok(HttpResponse::Ok().finish()),
    }
}

/// Route handler for the order listing: the caller's orders, newest first. An empty list is 204, not an error.
pub async fn my_orders<B: OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let orders = api.orders_for_user(claims.user_id()).await?;
    if orders.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let body: Vec<OrderSummary> = orders.into_iter().map(OrderSummary::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

// ----------------------------------------------  Balances  ----------------------------------------------------

pub async fn my_balance<B: BalanceManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let balance = api.balance(claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(balance))
}

/// Route handler for withdrawals. 402 when the balance does not cover the request; the balance check and the
/// withdrawal record are committed as one unit, so concurrent requests cannot jointly overdraw.
pub async fn withdraw<B: BalanceManagement>(
    claims: JwtClaims,
    body: web::Json<WithdrawalRequest>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    api.withdraw(claims.user_id(), &request.order, request.sum).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Route handler for the withdrawal listing: newest first, 204 when there are none.
pub async fn my_withdrawals<B: BalanceManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let withdrawals = api.withdrawals(claims.user_id()).await?;
    if withdrawals.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let body: Vec<WithdrawalSummary> = withdrawals.into_iter().map(WithdrawalSummary::from).collect();
    Ok(HttpResponse::Ok().json(body))
}
