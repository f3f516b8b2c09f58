use actix_web::{http::StatusCode, web, web::ServiceConfig};
use lpg_common::Points;
use loyalty_engine::{db_types::Balance, traits::LedgerError, AccountApi};
use serde_json::json;

use super::{
    helpers::{get_request, issue_token, post_json, withdrawal},
    mocks::MockBalanceManager,
};
use crate::routes::{my_balance, my_withdrawals, withdraw};

fn with_balances(balances: MockBalanceManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(AccountApi::new(balances)))
            .route("/balance", web::get().to(my_balance::<MockBalanceManager>))
            .route("/balance/withdraw", web::post().to(withdraw::<MockBalanceManager>))
            .route("/withdrawals", web::get().to(my_withdrawals::<MockBalanceManager>));
    }
}

#[actix_web::test]
async fn the_balance_is_reported_as_decimal_points() {
    let _ = env_logger::try_init();
    let mut balances = MockBalanceManager::new();
    balances.expect_fetch_balance().returning(|_| {
        Ok(Balance { current: Points::try_from(729.98).unwrap(), withdrawn: Points::new(500) })
    });
    let (status, body) = get_request(&issue_token(1), "/balance", with_balances(balances)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"current":729.98,"withdrawn":500.0}"#);
}

#[actix_web::test]
async fn a_covered_withdrawal_succeeds() {
    let _ = env_logger::try_init();
    let mut balances = MockBalanceManager::new();
    balances
        .expect_insert_withdrawal_if_sufficient()
        .returning(|user_id, number, amount| Ok(withdrawal(1, user_id, number.as_str(), amount)));
    let request = json!({"order": "2377225624", "sum": 500});
    let (status, _) = post_json(&issue_token(1), "/balance/withdraw", &request, with_balances(balances)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn an_uncovered_withdrawal_is_payment_required() {
    let _ = env_logger::try_init();
    let mut balances = MockBalanceManager::new();
    balances
        .expect_insert_withdrawal_if_sufficient()
        .returning(|_, _, amount| Err(LedgerError::InsufficientFunds(amount)));
    let request = json!({"order": "2377225624", "sum": 750});
    let (status, body) = post_json(&issue_token(1), "/balance/withdraw", &request, with_balances(balances)).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(body.contains("Insufficient balance"), "{body}");
}

#[actix_web::test]
async fn withdrawal_labels_are_luhn_checked() {
    let _ = env_logger::try_init();
    // No expectations: the label must be rejected before the ledger is touched.
    let request = json!({"order": "79927398710", "sum": 100});
    let (status, _) =
        post_json(&issue_token(1), "/balance/withdraw", &request, with_balances(MockBalanceManager::new())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn withdrawal_amounts_must_be_positive() {
    let _ = env_logger::try_init();
    let request = json!({"order": "2377225624", "sum": 0});
    let (status, _) =
        post_json(&issue_token(1), "/balance/withdraw", &request, with_balances(MockBalanceManager::new())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn withdrawals_are_listed() {
    let _ = env_logger::try_init();
    let mut balances = MockBalanceManager::new();
    balances.expect_fetch_withdrawals_for_user().returning(|user_id| {
        Ok(vec![withdrawal(2, user_id, "9278923470", Points::new(200)), withdrawal(1, user_id, "2377225624", Points::new(100))])
    });
    let (status, body) = get_request(&issue_token(1), "/withdrawals", with_balances(balances)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""order":"9278923470","sum":200.0"#), "{body}");
    assert!(body.contains(r#""order":"2377225624","sum":100.0"#), "{body}");
}

#[actix_web::test]
async fn an_empty_withdrawal_list_is_no_content() {
    let _ = env_logger::try_init();
    let mut balances = MockBalanceManager::new();
    balances.expect_fetch_withdrawals_for_user().returning(|_| Ok(Vec::new()));
    let (status, body) = get_request(&issue_token(1), "/withdrawals", with_balances(balances)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}
