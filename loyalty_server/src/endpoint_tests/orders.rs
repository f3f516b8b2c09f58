use actix_web::{http::StatusCode, web, web::ServiceConfig};
use lpg_common::Points;
use loyalty_engine::{db_types::OrderStatus, OrderFlowApi};

use super::{
    helpers::{get_request, issue_token, order, post_text},
    mocks::MockOrderManager,
};
use crate::routes::{my_orders, submit_order};

fn with_orders(orders: MockOrderManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(OrderFlowApi::new(orders))).service(
            web::resource("/orders")
                .route(web::post().to(submit_order::<MockOrderManager>))
                .route(web::get().to(my_orders::<MockOrderManager>)),
        );
    }
}

#[actix_web::test]
async fn uploading_without_a_token_is_unauthorized() {
    let _ = env_logger::try_init();
    let (status, body) = post_text("", "/orders", "12345678903", with_orders(MockOrderManager::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No authentication token"), "{body}");
}

#[actix_web::test]
async fn a_new_order_is_accepted() {
    let _ = env_logger::try_init();
    let mut orders = MockOrderManager::new();
    orders
        .expect_insert_order()
        .returning(|o| Ok((order(1, o.user_id, o.number.as_str(), OrderStatus::New, None), true)));
    let (status, _) = post_text(&issue_token(1), "/orders", "12345678903", with_orders(orders)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn re_uploading_my_own_order_is_ok() {
    let _ = env_logger::try_init();
    let mut orders = MockOrderManager::new();
    orders
        .expect_insert_order()
        .returning(|o| Ok((order(1, o.user_id, o.number.as_str(), OrderStatus::Processing, None), false)));
    let (status, _) = post_text(&issue_token(1), "/orders", "12345678903", with_orders(orders)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn uploading_another_users_order_is_a_conflict() {
    let _ = env_logger::try_init();
    let mut orders = MockOrderManager::new();
    // The stored order belongs to user 2; the caller is user 1.
    orders
        .expect_insert_order()
        .returning(|o| Ok((order(1, 2, o.number.as_str(), OrderStatus::Processing, None), false)));
    let (status, body) = post_text(&issue_token(1), "/orders", "12345678903", with_orders(orders)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("another user"), "{body}");
}

#[actix_web::test]
async fn an_invalid_order_number_is_unprocessable() {
    let _ = env_logger::try_init();
    // No expectations: the number must be rejected before the ledger is touched.
    let (status, _) = post_text(&issue_token(1), "/orders", "79927398710", with_orders(MockOrderManager::new())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn an_empty_body_is_a_bad_request() {
    let _ = env_logger::try_init();
    let (status, _) = post_text(&issue_token(1), "/orders", "  ", with_orders(MockOrderManager::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn orders_are_listed_with_accrual_only_when_processed() {
    let _ = env_logger::try_init();
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_orders_for_user().returning(|_| {
        Ok(vec![
            order(2, 1, "79927398713", OrderStatus::New, None),
            order(1, 1, "12345678903", OrderStatus::Processed, Some(Points::try_from(729.98).unwrap())),
        ])
    });
    let (status, body) = get_request(&issue_token(1), "/orders", with_orders(orders)).await;
    assert_eq!(status, StatusCode::OK);
    // Newest first, and no accrual field on non-terminal orders.
    assert!(body.contains(r#""number":"79927398713","status":"NEW","uploaded_at""#), "{body}");
    assert!(body.contains(r#""number":"12345678903","status":"PROCESSED","accrual":729.98"#), "{body}");
    let newest = body.find("79927398713").unwrap();
    let oldest = body.find("12345678903").unwrap();
    assert!(newest < oldest, "{body}");
}

#[actix_web::test]
async fn an_empty_order_list_is_no_content() {
    let _ = env_logger::try_init();
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_orders_for_user().returning(|_| Ok(Vec::new()));
    let (status, body) = get_request(&issue_token(1), "/orders", with_orders(orders)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}
