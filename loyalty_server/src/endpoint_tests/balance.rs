use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::Utc;
use loyalty_engine::{
    db_types::{Balance, Withdrawal},
    traits::StoreError,
    BalanceApi,
};
use lp_common::Amount;
use serde_json::json;

use super::{
    helpers::{assert_rejected, bearer, body_json, call, test_issuer, try_call},
    mocks::MockStore,
};
use crate::{middleware::AuthMiddlewareFactory, routes};

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(BalanceApi::new(store))).service(
            web::scope("/api/user")
                .wrap(AuthMiddlewareFactory::new(test_issuer()))
                .route("/balance", web::get().to(routes::get_balance::<MockStore>))
                .route("/balance/withdraw", web::post().to(routes::withdraw::<MockStore>))
                .route("/withdrawals", web::get().to(routes::list_withdrawals::<MockStore>)),
        );
    }
}

#[actix_web::test]
async fn balance_is_returned_as_fractional_points() {
    let mut store = MockStore::new();
    store.expect_balance().returning(|_| Ok(Balance { current: Amount::from(750), withdrawn: Amount::from(500) }));
    let req = TestRequest::get().uri("/api/user/balance").insert_header(bearer(1));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body, json!({"current": 7.5, "withdrawn": 5.0}));
}

#[actix_web::test]
async fn balance_requires_a_token() {
    let req = TestRequest::get().uri("/api/user/balance");
    let err = try_call(configure(MockStore::new()), req).await.expect_err("expected a rejection");
    assert_rejected(err, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn withdraw_debits_the_balance() {
    let mut store = MockStore::new();
    store.expect_withdraw_balance().returning(|_, _, _| Ok(()));
    let req = TestRequest::post()
        .uri("/api/user/balance/withdraw")
        .insert_header(bearer(1))
        .set_json(json!({"order": "2377225624", "sum": 5}));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn withdraw_more_than_the_balance_is_payment_required() {
    let mut store = MockStore::new();
    store.expect_withdraw_balance().returning(|_, _, _| Err(StoreError::InsufficientFunds));
    let req = TestRequest::post()
        .uri("/api/user/balance/withdraw")
        .insert_header(bearer(1))
        .set_json(json!({"order": "2377225624", "sum": 100}));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::PAYMENT_REQUIRED);
}

#[actix_web::test]
async fn withdraw_against_a_bad_checksum_is_unprocessable() {
    let req = TestRequest::post()
        .uri("/api/user/balance/withdraw")
        .insert_header(bearer(1))
        .set_json(json!({"order": "123", "sum": 5}));
    let res = call(configure(MockStore::new()), req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn withdraw_of_a_non_positive_sum_is_bad_request() {
    for sum in [0, -5] {
        let req = TestRequest::post()
            .uri("/api/user/balance/withdraw")
            .insert_header(bearer(1))
            .set_json(json!({"order": "2377225624", "sum": sum}));
        let res = call(configure(MockStore::new()), req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn no_withdrawals_is_no_content() {
    let mut store = MockStore::new();
    store.expect_withdrawals().returning(|_| Ok(Vec::new()));
    let req = TestRequest::get().uri("/api/user/withdrawals").insert_header(bearer(1));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn withdrawals_are_listed_with_fractional_sums() {
    let mut store = MockStore::new();
    store.expect_withdrawals().returning(|_| {
        Ok(vec![Withdrawal {
            order_number: "2377225624".to_string(),
            sum: Amount::from(500),
            processed_at: Utc::now(),
        }])
    });
    let req = TestRequest::get().uri("/api/user/withdrawals").insert_header(bearer(1));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["order"], "2377225624");
    assert_eq!(body[0]["sum"], 5.0);
}
