use accrual_engine::{
    traits::AccrualStoreError,
    types::{AccrualOrder, AccrualStatus, Good},
    OrderApi,
};
use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use lp_common::Amount;
use serde_json::json;

use super::{
    helpers::{body_json, call},
    mocks::MockStore,
};
use crate::routes;

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(OrderApi::new(store))).service(
            web::scope("/api")
                .route("/orders/{number}", web::get().to(routes::get_order_info::<MockStore>))
                .route("/orders", web::post().to(routes::register_order::<MockStore>)),
        );
    }
}

fn stored_order(number: &str, status: AccrualStatus, accrual: Option<Amount>) -> AccrualOrder {
    AccrualOrder {
        number: number.to_string(),
        status,
        accrual,
        goods: vec![Good { description: "Чайник Bork".to_string(), price: Amount::from_points(7000.0) }],
    }
}

/// A store whose background-processing calls all succeed, for registration tests.
fn permissive_store() -> MockStore {
    let mut store = MockStore::new();
    store.expect_create_order().returning(|_, _| Ok(()));
    store.expect_update_order().returning(|_, _, _| Ok(()));
    store.expect_rewards().returning(|| Ok(Vec::new()));
    store
        .expect_order_by_number()
        .returning(|number| Ok(Some(stored_order(number, AccrualStatus::Processing, None))));
    store
}

#[actix_web::test]
async fn processed_order_is_reported_with_its_accrual() {
    let mut store = MockStore::new();
    store
        .expect_order_by_number()
        .returning(|number| Ok(Some(stored_order(number, AccrualStatus::Processed, Some(Amount::from_points(700.0))))));
    let res = call(configure(store), TestRequest::get().uri("/api/orders/79927398713")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body, json!({"order": "79927398713", "status": "PROCESSED", "accrual": 700.0}));
}

#[actix_web::test]
async fn unfinished_order_has_no_accrual_field() {
    let mut store = MockStore::new();
    store.expect_order_by_number().returning(|number| Ok(Some(stored_order(number, AccrualStatus::Processing, None))));
    let res = call(configure(store), TestRequest::get().uri("/api/orders/79927398713")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["status"], "PROCESSING");
    assert!(body.get("accrual").is_none());
}

#[actix_web::test]
async fn unknown_order_is_no_content() {
    let mut store = MockStore::new();
    store.expect_order_by_number().returning(|_| Ok(None));
    let res = call(configure(store), TestRequest::get().uri("/api/orders/79927398713")).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn bad_checksum_is_a_bad_request() {
    let res = call(configure(MockStore::new()), TestRequest::get().uri("/api/orders/123")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn registration_is_accepted() {
    let req = TestRequest::post().uri("/api/orders").set_json(json!({
        "order": "79927398713",
        "goods": [{"description": "Чайник Bork", "price": 7000.0}]
    }));
    let res = call(configure(permissive_store()), req).await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn duplicate_registration_conflicts() {
    let mut store = MockStore::new();
    store.expect_create_order().returning(|_, _| Err(AccrualStoreError::OrderAlreadyExists));
    let req = TestRequest::post().uri("/api/orders").set_json(json!({
        "order": "79927398713",
        "goods": [{"description": "Чайник Bork", "price": 7000.0}]
    }));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn registration_validates_the_payload() {
    let bad_payloads = [
        // Bad checksum.
        json!({"order": "123", "goods": [{"description": "Чайник Bork", "price": 7000.0}]}),
        // Empty goods.
        json!({"order": "79927398713", "goods": []}),
        // Empty description.
        json!({"order": "79927398713", "goods": [{"description": "", "price": 7000.0}]}),
        // Non-positive price.
        json!({"order": "79927398713", "goods": [{"description": "Чайник Bork", "price": 0.0}]}),
    ];
    for payload in bad_payloads {
        let req = TestRequest::post().uri("/api/orders").set_json(payload);
        let res = call(configure(MockStore::new()), req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
