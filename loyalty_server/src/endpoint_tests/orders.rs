use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use loyalty_engine::{
    db_types::{Order, OrderStatus},
    OrderApi,
};
use lp_common::Amount;

use super::{
    helpers::{assert_rejected, bearer, body_json, call, test_issuer, try_call},
    mocks::MockStore,
};
use crate::{middleware::AuthMiddlewareFactory, routes};

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(OrderApi::new(store))).service(
            web::scope("/api/user")
                .wrap(AuthMiddlewareFactory::new(test_issuer()))
                .route("/orders", web::post().to(routes::upload_order::<MockStore>))
                .route("/orders", web::get().to(routes::list_orders::<MockStore>)),
        );
    }
}

fn order(user_id: i64, number: &str, status: OrderStatus, accrual: Amount) -> Order {
    Order {
        id: 1,
        user_id,
        number: number.to_string(),
        status,
        accrual,
        uploaded_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

#[actix_web::test]
async fn upload_without_token_is_unauthorized() {
    let req = TestRequest::post().uri("/api/user/orders").set_payload("79927398713");
    let err = try_call(configure(MockStore::new()), req).await.expect_err("expected a rejection");
    assert_rejected(err, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn upload_with_garbage_token_is_unauthorized() {
    let req = TestRequest::post()
        .uri("/api/user/orders")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .set_payload("79927398713");
    let err = try_call(configure(MockStore::new()), req).await.expect_err("expected a rejection");
    assert_rejected(err, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn upload_accepts_a_new_number() {
    let mut store = MockStore::new();
    store.expect_order_by_number().returning(|_| Ok(None));
    store.expect_create_order().returning(|_, _| Ok(()));
    let req = TestRequest::post().uri("/api/user/orders").insert_header(bearer(1)).set_payload("79927398713");
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn re_upload_by_the_same_user_is_ok() {
    let mut store = MockStore::new();
    store
        .expect_order_by_number()
        .returning(|number| Ok(Some(order(1, number, OrderStatus::New, Amount::ZERO))));
    let req = TestRequest::post().uri("/api/user/orders").insert_header(bearer(1)).set_payload("79927398713");
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn upload_of_a_foreign_number_conflicts() {
    let mut store = MockStore::new();
    store
        .expect_order_by_number()
        .returning(|number| Ok(Some(order(2, number, OrderStatus::New, Amount::ZERO))));
    let req = TestRequest::post().uri("/api/user/orders").insert_header(bearer(1)).set_payload("79927398713");
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn upload_rejects_a_bad_checksum() {
    let req = TestRequest::post().uri("/api/user/orders").insert_header(bearer(1)).set_payload("123");
    let res = call(configure(MockStore::new()), req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn upload_rejects_an_empty_body() {
    let req = TestRequest::post().uri("/api/user/orders").insert_header(bearer(1)).set_payload("");
    let res = call(configure(MockStore::new()), req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn listing_no_orders_is_no_content() {
    let mut store = MockStore::new();
    store.expect_orders_by_user().returning(|_| Ok(Vec::new()));
    let req = TestRequest::get().uri("/api/user/orders").insert_header(bearer(1));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn listing_orders_shows_accrual_for_processed_only() {
    let mut store = MockStore::new();
    store.expect_orders_by_user().returning(|user_id| {
        Ok(vec![
            order(user_id, "79927398713", OrderStatus::Processed, Amount::from(1250)),
            order(user_id, "2377225624", OrderStatus::Processing, Amount::ZERO),
        ])
    });
    let req = TestRequest::get().uri("/api/user/orders").insert_header(bearer(1));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body[0]["number"], "79927398713");
    assert_eq!(body[0]["status"], "PROCESSED");
    assert_eq!(body[0]["accrual"], 12.5);
    assert_eq!(body[1]["status"], "PROCESSING");
    assert!(body[1].get("accrual").is_none());
}
