use actix_web::{
    http::{header::AUTHORIZATION, StatusCode},
    test::TestRequest,
    web,
    web::ServiceConfig,
};
use chrono::Utc;
use loyalty_engine::{db_types::User, traits::StoreError};
use lp_common::Amount;
use serde_json::json;

use super::{
    helpers::{call, test_issuer},
    mocks::MockStore,
};
use crate::{auth, routes};

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(store))
            .app_data(web::Data::new(test_issuer()))
            .route("/api/user/register", web::post().to(routes::register::<MockStore>))
            .route("/api/user/login", web::post().to(routes::login::<MockStore>));
    }
}

fn stored_user(id: i64, login: &str, password: &str) -> User {
    User {
        id,
        login: login.to_string(),
        password_hash: auth::hash_password(password).unwrap(),
        balance: Amount::ZERO,
        withdrawn: Amount::ZERO,
        created_at: Utc::now(),
    }
}

#[actix_web::test]
async fn register_issues_a_bearer_token() {
    let mut store = MockStore::new();
    store.expect_create_user().returning(|_, _| Ok(7));
    let req = TestRequest::post().uri("/api/user/register").set_json(json!({"login": "user", "password": "pass"}));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let header = res.headers().get(AUTHORIZATION).expect("no Authorization header").to_str().unwrap();
    let token = header.strip_prefix("Bearer ").expect("not a bearer header");
    assert_eq!(test_issuer().verify(token).unwrap(), 7);
}

#[actix_web::test]
async fn register_rejects_empty_credentials() {
    for body in [json!({"login": "", "password": "pass"}), json!({"login": "user", "password": ""})] {
        let req = TestRequest::post().uri("/api/user/register").set_json(body);
        let res = call(configure(MockStore::new()), req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn register_rejects_malformed_body() {
    let req = TestRequest::post().uri("/api/user/register").set_payload("not json").insert_header((
        "content-type",
        "application/json",
    ));
    let res = call(configure(MockStore::new()), req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn duplicate_login_conflicts() {
    let mut store = MockStore::new();
    store.expect_create_user().returning(|_, _| Err(StoreError::UserAlreadyExists));
    let req = TestRequest::post().uri("/api/user/register").set_json(json!({"login": "user", "password": "pass"}));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn login_with_valid_credentials() {
    let mut store = MockStore::new();
    store.expect_user_by_login().returning(|_| Ok(Some(stored_user(7, "user", "pass"))));
    let req = TestRequest::post().uri("/api/user/login").set_json(json!({"login": "user", "password": "pass"}));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let header = res.headers().get(AUTHORIZATION).expect("no Authorization header").to_str().unwrap();
    let token = header.strip_prefix("Bearer ").unwrap();
    assert_eq!(test_issuer().verify(token).unwrap(), 7);
}

#[actix_web::test]
async fn login_with_wrong_password_is_unauthorized() {
    let mut store = MockStore::new();
    store.expect_user_by_login().returning(|_| Ok(Some(stored_user(7, "user", "pass"))));
    let req = TestRequest::post().uri("/api/user/login").set_json(json!({"login": "user", "password": "nope"}));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn login_with_unknown_user_is_unauthorized() {
    let mut store = MockStore::new();
    store.expect_user_by_login().returning(|_| Ok(None));
    let req = TestRequest::post().uri("/api/user/login").set_json(json!({"login": "ghost", "password": "pass"}));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
