use accrual_engine::{traits::AccrualStoreError, RewardApi};
use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::json;

use super::{helpers::call, mocks::MockStore};
use crate::routes;

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(RewardApi::new(store)))
            .route("/api/goods", web::post().to(routes::register_reward::<MockStore>));
    }
}

#[actix_web::test]
async fn a_valid_rule_is_registered() {
    let mut store = MockStore::new();
    store.expect_create_reward().returning(|_| Ok(()));
    let req = TestRequest::post()
        .uri("/api/goods")
        .set_json(json!({"match": "Bork", "reward": 10, "reward_type": "%"}));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn a_duplicate_match_conflicts() {
    let mut store = MockStore::new();
    store.expect_create_reward().returning(|_| Err(AccrualStoreError::MatchAlreadyExists));
    let req = TestRequest::post()
        .uri("/api/goods")
        .set_json(json!({"match": "Bork", "reward": 10, "reward_type": "%"}));
    let res = call(configure(store), req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn invalid_rules_are_bad_requests() {
    let bad_payloads = [
        json!({"match": "Bork", "reward": 10, "reward_type": "points"}),
        json!({"match": "", "reward": 10, "reward_type": "%"}),
        json!({"match": "Bork", "reward": 0, "reward_type": "%"}),
        json!({"match": "Bork", "reward": -3, "reward_type": "pt"}),
    ];
    for payload in bad_payloads {
        let req = TestRequest::post().uri("/api/goods").set_json(payload);
        let res = call(configure(MockStore::new()), req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
