use actix_web::{
    dev::ServiceResponse,
    http::StatusCode,
    test::{self, TestRequest},
    web::ServiceConfig,
    App,
    Error,
};
use lp_common::Secret;

use crate::auth::TokenIssuer;

pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(&Secret::new("endpoint-test-secret".to_string()))
}

pub fn bearer(user_id: i64) -> (&'static str, String) {
    let token = test_issuer().issue(user_id).expect("failed to issue a test token");
    ("Authorization", format!("Bearer {token}"))
}

/// Runs the request against an app built from `configure`. Handler and extractor failures come back as
/// error responses; a rejection from the auth middleware surfaces as `Err`, exactly as it would cross the
/// HTTP boundary as its status code.
pub async fn try_call<F>(configure: F, req: TestRequest) -> Result<ServiceResponse, Error>
where F: FnOnce(&mut ServiceConfig)
{
    let _ = env_logger::try_init();
    let app = test::init_service(App::new().configure(configure)).await;
    test::try_call_service(&app, req.to_request()).await
}

pub async fn call<F>(configure: F, req: TestRequest) -> ServiceResponse
where F: FnOnce(&mut ServiceConfig)
{
    try_call(configure, req).await.expect("request failed")
}

/// Asserts that the middleware rejected the request before it reached a handler.
pub fn assert_rejected(err: Error, status: StatusCode) {
    assert_eq!(err.as_response_error().status_code(), status);
}

pub async fn body_json(res: ServiceResponse) -> serde_json::Value {
    let body = test::read_body(res).await;
    serde_json::from_slice(&body).expect("response body was not valid JSON")
}
