use actix_web::{
    dev::ServiceResponse,
    test::{self, TestRequest},
    web::ServiceConfig,
    App,
};

pub async fn call<F>(configure: F, req: TestRequest) -> ServiceResponse
where F: FnOnce(&mut ServiceConfig)
{
    let _ = env_logger::try_init();
    let app = test::init_service(App::new().configure(configure)).await;
    test::call_service(&app, req.to_request()).await
}

pub async fn body_json(res: ServiceResponse) -> serde_json::Value {
    let body = test::read_body(res).await;
    serde_json::from_slice(&body).expect("response body was not valid JSON")
}
