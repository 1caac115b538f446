//! Request handlers for the accrual service. They are generic over the store so the endpoint tests can run
//! them against a mock; the server module instantiates them with [`accrual_engine::PgStore`].
use accrual_engine::{traits::AccrualStore, OrderApi, RewardApi};
use actix_web::{web, HttpResponse};

use crate::{
    data_objects::{OrderInfoResponse, RegisterOrderRequest, RewardRequest},
    errors::ServerError,
};

pub async fn get_order_info<S: AccrualStore + 'static>(
    api: web::Data<OrderApi<S>>,
    number: web::Path<String>,
) -> Result<HttpResponse, ServerError> {
    match api.order_info(&number).await? {
        Some(order) => Ok(HttpResponse::Ok().json(OrderInfoResponse::from(order))),
        None => Ok(HttpResponse::NoContent().finish()),
    }
}

pub async fn register_order<S: AccrualStore + 'static>(
    api: web::Data<OrderApi<S>>,
    body: web::Json<RegisterOrderRequest>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    let number = request.order.clone();
    let goods = request.into_goods()?;
    api.register(&number, goods).await?;
    Ok(HttpResponse::Accepted().finish())
}

pub async fn register_reward<S: AccrualStore + 'static>(
    api: web::Data<RewardApi<S>>,
    body: web::Json<RewardRequest>,
) -> Result<HttpResponse, ServerError> {
    let rule = body.into_inner().into_rule()?;
    api.register(rule).await?;
    Ok(HttpResponse::Ok().finish())
}
