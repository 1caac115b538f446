//! Request handlers for the loyalty service.
//!
//! Handlers stay thin: decode, call the matching API, map the result onto a status code. Anything longer
//! belongs in the engine. The handlers are generic over the store so the endpoint tests can run them against
//! a mock; the server module instantiates them with [`loyalty_engine::PgStore`].
use actix_web::{http::header::AUTHORIZATION, web, HttpResponse};
use log::info;
use loyalty_engine::{traits::LoyaltyStore, BalanceApi, OrderApi, UploadError};

use crate::{
    auth::{self, TokenIssuer},
    data_objects::{BalanceResponse, Credentials, OrderResponse, WithdrawRequest, WithdrawalResponse},
    errors::ServerError,
    middleware::AuthenticatedUser,
};

pub async fn register<S: LoyaltyStore + 'static>(
    store: web::Data<S>,
    issuer: web::Data<TokenIssuer>,
    body: web::Json<Credentials>,
) -> Result<HttpResponse, ServerError> {
    let Credentials { login, password } = body.into_inner();
    validate_credentials(&login, &password)?;
    let password_hash = auth::hash_password(&password)?;
    let user_id = store.create_user(&login, &password_hash).await?;
    info!("🧑️ User [{login}] registered with id {user_id}");
    bearer_response(&issuer, user_id)
}

pub async fn login<S: LoyaltyStore + 'static>(
    store: web::Data<S>,
    issuer: web::Data<TokenIssuer>,
    body: web::Json<Credentials>,
) -> Result<HttpResponse, ServerError> {
    let Credentials { login, password } = body.into_inner();
    validate_credentials(&login, &password)?;
    let user = store.user_by_login(&login).await?.ok_or(ServerError::Unauthorized)?;
    if !auth::verify_password(&user.password_hash, &password) {
        return Err(ServerError::Unauthorized);
    }
    bearer_response(&issuer, user.id)
}

pub async fn upload_order<S: LoyaltyStore + 'static>(
    user: AuthenticatedUser,
    api: web::Data<OrderApi<S>>,
    body: web::Bytes,
) -> Result<HttpResponse, ServerError> {
    let number = String::from_utf8(body.to_vec())
        .map_err(|_| ServerError::InvalidRequestBody("the order number must be UTF-8 text".to_string()))?;
    let number = number.trim();
    if number.is_empty() {
        return Err(ServerError::InvalidRequestBody("the order number cannot be empty".to_string()));
    }
    match api.upload(user.user_id, number).await {
        Ok(()) => Ok(HttpResponse::Accepted().finish()),
        Err(UploadError::AlreadyUploaded) => Ok(HttpResponse::Ok().finish()),
        Err(e) => Err(e.into()),
    }
}

pub async fn list_orders<S: LoyaltyStore + 'static>(
    user: AuthenticatedUser,
    api: web::Data<OrderApi<S>>,
) -> Result<HttpResponse, ServerError> {
    let orders = api.list(user.user_id).await.map_err(ServerError::from)?;
    if orders.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

pub async fn get_balance<S: LoyaltyStore + 'static>(
    user: AuthenticatedUser,
    api: web::Data<BalanceApi<S>>,
) -> Result<HttpResponse, ServerError> {
    let balance = api.balance(user.user_id).await.map_err(ServerError::from)?;
    Ok(HttpResponse::Ok().json(BalanceResponse::from(balance)))
}

pub async fn withdraw<S: LoyaltyStore + 'static>(
    user: AuthenticatedUser,
    api: web::Data<BalanceApi<S>>,
    body: web::Json<WithdrawRequest>,
) -> Result<HttpResponse, ServerError> {
    let WithdrawRequest { order, sum } = body.into_inner();
    api.withdraw(user.user_id, &order, sum).await?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn list_withdrawals<S: LoyaltyStore + 'static>(
    user: AuthenticatedUser,
    api: web::Data<BalanceApi<S>>,
) -> Result<HttpResponse, ServerError> {
    let withdrawals = api.withdrawals(user.user_id).await.map_err(ServerError::from)?;
    if withdrawals.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let body: Vec<WithdrawalResponse> = withdrawals.into_iter().map(WithdrawalResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

fn validate_credentials(login: &str, password: &str) -> Result<(), ServerError> {
    if login.trim().is_empty() || password.is_empty() {
        return Err(ServerError::InvalidRequestBody("login and password must be non-empty".to_string()));
    }
    Ok(())
}

fn bearer_response(issuer: &TokenIssuer, user_id: i64) -> Result<HttpResponse, ServerError> {
    let token = issuer.issue(user_id)?;
    Ok(HttpResponse::Ok().insert_header((AUTHORIZATION, format!("{}{token}", auth::BEARER_PREFIX))).finish())
}
