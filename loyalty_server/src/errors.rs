use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use loyalty_engine::{traits::StoreError, BalanceError, UploadError};
use thiserror::Error;

use crate::auth::AuthError;

/// Error surface of the loyalty HTTP adapter. Bodies are plain text and not contract-significant; the status
/// codes are.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("A user with this login already exists")]
    LoginTaken,
    #[error("The order was uploaded by another user")]
    OrderConflict,
    #[error("Invalid order number")]
    InvalidOrderNumber,
    #[error("Could not initialize the server: {0}")]
    Startup(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
            Self::LoginTaken | Self::OrderConflict => StatusCode::CONFLICT,
            Self::InvalidOrderNumber => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Startup(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("🛑️ {self}");
        }
        HttpResponse::build(self.status_code()).insert_header(ContentType::plaintext()).body(self.to_string())
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UserAlreadyExists => ServerError::LoginTaken,
            StoreError::InsufficientFunds => ServerError::InsufficientFunds,
            e => ServerError::Internal(e.to_string()),
        }
    }
}

impl From<UploadError> for ServerError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::InvalidNumber => ServerError::InvalidOrderNumber,
            // The same-user case is a success response and is handled before conversion.
            UploadError::AlreadyUploaded | UploadError::UploadedByAnotherUser => ServerError::OrderConflict,
            UploadError::Store(e) => e.into(),
        }
    }
}

impl From<BalanceError> for ServerError {
    fn from(e: BalanceError) -> Self {
        match e {
            BalanceError::InvalidNumber => ServerError::InvalidOrderNumber,
            BalanceError::InvalidSum => ServerError::InvalidRequestBody("the sum must be positive".to_string()),
            BalanceError::InsufficientFunds => ServerError::InsufficientFunds,
            BalanceError::Store(e) => e.into(),
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken => ServerError::Unauthorized,
            e => ServerError::Internal(e.to_string()),
        }
    }
}
