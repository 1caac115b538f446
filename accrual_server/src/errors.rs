use accrual_engine::{traits::AccrualStoreError, OrderError, RewardError};
use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use thiserror::Error;

/// Error surface of the accrual HTTP adapter. Bodies are plain text and not contract-significant; the status
/// codes are.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("An order with this number already exists")]
    OrderExists,
    #[error("A reward rule with this match already exists")]
    MatchExists,
    #[error("Could not initialize the server: {0}")]
    Startup(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::OrderExists | Self::MatchExists => StatusCode::CONFLICT,
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

impl From<OrderError> for ServerError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::InvalidNumber => ServerError::InvalidRequest("invalid order number".to_string()),
            OrderError::AlreadyExists => ServerError::OrderExists,
            OrderError::Store(e) => ServerError::Internal(e.to_string()),
        }
    }
}

impl From<RewardError> for ServerError {
    fn from(e: RewardError) -> Self {
        match e {
            RewardError::EmptyMatch | RewardError::InvalidReward => ServerError::InvalidRequest(e.to_string()),
            RewardError::MatchAlreadyExists => ServerError::MatchExists,
            RewardError::Store(e) => ServerError::Internal(e.to_string()),
        }
    }
}

impl From<AccrualStoreError> for ServerError {
    fn from(e: AccrualStoreError) -> Self {
        ServerError::Internal(e.to_string())
    }
}
