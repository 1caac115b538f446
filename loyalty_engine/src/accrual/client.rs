use std::time::Duration;

use async_trait::async_trait;
use log::trace;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};

use crate::traits::{AccrualClient, AccrualClientError, AccrualOrderState};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Reference HTTP implementation of the [`AccrualClient`] capability, targeting
/// `{base}/api/orders/{number}`.
#[derive(Debug, Clone)]
pub struct HttpAccrualClient {
    base_url: String,
    client: Client,
}

impl HttpAccrualClient {
    pub fn new(base_url: &str) -> Result<Self, AccrualClientError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| AccrualClientError::Transport(e.to_string()))?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), client })
    }
}

#[async_trait]
impl AccrualClient for HttpAccrualClient {
    async fn get_order(&self, number: &str) -> Result<AccrualOrderState, AccrualClientError> {
        let url = format!("{}/api/orders/{number}", self.base_url);
        trace!("📞️ Querying accrual system: {url}");
        let response = self.client.get(&url).send().await.map_err(|e| AccrualClientError::Transport(e.to_string()))?;
        match response.status() {
            StatusCode::OK => {
                response.json::<AccrualOrderState>().await.map_err(|e| AccrualClientError::Decode(e.to_string()))
            },
            StatusCode::NO_CONTENT => Err(AccrualClientError::NotRegistered),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(Duration::ZERO);
                Err(AccrualClientError::RateLimited(retry_after))
            },
            status => Err(AccrualClientError::UnexpectedStatus(status.as_u16())),
        }
    }
}
