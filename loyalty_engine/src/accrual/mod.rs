//! The loyalty service's link to the external accrual system: the HTTP client that queries it and the worker
//! pool that polls every unterminated order and drives status transitions.
mod client;
mod poller;

pub use client::HttpAccrualClient;
pub use poller::{PollerHandle, WorkerPool, DEFAULT_POLL_INTERVAL, DEFAULT_WORKERS};
