//! Request-level tests for the accrual routes, run against a mocked store.
mod helpers;
mod mocks;
mod orders;
mod rewards;
