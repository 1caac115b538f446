//! Core logic for the customer-facing loyalty service.
//!
//! The engine is split the same way the database-backed services in this workspace always are:
//! 1. Persistence. The [`traits::LoyaltyStore`] trait is the only way the rest of the system touches storage, and
//!    [`PgStore`] is the Postgres implementation. The data types that cross that boundary live in [`db_types`].
//! 2. Business logic. [`OrderApi`] implements order claiming, [`BalanceApi`] the balance/withdrawal engine, and the
//!    [`accrual`] module holds the client for the external accrual system together with the worker pool that polls
//!    it and drives order status transitions.
//!
//! The HTTP surface is a separate crate; nothing in here knows about request decoding or status codes.

pub mod accrual;
pub mod db_types;
pub mod traits;

mod balance_service;
mod order_service;
mod postgres;

pub use balance_service::{BalanceApi, BalanceError};
pub use order_service::{OrderApi, UploadError};
pub use postgres::PgStore;

#[cfg(test)]
pub(crate) mod test_utils;
