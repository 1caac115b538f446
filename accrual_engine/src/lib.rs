//! Core logic for the merchant-facing accrual service.
//!
//! Orders arrive with their goods, reward rules arrive from the merchant, and the [`rules`] module turns the
//! two into a single points amount. Registration is cheap: [`OrderApi::register`] persists the order and
//! returns immediately, and a background task drives the computation through `PROCESSING` into `PROCESSED`
//! or `INVALID`. Persistence hides behind [`traits::AccrualStore`], with [`PgStore`] as the Postgres
//! implementation.

pub mod rules;
pub mod traits;
pub mod types;

mod order_service;
mod postgres;
mod reward_service;

pub use order_service::{OrderApi, OrderError};
pub use postgres::PgStore;
pub use reward_service::{RewardApi, RewardError};

#[cfg(test)]
pub(crate) mod test_utils;
