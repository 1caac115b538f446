//! Request-level tests for every route, run against a mocked store the same way the real handlers run
//! against Postgres.
mod balance;
mod helpers;
mod mocks;
mod orders;
mod users;
