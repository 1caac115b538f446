pub mod orders;
pub mod rewards;

/// SQLSTATE code Postgres reports when a unique constraint rejects an insert.
const UNIQUE_VIOLATION: &str = "23505";

pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().and_then(|db| db.code()).is_some_and(|code| code == UNIQUE_VIOLATION)
}
