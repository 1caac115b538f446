mod amount;
mod luhn;

pub mod op;
mod secret;

pub use amount::{Amount, AmountConversionError};
pub use luhn::is_valid_order_number;
pub use secret::Secret;
