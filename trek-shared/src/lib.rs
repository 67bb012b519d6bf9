pub mod models;
pub mod money;
pub mod pii;
pub mod time;

pub use money::{round_currency, Money};
pub use pii::Masked;
