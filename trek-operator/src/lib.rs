pub mod builder;
pub mod rules;

pub use builder::{OperatorDraftBuilder, OperatorStep, SubmitError};
pub use rules::{price_record, validate_record, ValidationError};
