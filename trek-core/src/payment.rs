use serde::{Deserialize, Serialize};

/// How an operator booking is settled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Settled through the card processor; `reference` is the processor's id
    Processor { reference: String },
    Cash,
    BankTransfer,
}

impl PaymentMethod {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Processor { .. } => "PROCESSOR",
            PaymentMethod::Cash => "CASH",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
        }
    }

    pub fn external_reference(&self) -> Option<&str> {
        match self {
            PaymentMethod::Processor { reference } => Some(reference.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Pending,
}

impl PaymentStatus {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Pending => "PENDING",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentBlock {
    #[serde(flatten)]
    pub method: PaymentMethod,
    #[serde(default)]
    pub status: PaymentStatus,
}

impl Default for PaymentBlock {
    fn default() -> Self {
        Self {
            method: PaymentMethod::Cash,
            status: PaymentStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_block_wire_format() {
        let block = PaymentBlock {
            method: PaymentMethod::Processor { reference: "pi_123".to_string() },
            status: PaymentStatus::Paid,
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["method"], "PROCESSOR");
        assert_eq!(json["reference"], "pi_123");
        assert_eq!(json["status"], "PAID");

        let back: PaymentBlock = serde_json::from_value(json).unwrap();
        assert_eq!(back, block);
        assert_eq!(back.method.external_reference(), Some("pi_123"));
    }

    #[test]
    fn test_cash_has_no_external_reference() {
        let block: PaymentBlock = serde_json::from_str(r#"{"method":"CASH"}"#).unwrap();
        assert_eq!(block.method, PaymentMethod::Cash);
        assert_eq!(block.status, PaymentStatus::Pending);
        assert_eq!(block.method.external_reference(), None);
    }
}
