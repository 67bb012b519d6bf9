use serde::{Deserialize, Serialize};
use trek_shared::Masked;
use uuid::Uuid;

/// Contact details captured for a customer not yet on file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: Masked<String>,
    #[serde(default)]
    pub phone: Option<Masked<String>>,
}

impl NewCustomer {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: Masked::from(email),
            phone: None,
        }
    }

    /// Required fields that are blank. Email must also look like an address.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.first_name.trim().is_empty() {
            missing.push("first_name");
        }
        if self.last_name.trim().is_empty() {
            missing.push("last_name");
        }
        let email = self.email.expose().trim();
        if email.is_empty() || !email.contains('@') {
            missing.push("email");
        }
        missing
    }

    pub fn normalized_email(&self) -> String {
        self.email.expose().trim().to_lowercase()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Who the booking is for: a customer already on file, or a new one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustomerRef {
    Existing { customer_id: Uuid },
    New(NewCustomer),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_customer_required_fields() {
        let complete = NewCustomer::new("Ana", "Lima", "ana@example.com");
        assert!(complete.missing_fields().is_empty());

        let blank = NewCustomer::new(" ", "", "not-an-email");
        assert_eq!(blank.missing_fields(), vec!["first_name", "last_name", "email"]);
    }

    #[test]
    fn test_customer_ref_wire_format() {
        let id = Uuid::new_v4();
        let existing = serde_json::to_value(CustomerRef::Existing { customer_id: id }).unwrap();
        assert_eq!(existing["kind"], "existing");
        assert_eq!(existing["customer_id"], id.to_string());

        let json = r#"{"kind":"new","first_name":"Ana","last_name":"Lima","email":"ana@example.com"}"#;
        let parsed: CustomerRef = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, CustomerRef::New(NewCustomer::new("Ana", "Lima", "ana@example.com")));
    }
}
