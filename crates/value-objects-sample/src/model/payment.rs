//! Payment details. Which type is stored in the `payment` column depends on the
//! customer's `payment_method` column.

use serde::{Deserialize, Serialize};
use value_objects::{AttributeValue, ErrorBag, Host, Validate};

/// Column holding the payment method name.
pub const PAYMENT_METHOD: &str = "payment_method";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPayment {
    pub holder: String,
    pub number: String,
}

impl Validate for CardPayment {
    fn validate(&self, errors: &mut ErrorBag) {
        let digits = self.number.chars().filter(char::is_ascii_digit).count();
        if digits != self.number.len() || !(12..=19).contains(&digits) {
            errors.add("number", "Card number must have 12 to 19 digits.");
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoicePayment {
    pub email: String,
    #[serde(default)]
    pub terms_days: u32,
}

impl Validate for InvoicePayment {
    fn validate(&self, errors: &mut ErrorBag) {
        if !self.email.contains('@') {
            errors.add("email", "Email is not a valid email address.");
        }
        if self.terms_days > 90 {
            errors.add("terms_days", "Payment terms cannot exceed 90 days.");
        }
    }
}

/// Class name of the payment object for the host's payment method.
///
/// Unknown methods resolve to the method name itself, which the registry then
/// reports as an unknown class.
pub fn payment_class(host: &dyn Host) -> String {
    match host.attribute(PAYMENT_METHOD).and_then(AttributeValue::as_str) {
        Some("card") => "CardPayment".to_string(),
        Some("invoice") => "InvoicePayment".to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
