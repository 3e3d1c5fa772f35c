use serde::{Deserialize, Serialize};
use value_objects::{ErrorBag, Validate};

/// Postal address stored in the `address` column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: String,
}

impl Validate for Address {
    fn validate(&self, errors: &mut ErrorBag) {
        if self.city.trim().is_empty() {
            errors.add("city", "City cannot be blank.");
        }
        if !self.zip.is_empty()
            && (self.zip.len() != 5 || !self.zip.chars().all(|c| c.is_ascii_digit()))
        {
            errors.add("zip", "Zip must be five digits.");
        }
    }
}
