//! The customer record class.
//!
//! | column | content |
//! |--------|---------|
//! | `id` | assigned by the store |
//! | `name` | plain text |
//! | `address` | encoded [`Address`] |
//! | `payment_method` | `card` or `invoice` |
//! | `payment` | encoded [`CardPayment`] or [`InvoicePayment`], by `payment_method` |
//! | `tags` | encoded [`Tag`] list, shared by all customers of the class |

use super::address::Address;
use super::payment::{payment_class, CardPayment, InvoicePayment, PAYMENT_METHOD};
use super::tag::{tag_list, Tag};
use serde_json::Value;
use std::rc::Rc;
use value_objects::{
    BehaviorConfig, Declarations, DependentProperty, RecordClass, Registry, Result,
};

pub const CUSTOMER: &str = "Customer";

pub const COLUMNS: [&str; 6] = ["id", "name", "address", PAYMENT_METHOD, "payment", "tags"];

/// Registry with every value object class a customer can hold.
pub fn customer_registry() -> Rc<Registry> {
    let mut registry = Registry::new();
    registry
        .register_model::<Address>()
        .register_model::<CardPayment>()
        .register_model::<InvoicePayment>();
    Rc::new(registry)
}

/// Customers switch payment objects when the payment method changes.
pub fn customer_config() -> BehaviorConfig {
    BehaviorConfig::default().with_refresh_dependents(true)
}

/// The customer class. `tags` is the list every customer of this class shares.
pub fn customer_class(tags: Vec<Tag>) -> Result<Rc<RecordClass>> {
    let payment = DependentProperty::builder(PAYMENT_METHOD)
        .getter(payment_class)
        .build()?;
    let declarations = Declarations::new()
        .class("address", "Address")
        .dependent("payment", payment)
        .shared("tags", tag_list(tags));

    let class = RecordClass::new(CUSTOMER, COLUMNS)
        .with_safe_attributes(["name", "address", PAYMENT_METHOD, "payment", "tags"])
        .with_declarations(move |_| declarations.clone())
        .with_validator(|state, errors| {
            let name = state.json("name").and_then(Value::as_str).unwrap_or_default();
            if name.trim().is_empty() {
                errors.add("name", "Name cannot be blank.");
            }
        });
    Ok(Rc::new(class))
}
