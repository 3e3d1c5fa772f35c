//! Attributes whose sub-object class depends on the host record.
//!
//! A payment column, for example, may hold a card payment or an invoice payment
//! depending on the record's `payment_method` column. [`DependentClass`] resolves
//! the class per host instance; [`DependentProperty`] implements it with closures.

use crate::error::{Result, ValueObjectError};
use crate::host::Host;
use std::fmt;
use std::rc::Rc;

/// Resolves the sub-object class of a mapped attribute per host instance.
pub trait DependentClass {
    /// The host attribute the class depends on.
    fn source_attribute(&self) -> &str;

    fn class_name(&self, host: &dyn Host) -> String;

    /// Whether a sub-object can be created right now. By default the source
    /// attribute must be non-empty.
    fn can_get(&self, host: &dyn Host) -> bool {
        source_present(host, self.source_attribute())
    }

    /// Whether the source attribute changed against its baseline.
    fn is_changed(&self, host: &dyn Host) -> bool {
        host.is_attribute_changed(self.source_attribute())
    }
}

fn source_present(host: &dyn Host, attribute: &str) -> bool {
    host.attribute(attribute).is_some_and(|value| !value.is_empty())
}

type ClassGetter = Rc<dyn Fn(&dyn Host) -> String>;
type Predicate = Rc<dyn Fn(&dyn Host) -> bool>;

/// Closure-backed [`DependentClass`].
///
/// ```rust
/// use value_objects::{DependentClass, DependentProperty};
///
/// let payment = DependentProperty::builder("payment_method")
///     .getter(|host| match host.attribute("payment_method").and_then(|v| v.as_str()) {
///         Some("invoice") => "InvoicePayment".to_string(),
///         _ => "CardPayment".to_string(),
///     })
///     .build()
///     .unwrap();
/// assert_eq!(payment.source_attribute(), "payment_method");
///
/// assert!(DependentProperty::builder("payment_method").build().is_err());
/// ```
#[derive(Clone)]
pub struct DependentProperty {
    attribute: String,
    getter: ClassGetter,
    can_get: Option<Predicate>,
    is_changed: Option<Predicate>,
}

impl DependentProperty {
    pub fn builder(attribute: impl Into<String>) -> DependentPropertyBuilder {
        DependentPropertyBuilder {
            attribute: attribute.into(),
            getter: None,
            can_get: None,
            is_changed: None,
        }
    }
}

impl DependentClass for DependentProperty {
    fn source_attribute(&self) -> &str {
        &self.attribute
    }

    fn class_name(&self, host: &dyn Host) -> String {
        (self.getter)(host)
    }

    fn can_get(&self, host: &dyn Host) -> bool {
        match &self.can_get {
            Some(predicate) => predicate(host),
            None => source_present(host, &self.attribute),
        }
    }

    fn is_changed(&self, host: &dyn Host) -> bool {
        match &self.is_changed {
            Some(predicate) => predicate(host),
            None => host.is_attribute_changed(&self.attribute),
        }
    }
}

impl fmt::Debug for DependentProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependentProperty")
            .field("attribute", &self.attribute)
            .field("custom_can_get", &self.can_get.is_some())
            .field("custom_is_changed", &self.is_changed.is_some())
            .finish()
    }
}

/// Builder for [`DependentProperty`]. The getter is mandatory.
pub struct DependentPropertyBuilder {
    attribute: String,
    getter: Option<ClassGetter>,
    can_get: Option<Predicate>,
    is_changed: Option<Predicate>,
}

impl DependentPropertyBuilder {
    pub fn getter(mut self, getter: impl Fn(&dyn Host) -> String + 'static) -> Self {
        self.getter = Some(Rc::new(getter));
        self
    }

    pub fn can_get(mut self, predicate: impl Fn(&dyn Host) -> bool + 'static) -> Self {
        self.can_get = Some(Rc::new(predicate));
        self
    }

    pub fn is_changed(mut self, predicate: impl Fn(&dyn Host) -> bool + 'static) -> Self {
        self.is_changed = Some(Rc::new(predicate));
        self
    }

    pub fn build(self) -> Result<DependentProperty> {
        if self.attribute.is_empty() {
            return Err(ValueObjectError::Configuration(
                "the source attribute must not be empty".into(),
            ));
        }
        let getter = self.getter.ok_or_else(|| {
            ValueObjectError::Configuration(format!(
                "the getter for `{}` should be callable",
                self.attribute
            ))
        })?;
        Ok(DependentProperty {
            attribute: self.attribute,
            getter,
            can_get: self.can_get,
            is_changed: self.is_changed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{RecordClass, RecordState};
    use serde_json::json;

    fn state() -> RecordState {
        RecordState::new(Rc::new(RecordClass::new(
            "Order",
            ["payment_method", "payment"],
        )))
    }

    fn payment() -> DependentProperty {
        DependentProperty::builder("payment_method")
            .getter(|host| {
                match host.attribute("payment_method").and_then(|value| value.as_str()) {
                    Some("invoice") => "InvoicePayment".into(),
                    _ => "CardPayment".into(),
                }
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_getter_is_configuration_error() {
        let err = DependentProperty::builder("payment_method").build().unwrap_err();
        assert!(matches!(err, ValueObjectError::Configuration(_)));

        let err = DependentProperty::builder("")
            .getter(|_| "CardPayment".into())
            .build()
            .unwrap_err();
        assert!(matches!(err, ValueObjectError::Configuration(_)));
    }

    #[test]
    fn test_default_can_get_requires_non_empty_source() {
        let property = payment();
        let mut host = state();
        assert!(!property.can_get(&host));

        host.assign("payment_method", json!(""));
        assert!(!property.can_get(&host));

        host.assign("payment_method", json!("invoice"));
        assert!(property.can_get(&host));
        assert_eq!(property.class_name(&host), "InvoicePayment");
    }

    #[test]
    fn test_default_is_changed_uses_host_baseline() {
        let property = payment();
        let mut host = state();
        host.load_row(json!({"payment_method": "card"}).as_object().unwrap());
        assert!(!property.is_changed(&host));

        host.assign("payment_method", json!("invoice"));
        assert!(property.is_changed(&host));
    }

    #[test]
    fn test_custom_predicates_override_defaults() {
        let property = DependentProperty::builder("payment_method")
            .getter(|_| "CardPayment".into())
            .can_get(|_| true)
            .is_changed(|_| false)
            .build()
            .unwrap();
        let mut host = state();
        host.assign("payment_method", json!("invoice"));

        assert!(property.can_get(&host));
        assert!(!property.is_changed(&host));
    }

    struct FixedPayment;

    impl DependentClass for FixedPayment {
        fn source_attribute(&self) -> &str {
            "payment_method"
        }

        fn class_name(&self, _host: &dyn Host) -> String {
            "CardPayment".into()
        }
    }

    #[test]
    fn test_trait_defaults_match_closure_defaults() {
        let property = payment();
        let mut host = state();
        for method in [json!(null), json!(""), json!(0), json!("card")] {
            host.assign("payment_method", method);
            assert_eq!(FixedPayment.can_get(&host), property.can_get(&host));
            assert_eq!(FixedPayment.is_changed(&host), property.is_changed(&host));
        }
        assert!(FixedPayment.can_get(&host));
    }
}
