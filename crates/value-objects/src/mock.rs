//! # Mock Host
//!
//! [`MockHost`] implements [`Host`] entirely in memory and records every mutating
//! call, so a [`ValueObjectsBehavior`](crate::ValueObjectsBehavior) can be exercised
//! without an [`ActiveRecord`](crate::ActiveRecord) or a record class.
//!
//! ```rust
//! use std::rc::Rc;
//! use value_objects::mock::{HostCall, MockHost};
//! use value_objects::{Declarations, Registry, Slot, ValueObjectsBehavior};
//!
//! let mut host = MockHost::new("Customer")
//!     .with_declarations(Declarations::new().class("address", "Address"))
//!     .persisted();
//!
//! let mut behavior = ValueObjectsBehavior::new(Rc::new(Registry::new()));
//! // nothing is registered under "Address"
//! assert!(behavior.init_objects(&mut host, Slot::Current).is_err());
//! assert!(host.calls().is_empty());
//! # let _ = HostCall::AddErrors(0);
//! ```

use crate::attribute::AttributeValue;
use crate::declaration::Declarations;
use crate::host::Host;
use crate::object::ErrorBag;
use std::collections::BTreeMap;

/// A mutating call received by a [`MockHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    SetAttribute(String),
    SetOldAttribute(String),
    /// Number of fields in the merged bag.
    AddErrors(usize),
}

/// In-memory [`Host`] with call recording.
#[derive(Debug, Default)]
pub struct MockHost {
    class_name: String,
    attributes: BTreeMap<String, AttributeValue>,
    old_attributes: BTreeMap<String, AttributeValue>,
    persisted: bool,
    errors: ErrorBag,
    declarations: Option<Declarations>,
    calls: Vec<HostCall>,
}

impl MockHost {
    /// A new (not persisted) host without declarations.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    pub fn with_declarations(mut self, declarations: Declarations) -> Self {
        self.declarations = Some(declarations);
        self
    }

    /// Marks the host as loaded from storage.
    pub fn persisted(mut self) -> Self {
        self.persisted = true;
        self
    }

    pub fn errors(&self) -> &ErrorBag {
        &self.errors
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Host for MockHost {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    fn set_attribute(&mut self, name: &str, value: AttributeValue) {
        self.calls.push(HostCall::SetAttribute(name.to_string()));
        self.attributes.insert(name.to_string(), value);
    }

    fn old_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.old_attributes.get(name)
    }

    fn set_old_attribute(&mut self, name: &str, value: AttributeValue) {
        self.calls.push(HostCall::SetOldAttribute(name.to_string()));
        self.old_attributes.insert(name.to_string(), value);
    }

    fn is_new_record(&self) -> bool {
        !self.persisted
    }

    fn add_errors(&mut self, errors: &ErrorBag) {
        self.calls.push(HostCall::AddErrors(errors.len()));
        self.errors.merge(errors);
    }

    fn declarations(&self) -> Option<Declarations> {
        self.declarations.clone()
    }
}
