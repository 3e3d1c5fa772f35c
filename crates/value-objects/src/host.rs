//! # Host Records
//!
//! The [`Host`] trait is the contract the value object behavior relies on. It is
//! deliberately small: attribute slots (current and baseline), a change check, the
//! new-record flag, error merging and the optional declaration source.
//!
//! [`RecordState`] is the reference implementation. It keeps attributes in ordered
//! maps and takes its class-level metadata from a shared [`RecordClass`].

use crate::attribute::{AttributeValue, Attributes};
use crate::declaration::Declarations;
use crate::object::ErrorBag;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Contract between the behavior and the record it is attached to.
pub trait Host {
    /// Key of the per-class declaration cache.
    fn class_name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&AttributeValue>;

    /// Raw write into the current slot. No notifications are emitted.
    fn set_attribute(&mut self, name: &str, value: AttributeValue);

    fn old_attribute(&self, name: &str) -> Option<&AttributeValue>;

    fn set_old_attribute(&mut self, name: &str, value: AttributeValue);

    /// Whether the current value differs from the baseline.
    ///
    /// When both slots hold a value they are compared; otherwise the attribute is
    /// changed iff one of the two slots holds a value.
    fn is_attribute_changed(&self, name: &str) -> bool {
        match (self.attribute(name), self.old_attribute(name)) {
            (Some(current), Some(old)) => current != old,
            (current, old) => current.is_some() || old.is_some(),
        }
    }

    /// True until the record has been loaded from or written to storage.
    fn is_new_record(&self) -> bool;

    fn add_errors(&mut self, errors: &ErrorBag);

    /// Mapped attribute declarations, or `None` when the class declares none.
    fn declarations(&self) -> Option<Declarations>;
}

/// Produces the declarations of a record class for a given host instance.
pub type DeclarationSource = Rc<dyn Fn(&dyn Host) -> Declarations>;

/// Record-level validation run between the before and after validate notifications.
pub type RecordValidator = Rc<dyn Fn(&RecordState, &mut ErrorBag)>;

/// Class-level metadata shared by all records of one class.
pub struct RecordClass {
    name: String,
    columns: Vec<String>,
    safe_attributes: Option<Vec<String>>,
    declarations: Option<DeclarationSource>,
    validator: Option<RecordValidator>,
}

impl RecordClass {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            safe_attributes: None,
            declarations: None,
            validator: None,
        }
    }

    /// Restricts safe-only bulk assignment to these attributes. By default every
    /// column is safe.
    pub fn with_safe_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.safe_attributes = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_declarations(mut self, source: impl Fn(&dyn Host) -> Declarations + 'static) -> Self {
        self.declarations = Some(Rc::new(source));
        self
    }

    pub fn with_validator(mut self, validator: impl Fn(&RecordState, &mut ErrorBag) + 'static) -> Self {
        self.validator = Some(Rc::new(validator));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn is_safe(&self, name: &str) -> bool {
        match &self.safe_attributes {
            Some(safe) => safe.iter().any(|attribute| attribute == name),
            None => self.has_column(name),
        }
    }

    pub(crate) fn validator(&self) -> Option<&RecordValidator> {
        self.validator.as_ref()
    }
}

impl fmt::Debug for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordClass")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("safe_attributes", &self.safe_attributes)
            .field("declarations", &self.declarations.is_some())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Attribute storage of one record instance.
#[derive(Debug, Clone)]
pub struct RecordState {
    class: Rc<RecordClass>,
    attributes: BTreeMap<String, AttributeValue>,
    old_attributes: BTreeMap<String, AttributeValue>,
    new_record: bool,
    errors: ErrorBag,
}

impl RecordState {
    /// A new record with every column set to `null`.
    pub fn new(class: Rc<RecordClass>) -> Self {
        let attributes = class
            .columns()
            .iter()
            .map(|column| (column.clone(), AttributeValue::Json(Value::Null)))
            .collect();
        Self {
            class,
            attributes,
            old_attributes: BTreeMap::new(),
            new_record: true,
            errors: ErrorBag::new(),
        }
    }

    pub fn class(&self) -> &Rc<RecordClass> {
        &self.class
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.class.has_column(name)
    }

    /// The raw JSON held by a column, if it is not a live object.
    pub fn json(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).and_then(AttributeValue::as_json)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &String> {
        self.attributes.keys()
    }

    pub fn errors(&self) -> &ErrorBag {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorBag {
        &mut self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn set_new_record(&mut self, new_record: bool) {
        self.new_record = new_record;
    }

    /// Writes a column. Returns `false` when `name` is not a column.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if !self.has_attribute(name) {
            return false;
        }
        self.attributes
            .insert(name.to_string(), AttributeValue::Json(value));
        true
    }

    /// Writes every column in `values`; with `safe_only`, only safe attributes.
    /// Other names are skipped. Returns the number of columns written.
    pub fn assign_all(&mut self, values: &Attributes, safe_only: bool) -> usize {
        let mut written = 0;
        for (name, value) in values {
            let allowed = if safe_only {
                self.class.is_safe(name)
            } else {
                self.has_attribute(name)
            };
            if allowed {
                self.attributes
                    .insert(name.clone(), AttributeValue::Json(value.clone()));
                written += 1;
            } else {
                debug!(record = %self.class.name(), attribute = %name, "Skipping unsafe attribute");
            }
        }
        written
    }

    /// Fills current and baseline slots from a stored row and marks the record persisted.
    pub fn load_row(&mut self, row: &Attributes) {
        for (name, value) in row {
            if !self.has_attribute(name) {
                debug!(record = %self.class.name(), attribute = %name, "Ignoring unknown column");
                continue;
            }
            self.attributes
                .insert(name.clone(), AttributeValue::Json(value.clone()));
            self.old_attributes
                .insert(name.clone(), AttributeValue::Json(value.clone()));
        }
        self.new_record = false;
    }

    /// Marks the record persisted with the current values as baseline.
    pub fn mark_persisted(&mut self) {
        self.old_attributes = self.attributes.clone();
        self.new_record = false;
    }

    pub fn dirty_attributes(&self) -> Vec<String> {
        self.attributes
            .keys()
            .filter(|name| self.is_attribute_changed(name))
            .cloned()
            .collect()
    }

    /// Row for storage. Live objects are rendered as plain JSON.
    pub fn to_row(&self, names: Option<&[String]>) -> Attributes {
        self.attributes
            .iter()
            .filter(|(name, _)| names.map_or(true, |names| names.contains(name)))
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }
}

impl Host for RecordState {
    fn class_name(&self) -> &str {
        self.class.name()
    }

    fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    fn set_attribute(&mut self, name: &str, value: AttributeValue) {
        self.attributes.insert(name.to_string(), value);
    }

    fn old_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.old_attributes.get(name)
    }

    fn set_old_attribute(&mut self, name: &str, value: AttributeValue) {
        self.old_attributes.insert(name.to_string(), value);
    }

    fn is_new_record(&self) -> bool {
        self.new_record
    }

    fn add_errors(&mut self, errors: &ErrorBag) {
        self.errors.merge(errors);
    }

    fn declarations(&self) -> Option<Declarations> {
        self.class
            .declarations
            .as_ref()
            .map(|source| source(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn class() -> Rc<RecordClass> {
        Rc::new(RecordClass::new("Customer", ["id", "name", "address"]).with_safe_attributes(["name"]))
    }

    #[test]
    fn test_new_record_has_null_columns() {
        let state = RecordState::new(class());
        assert!(state.is_new_record());
        assert_eq!(state.json("name"), Some(&Value::Null));
        assert!(state.declarations().is_none());
    }

    #[test]
    fn test_safe_only_assignment_skips_unsafe_names() {
        let mut state = RecordState::new(class());
        let values = json!({"name": "Ada", "id": 7, "address.city": "Oslo"});

        let written = state.assign_all(values.as_object().unwrap(), true);
        assert_eq!(written, 1);
        assert_eq!(state.json("id"), Some(&Value::Null));

        let written = state.assign_all(values.as_object().unwrap(), false);
        assert_eq!(written, 2);
        assert_eq!(state.json("id"), Some(&json!(7)));
    }

    #[test]
    fn test_change_detection_follows_baseline() {
        let mut state = RecordState::new(class());
        state.load_row(json!({"id": 1, "name": "Ada"}).as_object().unwrap());
        assert!(!state.is_new_record());
        assert!(!state.is_attribute_changed("name"));
        // never loaded, current is null: present on one side only
        assert!(state.is_attribute_changed("address"));

        state.assign("name", json!("Grace"));
        assert_eq!(state.dirty_attributes(), vec!["address", "name"]);

        state.mark_persisted();
        assert!(state.dirty_attributes().is_empty());
    }
}
