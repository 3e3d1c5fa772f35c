//! List-shaped value objects.
//!
//! A [`ValueObjectList`] is stored as a JSON array. Its attributes are addressed by
//! decimal index, so `"tags.1.label"` reaches the label of the second item.
//! When a list is declared as a prebuilt instance it is shared by every record
//! that uses the declaration.

use crate::attribute::Attributes;
use crate::error::{Result, ValueObjectError};
use crate::object::{merge, ErrorBag, Validate, ValueObject};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::fmt::Debug;

/// An ordered collection of serde items acting as one value object.
///
/// Item errors are keyed `index<separator>field`. The separator is `.` until the
/// owning behavior hands over its own.
#[derive(Debug, Clone)]
pub struct ValueObjectList<T> {
    items: Vec<T>,
    old: Option<Attributes>,
    errors: ErrorBag,
    separator: String,
}

impl<T> Default for ValueObjectList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ValueObjectList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            old: None,
            errors: ErrorBag::new(),
            separator: ".".to_string(),
        }
    }

    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            items,
            ..Self::new()
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> ValueObjectList<T>
where
    T: Serialize + DeserializeOwned + Default + Validate + Debug + 'static,
{
    fn item_json(&self, item: &T) -> Value {
        serde_json::to_value(item).unwrap_or(Value::Null)
    }

    fn assign_item(&mut self, index: usize, value: Value) -> Result<()> {
        let class = self.class_name().to_string();
        let mut current = match self.items.get(index) {
            Some(item) => self.item_json(item),
            None => serde_json::to_value(T::default())
                .map_err(|source| ValueObjectError::Assign {
                    class: class.clone(),
                    source,
                })?,
        };
        merge(&mut current, value).map_err(|message| ValueObjectError::assign(&class, message))?;
        let item: T = serde_json::from_value(current)
            .map_err(|source| ValueObjectError::Assign { class, source })?;
        match self.items.get_mut(index) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
        Ok(())
    }
}

impl<T> ValueObject for ValueObjectList<T>
where
    T: Serialize + DeserializeOwned + Default + Validate + Debug + 'static,
{
    fn class_name(&self) -> &str {
        "ValueObjectList"
    }

    fn attributes(&self) -> Attributes {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), self.item_json(item)))
            .collect()
    }

    /// Keys are item indexes. An index equal to the current length appends a new
    /// item; larger or non-numeric keys are rejected.
    fn set_attributes(&mut self, values: Attributes) -> Result<()> {
        let mut entries = Vec::with_capacity(values.len());
        for (key, value) in values {
            let index: usize = key.parse().map_err(|_| {
                ValueObjectError::assign(self.class_name(), format!("`{key}` is not an item index"))
            })?;
            entries.push((index, value));
        }
        entries.sort_by_key(|(index, _)| *index);

        for (index, value) in entries {
            if index > self.items.len() {
                return Err(ValueObjectError::assign(
                    self.class_name(),
                    format!("index {index} is past the end of a list of {}", self.items.len()),
                ));
            }
            self.assign_item(index, value)?;
        }
        Ok(())
    }

    fn old_attributes(&self) -> Option<&Attributes> {
        self.old.as_ref()
    }

    fn set_old_attributes(&mut self, values: Attributes) {
        self.old = Some(values);
    }

    fn validate(&mut self) -> bool {
        self.errors.clear();
        for (index, item) in self.items.iter().enumerate() {
            let mut item_errors = ErrorBag::new();
            item.validate(&mut item_errors);
            self.errors
                .merge_prefixed(&index.to_string(), &self.separator, &item_errors);
        }
        self.errors.is_empty()
    }

    fn errors(&self) -> &ErrorBag {
        &self.errors
    }

    fn set_separator(&mut self, separator: &str) {
        self.separator = separator.to_string();
    }

    fn to_json(&self) -> Value {
        Value::Array(self.items.iter().map(|item| self.item_json(item)).collect())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Tag {
        label: String,
        #[serde(default)]
        color: Option<String>,
    }

    impl Validate for Tag {
        fn validate(&self, errors: &mut ErrorBag) {
            if self.label.is_empty() {
                errors.add("label", "Label cannot be blank.");
            }
        }
    }

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_list_encodes_as_array() {
        let list = ValueObjectList::from_items(vec![Tag {
            label: "vip".into(),
            color: None,
        }]);
        assert_eq!(list.to_json(), json!([{"label": "vip", "color": null}]));
        assert_eq!(list.class_name(), "ValueObjectList");
    }

    #[test]
    fn test_index_keys_update_and_append() {
        let mut list = ValueObjectList::from_items(vec![Tag {
            label: "vip".into(),
            color: None,
        }]);

        list.set_attributes(attrs(json!({
            "0": {"color": "gold"},
            "1": {"label": "new"}
        })))
        .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.items()[0].label, "vip");
        assert_eq!(list.items()[0].color.as_deref(), Some("gold"));
        assert_eq!(list.items()[1].label, "new");
    }

    #[test]
    fn test_bad_keys_are_rejected() {
        let mut list = ValueObjectList::<Tag>::new();
        assert!(list.set_attributes(attrs(json!({"first": {}}))).is_err());
        assert!(list.set_attributes(attrs(json!({"3": {"label": "x"}}))).is_err());
        assert!(list.is_empty());
    }

    #[test]
    fn test_item_errors_are_namespaced_by_index() {
        let mut list = ValueObjectList::from_items(vec![
            Tag {
                label: "ok".into(),
                color: None,
            },
            Tag::default(),
        ]);

        assert!(!list.validate());
        assert!(list.errors().get("1.label").is_some());
        assert!(list.errors().get("0.label").is_none());
    }

    #[test]
    fn test_item_errors_follow_separator() {
        let mut list = ValueObjectList::from_items(vec![Tag::default()]);
        list.set_separator("/");

        assert!(!list.validate());
        assert!(list.errors().get("0/label").is_some());
        assert!(list.errors().get("0.label").is_none());
    }
}
