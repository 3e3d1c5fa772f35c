use serde::{Deserialize, Serialize};
use value_objects::{share, ErrorBag, SharedObject, Validate, ValueObjectList};

/// A label attached to customers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Tag {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: None,
        }
    }
}

impl Validate for Tag {
    fn validate(&self, errors: &mut ErrorBag) {
        if self.label.trim().is_empty() {
            errors.add("label", "Label cannot be blank.");
        }
    }
}

/// The tag list shared by every customer of one record class.
pub fn tag_list(tags: Vec<Tag>) -> SharedObject {
    share(ValueObjectList::from_items(tags))
}
