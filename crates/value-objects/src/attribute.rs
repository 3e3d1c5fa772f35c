//! Attribute values as seen by a host record.
//!
//! A mapped attribute lives in one of two shapes in the host's storage: raw column
//! data (the encoded JSON string, or anything else the column held) and the live
//! sub-object. [`AttributeValue`] holds either one.

use crate::object::ValueObject;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// A structured mapping of attribute names to JSON values.
pub type Attributes = serde_json::Map<String, Value>;

/// A live sub-object shared between its behavior and the host's attribute slot.
pub type SharedObject = Rc<RefCell<dyn ValueObject>>;

/// Wraps a concrete value object into a [`SharedObject`].
pub fn share<O: ValueObject>(object: O) -> SharedObject {
    Rc::new(RefCell::new(object))
}

/// Turns a structured JSON value into [`Attributes`].
///
/// Arrays become index-keyed mappings (`"0"`, `"1"`, ...). Scalars and `null`
/// are not structured and yield `None`.
pub fn into_attributes(value: Value) -> Option<Attributes> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) => Some(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
        ),
        _ => None,
    }
}

/// True for JSON objects and arrays.
pub fn is_structured(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

/// The value stored in a host attribute slot.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    /// Raw column data.
    Json(Value),
    /// A live sub-object.
    Object(SharedObject),
}

impl AttributeValue {
    /// Emptiness in the sense used by dependent property defaults.
    ///
    /// `null`, `false`, zero, `""`, `[]` and `{}` are empty. A live object never is.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Object(_) => false,
            Self::Json(value) => match value {
                Value::Null => true,
                Value::Bool(flag) => !flag,
                Value::Number(number) => number.as_f64() == Some(0.0),
                Value::String(text) => text.is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::Object(map) => map.is_empty(),
            },
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Object(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }

    pub fn as_object(&self) -> Option<&SharedObject> {
        match self {
            Self::Object(object) => Some(object),
            Self::Json(_) => None,
        }
    }

    /// Plain JSON for this value; live objects are rendered through their attributes.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Object(object) => object.borrow().to_json(),
        }
    }
}

/// Raw values compare by content, objects by identity.
impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Json(left), Self::Json(right)) => left == right,
            (Self::Object(left), Self::Object(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<SharedObject> for AttributeValue {
    fn from(object: SharedObject) -> Self {
        Self::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Model, Validate};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Point {
        x: i32,
    }

    impl Validate for Point {}

    #[test]
    fn test_emptiness_follows_column_semantics() {
        for empty in [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})] {
            assert!(AttributeValue::Json(empty.clone()).is_empty(), "{empty} should be empty");
        }
        for filled in [json!("card"), json!(1), json!(true), json!({"a": 1})] {
            assert!(!AttributeValue::Json(filled.clone()).is_empty(), "{filled} should not be empty");
        }
        assert!(!AttributeValue::Object(share(Model::<Point>::default())).is_empty());
    }

    #[test]
    fn test_objects_compare_by_identity() {
        let first = share(Model::<Point>::default());
        let second = share(Model::<Point>::default());

        assert_eq!(
            AttributeValue::Object(first.clone()),
            AttributeValue::Object(first.clone())
        );
        assert_ne!(AttributeValue::Object(first.clone()), AttributeValue::Object(second));
        assert_ne!(AttributeValue::Object(first), AttributeValue::Json(json!({"x": 0})));
    }

    #[test]
    fn test_arrays_become_index_keyed_attributes() {
        let attributes = into_attributes(json!(["a", "b"])).unwrap();
        assert_eq!(attributes.get("1"), Some(&json!("b")));
        assert!(into_attributes(json!("scalar")).is_none());
    }
}
