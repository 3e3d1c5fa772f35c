//! # Sub-objects
//!
//! [`ValueObject`] is the contract every nested value must satisfy: it exposes its
//! attributes, accepts bulk assignment from a structured mapping, keeps a baseline
//! snapshot for change detection and validates itself into an [`ErrorBag`].
//!
//! [`Model`] adapts any serde type to that contract, so most value objects are
//! plain structs:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use value_objects::{ErrorBag, Model, Validate, ValueObject};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Address {
//!     city: String,
//!     zip: String,
//! }
//!
//! impl Validate for Address {
//!     fn validate(&self, errors: &mut ErrorBag) {
//!         if self.city.is_empty() {
//!             errors.add("city", "City cannot be blank.");
//!         }
//!     }
//! }
//!
//! let mut address = Model::new(Address::default());
//! let values = serde_json::json!({"zip": "0150"});
//! address.set_attributes(values.as_object().unwrap().clone()).unwrap();
//! assert_eq!(address.data().zip, "0150");
//! assert!(!address.validate());
//! ```

use crate::attribute::Attributes;
use crate::error::{Result, ValueObjectError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::warn;

/// Validation messages keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorBag(BTreeMap<String, Vec<String>>);

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Appends all messages of `other`.
    pub fn merge(&mut self, other: &ErrorBag) {
        for (field, messages) in other.iter() {
            self.0
                .entry(field.clone())
                .or_default()
                .extend(messages.iter().cloned());
        }
    }

    /// Appends all messages of `other` under `prefix<separator>field` keys.
    pub fn merge_prefixed(&mut self, prefix: &str, separator: &str, other: &ErrorBag) {
        for (field, messages) in other.iter() {
            self.0
                .entry(format!("{prefix}{separator}{field}"))
                .or_default()
                .extend(messages.iter().cloned());
        }
    }
}

/// A nested, independently validatable value mapped onto one host attribute.
pub trait ValueObject: Debug + Any {
    /// Name under which the class is registered.
    fn class_name(&self) -> &str;

    /// Current attributes as a structured mapping.
    fn attributes(&self) -> Attributes;

    /// Bulk setter: applies `values` on top of the current state.
    ///
    /// Fields not named in `values` keep their value. Nested mappings are merged
    /// recursively.
    fn set_attributes(&mut self, values: Attributes) -> Result<()>;

    /// Baseline snapshot, if one was taken.
    fn old_attributes(&self) -> Option<&Attributes>;

    fn set_old_attributes(&mut self, values: Attributes);

    /// Runs validation, replacing [`errors`](Self::errors). Returns `true` when valid.
    fn validate(&mut self) -> bool;

    fn errors(&self) -> &ErrorBag;

    /// Separator for error keys of nested items. Flat objects ignore it.
    fn set_separator(&mut self, _separator: &str) {}

    /// The form handed to the codec.
    fn to_json(&self) -> Value {
        Value::Object(self.attributes())
    }

    /// True when the attributes differ from the baseline snapshot (or none was taken).
    fn is_changed(&self) -> bool {
        self.old_attributes()
            .map_or(true, |old| *old != self.attributes())
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Field-level validation for types wrapped in [`Model`].
pub trait Validate {
    fn validate(&self, _errors: &mut ErrorBag) {}
}

/// Deep-merges `patch` into `target`.
///
/// Objects merge key by key. An object patch applied to an array addresses items
/// by decimal index; the index equal to the length appends, anything past it is
/// rejected. Anything else replaces.
pub(crate) fn merge(target: &mut Value, patch: Value) -> std::result::Result<(), String> {
    match (target, patch) {
        (Value::Object(current), Value::Object(patch)) => {
            for (key, value) in patch {
                match current.get_mut(&key) {
                    Some(existing) => merge(existing, value)?,
                    None => {
                        current.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(items), Value::Object(patch))
            if patch.keys().all(|key| key.parse::<usize>().is_ok()) =>
        {
            let mut entries: Vec<(usize, Value)> = patch
                .into_iter()
                .filter_map(|(key, value)| key.parse().ok().map(|index| (index, value)))
                .collect();
            entries.sort_by_key(|(index, _)| *index);
            for (index, value) in entries {
                if index > items.len() {
                    return Err(format!(
                        "index {index} is past the end of a list of {}",
                        items.len()
                    ));
                }
                match items.get_mut(index) {
                    Some(existing) => merge(existing, value)?,
                    None => items.push(value),
                }
            }
        }
        (target, patch) => *target = patch,
    }
    Ok(())
}

/// Short type name, e.g. `Address` for `my_app::model::Address`.
///
/// Generic arguments are dropped, so `Wrapper<Inner>` is `Wrapper`. Register
/// distinct instantiations of one generic type under explicit names.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let name = std::any::type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

/// A [`ValueObject`] backed by a serde type.
#[derive(Debug, Clone, Default)]
pub struct Model<T> {
    data: T,
    old: Option<Attributes>,
    errors: ErrorBag,
}

impl<T> Model<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            old: None,
            errors: ErrorBag::new(),
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T> ValueObject for Model<T>
where
    T: Serialize + DeserializeOwned + Validate + Debug + 'static,
{
    fn class_name(&self) -> &str {
        short_type_name::<T>()
    }

    fn attributes(&self) -> Attributes {
        match serde_json::to_value(&self.data) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!(class = self.class_name(), kind = ?other, "Value object is not a mapping");
                Attributes::new()
            }
            Err(error) => {
                warn!(class = self.class_name(), %error, "Value object failed to serialize");
                Attributes::new()
            }
        }
    }

    fn set_attributes(&mut self, values: Attributes) -> Result<()> {
        let class = self.class_name().to_string();
        let mut current = serde_json::to_value(&self.data).map_err(|source| {
            ValueObjectError::Assign {
                class: class.clone(),
                source,
            }
        })?;
        merge(&mut current, Value::Object(values))
            .map_err(|message| ValueObjectError::assign(&class, message))?;
        self.data = serde_json::from_value(current)
            .map_err(|source| ValueObjectError::Assign { class, source })?;
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
        self.data.validate(&mut self.errors);
        self.errors.is_empty()
    }

    fn errors(&self) -> &ErrorBag {
        &self.errors
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
