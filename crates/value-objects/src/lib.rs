//! # Value Objects
//!
//! A mapping layer that lets a database record expose nested, independently
//! validated sub-objects stored as encoded text in a single column.
//!
//! ## How it fits together
//!
//! 1. **Record layer** ([`ActiveRecord`], [`RecordState`], [`Host`]): attribute
//!    storage with a current and a baseline slot per column, plus lifecycle events.
//! 2. **Behavior layer** ([`ValueObjectsBehavior`]): attached to a record, it
//!    creates the sub-objects, loads them from their columns, writes them back
//!    before validation and storage, and routes dotted assignments like
//!    `address.city` into them.
//! 3. **Object layer** ([`ValueObject`], [`Model`], [`ValueObjectList`]): the
//!    sub-objects themselves.
//!
//! Class names are resolved through a [`Registry`] built at startup. The same
//! registry caches the mapped attributes of each record class.
//!
//! ## Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//! use std::rc::Rc;
//! use value_objects::{
//!     ActiveRecord, Behavior, Declarations, ErrorBag, RecordClass, Registry, Validate,
//!     ValueObjectsBehavior,
//! };
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Address {
//!     city: String,
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
//! let mut registry = Registry::new();
//! registry.register_model::<Address>();
//! let registry = Rc::new(registry);
//!
//! let class = Rc::new(
//!     RecordClass::new("Customer", ["id", "address"])
//!         .with_declarations(|_| Declarations::new().class("address", "Address")),
//! );
//! let behaviors: Vec<Box<dyn Behavior>> = vec![Box::new(ValueObjectsBehavior::new(registry))];
//! let mut customer = ActiveRecord::new(class, behaviors).unwrap();
//!
//! assert!(!customer.validate().unwrap());
//! assert!(customer.errors().get("address.city").is_some());
//!
//! customer.set_attribute("address.city", json!("Oslo")).unwrap();
//! let pending = customer.begin_save(true).unwrap().unwrap();
//! assert_eq!(pending.row["address"], json!(r#"{"city":"Oslo"}"#));
//! ```
//!
//! ## Testing
//!
//! The [`mock`] module provides [`MockHost`](mock::MockHost), an in-memory host that
//! records every write, for exercising a behavior without a record class.

pub mod attribute;
pub mod behavior;
pub mod codec;
pub mod config;
pub mod declaration;
pub mod dependent;
pub mod error;
pub mod events;
pub mod host;
pub mod list;
pub mod logging;
pub mod mock;
pub mod object;
pub mod path;
pub mod record;
pub mod registry;

pub use attribute::{into_attributes, share, AttributeValue, Attributes, SharedObject};
pub use behavior::{Slot, ValueObjectsBehavior};
pub use codec::{Codec, CodecError, JsonCodec};
pub use config::BehaviorConfig;
pub use declaration::{Declaration, Declarations};
pub use dependent::{DependentClass, DependentProperty, DependentPropertyBuilder};
pub use error::{Result, ValueObjectError};
pub use events::{Behavior, EventKind, Listener, RecordEvent};
pub use host::{Host, RecordClass, RecordState};
pub use list::ValueObjectList;
pub use object::{ErrorBag, Model, Validate, ValueObject};
pub use record::{ActiveRecord, PendingWrite, WriteKind};
pub use registry::Registry;
