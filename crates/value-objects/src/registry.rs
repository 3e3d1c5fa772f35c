//! # Registry
//!
//! The registry is built once at startup and shared by every behavior through `Rc`.
//! It holds two things:
//!
//! 1. **Class factories**: how to build a fresh sub-object from a class name.
//! 2. **Declaration cache**: the mapped attributes of each host class, computed
//!    the first time a record of that class asks and reused afterwards.
//!
//! The cache is keyed by the host's class name. It is only replaced through
//! [`Registry::refresh_declarations`], [`Registry::invalidate`] or [`Registry::clear`].

use crate::attribute::{share, SharedObject};
use crate::declaration::Declarations;
use crate::error::{Result, ValueObjectError};
use crate::host::Host;
use crate::object::{short_type_name, Model, Validate, ValueObject};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;
use std::rc::Rc;
use tracing::debug;

type Factory = Rc<dyn Fn() -> SharedObject>;

/// Class factories plus the per-class declaration cache.
#[derive(Default)]
pub struct Registry {
    factories: HashMap<String, Factory>,
    declarations: RefCell<HashMap<String, Declarations>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `O` under `name`, built from its `Default`.
    pub fn register<O>(&mut self, name: impl Into<String>) -> &mut Self
    where
        O: ValueObject + Default,
    {
        self.register_with(name, || share(O::default()))
    }

    /// Registers `Model<T>` under the short type name of `T`.
    pub fn register_model<T>(&mut self) -> &mut Self
    where
        T: Serialize + DeserializeOwned + Default + Validate + Debug + 'static,
    {
        self.register::<Model<T>>(short_type_name::<T>())
    }

    pub fn register_with(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> SharedObject + 'static,
    ) -> &mut Self {
        self.factories.insert(name.into(), Rc::new(factory));
        self
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// A fresh instance of the class registered under `name`.
    pub fn instantiate(&self, name: &str) -> Result<SharedObject> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ValueObjectError::UnknownClass(name.to_string()))?;
        Ok(factory())
    }

    /// Cached declarations for the host's class, computed on first use.
    pub fn declarations(&self, host: &dyn Host) -> Declarations {
        if let Some(cached) = self.declarations.borrow().get(host.class_name()) {
            return cached.clone();
        }
        self.refresh_declarations(host)
    }

    /// Recomputes the declarations from `host` and overwrites the cache entry.
    pub fn refresh_declarations(&self, host: &dyn Host) -> Declarations {
        let declarations = host.declarations().unwrap_or_default();
        debug!(
            record = %host.class_name(),
            attributes = declarations.len(),
            "Caching value object declarations"
        );
        self.declarations
            .borrow_mut()
            .insert(host.class_name().to_string(), declarations.clone());
        declarations
    }

    pub fn invalidate(&self, class_name: &str) {
        self.declarations.borrow_mut().remove(class_name);
    }

    pub fn clear(&self) {
        self.declarations.borrow_mut().clear();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<&String> = self.factories.keys().collect();
        classes.sort();
        f.debug_struct("Registry")
            .field("classes", &classes)
            .field("cached", &self.declarations.borrow().len())
            .finish()
    }
}
