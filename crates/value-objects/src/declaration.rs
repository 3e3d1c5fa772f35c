//! Which host attributes are mapped, and to what.

use crate::attribute::SharedObject;
use crate::dependent::DependentClass;
use std::fmt;
use std::rc::Rc;

/// How the sub-object of one mapped attribute is obtained.
#[derive(Clone)]
pub enum Declaration {
    /// A registered class, instantiated fresh for every record.
    Class(String),
    /// A class resolved from the host record.
    Dependent(Rc<dyn DependentClass>),
    /// A prebuilt container handed out as-is. Every record using the
    /// declaration shares this one instance.
    Shared(SharedObject),
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(name) => f.debug_tuple("Class").field(name).finish(),
            Self::Dependent(dependent) => f
                .debug_tuple("Dependent")
                .field(&dependent.source_attribute())
                .finish(),
            Self::Shared(object) => f
                .debug_tuple("Shared")
                .field(&object.borrow().class_name())
                .finish(),
        }
    }
}

/// Mapped attributes of a record class, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Declarations(Vec<(String, Declaration)>);

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `attribute` to a registered class.
    pub fn class(self, attribute: impl Into<String>, class: impl Into<String>) -> Self {
        self.with(attribute, Declaration::Class(class.into()))
    }

    pub fn dependent(self, attribute: impl Into<String>, dependent: impl DependentClass + 'static) -> Self {
        self.with(attribute, Declaration::Dependent(Rc::new(dependent)))
    }

    pub fn shared(self, attribute: impl Into<String>, object: SharedObject) -> Self {
        self.with(attribute, Declaration::Shared(object))
    }

    /// Adds or replaces a declaration. A replaced declaration keeps its position.
    pub fn with(mut self, attribute: impl Into<String>, declaration: Declaration) -> Self {
        let attribute = attribute.into();
        match self.0.iter_mut().find(|(name, _)| *name == attribute) {
            Some((_, existing)) => *existing = declaration,
            None => self.0.push((attribute, declaration)),
        }
        self
    }

    pub fn get(&self, attribute: &str) -> Option<&Declaration> {
        self.0
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, declaration)| declaration)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.get(attribute).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Declaration)> {
        self.0
            .iter()
            .map(|(name, declaration)| (name.as_str(), declaration))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order_is_kept() {
        let declarations = Declarations::new()
            .class("shipping", "Address")
            .class("billing", "Address")
            .class("shipping", "PostBox");

        assert_eq!(declarations.names().collect::<Vec<_>>(), ["shipping", "billing"]);
        assert!(matches!(
            declarations.get("shipping"),
            Some(Declaration::Class(name)) if name == "PostBox"
        ));
        assert!(!declarations.contains("payment"));
    }
}
