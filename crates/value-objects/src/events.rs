//! # Record Events
//!
//! Lifecycle notifications emitted by [`ActiveRecord`](crate::ActiveRecord).
//!
//! Mutating calls (`set_attributes`, `set_attribute`, population from a stored row)
//! are bracketed by a *before* and an *after* event carrying the call's arguments.
//! Events are synchronous: every listener has run before the call returns.
//!
//! ## Delivery order
//!
//! Attached [`Behavior`]s receive an event first, in attachment order. Closure
//! listeners registered with [`ActiveRecord::on`](crate::ActiveRecord::on) follow,
//! in registration order. The first listener error aborts delivery and is
//! returned to the caller.

use crate::attribute::Attributes;
use crate::error::Result;
use crate::host::{Host, RecordState};
use serde_json::Value;
use std::any::Any;

/// A lifecycle notification with borrowed arguments.
#[derive(Debug, Clone, Copy)]
pub enum RecordEvent<'a> {
    Init,
    AfterFind,
    /// Sub-objects must be rebuilt from scratch.
    Reinitialize,
    BeforeValidate,
    AfterValidate,
    BeforeInsert,
    AfterInsert,
    BeforeUpdate,
    AfterUpdate,
    BeforeSetAttributes {
        values: &'a Attributes,
        safe_only: bool,
    },
    AfterSetAttributes {
        values: &'a Attributes,
        safe_only: bool,
    },
    BeforeSetAttribute {
        name: &'a str,
        value: &'a Value,
    },
    AfterSetAttribute {
        name: &'a str,
        value: &'a Value,
    },
    BeforePopulate {
        row: &'a Attributes,
    },
    AfterPopulate {
        row: &'a Attributes,
    },
}

/// Event discriminant, used to register closure listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Init,
    AfterFind,
    Reinitialize,
    BeforeValidate,
    AfterValidate,
    BeforeInsert,
    AfterInsert,
    BeforeUpdate,
    AfterUpdate,
    BeforeSetAttributes,
    AfterSetAttributes,
    BeforeSetAttribute,
    AfterSetAttribute,
    BeforePopulate,
    AfterPopulate,
}

impl RecordEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Init => EventKind::Init,
            Self::AfterFind => EventKind::AfterFind,
            Self::Reinitialize => EventKind::Reinitialize,
            Self::BeforeValidate => EventKind::BeforeValidate,
            Self::AfterValidate => EventKind::AfterValidate,
            Self::BeforeInsert => EventKind::BeforeInsert,
            Self::AfterInsert => EventKind::AfterInsert,
            Self::BeforeUpdate => EventKind::BeforeUpdate,
            Self::AfterUpdate => EventKind::AfterUpdate,
            Self::BeforeSetAttributes { .. } => EventKind::BeforeSetAttributes,
            Self::AfterSetAttributes { .. } => EventKind::AfterSetAttributes,
            Self::BeforeSetAttribute { .. } => EventKind::BeforeSetAttribute,
            Self::AfterSetAttribute { .. } => EventKind::AfterSetAttribute,
            Self::BeforePopulate { .. } => EventKind::BeforePopulate,
            Self::AfterPopulate { .. } => EventKind::AfterPopulate,
        }
    }
}

/// A component attached to a record that reacts to its lifecycle events.
pub trait Behavior: Any {
    fn handle(&mut self, event: &RecordEvent<'_>, host: &mut dyn Host) -> Result<()>;

    /// Whether a name that is not a column is still a valid assignment target
    /// because this behavior routes it.
    fn claims_attribute(&self, _name: &str, _host: &dyn Host) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A closure listener registered for one [`EventKind`].
pub type Listener = Box<dyn FnMut(&RecordEvent<'_>, &mut RecordState) -> Result<()>>;
