//! # Active Records
//!
//! [`ActiveRecord`] couples a [`RecordState`] with the behaviors attached to it and
//! emits [`RecordEvent`]s around every lifecycle step.
//!
//! Storage is not part of this crate. Saving is split in two so an asynchronous
//! store can sit in between:
//!
//! 1. [`ActiveRecord::begin_save`] validates, runs the before-write events and
//!    hands back the row to write.
//! 2. [`ActiveRecord::finish_save`] is called once the store accepted the row.
//!    It sets the new baseline and runs the after-write events.

use crate::attribute::{AttributeValue, Attributes};
use crate::error::{Result, ValueObjectError};
use crate::events::{Behavior, EventKind, Listener, RecordEvent};
use crate::host::{Host, RecordClass, RecordState};
use crate::object::ErrorBag;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info};

/// Whether a pending write creates or updates a stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Insert,
    Update,
}

/// A row ready to be written by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWrite {
    pub kind: WriteKind,
    /// Every column on insert; only changed columns on update.
    pub row: Attributes,
}

/// A record instance with its attached behaviors.
pub struct ActiveRecord {
    state: RecordState,
    behaviors: Vec<Box<dyn Behavior>>,
    listeners: Vec<(EventKind, Listener)>,
}

impl ActiveRecord {
    /// Creates a new record and emits [`RecordEvent::Init`].
    pub fn new(class: Rc<RecordClass>, behaviors: Vec<Box<dyn Behavior>>) -> Result<Self> {
        let mut record = Self {
            state: RecordState::new(class),
            behaviors,
            listeners: Vec::new(),
        };
        record.trigger(&RecordEvent::Init)?;
        Ok(record)
    }

    /// Builds a persisted record from a stored row.
    pub fn populate(
        class: Rc<RecordClass>,
        behaviors: Vec<Box<dyn Behavior>>,
        row: &Attributes,
    ) -> Result<Self> {
        let mut record = Self::new(class, behaviors)?;
        record.fill(row)?;
        Ok(record)
    }

    /// Reloads the record from a stored row, rebuilding every sub-object.
    pub fn refresh(&mut self, row: &Attributes) -> Result<()> {
        self.trigger(&RecordEvent::Reinitialize)?;
        self.fill(row)
    }

    fn fill(&mut self, row: &Attributes) -> Result<()> {
        self.trigger(&RecordEvent::BeforePopulate { row })?;
        self.state.load_row(row);
        self.trigger(&RecordEvent::AfterPopulate { row })?;
        self.trigger(&RecordEvent::AfterFind)
    }

    /// Registers a closure listener for `kind`.
    pub fn on(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&RecordEvent<'_>, &mut RecordState) -> Result<()> + 'static,
    ) -> &mut Self {
        self.listeners.push((kind, Box::new(listener)));
        self
    }

    /// Emits `event` to every behavior, then to the closure listeners for its kind.
    pub fn trigger(&mut self, event: &RecordEvent<'_>) -> Result<()> {
        let kind = event.kind();
        debug!(record = %self.state.class_name(), event = ?kind, "Dispatching event");
        for behavior in self.behaviors.iter_mut() {
            behavior.handle(event, &mut self.state)?;
        }
        for (listens_to, listener) in self.listeners.iter_mut() {
            if *listens_to == kind {
                listener(event, &mut self.state)?;
            }
        }
        Ok(())
    }

    /// Assigns one attribute.
    ///
    /// Columns are written directly. A dotted name such as `address.city` is not a
    /// column; it is accepted when a behavior routes it. Anything else fails with
    /// [`ValueObjectError::UnknownAttribute`] and no after event is emitted.
    pub fn set_attribute(&mut self, name: &str, value: Value) -> Result<()> {
        self.trigger(&RecordEvent::BeforeSetAttribute {
            name,
            value: &value,
        })?;
        if self.state.has_attribute(name) {
            self.state.assign(name, value.clone());
        } else if !self
            .behaviors
            .iter()
            .any(|behavior| behavior.claims_attribute(name, &self.state))
        {
            return Err(ValueObjectError::UnknownAttribute(name.to_string()));
        }
        self.trigger(&RecordEvent::AfterSetAttribute {
            name,
            value: &value,
        })
    }

    /// Bulk assignment. Names that are not columns (or not safe, with `safe_only`)
    /// are skipped by the raw write but still reach the behaviors.
    pub fn set_attributes(&mut self, values: &Attributes, safe_only: bool) -> Result<()> {
        self.trigger(&RecordEvent::BeforeSetAttributes { values, safe_only })?;
        self.state.assign_all(values, safe_only);
        self.trigger(&RecordEvent::AfterSetAttributes { values, safe_only })
    }

    /// Clears previous errors and runs validation. Returns `Ok(true)` when the
    /// record has no errors afterwards.
    pub fn validate(&mut self) -> Result<bool> {
        self.state.clear_errors();
        self.trigger(&RecordEvent::BeforeValidate)?;
        if let Some(validator) = self.state.class().validator().cloned() {
            let mut errors = ErrorBag::new();
            validator(&self.state, &mut errors);
            self.state.add_errors(&errors);
        }
        self.trigger(&RecordEvent::AfterValidate)?;
        Ok(!self.state.has_errors())
    }

    /// First half of a save. Returns `None` when validation failed.
    pub fn begin_save(&mut self, run_validation: bool) -> Result<Option<PendingWrite>> {
        if run_validation && !self.validate()? {
            info!(record = %self.state.class_name(), errors = self.state.errors().len(), "Validation failed, nothing to save");
            return Ok(None);
        }

        let kind = if self.state.is_new_record() {
            WriteKind::Insert
        } else {
            WriteKind::Update
        };
        let row = match kind {
            WriteKind::Insert => {
                self.trigger(&RecordEvent::BeforeInsert)?;
                self.state.to_row(None)
            }
            WriteKind::Update => {
                self.trigger(&RecordEvent::BeforeUpdate)?;
                let dirty = self.state.dirty_attributes();
                self.state.to_row(Some(&dirty))
            }
        };
        debug!(record = %self.state.class_name(), ?kind, columns = row.len(), "Prepared write");
        Ok(Some(PendingWrite { kind, row }))
    }

    /// Second half of a save, after the store accepted the row.
    pub fn finish_save(&mut self, kind: WriteKind) -> Result<()> {
        self.state.mark_persisted();
        match kind {
            WriteKind::Insert => self.trigger(&RecordEvent::AfterInsert),
            WriteKind::Update => self.trigger(&RecordEvent::AfterUpdate),
        }
    }

    pub fn state(&self) -> &RecordState {
        &self.state
    }

    /// Raw access to the attribute storage. Writes made here emit no events.
    pub fn state_mut(&mut self) -> &mut RecordState {
        &mut self.state
    }

    pub fn class(&self) -> &Rc<RecordClass> {
        self.state.class()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.state.attribute(name)
    }

    pub fn old_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.state.old_attribute(name)
    }

    pub fn is_attribute_changed(&self, name: &str) -> bool {
        self.state.is_attribute_changed(name)
    }

    pub fn is_new_record(&self) -> bool {
        self.state.is_new_record()
    }

    pub fn errors(&self) -> &ErrorBag {
        self.state.errors()
    }

    /// The first attached behavior of type `B`.
    pub fn behavior<B: Behavior>(&self) -> Option<&B> {
        self.behaviors
            .iter()
            .find_map(|behavior| behavior.as_any().downcast_ref::<B>())
    }

    pub fn behavior_mut<B: Behavior>(&mut self) -> Option<&mut B> {
        self.behaviors
            .iter_mut()
            .find_map(|behavior| behavior.as_any_mut().downcast_mut::<B>())
    }
}

impl fmt::Debug for ActiveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveRecord")
            .field("state", &self.state)
            .field("behaviors", &self.behaviors.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
