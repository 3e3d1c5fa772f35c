//! # Customer Repository
//!
//! Bridges synchronous records and the asynchronous row store. Records are not
//! `Send`, so the repository trait is declared with `async_trait(?Send)` and its
//! futures run on the caller's task.
//!
//! Saving follows the two-phase protocol of [`ActiveRecord`]: `begin_save`
//! produces the row, the store writes it, `finish_save` sets the new baseline.

use crate::model::{customer_class, customer_config, customer_registry, Tag, CUSTOMER};
use crate::store::{RowId, StoreError, TableClient};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::rc::Rc;
use tracing::{debug, info, instrument};
use value_objects::{
    ActiveRecord, Attributes, Behavior, BehaviorConfig, ErrorBag, RecordClass, Registry,
    ValueObjectError, ValueObjectsBehavior, WriteKind,
};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Record(#[from] ValueObjectError),
    #[error("Validation failed on {}", invalid_fields(.0))]
    Invalid(ErrorBag),
    #[error("Record has no id")]
    MissingId,
}

fn invalid_fields(errors: &ErrorBag) -> String {
    errors
        .iter()
        .map(|(field, _)| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Persistence operations for one record type.
#[async_trait(?Send)]
pub trait Repository {
    type Record;
    type Error;

    /// Builds a record from `values`, validates and inserts it.
    async fn create(&self, values: &Attributes) -> Result<Self::Record, Self::Error>;

    /// Validates and writes the record. Returns `false` when validation failed.
    async fn save(&self, record: &mut Self::Record) -> Result<bool, Self::Error>;

    async fn find(&self, id: RowId) -> Result<Option<Self::Record>, Self::Error>;

    async fn delete(&self, id: RowId) -> Result<(), Self::Error>;
}

/// Customers stored in a [`TableClient`].
pub struct CustomerRepository {
    class: Rc<RecordClass>,
    registry: Rc<Registry>,
    config: BehaviorConfig,
    table: TableClient,
}

impl CustomerRepository {
    pub fn new(table: TableClient, tags: Vec<Tag>) -> Result<Self, RepositoryError> {
        Ok(Self {
            class: customer_class(tags)?,
            registry: customer_registry(),
            config: customer_config(),
            table,
        })
    }

    pub fn class(&self) -> &Rc<RecordClass> {
        &self.class
    }

    fn behaviors(&self) -> Vec<Box<dyn Behavior>> {
        vec![Box::new(
            ValueObjectsBehavior::new(self.registry.clone()).with_config(self.config.clone()),
        )]
    }

    /// A new, unsaved customer.
    pub fn new_record(&self) -> Result<ActiveRecord, RepositoryError> {
        Ok(ActiveRecord::new(self.class.clone(), self.behaviors())?)
    }
}

/// The store id of a persisted record.
pub fn record_id(record: &ActiveRecord) -> Option<RowId> {
    record.state().json("id").and_then(Value::as_u64)
}

#[async_trait(?Send)]
impl Repository for CustomerRepository {
    type Record = ActiveRecord;
    type Error = RepositoryError;

    #[instrument(skip(self, values), fields(class = CUSTOMER))]
    async fn create(&self, values: &Attributes) -> Result<ActiveRecord, RepositoryError> {
        let mut record = self.new_record()?;
        record.set_attributes(values, true)?;
        if !self.save(&mut record).await? {
            return Err(RepositoryError::Invalid(record.errors().clone()));
        }
        Ok(record)
    }

    #[instrument(skip(self, record), fields(class = CUSTOMER))]
    async fn save(&self, record: &mut ActiveRecord) -> Result<bool, RepositoryError> {
        let Some(pending) = record.begin_save(true)? else {
            debug!(errors = record.errors().len(), "Not saved");
            return Ok(false);
        };
        match pending.kind {
            WriteKind::Insert => {
                let id = self.table.insert(pending.row).await?;
                record.state_mut().assign("id", json!(id));
                info!(id, "Customer inserted");
            }
            WriteKind::Update => {
                let id = record_id(record).ok_or(RepositoryError::MissingId)?;
                if pending.row.is_empty() {
                    debug!(id, "Nothing changed");
                } else {
                    self.table.update(id, pending.row).await?;
                    info!(id, "Customer updated");
                }
            }
        }
        record.finish_save(pending.kind)?;
        Ok(true)
    }

    #[instrument(skip(self), fields(class = CUSTOMER))]
    async fn find(&self, id: RowId) -> Result<Option<ActiveRecord>, RepositoryError> {
        let Some(row) = self.table.find(id).await? else {
            debug!("Customer not found");
            return Ok(None);
        };
        let record = ActiveRecord::populate(self.class.clone(), self.behaviors(), &row)?;
        Ok(Some(record))
    }

    #[instrument(skip(self), fields(class = CUSTOMER))]
    async fn delete(&self, id: RowId) -> Result<(), RepositoryError> {
        self.table.delete(id).await?;
        info!(id, "Customer deleted");
        Ok(())
    }
}
