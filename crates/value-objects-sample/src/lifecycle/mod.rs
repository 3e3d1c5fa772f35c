//! # System Lifecycle
//!
//! [`SampleSystem`] starts the customer table actor, wires the repository to it and
//! shuts everything down again.
//!
//! Shutdown drops the repository, which holds the only
//! [`TableClient`](crate::store::TableClient). The actor
//! sees its channel close, logs its final state and returns; the system then awaits
//! the task.
//!
//! Must be created inside a Tokio runtime.

use crate::model::Tag;
use crate::repository::{CustomerRepository, RepositoryError};
use crate::store::{TableActor, TABLE_BUFFER};
use tokio::task::JoinHandle;
use tracing::info;

pub struct SampleSystem {
    pub customers: CustomerRepository,
    handles: Vec<JoinHandle<()>>,
}

impl SampleSystem {
    /// Starts the store with the default tag catalog.
    pub fn new() -> Result<Self, RepositoryError> {
        Self::with_tags(vec![Tag::new("new")])
    }

    pub fn with_tags(tags: Vec<Tag>) -> Result<Self, RepositoryError> {
        let (actor, client) = TableActor::new("customers", TABLE_BUFFER);
        let handle = tokio::spawn(actor.run());
        let customers = CustomerRepository::new(client, tags)?;
        info!("Sample system started");
        Ok(Self {
            customers,
            handles: vec![handle],
        })
    }

    pub async fn shutdown(self) -> Result<(), String> {
        drop(self.customers);
        for handle in self.handles {
            handle.await.map_err(|e| e.to_string())?;
        }
        info!("Sample system stopped");
        Ok(())
    }
}
