//! # Table Client
//!
//! The cheap-to-clone handle used to talk to a [`TableActor`](super::TableActor).

use super::error::StoreError;
use super::message::{Row, RowId, TableRequest};
use tokio::sync::{mpsc, oneshot};

/// Async request/response access to one table.
#[derive(Clone, Debug)]
pub struct TableClient {
    table: String,
    sender: mpsc::Sender<TableRequest>,
}

impl TableClient {
    pub fn new(table: impl Into<String>, sender: mpsc::Sender<TableRequest>) -> Self {
        Self {
            table: table.into(),
            sender,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Stores a new row and returns the id the table assigned to it.
    pub async fn insert(&self, row: Row) -> Result<RowId, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.send(TableRequest::Insert { row, respond_to }).await?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    /// Overwrites the given columns of a stored row and returns the whole row.
    pub async fn update(&self, id: RowId, row: Row) -> Result<Row, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.send(TableRequest::Update {
            id,
            row,
            respond_to,
        })
        .await?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    pub async fn find(&self, id: RowId) -> Result<Option<Row>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.send(TableRequest::Find { id, respond_to }).await?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    pub async fn delete(&self, id: RowId) -> Result<(), StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.send(TableRequest::Delete { id, respond_to }).await?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    async fn send(&self, request: TableRequest) -> Result<(), StoreError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| StoreError::ActorClosed)
    }
}
