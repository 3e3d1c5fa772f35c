//! # Table Actor
//!
//! An in-memory table running in its own Tokio task. It owns the rows and the id
//! counter and handles one request at a time, so no lock is needed.

use super::client::TableClient;
use super::error::StoreError;
use super::message::{Row, RowId, TableRequest};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Server half of a table. Create with [`TableActor::new`], then spawn [`TableActor::run`].
pub struct TableActor {
    table: String,
    receiver: mpsc::Receiver<TableRequest>,
    rows: HashMap<RowId, Row>,
    next_id: RowId,
}

impl TableActor {
    /// Creates the actor and a client connected to it.
    ///
    /// `buffer_size` is the channel capacity; clients wait when it is full.
    pub fn new(table: impl Into<String>, buffer_size: usize) -> (Self, TableClient) {
        let table = table.into();
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            table: table.clone(),
            receiver,
            rows: HashMap::new(),
            next_id: 1,
        };
        (actor, TableClient::new(table, sender))
    }

    /// Processes requests until every client is dropped.
    pub async fn run(mut self) {
        let table = self.table.clone();
        info!(%table, "Table actor started");

        while let Some(request) = self.receiver.recv().await {
            match request {
                TableRequest::Insert { mut row, respond_to } => {
                    let id = self.next_id;
                    self.next_id += 1;
                    row.insert("id".to_string(), Value::from(id));
                    self.rows.insert(id, row);
                    info!(%table, id, size = self.rows.len(), "Inserted");
                    let _ = respond_to.send(Ok(id));
                }
                TableRequest::Update { id, row, respond_to } => {
                    debug!(%table, id, columns = row.len(), "Update");
                    match self.rows.get_mut(&id) {
                        Some(stored) => {
                            for (column, value) in row {
                                if column != "id" {
                                    stored.insert(column, value);
                                }
                            }
                            info!(%table, id, "Updated");
                            let _ = respond_to.send(Ok(stored.clone()));
                        }
                        None => {
                            warn!(%table, id, "Not found");
                            let _ = respond_to.send(Err(self.not_found(id)));
                        }
                    }
                }
                TableRequest::Find { id, respond_to } => {
                    let row = self.rows.get(&id).cloned();
                    debug!(%table, id, found = row.is_some(), "Find");
                    let _ = respond_to.send(Ok(row));
                }
                TableRequest::Delete { id, respond_to } => {
                    if self.rows.remove(&id).is_some() {
                        info!(%table, id, size = self.rows.len(), "Deleted");
                        let _ = respond_to.send(Ok(()));
                    } else {
                        warn!(%table, id, "Not found");
                        let _ = respond_to.send(Err(self.not_found(id)));
                    }
                }
            }
        }

        info!(%table, size = self.rows.len(), "Shutdown");
    }

    fn not_found(&self, id: RowId) -> StoreError {
        StoreError::NotFound {
            table: self.table.clone(),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let (actor, client) = TableActor::new("customers", 8);
        let handle = tokio::spawn(actor.run());

        let first = client.insert(row(json!({"name": "Ada"}))).await.unwrap();
        let second = client.insert(row(json!({"name": "Grace"}))).await.unwrap();
        assert_eq!((first, second), (1, 2));

        let stored = client.find(second).await.unwrap().unwrap();
        assert_eq!(stored["id"], json!(2));
        assert_eq!(stored["name"], json!("Grace"));

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_update_merges_columns_and_keeps_id() {
        let (actor, client) = TableActor::new("customers", 8);
        tokio::spawn(actor.run());

        let id = client
            .insert(row(json!({"name": "Ada", "city": "Oslo"})))
            .await
            .unwrap();
        let updated = client
            .update(id, row(json!({"city": "Bergen", "id": 99})))
            .await
            .unwrap();

        assert_eq!(updated, row(json!({"id": 1, "name": "Ada", "city": "Bergen"})));
    }

    #[tokio::test]
    async fn test_missing_rows() {
        let (actor, client) = TableActor::new("customers", 8);
        tokio::spawn(actor.run());

        assert_eq!(client.find(5).await.unwrap(), None);
        assert_eq!(
            client.delete(5).await.unwrap_err(),
            StoreError::NotFound {
                table: "customers".into(),
                id: 5
            }
        );
        assert!(client.update(5, Row::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_closed_actor() {
        let (actor, client) = TableActor::new("customers", 8);
        drop(actor);
        assert_eq!(
            client.insert(Row::new()).await.unwrap_err(),
            StoreError::ActorClosed
        );
    }
}
