//! # Table Messages
//!
//! Requests sent from a [`TableClient`](super::TableClient) to its
//! [`TableActor`](super::TableActor). Rows are plain JSON mappings, so nothing
//! that lives in a record (shared sub-objects, behaviors) ever crosses into the
//! actor task.

use super::error::StoreError;
use serde_json::{Map, Value};
use tokio::sync::oneshot;

/// A stored row: column name to column value.
pub type Row = Map<String, Value>;

/// Row identifier assigned by the table.
pub type RowId = u64;

/// One-shot channel carrying the reply to a request.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum TableRequest {
    Insert {
        row: Row,
        respond_to: Response<RowId>,
    },
    Update {
        id: RowId,
        row: Row,
        respond_to: Response<Row>,
    },
    Find {
        id: RowId,
        respond_to: Response<Option<Row>>,
    },
    Delete {
        id: RowId,
        respond_to: Response<()>,
    },
}
