/// Errors returned by a [`TableClient`](super::TableClient).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Table actor closed")]
    ActorClosed,
    #[error("Table actor dropped response channel")]
    ActorDropped,
    #[error("Row {id} not found in {table}")]
    NotFound { table: String, id: u64 },
}
