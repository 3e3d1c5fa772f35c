//! # Row Store
//!
//! A minimal in-memory table behind a Tokio actor. Records are never sent to the
//! actor; only their rows are.
//!
//! ```rust
//! use value_objects_sample::store::{Row, TableActor};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = TableActor::new("customers", 8);
//!     tokio::spawn(actor.run());
//!
//!     let id = client.insert(Row::new()).await.unwrap();
//!     assert!(client.find(id).await.unwrap().is_some());
//! }
//! ```

pub mod actor;
pub mod client;
pub mod error;
pub mod message;

pub use actor::TableActor;
pub use client::TableClient;
pub use error::StoreError;
pub use message::{Row, RowId, TableRequest};

/// Channel capacity of table actors.
pub const TABLE_BUFFER: usize = 32;
