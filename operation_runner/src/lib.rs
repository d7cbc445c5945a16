//! Operation runner for concurrent store calls
//!
//! This crate runs independent store operations on background Tokio tasks and
//! hands each result back through a one-shot [`CompletionHandle`]. Failures
//! travel through the channel as values; a task that dies before reporting
//! surfaces as `StoreError::OperationAborted`.
//!
//! ```rust,no_run
//! use operation_runner::OperationRunner;
//! use store_object::prelude::*;
//!
//! # async fn demo<T: Entity + Clone>(people: Repository<T>, someone: T) -> Result<(), StoreError> {
//! let runner = OperationRunner::new();
//!
//! let insert = {
//!     let people = people.clone();
//!     runner.run(async move { people.insert(&someone).await })
//! };
//! let adults = {
//!     let people = people.clone();
//!     runner.run(async move { people.find_many(&Filter::new().gt("age", 25)).await })
//! };
//!
//! let (mut insert, mut adults) = (insert, adults);
//! let id = insert.wait().await?;
//! let adults = adults.wait().await?;
//! # let _ = (id, adults);
//! # Ok(())
//! # }
//! ```

pub mod handle;
pub mod runner;

#[cfg(test)]
mod tests;

pub use handle::{wait_all, CompletionHandle};
pub use runner::OperationRunner;
