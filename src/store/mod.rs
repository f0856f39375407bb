#[cfg(test)]
pub mod memory;

use std::future::Future;
use serde_json::Value;
use thiserror::Error;

use crate::db_mongo::models::{Item, NewItem, SearchField};

/// Attempts at claiming a fresh code before a create gives up.
pub const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or refused our credentials.
    #[error("document store unavailable: {0}")]
    Connection(String),
    #[error("item code {0} already taken")]
    DuplicateCode(i64),
    #[error("document store operation failed: {0}")]
    Operation(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Item persistence as seen by the HTTP handlers.
///
/// Implementations are cheap handles onto a process-wide pool; handlers clone
/// one out of the shared state for the duration of a request.
pub trait ItemStore: Clone + Send + Sync + 'static {
    fn list(&self) -> impl Future<Output = StoreResult<Vec<Item>>> + Send;

    fn find_by_code(&self, code: i64) -> impl Future<Output = StoreResult<Option<Item>>> + Send;

    /// Case-insensitive substring match on `field`. `term` is literal text.
    fn search(
        &self,
        field: SearchField,
        term: &str,
    ) -> impl Future<Output = StoreResult<Vec<Item>>> + Send;

    /// One past the largest code currently stored, or 1 when empty.
    fn next_code(&self) -> impl Future<Output = StoreResult<i64>> + Send;

    /// Fails with [`StoreError::DuplicateCode`] when the code is already stored.
    fn insert(&self, item: &Item) -> impl Future<Output = StoreResult<()>> + Send;

    /// Sets the price and returns the updated item, or `None` if no item has `code`.
    fn update_price(
        &self,
        code: i64,
        price: Value,
    ) -> impl Future<Output = StoreResult<Option<Item>>> + Send;

    /// Returns the number of deleted items.
    fn delete(&self, code: i64) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Stores `new_item` under the next free code.
    ///
    /// Reading the maximum and inserting are separate steps, so a concurrent
    /// create can claim the same code first; the unique code constraint turns
    /// that into `DuplicateCode` and the read is repeated.
    fn create(&self, new_item: NewItem) -> impl Future<Output = StoreResult<Item>> + Send {
        async move {
            let mut attempt = 1;
            loop {
                let item = new_item.clone().with_code(self.next_code().await?);
                match self.insert(&item).await {
                    Err(StoreError::DuplicateCode(code)) if attempt < MAX_CODE_ATTEMPTS => {
                        tracing::warn!("Item code {} taken concurrently, retrying", code);
                        attempt += 1;
                    }
                    result => return result.map(|()| item),
                }
            }
        }
    }
}
