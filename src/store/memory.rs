use serde_json::Value;
use std::sync::{Arc, Mutex};

use super::{ItemStore, StoreError, StoreResult};
use crate::db_mongo::models::{Item, SearchField};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Connection,
    Operation,
}

#[derive(Debug, Default)]
struct Inner {
    items: Vec<Item>,
    failure: Option<Failure>,
    calls: usize,
    /// Items written by a "concurrent" client just before our next insert.
    interleaved: Vec<Item>,
}

/// In-process store for handler tests, with the same code and uniqueness
/// rules as the MongoDB store.
#[derive(Debug, Clone, Default)]
pub struct MemoryItemStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryItemStore {
    pub fn with_items(items: Vec<Item>) -> Self {
        let store = Self::default();
        store.inner.lock().unwrap().items = items;
        store
    }

    pub fn fail_with(&self, failure: Failure) {
        self.inner.lock().unwrap().failure = Some(failure);
    }

    /// Lands `item` between the next code lookup and the insert that follows it.
    pub fn interleave_insert(&self, item: Item) {
        self.inner.lock().unwrap().interleaved.push(item);
    }

    pub fn items(&self) -> Vec<Item> {
        self.inner.lock().unwrap().items.clone()
    }

    /// Number of store operations attempted so far.
    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().calls
    }

    fn with_inner<T>(&self, op: impl FnOnce(&mut Inner) -> T) -> StoreResult<T> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        match inner.failure {
            Some(Failure::Connection) => Err(StoreError::Connection("server selection timeout".into())),
            Some(Failure::Operation) => Err(StoreError::Operation("write conflict".into())),
            None => Ok(op(&mut *inner)),
        }
    }
}

impl ItemStore for MemoryItemStore {
    async fn list(&self) -> StoreResult<Vec<Item>> {
        self.with_inner(|inner| inner.items.clone())
    }

    async fn find_by_code(&self, code: i64) -> StoreResult<Option<Item>> {
        self.with_inner(|inner| inner.items.iter().find(|i| i.code() == Some(code)).cloned())
    }

    async fn search(&self, field: SearchField, term: &str) -> StoreResult<Vec<Item>> {
        let needle = term.to_lowercase();
        self.with_inner(|inner| {
            inner
                .items
                .iter()
                .filter(|i| {
                    field_value(field, i)
                        .as_str()
                        .is_some_and(|s| s.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect()
        })
    }

    async fn next_code(&self) -> StoreResult<i64> {
        self.with_inner(|inner| inner.items.iter().filter_map(Item::code).max().unwrap_or(0) + 1)
    }

    async fn insert(&self, item: &Item) -> StoreResult<()> {
        self.with_inner(|inner| {
            let interleaved = std::mem::take(&mut inner.interleaved);
            inner.items.extend(interleaved);

            let code = item.code().unwrap_or_default();
            if inner.items.iter().any(|i| i.code() == Some(code)) {
                return Err(StoreError::DuplicateCode(code));
            }
            inner.items.push(item.clone());
            Ok(())
        })?
    }

    async fn update_price(&self, code: i64, price: Value) -> StoreResult<Option<Item>> {
        self.with_inner(|inner| {
            let item = inner.items.iter_mut().find(|i| i.code() == Some(code))?;
            item.price = price;
            Some(item.clone())
        })
    }

    async fn delete(&self, code: i64) -> StoreResult<u64> {
        self.with_inner(|inner| {
            let before = inner.items.len();
            if let Some(pos) = inner.items.iter().position(|i| i.code() == Some(code)) {
                inner.items.remove(pos);
            }
            (before - inner.items.len()) as u64
        })
    }
}

fn field_value(field: SearchField, item: &Item) -> &Value {
    match field {
        SearchField::Name => &item.name,
        SearchField::Category => &item.category,
    }
}
