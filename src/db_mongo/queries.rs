use anyhow::Result;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc},
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
};
use serde_json::Value;

use super::models::{Item, SearchField};
use crate::store::{ItemStore, StoreError, StoreResult};

const DUPLICATE_KEY: i32 = 11000;

/// `ItemStore` backed by a MongoDB collection.
///
/// New codes are the current maximum plus one. A unique index on `codigo`
/// makes a concurrent create that picked the same code fail with a duplicate
/// key, which the caller retries.
#[derive(Clone)]
pub struct MongoItemStore {
    items: Collection<Item>,
}

impl MongoItemStore {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            items: db.collection::<Item>(collection),
        }
    }

    /// Startup housekeeping: unique index on `codigo`.
    pub async fn prepare(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "codigo": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.items.create_index(index).await?;
        tracing::info!("Unique index on codigo in place");
        Ok(())
    }
}

impl ItemStore for MongoItemStore {
    async fn list(&self) -> StoreResult<Vec<Item>> {
        let cursor = self.items.find(doc! {}).await?;
        let items: Vec<Item> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn find_by_code(&self, code: i64) -> StoreResult<Option<Item>> {
        Ok(self.items.find_one(doc! { "codigo": code }).await?)
    }

    async fn search(&self, field: SearchField, term: &str) -> StoreResult<Vec<Item>> {
        let cursor = self.items.find(contains_filter(field, term)).await?;
        let items: Vec<Item> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn next_code(&self) -> StoreResult<i64> {
        // Only numeric codes count; strings would sort above every number.
        let top = self
            .items
            .clone_with_type::<Document>()
            .find_one(doc! { "codigo": { "$type": "number" } })
            .sort(doc! { "codigo": -1 })
            .projection(doc! { "codigo": 1 })
            .await?;

        let max = top
            .as_ref()
            .and_then(|d| d.get("codigo"))
            .and_then(code_from_bson)
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn insert(&self, item: &Item) -> StoreResult<()> {
        match self.items.insert_one(item).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => {
                Err(StoreError::DuplicateCode(item.code().unwrap_or_default()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_price(&self, code: i64, price: Value) -> StoreResult<Option<Item>> {
        let price = mongodb::bson::to_bson(&price)
            .map_err(|e| StoreError::Operation(e.to_string()))?;

        Ok(self
            .items
            .find_one_and_update(
                doc! { "codigo": code },
                doc! { "$set": { "precio": price } },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete(&self, code: i64) -> StoreResult<u64> {
        let result = self.items.delete_one(doc! { "codigo": code }).await?;
        Ok(result.deleted_count)
    }
}

/// Case-insensitive substring filter with regex metacharacters escaped.
pub fn contains_filter(field: SearchField, term: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(
        field.document_key(),
        doc! { "$regex": regex::escape(term), "$options": "i" },
    );
    filter
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

fn code_from_bson(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        Bson::Double(f) if f.is_finite() => Some(f.floor() as i64),
        _ => None,
    }
}
