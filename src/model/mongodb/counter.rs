use std::ops::RangeInclusive;

use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::Coll;

/// Counter allocating question IDs.
pub const QUESTION_ID_COUNTER: &str = "question_id";
/// Counter allocating option IDs.
pub const OPTION_ID_COUNTER: &str = "option_id";
/// Counter allocating response IDs.
pub const RESPONSE_ID_COUNTER: &str = "response_id";

/// A counter object used to implement auto-increment fields.
///
/// `next` is the last value handed out; a missing counter behaves as if it were zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u32,
}

impl Counter {
    /// Atomically retrieve the next value of the named counter, creating it if needed.
    /// The first value handed out is 1.
    pub async fn next(counters: &Coll<Counter>, id: &str) -> Result<u32> {
        let range = Self::reserve(counters, id, 1).await?;
        Ok(*range.start())
    }

    /// Atomically reserve `count` consecutive values of the named counter.
    ///
    /// Reserving zero values returns an empty range without touching the database.
    pub async fn reserve(
        counters: &Coll<Counter>,
        id: &str,
        count: u32,
    ) -> Result<RangeInclusive<u32>> {
        if count == 0 {
            #[allow(clippy::reversed_empty_ranges)]
            return Ok(1..=0);
        }
        let update = doc! {
            "$inc": { "next": i64::from(count) }
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let counter = counters
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?
            .ok_or_else(|| Error::not_found(format!("Counter {id}")))?;
        Ok(counter.next - (count - 1)..=counter.next)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use mongodb::Database;

    #[backend_test]
    async fn counter_increment(db: Database) {
        let counters = Coll::<Counter>::from_db(&db);

        // A fresh counter starts at 1.
        let first = Counter::next(&counters, "widgets").await.unwrap();
        assert_eq!(first, 1);
        let second = Counter::next(&counters, "widgets").await.unwrap();
        assert_eq!(second, 2);

        // Other counters are independent.
        let other = Counter::next(&counters, "gadgets").await.unwrap();
        assert_eq!(other, 1);

        // Check the counter was persisted.
        let counter = counters
            .find_one(doc! { "_id": "widgets" }, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(counter.next, 2);
    }

    #[backend_test]
    async fn counter_reserve_block(db: Database) {
        let counters = Coll::<Counter>::from_db(&db);

        let block = Counter::reserve(&counters, "widgets", 3).await.unwrap();
        assert_eq!(block, 1..=3);
        let block = Counter::reserve(&counters, "widgets", 2).await.unwrap();
        assert_eq!(block, 4..=5);

        // An empty reservation doesn't consume anything.
        let block = Counter::reserve(&counters, "widgets", 0).await.unwrap();
        assert!(block.is_empty());
        assert_eq!(Counter::next(&counters, "widgets").await.unwrap(), 6);
    }
}
