mod bson;
mod collection;
mod counter;

pub use bson::u32_id_filter;
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use counter::{Counter, OPTION_ID_COUNTER, QUESTION_ID_COUNTER, RESPONSE_ID_COUNTER};
