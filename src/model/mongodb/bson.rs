use mongodb::bson::{doc, Document};

/// Filter matching the document whose `_id` is the given integer identity.
///
/// The ID is widened to `i64` because BSON has no unsigned types; MongoDB
/// compares numbers by value, so this also matches IDs stored as `Int32`.
pub fn u32_id_filter(id: u32) -> Document {
    doc! { "_id": i64::from(id) }
}
