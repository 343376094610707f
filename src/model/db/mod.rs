//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - IDs are stored as integers allocated from counters.
//! - Datetimes are serialised in MongoDB's own format.
//! - Options are embedded in the question that owns them.

mod question;
pub use question::{Question, QuestionCore, QuestionOption};

mod response;
pub use response::Response;
