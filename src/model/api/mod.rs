//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as plain integers under `id`.
//! - Datetimes are serialised as `YYYY-MM-DD HH:MM:SS` strings in UTC.
//! - Stored payloads are serialised back into the JSON they were submitted as.

mod ack;
pub use ack::{Ack, Created};

mod question;
pub use question::{
    NewQuestion, NoteMetadata, OptionDescription, OptionSpec, QuestionDescription, QuestionList,
    QuestionSpec,
};

mod response;
pub use response::ResponseDescription;
