//! Types shared between the API and DB representations.

mod question_type;
pub use question_type::QuestionType;

/// Question unique ID.
pub type QuestionId = u32;
/// Option unique ID.
pub type OptionId = u32;
/// Response unique ID.
pub type ResponseId = u32;
