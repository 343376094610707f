//! Projections of the response history onto the current questionnaire.
//!
//! Both projections are fed one response at a time, so the history never needs to be held in
//! memory as a whole. Answers referring to questions or options that no longer exist are
//! tolerated: they are reported as their raw codes, or left out if their question is gone.

mod answer;
pub use answer::answer_text;

mod flat;
pub use flat::FlatProjection;

mod tally;
pub use tally::{QuestionTally, Tally, TallyRow};

mod workbook;
pub use workbook::{FlatWorkbook, TallyWorkbook};
