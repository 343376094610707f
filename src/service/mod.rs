//! The operations behind the API, as request guards.
//!
//! Each service validates its inputs before touching the database, and every mutation of the
//! questionnaire invalidates the [`QuestionCache`].

mod cache;
pub use cache::{Lookup, QuestionCache};

mod export;
pub use export::ExportService;

mod question;
pub use question::QuestionService;

mod response;
pub use response::ResponseService;
