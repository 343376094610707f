use log::info;
use mongodb::{options::SessionOptions, Client, ClientSession, Database};
use rocket::{
    outcome::try_outcome,
    request::{FromRequest, Outcome},
    Request, State,
};

use crate::error::Result;
use crate::model::{
    db::{Question, Response},
    mongodb::Coll,
};
use crate::report::{FlatWorkbook, TallyWorkbook};

/// Produce the spreadsheet exports.
///
/// The questions and the whole response history are read from a single snapshot, so an export
/// is consistent even while new responses arrive. Responses are streamed into the workbook
/// rather than collected first.
pub struct ExportService<'r> {
    db_client: &'r Client,
    questions: Coll<Question>,
    responses: Coll<Response>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ExportService<'r> {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let db_client = try_outcome!(req.guard::<&State<Client>>().await);
        let db = try_outcome!(req.guard::<&State<Database>>().await);
        Outcome::Success(ExportService::new(db_client, db))
    }
}

impl<'r> ExportService<'r> {
    pub fn new(db_client: &'r Client, db: &Database) -> Self {
        Self {
            db_client,
            questions: Coll::from_db(db),
            responses: Coll::from_db(db),
        }
    }

    async fn snapshot(&self) -> Result<ClientSession> {
        let session_options = SessionOptions::builder().snapshot(true).build();
        let session = self.db_client.start_session(Some(session_options)).await?;
        Ok(session)
    }

    /// The tally workbook: raw responses, option counts, and text answers.
    pub async fn tally_workbook(&self) -> Result<Vec<u8>> {
        let mut session = self.snapshot().await?;
        let questions = Question::all_in_session(&self.questions, &mut session).await?;
        let mut workbook = TallyWorkbook::new(&questions)?;

        let mut cursor = Response::cursor_in_session(&self.responses, &mut session).await?;
        while let Some(response) = cursor.next(&mut session).await {
            workbook.push(&response?)?;
        }

        let responses = workbook.responses();
        let bytes = workbook.finish()?;
        info!(
            "Exported tally of {responses} responses over {} questions ({} bytes)",
            questions.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// The flat workbook: one row of raw codes per response.
    pub async fn flat_workbook(&self) -> Result<Vec<u8>> {
        let mut session = self.snapshot().await?;
        let questions = Question::all_in_session(&self.questions, &mut session).await?;
        let mut workbook = FlatWorkbook::new(&questions)?;

        let mut cursor = Response::cursor_in_session(&self.responses, &mut session).await?;
        while let Some(response) = cursor.next(&mut session).await {
            workbook.push(&response?)?;
        }

        let responses = workbook.responses();
        let bytes = workbook.finish()?;
        info!(
            "Exported {responses} flat rows over {} questions ({} bytes)",
            questions.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}
