use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime, Bson, Document},
    options::FindOptions,
    ClientSession, SessionCursor,
};
use rocket::futures::TryStreamExt;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    common::{QuestionId, ResponseId},
    mongodb::Coll,
};

/// A submitted response. Never modified once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "_id")]
    pub id: ResponseId,
    /// When the response was received by the server.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub ts: DateTime<Utc>,
    /// The body exactly as submitted.
    pub payload: Document,
}

impl Response {
    /// Stamp a payload with the current time.
    pub fn new(id: ResponseId, payload: Document) -> Self {
        Self {
            id,
            ts: Utc::now(),
            payload,
        }
    }

    /// The answers, keyed by question ID, if the payload has any.
    pub fn answers(&self) -> Option<&Document> {
        self.payload.get_document("answers").ok()
    }

    /// The answer to the given question. An explicit `null` counts as unanswered.
    pub fn answer(&self, question: QuestionId) -> Option<&Bson> {
        self.answers()?
            .get(question.to_string())
            .filter(|answer| !matches!(answer, Bson::Null | Bson::Undefined))
    }

    /// Render the capture time the way it is shown to humans.
    pub fn ts_string(&self) -> String {
        self.ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Sort by insertion order.
    fn insertion_order() -> FindOptions {
        FindOptions::builder().sort(doc! {"_id": 1}).build()
    }

    /// Append a response.
    pub async fn append(responses: &Coll<Response>, response: &Response) -> Result<()> {
        responses.insert_one(response, None).await?;
        Ok(())
    }

    /// Retrieve every response in insertion order.
    pub async fn all(responses: &Coll<Response>) -> Result<Vec<Response>> {
        let all: Vec<Response> = responses
            .find(None, Self::insertion_order())
            .await?
            .try_collect()
            .await?;
        Ok(all)
    }

    /// Open a cursor over every response in insertion order, within the given session.
    ///
    /// Responses are streamed so that a large history is never held in memory all at once.
    pub async fn cursor_in_session(
        responses: &Coll<Response>,
        session: &mut ClientSession,
    ) -> Result<SessionCursor<Response>> {
        let cursor = responses
            .find_with_session(None, Self::insertion_order(), session)
            .await?;
        Ok(cursor)
    }
}
