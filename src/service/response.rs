use log::info;
use mongodb::{bson, Database};
use rocket::{
    request::{FromRequest, Outcome},
    serde::json::Value,
    Request, State,
};

use crate::error::{Error, Result};
use crate::model::{
    common::ResponseId,
    db::Response,
    mongodb::{Coll, Counter, RESPONSE_ID_COUNTER},
};

/// Accept and list survey responses.
pub struct ResponseService {
    responses: Coll<Response>,
    counters: Coll<Counter>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ResponseService {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        req.guard::<&State<Database>>()
            .await
            .map(|db| ResponseService::new(db))
    }
}

impl ResponseService {
    pub fn new(db: &Database) -> Self {
        Self {
            responses: Coll::from_db(db),
            counters: Coll::from_db(db),
        }
    }

    /// Store a submitted payload, stamped with the time it arrived.
    ///
    /// The answers are deliberately not checked against the current questions: responses
    /// outlive edits to the questionnaire.
    pub async fn submit(&self, payload: Value) -> Result<ResponseId> {
        if !payload.is_object() {
            return Err(Error::validation("payload must be a JSON object"));
        }
        let payload = bson::to_document(&payload)
            .map_err(|e| Error::validation(format!("payload cannot be stored: {e}")))?;

        let id = Counter::next(&self.counters, RESPONSE_ID_COUNTER).await?;
        let response = Response::new(id, payload);
        Response::append(&self.responses, &response).await?;
        info!("Stored response {id}");
        Ok(id)
    }

    /// Every response in the order it was received.
    pub async fn list(&self) -> Result<Vec<Response>> {
        Response::all(&self.responses).await
    }
}
