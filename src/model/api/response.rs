use mongodb::bson::Bson;
use rocket::serde::json::Value;
use serde::{Deserialize, Serialize};

use crate::model::{common::ResponseId, db::Response};

/// A stored response, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDescription {
    pub id: ResponseId,
    pub ts: String,
    pub payload: Value,
}

impl From<Response> for ResponseDescription {
    fn from(response: Response) -> Self {
        let ts = response.ts_string();
        Self {
            id: response.id,
            ts,
            payload: Bson::Document(response.payload).into_relaxed_extjson(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::json;

    use super::*;

    #[test]
    fn payload_returned_as_submitted() {
        let description = ResponseDescription::from(Response::example());
        assert_eq!(1, description.id);
        assert_eq!("2023-05-17 08:30:00", description.ts);
        assert_eq!(
            json!({
                "answers": {
                    "1": "do",
                    "2": ["work", "leisure"],
                    "3": "Trains were on time",
                }
            }),
            description.payload
        );
    }
}
