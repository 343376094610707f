use rocket::{
    serde::json::{self, Json},
    Route,
};

use crate::error::{Error, Result};
use crate::model::{
    api::{Ack, Created, QuestionList, QuestionSpec},
    common::QuestionId,
};
use crate::service::QuestionService;

pub fn routes() -> Vec<Route> {
    routes![
        create_question,
        list_questions,
        update_question,
        delete_question,
    ]
}

/// Unpack a submitted question, treating an unreadable body as a validation failure.
fn read_spec(
    spec: std::result::Result<Json<QuestionSpec>, json::Error<'_>>,
) -> Result<QuestionSpec> {
    spec.map(Json::into_inner)
        .map_err(|e| Error::validation(e.to_string()))
}

#[post("/question", data = "<spec>", format = "json")]
async fn create_question(
    spec: std::result::Result<Json<QuestionSpec>, json::Error<'_>>,
    service: QuestionService<'_>,
) -> Result<Json<Created>> {
    let id = service.create(read_spec(spec)?).await?;
    Ok(Json(Created { id }))
}

#[get("/questions")]
async fn list_questions(service: QuestionService<'_>) -> Result<Json<QuestionList>> {
    let questions = service.list().await?;
    Ok(Json(questions.into()))
}

#[put("/question/<id>", data = "<spec>", format = "json")]
async fn update_question(
    id: QuestionId,
    spec: std::result::Result<Json<QuestionSpec>, json::Error<'_>>,
    service: QuestionService<'_>,
) -> Result<Json<Ack>> {
    service.update(id, read_spec(spec)?).await?;
    Ok(Json(Ack::default()))
}

#[delete("/question/<id>")]
async fn delete_question(id: QuestionId, service: QuestionService<'_>) -> Result<Json<Ack>> {
    service.delete(id).await?;
    Ok(Json(Ack::default()))
}
