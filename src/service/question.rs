use log::{debug, info};
use mongodb::Database;
use rocket::{
    outcome::try_outcome,
    request::{FromRequest, Outcome},
    Request, State,
};

use crate::error::{Error, Result};
use crate::model::{
    api::QuestionSpec,
    common::QuestionId,
    db::Question,
    mongodb::{Coll, Counter, OPTION_ID_COUNTER, QUESTION_ID_COUNTER},
};

use super::{Lookup, QuestionCache};

/// Create, modify, delete and list the questions of the survey.
pub struct QuestionService<'r> {
    questions: Coll<Question>,
    counters: Coll<Counter>,
    cache: &'r QuestionCache,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for QuestionService<'r> {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let db = try_outcome!(req.guard::<&State<Database>>().await);
        let cache = try_outcome!(req.guard::<&State<QuestionCache>>().await);
        Outcome::Success(QuestionService::new(db, cache))
    }
}

impl<'r> QuestionService<'r> {
    pub fn new(db: &Database, cache: &'r QuestionCache) -> Self {
        Self {
            questions: Coll::from_db(db),
            counters: Coll::from_db(db),
            cache,
        }
    }

    /// Create a question, returning its ID.
    pub async fn create(&self, spec: QuestionSpec) -> Result<QuestionId> {
        let new_question = spec.validate()?;
        let order = new_question.order.unwrap_or(0);

        let id = Counter::next(&self.counters, QUESTION_ID_COUNTER).await?;
        let option_ids =
            Counter::reserve(&self.counters, OPTION_ID_COUNTER, new_question.option_count())
                .await?;
        let question = Question::new(id, new_question.into_core(order, option_ids));
        Question::insert(&self.questions, &question).await?;
        self.cache.invalidate().await;

        info!(
            "Created {} question {id} with {} options",
            question.qtype,
            question.options.len()
        );
        Ok(id)
    }

    /// Overwrite a question, replacing its whole option set.
    ///
    /// If no order is given the question keeps its current one.
    pub async fn update(&self, id: QuestionId, spec: QuestionSpec) -> Result<()> {
        let existing = Question::find(&self.questions, id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        let new_question = spec.validate()?;
        let order = new_question.order.unwrap_or(existing.order);

        let option_ids =
            Counter::reserve(&self.counters, OPTION_ID_COUNTER, new_question.option_count())
                .await?;
        let question = Question::new(id, new_question.into_core(order, option_ids));
        // The question may have been deleted since we looked it up.
        let replaced = Question::replace(&self.questions, &question).await?;
        self.cache.invalidate().await;
        if !replaced {
            return Err(Self::not_found(id));
        }

        info!(
            "Updated question {id}: {} options replaced by {}",
            existing.options.len(),
            question.options.len()
        );
        Ok(())
    }

    /// Delete a question and its options. Deleting a missing question succeeds.
    pub async fn delete(&self, id: QuestionId) -> Result<()> {
        let existed = Question::delete(&self.questions, id).await?;
        self.cache.invalidate().await;
        if existed {
            info!("Deleted question {id}");
        } else {
            debug!("Question {id} already absent, nothing to delete");
        }
        Ok(())
    }

    /// Every question in display order, served from the cache when fresh.
    pub async fn list(&self) -> Result<Vec<Question>> {
        match self.cache.lookup().await {
            Lookup::Hit(questions) => Ok(questions),
            Lookup::Miss(generation) => {
                let questions = Question::all(&self.questions).await?;
                self.cache.fill(generation, &questions).await;
                Ok(questions)
            }
        }
    }

    fn not_found(id: QuestionId) -> Error {
        Error::not_found(format!("Question {id}"))
    }
}
