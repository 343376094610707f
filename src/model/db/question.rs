use std::ops::Deref;

use mongodb::{
    bson::doc,
    options::{FindOptions, ReplaceOptions},
    ClientSession,
};
use rocket::futures::TryStreamExt;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    common::{OptionId, QuestionId, QuestionType},
    mongodb::{u32_id_filter, Coll},
};

/// One option of a question.
///
/// A `note` question carries exactly one of these, with empty code and label, purely to hold
/// its presentation metadata. It is never a selectable choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Option unique ID.
    pub id: OptionId,
    /// Machine code recorded in responses.
    pub code: String,
    /// Human-readable label.
    pub label: String,
    /// Position within the question.
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
}

impl QuestionOption {
    /// A selectable choice.
    pub fn choice(id: OptionId, code: String, label: String, order: u32) -> Self {
        Self {
            id,
            code,
            label,
            order,
            image_url: None,
            caption: None,
            image_width: None,
        }
    }

    /// The presentation metadata of a note.
    pub fn note(
        id: OptionId,
        image_url: Option<String>,
        caption: Option<String>,
        image_width: Option<u32>,
    ) -> Self {
        Self {
            id,
            code: String::new(),
            label: String::new(),
            order: 0,
            image_url,
            caption,
            image_width,
        }
    }
}

/// Core question data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCore {
    /// Question text.
    pub text: String,
    /// Question type.
    #[serde(rename = "type")]
    pub qtype: QuestionType,
    /// Display order. Need not be unique; ties are broken by ID.
    pub order: i64,
    /// The options of this question. Always replaced as a whole.
    pub options: Vec<QuestionOption>,
}

impl QuestionCore {
    /// Put the options into display order, ties broken by ID.
    pub fn sort_options(&mut self) {
        self.options.sort_by_key(|option| (option.order, option.id));
    }

    /// Look up the label of a choice by its code.
    pub fn label_for(&self, code: &str) -> Option<&str> {
        if !self.qtype.is_choice() {
            return None;
        }
        self.options
            .iter()
            .find(|option| option.code == code)
            .map(|option| option.label.as_str())
    }
}

/// A question from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: QuestionId,
    #[serde(flatten)]
    pub question: QuestionCore,
}

impl Deref for Question {
    type Target = QuestionCore;

    fn deref(&self) -> &Self::Target {
        &self.question
    }
}

impl Question {
    pub fn new(id: QuestionId, question: QuestionCore) -> Self {
        Self { id, question }
    }

    /// Sort by display order, ties broken by ID.
    fn display_order() -> FindOptions {
        FindOptions::builder().sort(doc! {"order": 1, "_id": 1}).build()
    }

    /// Retrieve every question in display order, options included and sorted.
    pub async fn all(questions: &Coll<Question>) -> Result<Vec<Question>> {
        let mut all: Vec<Question> = questions
            .find(None, Self::display_order())
            .await?
            .try_collect()
            .await?;
        all.iter_mut().for_each(|q| q.question.sort_options());
        Ok(all)
    }

    /// As [`Question::all`], but reading within the given session.
    pub async fn all_in_session(
        questions: &Coll<Question>,
        session: &mut ClientSession,
    ) -> Result<Vec<Question>> {
        let mut cursor = questions
            .find_with_session(None, Self::display_order(), session)
            .await?;
        let mut all = Vec::new();
        while let Some(question) = cursor.next(session).await {
            let mut question = question?;
            question.question.sort_options();
            all.push(question);
        }
        Ok(all)
    }

    /// Retrieve a single question, if it exists.
    pub async fn find(questions: &Coll<Question>, id: QuestionId) -> Result<Option<Question>> {
        let mut question = questions.find_one(u32_id_filter(id), None).await?;
        if let Some(q) = question.as_mut() {
            q.question.sort_options();
        }
        Ok(question)
    }

    /// Insert a brand new question.
    pub async fn insert(questions: &Coll<Question>, question: &Question) -> Result<()> {
        questions.insert_one(question, None).await?;
        Ok(())
    }

    /// Overwrite the stored question with this one, options and all, in a single write.
    ///
    /// Returns whether the question existed.
    pub async fn replace(questions: &Coll<Question>, question: &Question) -> Result<bool> {
        let result = questions
            .replace_one(
                u32_id_filter(question.id),
                question,
                ReplaceOptions::builder().upsert(false).build(),
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Delete a question and, with it, its options.
    ///
    /// Returns whether the question existed.
    pub async fn delete(questions: &Coll<Question>, id: QuestionId) -> Result<bool> {
        let result = questions.delete_one(u32_id_filter(id), None).await?;
        Ok(result.deleted_count > 0)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_sorted_by_order_then_id() {
        let mut question = QuestionCore::example_multi();
        question.options[0].order = 5;
        question.options[1].order = 1;
        question.options[2].order = 1;
        question.sort_options();
        let ids: Vec<_> = question.options.iter().map(|o| o.id).collect();
        assert_eq!(vec![4, 5, 3], ids);
    }

    #[test]
    fn labels_only_resolved_for_choices() {
        let single = QuestionCore::example_single();
        assert_eq!(Some("Essen Hbf"), single.label_for("es"));
        assert_eq!(None, single.label_for("c"));
        let note = QuestionCore::example_note();
        assert_eq!(None, note.label_for(""));
    }

    #[backend_test(seeded)]
    async fn all_in_display_order(questions: Coll<Question>) {
        // Add a question that sorts between the first two by ID.
        let mut tied = QuestionCore::example_text();
        tied.order = 0;
        Question::insert(&questions, &Question::new(9, tied)).await.unwrap();

        let ids: Vec<_> = Question::all(&questions)
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(vec![1, 9, 2, 3, 4], ids);
    }

    #[backend_test(seeded)]
    async fn replace_and_delete(questions: Coll<Question>) {
        let mut question = Question::find(&questions, 1).await.unwrap().unwrap();
        assert_eq!(Question::examples()[0], question);

        // Replacing swaps the whole option set.
        question.question.options.clear();
        assert!(Question::replace(&questions, &question).await.unwrap());
        let stored = Question::find(&questions, 1).await.unwrap().unwrap();
        assert!(stored.options.is_empty());

        // Replacing a missing question does not create it.
        let ghost = Question::new(42, QuestionCore::example_text());
        assert!(!Question::replace(&questions, &ghost).await.unwrap());
        assert!(Question::find(&questions, 42).await.unwrap().is_none());

        assert!(Question::delete(&questions, 1).await.unwrap());
        assert!(!Question::delete(&questions, 1).await.unwrap());
        assert!(Question::find(&questions, 1).await.unwrap().is_none());
    }
}
