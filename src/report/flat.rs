use crate::model::{
    common::{QuestionId, QuestionType},
    db::{Question, Response},
};

use super::answer::answer_text;

/// Heading of the leading timestamp column.
pub const TS_HEADING: &str = "ts";

/// One row per response and one column per answerable question, holding raw codes.
#[derive(Debug, Clone)]
pub struct FlatProjection {
    columns: Vec<QuestionId>,
    header: Vec<String>,
}

impl FlatProjection {
    /// Lay out the columns for the given questions, which must be in display order.
    /// Notes have no column.
    pub fn new(questions: &[Question]) -> Self {
        let answerable: Vec<_> = questions
            .iter()
            .filter(|q| q.qtype != QuestionType::Note)
            .collect();
        let header = std::iter::once(TS_HEADING.to_string())
            .chain(answerable.iter().map(|q| q.text.clone()))
            .collect();
        Self {
            columns: answerable.iter().map(|q| q.id).collect(),
            header,
        }
    }

    /// `ts` followed by the text of each question.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// The cells of one response: its timestamp, then the raw answer to each question.
    /// Unanswered questions are empty.
    pub fn row(&self, response: &Response) -> Vec<String> {
        std::iter::once(response.ts_string())
            .chain(self.columns.iter().map(|&id| {
                response
                    .answer(id)
                    .map(answer_text)
                    .unwrap_or_default()
            }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use mongodb::bson::{doc, Document};

    use crate::model::db::{QuestionCore, QuestionOption};

    use super::*;

    fn response(payload: Document) -> Response {
        Response {
            id: 1,
            ts: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            payload,
        }
    }

    #[test]
    fn single_choice_row() {
        let question = Question::new(
            1,
            QuestionCore {
                text: "Q1".to_string(),
                qtype: QuestionType::Single,
                order: 0,
                options: vec![
                    QuestionOption::choice(1, "a".to_string(), "A".to_string(), 0),
                    QuestionOption::choice(2, "b".to_string(), "B".to_string(), 1),
                ],
            },
        );
        let flat = FlatProjection::new(&[question]);
        assert_eq!(vec!["ts", "Q1"], flat.header());
        assert_eq!(
            vec!["2024-01-02 03:04:05", "a"],
            flat.row(&response(doc! {"answers": {"1": "a"}}))
        );
    }

    #[test]
    fn raw_codes_by_type() {
        let flat = FlatProjection::new(&Question::examples());
        assert_eq!(
            vec![
                "ts",
                "Which station are you at today?",
                "Why are you travelling?",
                "Anything else to tell us?",
            ],
            flat.header()
        );
        let row = flat.row(&response(doc! {
            "answers": {"1": "es", "2": ["x", "y"], "3": "Too crowded", "4": "ignored"}
        }));
        assert_eq!(
            vec!["2024-01-02 03:04:05", "es", "x, y", "Too crowded"],
            row
        );
    }

    #[test]
    fn missing_answers_are_empty() {
        let flat = FlatProjection::new(&Question::examples());
        let row = flat.row(&response(doc! {"answers": {"2": null, "99": "stale"}}));
        assert_eq!(vec!["2024-01-02 03:04:05", "", "", ""], row);
        let row = flat.row(&response(doc! {"note": "no answers at all"}));
        assert_eq!(vec!["2024-01-02 03:04:05", "", "", ""], row);
    }
}
