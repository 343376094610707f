use std::collections::HashMap;

use crate::model::{
    common::{QuestionId, QuestionType},
    db::{Question, Response},
};

use super::answer::chosen_codes;

/// One line of a tally: how often an option was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyRow<'a> {
    pub question: &'a str,
    pub label: &'a str,
    pub count: u64,
}

/// Option counts for one choice question.
#[derive(Debug, Clone)]
pub struct QuestionTally {
    id: QuestionId,
    text: String,
    multiple: bool,
    labels: HashMap<String, String>,
    /// Codes with their counts, in the order they were first seen.
    counts: Vec<(String, u64)>,
    positions: HashMap<String, usize>,
}

impl QuestionTally {
    /// Start counting for a question, or `None` if it has no choices to count.
    pub fn new(question: &Question) -> Option<Self> {
        if !question.qtype.is_choice() {
            return None;
        }
        let mut labels = HashMap::new();
        for option in &question.options {
            labels
                .entry(option.code.clone())
                .or_insert_with(|| option.label.clone());
        }
        Some(Self {
            id: question.id,
            text: question.text.clone(),
            multiple: question.qtype == QuestionType::Multi,
            labels,
            counts: Vec::new(),
            positions: HashMap::new(),
        })
    }

    pub fn id(&self) -> QuestionId {
        self.id
    }

    /// Count this question's answer in a response, if there is one.
    pub fn observe(&mut self, response: &Response) {
        let Some(answer) = response.answer(self.id) else {
            return;
        };
        for code in chosen_codes(answer, self.multiple) {
            match self.positions.get(&code) {
                Some(&i) => self.counts[i].1 += 1,
                None => {
                    self.positions.insert(code.clone(), self.counts.len());
                    self.counts.push((code, 1));
                }
            }
        }
    }

    /// The counts so far, labelled with the current option labels.
    ///
    /// A code without a current option is labelled with the code itself.
    pub fn rows(&self) -> impl Iterator<Item = TallyRow<'_>> {
        self.counts.iter().map(|(code, count)| TallyRow {
            question: &self.text,
            label: self.labels.get(code).unwrap_or(code),
            count: *count,
        })
    }
}

/// Option counts for every choice question of the survey, in question order.
#[derive(Debug, Clone)]
pub struct Tally {
    questions: Vec<QuestionTally>,
}

impl Tally {
    pub fn new(questions: &[Question]) -> Self {
        Self {
            questions: questions.iter().filter_map(QuestionTally::new).collect(),
        }
    }

    pub fn observe(&mut self, response: &Response) {
        for question in &mut self.questions {
            question.observe(response);
        }
    }

    pub fn questions(&self) -> &[QuestionTally] {
        &self.questions
    }

    /// Every row of every question, as one combined table.
    pub fn summary(&self) -> impl Iterator<Item = TallyRow<'_>> {
        self.questions.iter().flat_map(|q| q.rows())
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{doc, Document};

    use crate::model::db::{QuestionCore, QuestionOption};

    use super::*;

    fn ab_question() -> Question {
        Question::new(
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
        )
    }

    fn responses(payloads: Vec<Document>) -> Vec<Response> {
        payloads
            .into_iter()
            .zip(1..)
            .map(|(payload, id)| Response::new(id, payload))
            .collect()
    }

    fn tally(questions: &[Question], responses: &[Response]) -> Tally {
        let mut tally = Tally::new(questions);
        responses.iter().for_each(|r| tally.observe(r));
        tally
    }

    fn counts(tally: &Tally) -> Vec<(&str, &str, u64)> {
        tally
            .summary()
            .map(|row| (row.question, row.label, row.count))
            .collect()
    }

    #[test]
    fn single_choice_counts() {
        let questions = [ab_question()];
        let responses = responses(vec![
            doc! {"answers": {"1": "a"}},
            doc! {"answers": {"1": "a"}},
            doc! {"answers": {"1": "b"}},
        ]);
        let tally = tally(&questions, &responses);
        assert_eq!(vec![("Q1", "A", 2), ("Q1", "B", 1)], counts(&tally));
    }

    #[test]
    fn orphaned_codes_reported_verbatim() {
        let questions = [ab_question()];
        let responses = responses(vec![
            doc! {"answers": {"1": "c"}},
            doc! {"answers": {"1": "a"}},
            doc! {"answers": {"2": "a"}},
            doc! {"answers": {"1": null}},
            doc! {},
        ]);
        let tally = tally(&questions, &responses);
        assert_eq!(vec![("Q1", "c", 1), ("Q1", "A", 1)], counts(&tally));
    }

    #[test]
    fn multi_choice_counts_every_code() {
        let questions = Question::examples();
        let responses = responses(vec![
            doc! {"answers": {"2": ["work", "leisure"]}},
            doc! {"answers": {"2": ["leisure"]}},
            doc! {"answers": {"2": "other"}},
            doc! {"answers": {"2": []}},
        ]);
        let tally = tally(&questions, &responses);
        let question = &tally.questions()[1];
        assert_eq!(2, question.id());
        let rows: Vec<_> = question.rows().map(|r| (r.label, r.count)).collect();
        assert_eq!(
            vec![("Commuting", 1), ("Leisure", 2), ("Something else", 1)],
            rows
        );
    }

    #[test]
    fn text_and_note_questions_never_tallied() {
        let questions = Question::examples();
        let responses = responses(vec![
            doc! {"answers": {"1": "do", "3": "Lovely", "4": "seen"}},
        ]);
        let tally = tally(&questions, &responses);
        let ids: Vec<_> = tally.questions().iter().map(QuestionTally::id).collect();
        assert_eq!(vec![1, 2], ids);
        assert_eq!(
            vec![("Which station are you at today?", "Dortmund Hbf", 1)],
            counts(&tally)
        );
    }

    #[test]
    fn summary_in_question_then_first_seen_order() {
        let questions = Question::examples();
        let responses = responses(vec![
            doc! {"answers": {"2": ["leisure"], "1": "es"}},
            doc! {"answers": {"2": ["work"], "1": "do"}},
        ]);
        let tally = tally(&questions, &responses);
        let labels: Vec<_> = tally.summary().map(|r| r.label).collect();
        assert_eq!(vec!["Essen Hbf", "Dortmund Hbf", "Leisure", "Commuting"], labels);
    }
}
