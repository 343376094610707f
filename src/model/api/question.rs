use std::collections::HashSet;

use rocket::serde::json::Value;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{OptionId, QuestionId, QuestionType},
    db::{Question, QuestionCore, QuestionOption},
};

/// A question as submitted by the editor, for both creation and update.
///
/// The type may arrive as either `qtype` or `type`, and the order as either `qorder` or `order`.
/// Nothing here is trusted until [`QuestionSpec::validate`] has been called.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionSpec {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qtype: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qorder: Option<i64>,
    #[serde(default, rename = "order", skip_serializing_if = "Option::is_none")]
    pub order_alias: Option<i64>,
    #[serde(default)]
    pub options: Option<Vec<OptionSpec>>,
}

/// One submitted option.
///
/// Any explicit position is ignored; options are ordered by their place in the list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Accepts a number or a numeric string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<Value>,
}

/// Presentation metadata of a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteMetadata {
    pub image_url: Option<String>,
    pub caption: Option<String>,
    pub image_width: Option<u32>,
}

/// A validated question, ready to be given IDs and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub text: String,
    pub qtype: QuestionType,
    /// `None` if the editor didn't say; creation then uses 0 and update keeps the current order.
    pub order: Option<i64>,
    choices: Vec<(String, String)>,
    note: Option<NoteMetadata>,
}

impl QuestionSpec {
    /// Normalise and check this question, reporting the first problem found.
    pub fn validate(self) -> Result<NewQuestion> {
        let text = self.text.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(Error::validation("text is required"));
        }

        let qtype = match [self.qtype, self.type_alias]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
        {
            Some(t) => t.parse::<QuestionType>()?,
            None => QuestionType::default(),
        };

        let options = self.options.unwrap_or_default();
        let mut choices = Vec::new();
        let mut note = None;
        match qtype {
            QuestionType::Single | QuestionType::Multi => {
                let mut seen = HashSet::new();
                for (i, option) in options.into_iter().enumerate() {
                    let code = non_blank(option.code)
                        .ok_or_else(|| Error::validation(format!("option {i} has no code")))?;
                    let label = non_blank(option.label)
                        .ok_or_else(|| Error::validation(format!("option {i} has no label")))?;
                    if !seen.insert(code.clone()) {
                        return Err(Error::validation(format!(
                            "option code '{code}' is used more than once"
                        )));
                    }
                    choices.push((code, label));
                }
            }
            QuestionType::Note => {
                let meta = options.into_iter().next().unwrap_or_default();
                note = Some(NoteMetadata {
                    image_url: non_blank(meta.image_url),
                    caption: non_blank(meta.caption),
                    image_width: meta.image_width.as_ref().and_then(positive_width),
                });
            }
            QuestionType::Text => {}
        }

        Ok(NewQuestion {
            text,
            qtype,
            order: self.qorder.or(self.order_alias),
            choices,
            note,
        })
    }
}

impl NewQuestion {
    /// How many option IDs this question needs.
    pub fn option_count(&self) -> u32 {
        let count = if self.note.is_some() {
            1
        } else {
            self.choices.len()
        };
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Build the stored form, taking option IDs from `ids` in list order.
    ///
    /// Positions are assigned from list order.
    pub fn into_core(self, order: i64, ids: impl IntoIterator<Item = OptionId>) -> QuestionCore {
        let mut ids = ids.into_iter();
        let options = match self.note {
            Some(note) => ids
                .next()
                .map(|id| QuestionOption::note(id, note.image_url, note.caption, note.image_width))
                .into_iter()
                .collect(),
            None => self
                .choices
                .into_iter()
                .zip(ids)
                .zip(0..)
                .map(|(((code, label), id), position)| {
                    QuestionOption::choice(id, code, label, position)
                })
                .collect(),
        };
        QuestionCore {
            text: self.text,
            qtype: self.qtype,
            order,
            options,
        }
    }
}

/// Trim a string, discarding it if nothing is left.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Coerce a width to a positive integer, or nothing.
fn positive_width(value: &Value) -> Option<u32> {
    let width = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 1.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    u32::try_from(width).ok().filter(|w| *w > 0)
}

/// An option, as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDescription {
    pub id: OptionId,
    pub code: String,
    pub label: String,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
}

impl From<QuestionOption> for OptionDescription {
    fn from(option: QuestionOption) -> Self {
        Self {
            id: option.id,
            code: option.code,
            label: option.label,
            order: option.order,
            image_url: option.image_url,
            caption: option.caption,
            image_width: option.image_width,
        }
    }
}

/// A question, as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDescription {
    pub id: QuestionId,
    pub text: String,
    #[serde(rename = "type")]
    pub qtype: QuestionType,
    pub order: i64,
    pub options: Vec<OptionDescription>,
}

impl From<Question> for QuestionDescription {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            text: question.question.text,
            qtype: question.question.qtype,
            order: question.question.order,
            options: question
                .question
                .options
                .into_iter()
                .map(OptionDescription::from)
                .collect(),
        }
    }
}

/// Every question, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionList {
    pub questions: Vec<QuestionDescription>,
}

impl From<Vec<Question>> for QuestionList {
    fn from(questions: Vec<Question>) -> Self {
        Self {
            questions: questions.into_iter().map(Into::into).collect(),
        }
    }
}
