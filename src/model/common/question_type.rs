use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The kind of a question, which determines the shape of its answers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Exactly one option is chosen; answered with a single code.
    #[default]
    Single,
    /// Zero or more options are chosen; answered with a list of codes.
    Multi,
    /// Free-form answer.
    Text,
    /// A display block that is never answered.
    Note,
}

impl QuestionType {
    /// Whether answers to this kind of question are option codes.
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Single | Self::Multi)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
            Self::Text => "text",
            Self::Note => "note",
        }
    }
}

impl Display for QuestionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = Error;

    /// Parse a question type, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multi" => Ok(Self::Multi),
            "text" => Ok(Self::Text),
            "note" => Ok(Self::Note),
            _ => Err(Error::validation(format!(
                "unknown question type '{s}', expected one of single, multi, text, note"
            ))),
        }
    }
}
