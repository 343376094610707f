use mongodb::bson::Bson;

/// Separator between the codes of a multiple-choice answer.
pub const CODE_SEPARATOR: &str = ", ";

/// Render a stored answer as text.
///
/// Strings are returned as-is, lists are joined with [`CODE_SEPARATOR`], and anything else is
/// written as JSON.
pub fn answer_text(answer: &Bson) -> String {
    match answer {
        Bson::String(s) => s.clone(),
        Bson::Array(items) => items
            .iter()
            .map(answer_text)
            .collect::<Vec<_>>()
            .join(CODE_SEPARATOR),
        Bson::Null | Bson::Undefined => String::new(),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(n) => n.to_string(),
        Bson::Boolean(b) => b.to_string(),
        other => other.clone().into_relaxed_extjson().to_string(),
    }
}

/// The codes chosen by an answer, for counting.
///
/// A list counts each of its elements only when the question allows several choices;
/// otherwise the answer is a single code.
pub fn chosen_codes(answer: &Bson, multiple: bool) -> Vec<String> {
    match answer {
        Bson::Array(items) if multiple => items
            .iter()
            .filter(|item| !matches!(item, Bson::Null | Bson::Undefined))
            .map(answer_text)
            .collect(),
        _ => vec![answer_text(answer)],
    }
}
