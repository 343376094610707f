use std::collections::HashMap;

use mongodb::bson::Document;
use rocket::serde::json::serde_json;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

use crate::model::{
    common::{QuestionId, QuestionType},
    db::{Question, Response},
};

use super::{answer::answer_text, flat::FlatProjection, tally::Tally};

/// Column widths are fitted to their content within these bounds.
const MIN_WIDTH: usize = 10;
const MAX_WIDTH: usize = 60;

/// The most characters an xlsx cell can hold.
const MAX_CELL_CHARS: usize = 32_767;

/// Cut text to what a cell can hold, on a character boundary.
fn fit_cell(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Render a stored payload as JSON text.
fn payload_json(payload: &Document) -> String {
    serde_json::to_string(payload).unwrap_or_default()
}

/// A worksheet that is only ever appended to, one row at a time.
struct Sheet {
    worksheet: Worksheet,
    next_row: u32,
    widths: Vec<usize>,
}

/// A cell to append.
enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

impl Sheet {
    fn new(name: &str) -> Result<Self, XlsxError> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(name)?;
        Ok(Self {
            worksheet,
            next_row: 0,
            widths: Vec::new(),
        })
    }

    fn push(&mut self, cells: &[Cell<'_>]) -> Result<(), XlsxError> {
        let row = self.next_row;
        for (i, cell) in cells.iter().enumerate() {
            // Out-of-range indices are rejected by the writer.
            let col = u16::try_from(i).unwrap_or(u16::MAX);
            let len = match cell {
                Cell::Text(text) => {
                    let text = fit_cell(text);
                    self.worksheet.write_string(row, col, text)?;
                    text.chars().count()
                }
                Cell::Number(n) => {
                    self.worksheet.write_number(row, col, *n)?;
                    n.to_string().len()
                }
            };
            if self.widths.len() <= i {
                self.widths.resize(i + 1, 0);
            }
            self.widths[i] = self.widths[i].max(len);
        }
        self.next_row = self.next_row.saturating_add(1);
        Ok(())
    }

    fn push_text<S: AsRef<str>>(&mut self, cells: &[S]) -> Result<(), XlsxError> {
        let cells: Vec<_> = cells.iter().map(|c| Cell::Text(c.as_ref())).collect();
        self.push(&cells)
    }

    /// Fit every column to its longest value, within bounds.
    fn autofit(&mut self) -> Result<(), XlsxError> {
        for (i, len) in self.widths.iter().enumerate() {
            let width = (len + 2).clamp(MIN_WIDTH, MAX_WIDTH);
            let col = u16::try_from(i).unwrap_or(u16::MAX);
            self.worksheet.set_column_width(col, width as f64)?;
        }
        Ok(())
    }
}

/// Build a workbook from sheets, in the given order.
fn save(sheets: impl IntoIterator<Item = Sheet>) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        workbook.push_worksheet(sheet.worksheet);
    }
    workbook.save_to_buffer()
}

/// Count and text answers for one question.
enum QuestionSheet {
    /// Filled in from the tally once every response has been seen.
    Counts(Sheet),
    /// Filled in as responses arrive.
    Texts(Sheet),
}

/// The human-oriented export.
///
/// Sheets, in order: `raw_responses` with every stored payload, `summary_counts` with the option
/// counts of every choice question, then a `Q{id}_counts` sheet per choice question or a
/// `Q{id}_texts` sheet per text question, in question order.
pub struct TallyWorkbook {
    raw: Sheet,
    summary: Sheet,
    per_question: Vec<(QuestionId, QuestionSheet)>,
    text_questions: Vec<QuestionId>,
    tally: Tally,
    responses: u64,
}

const COUNT_HEADER: [&str; 3] = ["Question", "Option", "Count"];

impl TallyWorkbook {
    /// Lay out a workbook for the given questions, which must be in display order.
    pub fn new(questions: &[Question]) -> Result<Self, XlsxError> {
        let mut raw = Sheet::new("raw_responses")?;
        raw.push_text(&["id", "ts", "payload"])?;
        let mut summary = Sheet::new("summary_counts")?;
        summary.push_text(&COUNT_HEADER)?;

        let mut per_question = Vec::new();
        let mut text_questions = Vec::new();
        for question in questions {
            match question.qtype {
                QuestionType::Single | QuestionType::Multi => {
                    let mut sheet = Sheet::new(&format!("Q{}_counts", question.id))?;
                    sheet.push_text(&COUNT_HEADER)?;
                    per_question.push((question.id, QuestionSheet::Counts(sheet)));
                }
                QuestionType::Text => {
                    let mut sheet = Sheet::new(&format!("Q{}_texts", question.id))?;
                    sheet.push_text(&["response_id", "ts", "Answer"])?;
                    per_question.push((question.id, QuestionSheet::Texts(sheet)));
                    text_questions.push(question.id);
                }
                QuestionType::Note => {}
            }
        }

        Ok(Self {
            raw,
            summary,
            per_question,
            text_questions,
            tally: Tally::new(questions),
            responses: 0,
        })
    }

    /// Add one response.
    pub fn push(&mut self, response: &Response) -> Result<(), XlsxError> {
        let ts = response.ts_string();
        let payload = payload_json(&response.payload);
        self.raw.push(&[
            Cell::Number(f64::from(response.id)),
            Cell::Text(&ts),
            Cell::Text(&payload),
        ])?;

        self.tally.observe(response);

        for id in &self.text_questions {
            let Some(answer) = response.answer(*id) else {
                continue;
            };
            let answer = answer_text(answer);
            if let Some((_, QuestionSheet::Texts(sheet))) =
                self.per_question.iter_mut().find(|(q, _)| q == id)
            {
                sheet.push(&[
                    Cell::Number(f64::from(response.id)),
                    Cell::Text(&ts),
                    Cell::Text(&answer),
                ])?;
            }
        }

        self.responses += 1;
        Ok(())
    }

    /// How many responses have been added.
    pub fn responses(&self) -> u64 {
        self.responses
    }

    /// Write out the counts and produce the file.
    pub fn finish(mut self) -> Result<Vec<u8>, XlsxError> {
        let counts: HashMap<QuestionId, _> = self
            .tally
            .questions()
            .iter()
            .map(|q| (q.id(), q))
            .collect();
        for (id, sheet) in &mut self.per_question {
            let QuestionSheet::Counts(sheet) = sheet else {
                continue;
            };
            let Some(question) = counts.get(&*id) else {
                continue;
            };
            for row in question.rows() {
                let cells = [
                    Cell::Text(row.question),
                    Cell::Text(row.label),
                    Cell::Number(row.count as f64),
                ];
                sheet.push(&cells)?;
                self.summary.push(&cells)?;
            }
        }

        let per_question = self.per_question.into_iter().map(|(_, sheet)| match sheet {
            QuestionSheet::Counts(sheet) | QuestionSheet::Texts(sheet) => sheet,
        });
        save([self.raw, self.summary].into_iter().chain(per_question))
    }
}

/// The machine-oriented export: a single `flat` sheet with one row per response.
pub struct FlatWorkbook {
    projection: FlatProjection,
    sheet: Sheet,
    responses: u64,
}

impl FlatWorkbook {
    /// Lay out a workbook for the given questions, which must be in display order.
    pub fn new(questions: &[Question]) -> Result<Self, XlsxError> {
        let projection = FlatProjection::new(questions);
        let mut sheet = Sheet::new("flat")?;
        sheet.push_text(projection.header())?;
        Ok(Self {
            projection,
            sheet,
            responses: 0,
        })
    }

    /// Add one response.
    pub fn push(&mut self, response: &Response) -> Result<(), XlsxError> {
        let row = self.projection.row(response);
        self.sheet.push_text(&row)?;
        self.responses += 1;
        Ok(())
    }

    /// How many responses have been added.
    pub fn responses(&self) -> u64 {
        self.responses
    }

    /// Fit the columns and produce the file.
    pub fn finish(mut self) -> Result<Vec<u8>, XlsxError> {
        self.sheet.autofit()?;
        save([self.sheet])
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;

    use super::*;

    /// An xlsx file is a zip archive.
    fn assert_is_xlsx(bytes: &[u8]) {
        assert!(bytes.starts_with(b"PK"), "not a zip archive");
    }

    fn examples() -> Vec<Response> {
        vec![
            Response::example(),
            Response::new(2, doc! {"answers": {"1": "es", "3": "Clean platforms"}}),
            Response::new(3, doc! {"answers": {"1": "gone"}}),
        ]
    }

    #[test]
    fn tally_workbook_sheets() {
        let mut workbook = TallyWorkbook::new(&Question::examples()).unwrap();
        let names: Vec<_> = [&workbook.raw, &workbook.summary]
            .into_iter()
            .chain(workbook.per_question.iter().map(|(_, s)| match s {
                QuestionSheet::Counts(s) | QuestionSheet::Texts(s) => s,
            }))
            .map(|s| s.worksheet.name())
            .collect();
        assert_eq!(
            vec!["raw_responses", "summary_counts", "Q1_counts", "Q2_counts", "Q3_texts"],
            names
        );

        for response in examples() {
            workbook.push(&response).unwrap();
        }
        assert_eq!(3, workbook.responses());
        // Header plus one row per response.
        assert_eq!(4, workbook.raw.next_row);
        // Header plus the two responses that answered question 3.
        match &workbook.per_question[2].1 {
            QuestionSheet::Texts(sheet) => assert_eq!(3, sheet.next_row),
            QuestionSheet::Counts(_) => panic!("question 3 is a text question"),
        }

        assert_is_xlsx(&workbook.finish().unwrap());
    }

    #[test]
    fn flat_workbook_rows_and_widths() {
        let mut workbook = FlatWorkbook::new(&Question::examples()).unwrap();
        for response in examples() {
            workbook.push(&response).unwrap();
        }
        assert_eq!(3, workbook.responses());
        assert_eq!(4, workbook.sheet.next_row);
        // `ts` is short, but its values are 19 characters long.
        assert_eq!(19, workbook.sheet.widths[0]);
        // The header is the longest value in the question columns.
        assert_eq!("Which station are you at today?".len(), workbook.sheet.widths[1]);

        assert_is_xlsx(&workbook.finish().unwrap());
    }

    #[test]
    fn long_text_is_cut_to_fit_a_cell() {
        let long = "x".repeat(40_000);
        assert_eq!(MAX_CELL_CHARS, fit_cell(&long).chars().count());
        // Multi-byte characters are never split.
        let wide = "ä".repeat(40_000);
        assert_eq!(MAX_CELL_CHARS, fit_cell(&wide).chars().count());
        assert_eq!("short", fit_cell("short"));
    }

    #[test]
    fn long_answers_still_export() {
        let long = Response::new(9, doc! {"answers": {"1": "do", "3": "x".repeat(40_000)}});

        let mut tally = TallyWorkbook::new(&Question::examples()).unwrap();
        tally.push(&Response::example()).unwrap();
        tally.push(&long).unwrap();
        assert_eq!(3, tally.raw.next_row);
        assert_is_xlsx(&tally.finish().unwrap());

        let mut flat = FlatWorkbook::new(&Question::examples()).unwrap();
        flat.push(&long).unwrap();
        flat.push(&Response::example()).unwrap();
        assert_eq!(3, flat.sheet.next_row);
        assert_eq!(MAX_CELL_CHARS, flat.sheet.widths[3]);
        assert_is_xlsx(&flat.finish().unwrap());
    }

    #[test]
    fn raw_payload_rendered_as_json() {
        assert_eq!(
            r#"{"answers":{"1":"do","2":["work","leisure"],"3":"Trains were on time"}}"#,
            payload_json(&Response::example().payload)
        );
        assert_eq!("{}", payload_json(&doc! {}));
    }

    #[test]
    fn empty_history_still_exports() {
        let workbook = TallyWorkbook::new(&[]).unwrap();
        assert_is_xlsx(&workbook.finish().unwrap());
        let workbook = FlatWorkbook::new(&[]).unwrap();
        assert_is_xlsx(&workbook.finish().unwrap());
    }
}
