//! Answer and exam record types.
//!
//! Two layers: the persisted shapes the grading pipeline stores as JSON
//! ([`StoredAnswer`], [`StudentExam`], [`AnswerKey`]) and the minimal
//! [`AnswerRecord`] projection the highlighter consumes. Persisted JSON
//! is tolerant: question numbers may arrive as numbers or strings, the
//! location may be missing entirely, and correctness is a JSON
//! `true`/`false`/`null` tri-state.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Tri-state evaluation outcome for an answer.
///
/// `Unknown` means the answer was not evaluated or the question is not
/// present in the answer key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Correctness {
    /// Evaluated as correct
    Correct,
    /// Evaluated as incorrect
    Incorrect,
    /// Not evaluated / not in the key
    #[default]
    Unknown,
}

impl From<Option<bool>> for Correctness {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Correctness::Correct,
            Some(false) => Correctness::Incorrect,
            None => Correctness::Unknown,
        }
    }
}

impl From<Correctness> for Option<bool> {
    fn from(value: Correctness) -> Self {
        match value {
            Correctness::Correct => Some(true),
            Correctness::Incorrect => Some(false),
            Correctness::Unknown => None,
        }
    }
}

/// A normalized rectangle: coordinates in `[0, 1]` relative to page
/// width/height, `(x1, y1)` top-left and `(x2, y2)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
    /// Right edge
    pub x2: f32,
    /// Bottom edge
    pub y2: f32,
}

/// Where an answer sits in the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerLocation {
    /// 1-indexed page number
    #[serde(default = "default_page")]
    pub page: u32,
    /// Optional normalized region
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    /// Sub-regions when the answer text is not visually contiguous
    #[serde(default)]
    pub text_spans: Vec<BoundingBox>,
}

fn default_page() -> u32 {
    1
}

impl Default for AnswerLocation {
    fn default() -> Self {
        Self {
            page: 1,
            bounding_box: None,
            text_spans: Vec::new(),
        }
    }
}

/// The minimal record the highlighter consumes: one transcribed response
/// to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Opaque question identifier, compared as a string
    #[serde(deserialize_with = "string_or_number")]
    pub question_number: String,
    /// Transcribed free text (may contain extraction artifacts)
    #[serde(default)]
    pub answer_text: String,
    /// Evaluation outcome
    #[serde(default, rename = "is_correct")]
    pub correctness: Correctness,
    /// Location in the source document
    #[serde(default)]
    pub location: AnswerLocation,
}

/// The full persisted shape of one answer, as the evaluation pipeline
/// stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredAnswer {
    /// Question identifier
    #[serde(deserialize_with = "string_or_number", default)]
    pub question_number: String,
    /// Transcribed answer text
    #[serde(default)]
    pub answer_text: String,
    /// Tri-state correctness (`null` = not evaluated)
    #[serde(default)]
    pub is_correct: Option<bool>,
    /// Location, absent when extraction produced none
    #[serde(default)]
    pub location: Option<AnswerLocation>,
    /// Categorized error label set by the evaluation stage
    #[serde(default)]
    pub error_type: Option<String>,
    /// Free-text rationale from the evaluation stage
    #[serde(default)]
    pub evaluation_reason: Option<String>,
    /// Topics to review, set by the evaluation stage
    #[serde(default)]
    pub learning_topics: Vec<String>,
    /// The key's reference answer, when known
    #[serde(default)]
    pub reference_to_answer: Option<String>,
    /// Identified misconception, when any
    #[serde(default)]
    pub misconception: Option<String>,
}

impl StoredAnswer {
    /// Project this record down to the fields the highlighter needs.
    ///
    /// The page defaults to 1 when no location was stored.
    pub fn to_highlight_input(&self) -> AnswerRecord {
        AnswerRecord {
            question_number: self.question_number.clone(),
            answer_text: self.answer_text.clone(),
            correctness: Correctness::from(self.is_correct),
            location: self.location.clone().unwrap_or_default(),
        }
    }
}

/// One student's exam with all their answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentExam {
    /// Student identifier
    pub student_id: String,
    /// Exam identifier
    pub exam_id: String,
    /// Full name when transcription found one
    #[serde(default)]
    pub student_name: Option<String>,
    /// All transcribed answers
    #[serde(default)]
    pub answers: Vec<StoredAnswer>,
    /// Percentage score, set after comparison with the key
    #[serde(default)]
    pub score: Option<f64>,
}

impl StudentExam {
    /// Load a student exam from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&data).map_err(|e| Error::Record(e.to_string()))
    }

    /// Save the student exam as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Record(e.to_string()))?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Project all answers into highlighter input records.
    pub fn to_highlight_inputs(&self) -> Vec<AnswerRecord> {
        self.answers.iter().map(StoredAnswer::to_highlight_input).collect()
    }
}

/// The authoritative answers for one exam.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerKey {
    /// Exam identifier
    pub exam_id: String,
    /// question number -> correct answer text
    #[serde(default)]
    pub answers: HashMap<String, String>,
    /// question number -> location of the answer in the key document
    #[serde(default)]
    pub answer_locations: HashMap<String, AnswerLocation>,
}

impl AnswerKey {
    /// Load an answer key from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&data).map_err(|e| Error::Record(e.to_string()))
    }

    /// Save the answer key as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Record(e.to_string()))?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

/// Accept question numbers as JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Value::deserialize(deserializer)? {
        Value::Str(s) => s,
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correctness_from_json_tristate() {
        let record: AnswerRecord =
            serde_json::from_str(r#"{"question_number":"1","is_correct":true}"#).unwrap();
        assert_eq!(record.correctness, Correctness::Correct);

        let record: AnswerRecord =
            serde_json::from_str(r#"{"question_number":"1","is_correct":false}"#).unwrap();
        assert_eq!(record.correctness, Correctness::Incorrect);

        let record: AnswerRecord =
            serde_json::from_str(r#"{"question_number":"1","is_correct":null}"#).unwrap();
        assert_eq!(record.correctness, Correctness::Unknown);

        let record: AnswerRecord =
            serde_json::from_str(r#"{"question_number":"1"}"#).unwrap();
        assert_eq!(record.correctness, Correctness::Unknown);
    }

    #[test]
    fn test_question_number_accepts_numbers() {
        let record: AnswerRecord = serde_json::from_str(r#"{"question_number":7}"#).unwrap();
        assert_eq!(record.question_number, "7");

        let record: AnswerRecord = serde_json::from_str(r#"{"question_number":"7a"}"#).unwrap();
        assert_eq!(record.question_number, "7a");
    }

    #[test]
    fn test_location_defaults() {
        let record: AnswerRecord = serde_json::from_str(r#"{"question_number":"1"}"#).unwrap();
        assert_eq!(record.location.page, 1);
        assert!(record.location.bounding_box.is_none());
        assert!(record.location.text_spans.is_empty());
    }

    #[test]
    fn test_stored_answer_projection_defaults_page() {
        let stored = StoredAnswer {
            question_number: "3".to_string(),
            answer_text: "Paris".to_string(),
            is_correct: Some(false),
            location: None,
            error_type: Some("factual".to_string()),
            ..Default::default()
        };
        let record = stored.to_highlight_input();
        assert_eq!(record.question_number, "3");
        assert_eq!(record.correctness, Correctness::Incorrect);
        assert_eq!(record.location.page, 1);
    }

    #[test]
    fn test_student_exam_json_roundtrip() {
        let json = r#"{
            "student_id": "s01",
            "exam_id": "exam1",
            "student_name": "Alice Martin",
            "answers": [
                {
                    "question_number": 1,
                    "answer_text": "Paris",
                    "is_correct": true,
                    "location": {"page": 2, "bounding_box": {"x1": 0.1, "y1": 0.2, "x2": 0.5, "y2": 0.25}}
                }
            ],
            "score": 100.0
        }"#;
        let exam: StudentExam = serde_json::from_str(json).unwrap();
        assert_eq!(exam.answers.len(), 1);
        assert_eq!(exam.answers[0].question_number, "1");
        let inputs = exam.to_highlight_inputs();
        assert_eq!(inputs[0].location.page, 2);
        assert!(inputs[0].location.bounding_box.is_some());

        let back = serde_json::to_string(&exam).unwrap();
        let again: StudentExam = serde_json::from_str(&back).unwrap();
        assert_eq!(exam, again);
    }

    #[test]
    fn test_correctness_serializes_as_tristate() {
        let record = AnswerRecord {
            question_number: "1".to_string(),
            answer_text: String::new(),
            correctness: Correctness::Unknown,
            location: AnswerLocation::default(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""is_correct":null"#));
    }
}
