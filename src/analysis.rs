//! Exam-level analytics.
//!
//! Pure computations over a cohort's graded exams: per-question
//! difficulty, error-pattern counts, and common wrong answers. Report
//! maps are insertion-ordered so questions stay in their numeric order
//! when serialized.

use crate::records::{AnswerKey, StudentExam};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

/// Coarse difficulty bucket for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    /// Fewer than 30% of students missed it
    Easy,
    /// 30-70% missed it
    Medium,
    /// More than 70% missed it
    Hard,
}

impl DifficultyLevel {
    /// Bucket a difficulty score in `[0, 1]`.
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            DifficultyLevel::Easy
        } else if score < 0.7 {
            DifficultyLevel::Medium
        } else {
            DifficultyLevel::Hard
        }
    }
}

/// Aggregated analysis of one exam across all students.
#[derive(Debug, Clone, Serialize)]
pub struct ExamAnalysis {
    /// Exam identifier
    pub exam_id: String,
    /// Question numbers in display order
    pub questions: Vec<String>,
    /// question -> share of non-correct attempts in `[0, 1]`
    pub question_difficulty: IndexMap<String, f64>,
    /// question -> error type -> count
    pub error_patterns: IndexMap<String, IndexMap<String, u32>>,
}

/// Analyzer for exam results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExamAnalyzer;

impl ExamAnalyzer {
    /// Create a new analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Analyze the exam results across all students.
    pub fn analyze_exam(
        &self,
        exam_id: &str,
        student_exams: &[StudentExam],
        _answer_key: Option<&AnswerKey>,
    ) -> ExamAnalysis {
        log::info!(
            "analyzing exam {} for {} students",
            exam_id,
            student_exams.len()
        );

        let difficulty = self.calculate_difficulty(student_exams);
        let errors = self.identify_error_patterns(student_exams);

        let mut questions: Vec<String> = difficulty.keys().cloned().collect();
        questions.sort_by_key(|q| question_sort_key(q));

        let question_difficulty: IndexMap<String, f64> = questions
            .iter()
            .filter_map(|q| difficulty.get(q).map(|&d| (q.clone(), d)))
            .collect();
        let error_patterns: IndexMap<String, IndexMap<String, u32>> = questions
            .iter()
            .filter_map(|q| errors.get(q).map(|counts| {
                let mut ordered: Vec<(&String, &u32)> = counts.iter().collect();
                ordered.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
                (
                    q.clone(),
                    ordered
                        .into_iter()
                        .map(|(k, &v)| (k.clone(), v))
                        .collect(),
                )
            }))
            .collect();

        ExamAnalysis {
            exam_id: exam_id.to_string(),
            questions,
            question_difficulty,
            error_patterns,
        }
    }

    /// Difficulty per question: the share of attempts not marked correct.
    pub fn calculate_difficulty(&self, student_exams: &[StudentExam]) -> HashMap<String, f64> {
        let mut totals: HashMap<String, (u32, u32)> = HashMap::new(); // (correct, total)

        for exam in student_exams {
            for answer in &exam.answers {
                let entry = totals
                    .entry(answer.question_number.clone())
                    .or_insert((0, 0));
                entry.1 += 1;
                if answer.is_correct == Some(true) {
                    entry.0 += 1;
                }
            }
        }

        totals
            .into_iter()
            .map(|(question, (correct, total))| {
                let difficulty = if total > 0 {
                    1.0 - correct as f64 / total as f64
                } else {
                    0.0
                };
                (question, difficulty)
            })
            .collect()
    }

    /// Count labelled error types per question (incorrect answers only).
    pub fn identify_error_patterns(
        &self,
        student_exams: &[StudentExam],
    ) -> HashMap<String, HashMap<String, u32>> {
        let mut patterns: HashMap<String, HashMap<String, u32>> = HashMap::new();

        for exam in student_exams {
            for answer in &exam.answers {
                if answer.is_correct == Some(false) {
                    if let Some(error_type) = &answer.error_type {
                        *patterns
                            .entry(answer.question_number.clone())
                            .or_default()
                            .entry(error_type.clone())
                            .or_insert(0) += 1;
                    }
                }
            }
        }
        patterns
    }

    /// Incorrect answer texts seen more than once, most common first.
    pub fn find_common_errors(
        &self,
        student_exams: &[StudentExam],
    ) -> HashMap<String, Vec<String>> {
        let mut by_question: HashMap<String, HashMap<String, u32>> = HashMap::new();

        for exam in student_exams {
            for answer in &exam.answers {
                if answer.is_correct == Some(false) {
                    *by_question
                        .entry(answer.question_number.clone())
                        .or_default()
                        .entry(answer.answer_text.clone())
                        .or_insert(0) += 1;
                }
            }
        }

        by_question
            .into_iter()
            .filter_map(|(question, counts)| {
                let mut repeated: Vec<(String, u32)> =
                    counts.into_iter().filter(|(_, n)| *n > 1).collect();
                if repeated.is_empty() {
                    return None;
                }
                repeated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                Some((question, repeated.into_iter().map(|(text, _)| text).collect()))
            })
            .collect()
    }
}

/// Numeric question numbers sort numerically, everything else after them
/// lexicographically.
fn question_sort_key(q: &str) -> (bool, i64, String) {
    match q.parse::<i64>() {
        Ok(n) => (false, n, String::new()),
        Err(_) => (true, 0, q.to_string()),
    }
}
