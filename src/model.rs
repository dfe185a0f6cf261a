//! Data model for the extraction pipeline.
//!
//! The wire types mirror the extraction service contract (absence encoded
//! as `0`); the domain types convert the zero sentinel into `None` so that
//! no downstream arithmetic ever sees a sentinel value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cycle::Cycle;

/// One sheet tab of the connected spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetInfo {
    pub name: String,
    pub id: String,
}

/// A student row as returned by the extraction service.
///
/// `scores` aligns positionally with the subject list; `0` means no grade
/// was recorded for that subject.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedStudent {
    pub numero: u32,
    pub aluno: String,
    pub scores: Vec<f64>,
}

/// Full extraction service response for one sheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedTable {
    pub subjects: Vec<String>,
    pub students: Vec<ExtractedStudent>,
}

impl ExtractedTable {
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty() || self.students.is_empty()
    }
}

/// A student with grades keyed by subject name.
///
/// A grade is `None` when the sheet had no value recorded (wire `0`); valid
/// grades are always strictly positive.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub numero: u32,
    pub aluno: String,
    pub grades: HashMap<String, Option<f64>>,
}

impl StudentRecord {
    /// Builds a record from a positional score row, mapping the zero
    /// sentinel (and any missing trailing position) to `None`.
    pub fn from_scores(subjects: &[String], extracted: ExtractedStudent) -> Self {
        let mut grades = HashMap::with_capacity(subjects.len());
        for (i, subject) in subjects.iter().enumerate() {
            let score = extracted.scores.get(i).copied().unwrap_or(0.0);
            let grade = if score > 0.0 { Some(score) } else { None };
            grades.insert(subject.clone(), grade);
        }
        Self {
            numero: extracted.numero,
            aluno: extracted.aluno,
            grades,
        }
    }

    /// The recorded grade for `subject`, if any. An unknown subject is the
    /// same as an absent grade.
    pub fn grade(&self, subject: &str) -> Option<f64> {
        self.grades.get(subject).copied().flatten()
    }
}

/// The single in-memory snapshot of a loaded sheet.
///
/// Replaced wholesale on every successful load; aggregation and ranking
/// only ever run against a fully built snapshot.
#[derive(Debug, Clone)]
pub struct ClassSnapshot {
    pub sheet_name: String,
    pub cycle: Cycle,
    pub subjects: Vec<String>,
    pub students: Vec<StudentRecord>,
    pub loaded_at: DateTime<Utc>,
}

impl ClassSnapshot {
    /// Builds a snapshot from an extraction result, classifying the grading
    /// convention from the sheet label.
    pub fn from_extraction(sheet_name: &str, table: ExtractedTable) -> Self {
        let students = table
            .students
            .into_iter()
            .map(|s| StudentRecord::from_scores(&table.subjects, s))
            .collect();

        Self {
            sheet_name: sheet_name.to_string(),
            cycle: Cycle::classify(sheet_name),
            subjects: table.subjects,
            students,
            loaded_at: Utc::now(),
        }
    }
}
