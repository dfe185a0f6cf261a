//! Grading-convention classifier.
//!
//! Portuguese schools grade differently per educational cycle: pre-school
//! and the 1st cycle use qualitative labels, the 2nd/3rd cycles a 1–5
//! scale, and secondary a 1–20 scale. The convention is inferred from the
//! sheet (class) label; an unrecognized label falls back to [`Cycle::Default`],
//! which shares the secondary 1–20 parameters.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static FIRST_CYCLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(1|2|3|4)\.?º\s?Ano").unwrap());
static SECOND_THIRD_CYCLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(5|6|7|8|9)\.?º\s?Ano").unwrap());
static SECONDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(10|11|12)\.?º\s?Ano").unwrap());
static SECOND_CYCLE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(5|6)\.?º\s?Ano").unwrap());

/// Grading convention of an educational cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Cycle {
    PreSchool,
    FirstCycle,
    SecondThirdCycle,
    Secondary,
    /// Unrecognized label; treated as secondary for thresholds.
    Default,
}

impl Cycle {
    /// Classifies a class/sheet label. Total: every string maps to exactly
    /// one cycle, first match wins, case-insensitive.
    pub fn classify(label: &str) -> Self {
        if label.to_lowercase().starts_with("pré_") {
            Cycle::PreSchool
        } else if FIRST_CYCLE.is_match(label) {
            Cycle::FirstCycle
        } else if SECOND_THIRD_CYCLE.is_match(label) {
            Cycle::SecondThirdCycle
        } else if SECONDARY.is_match(label) {
            Cycle::Secondary
        } else {
            Cycle::Default
        }
    }

    /// Minimum grade value counted as a pass.
    pub fn positive_threshold(self) -> f64 {
        match self {
            Cycle::PreSchool => 2.0,
            Cycle::FirstCycle | Cycle::SecondThirdCycle => 3.0,
            Cycle::Secondary | Cycle::Default => 10.0,
        }
    }

    /// Top of the grading scale, used to detect maximum classifications.
    pub fn max_grade(self) -> f64 {
        match self {
            Cycle::PreSchool => 3.0,
            Cycle::FirstCycle | Cycle::SecondThirdCycle => 5.0,
            Cycle::Secondary | Cycle::Default => 20.0,
        }
    }

    /// Qualitative cycles report pass-rate percentages rather than
    /// averages and standard deviations.
    pub fn is_qualitative(self) -> bool {
        matches!(self, Cycle::PreSchool | Cycle::FirstCycle)
    }

    /// Display group for the sheet listing. Splits the 2nd from the 3rd
    /// cycle even though both share one statistics convention.
    pub fn display_group(label: &str) -> &'static str {
        match Cycle::classify(label) {
            Cycle::PreSchool => "Pré-escolar",
            Cycle::FirstCycle => "1.º Ciclo",
            Cycle::SecondThirdCycle => {
                if SECOND_CYCLE_ONLY.is_match(label) {
                    "2.º Ciclo"
                } else {
                    "3.º Ciclo"
                }
            }
            Cycle::Secondary => "Secundário",
            Cycle::Default => "Outras",
        }
    }
}
