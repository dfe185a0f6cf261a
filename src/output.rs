//! Output formatting and persistence for class reports.
//!
//! Supports the terminal grade table, pretty JSON reports, and CSV append
//! of per-subject statistics.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::cycle::Cycle;
use crate::format::{format_decimal, grade_label};
use crate::model::ClassSnapshot;
use crate::rankings::CohortRankings;
use crate::stats::SubjectStats;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Complete analysis result for one sheet, serialized as JSON.
#[derive(Debug, Serialize)]
pub struct ClassReport {
    pub generated_at: DateTime<Utc>,
    pub sheet_name: String,
    pub cycle: Cycle,
    pub total_students: usize,
    pub subjects: Vec<SubjectStats>,
    pub rankings: CohortRankings,
}

impl ClassReport {
    pub fn new(
        snapshot: &ClassSnapshot,
        subjects: Vec<SubjectStats>,
        rankings: CohortRankings,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            sheet_name: snapshot.sheet_name.clone(),
            cycle: snapshot.cycle,
            total_students: snapshot.students.len(),
            subjects,
            rankings,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One flat CSV row per subject; the nested distribution stays in the
/// JSON report.
#[derive(Debug, Serialize)]
struct SubjectCsvRow<'a> {
    sheet: &'a str,
    subject: &'a str,
    avg: f64,
    std_dev: f64,
    max: f64,
    min: f64,
    count: usize,
    count_below_threshold: usize,
    percentage_below_threshold: f64,
    percentage_positive: f64,
}

/// Appends one row per subject to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_subject_rows(path: &str, sheet_name: &str, stats: &[SubjectStats]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for s in stats {
        writer.serialize(SubjectCsvRow {
            sheet: sheet_name,
            subject: &s.subject,
            avg: s.avg,
            std_dev: s.std_dev,
            max: s.max,
            min: s.min,
            count: s.count,
            count_below_threshold: s.count_below_threshold,
            percentage_below_threshold: s.percentage_below_threshold,
            percentage_positive: s.percentage_positive,
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Renders the student grade table as plain text, one row per student,
/// grades as the cycle's qualitative labels where they exist.
pub fn render_table(snapshot: &ClassSnapshot) -> String {
    let mut out = String::new();

    out.push_str("Nº\tAluno");
    for subject in &snapshot.subjects {
        out.push('\t');
        out.push_str(subject);
    }
    out.push('\n');

    for student in &snapshot.students {
        out.push_str(&format!("{}\t{}", student.numero, student.aluno));
        for subject in &snapshot.subjects {
            out.push('\t');
            out.push_str(&grade_label(snapshot.cycle, student.grade(subject)));
        }
        out.push('\n');
    }

    out
}

/// Renders the cohort summary as plain text lines for the terminal.
pub fn render_summary(report: &ClassReport) -> String {
    let mut lines = vec![
        format!("Turma: {} ({:?})", report.sheet_name, report.cycle),
        format!("Total de alunos: {}", report.total_students),
    ];

    if report.cycle.is_qualitative() {
        lines.push(format!(
            "Taxa de sucesso global: {}%",
            format_decimal(report.rankings.global_success_rate)
        ));
    } else {
        lines.push(format!(
            "Média global: {}",
            format_decimal(report.rankings.global_average)
        ));
        if let Some(best) = &report.rankings.best_student {
            lines.push(format!(
                "Aluno com média mais alta: {} ({})",
                best.name,
                format_decimal(best.avg)
            ));
        }
    }

    if let Some(best) = &report.rankings.best_subject {
        lines.push(format!(
            "Disciplina com média mais alta: {} ({})",
            best.subject,
            format_decimal(best.value)
        ));
    }
    if let Some(worst) = &report.rankings.worst_subject {
        lines.push(format!(
            "Disciplina com média mais baixa: {} ({})",
            worst.subject,
            format_decimal(worst.value)
        ));
    }
    if let Some(top) = &report.rankings.top_student_by_max_grades {
        lines.push(format!(
            "Mais classificações máximas: {} ({})",
            top.name, top.count
        ));
    }
    for (i, neg) in report.rankings.top_negative_subjects.iter().enumerate() {
        lines.push(format!(
            "Top negativas #{}: {} ({}%)",
            i + 1,
            neg.subject,
            format_decimal(neg.percentage_below_threshold)
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExtractedStudent, ExtractedTable};
    use crate::rankings::rank_cohort;
    use crate::stats::aggregate;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn snapshot() -> ClassSnapshot {
        ClassSnapshot::from_extraction(
            "Pré_Sala A",
            ExtractedTable {
                subjects: vec!["Linguagem".to_string(), "Matemática".to_string()],
                students: vec![
                    ExtractedStudent {
                        numero: 1,
                        aluno: "Ana".to_string(),
                        scores: vec![3.0, 2.0],
                    },
                    ExtractedStudent {
                        numero: 2,
                        aluno: "Bruno".to_string(),
                        scores: vec![1.0, 0.0],
                    },
                ],
            },
        )
    }

    fn report() -> ClassReport {
        let snap = snapshot();
        let stats = aggregate(&snap.students, &snap.subjects, snap.cycle);
        let rankings = rank_cohort(&snap.students, &snap.subjects, &stats, snap.cycle);
        ClassReport::new(&snap, stats, rankings)
    }

    #[test]
    fn test_table_uses_labels_and_placeholder() {
        let table = render_table(&snapshot());

        assert!(table.contains("Nº\tAluno\tLinguagem\tMatemática"));
        assert!(table.contains("1\tAna\tAdquirido\tEm Aquisição"));
        assert!(table.contains("2\tBruno\tNão Adquirido\t-"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let json = report().to_json().unwrap();

        assert!(json.contains("\"sheet_name\": \"Pré_Sala A\""));
        assert!(json.contains("\"cycle\": \"PreSchool\""));
        assert!(json.contains("\"distribution\""));
        // The internal grade set is not part of the report.
        assert!(!json.contains("\"grades\""));
    }

    #[test]
    fn test_summary_is_qualitative_for_pre_school() {
        let text = render_summary(&report());

        assert!(text.contains("Taxa de sucesso global"));
        assert!(!text.contains("Média global"));
    }

    #[test]
    fn test_append_creates_file_with_single_header() {
        let path = temp_path("edustats_test_csv.csv");
        let _ = fs::remove_file(&path);

        let snap = snapshot();
        let stats = aggregate(&snap.students, &snap.subjects, snap.cycle);

        append_subject_rows(&path, &snap.sheet_name, &stats).unwrap();
        append_subject_rows(&path, &snap.sheet_name, &stats).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("subject")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 appends × 2 subjects.
        assert_eq!(content.lines().count(), 5);

        fs::remove_file(&path).unwrap();
    }
}
