//! Cross-cutting cohort rankings derived from the student table and the
//! per-subject statistics.
//!
//! Every ranking is a pure function of its inputs. Ties are broken by
//! original order: sorts are stable and descending, so the first occurrence
//! wins. Subjects with no valid grades never rank.

use serde::Serialize;

use crate::cycle::Cycle;
use crate::model::StudentRecord;
use crate::stats::{SubjectStats, mean, round1};

/// Rank colors for the top-negative highlight, best to third.
const NEGATIVE_RANK_COLORS: [&str; 3] = ["#D32F2F", "#EC407A", "#F48FB1"];

/// A subject singled out by one of the average/variance rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectHighlight {
    pub subject: String,
    pub value: f64,
}

/// A student singled out by the average ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentHighlight {
    pub name: String,
    pub avg: f64,
}

/// A student or subject ranked by count of maximum classifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxGradeHighlight {
    pub name: String,
    pub count: usize,
}

/// A subject ranked by negative percentage, carrying its rank color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NegativeHighlight {
    pub subject: String,
    pub percentage_below_threshold: f64,
    pub color: &'static str,
}

/// All cohort-level derived metrics. Each highlight is `None` when the
/// input set it ranks over is empty.
#[derive(Debug, Clone, Serialize)]
pub struct CohortRankings {
    pub best_subject: Option<SubjectHighlight>,
    pub worst_subject: Option<SubjectHighlight>,
    pub highest_std_dev_subject: Option<SubjectHighlight>,
    pub best_student: Option<StudentHighlight>,
    pub top_student_by_max_grades: Option<MaxGradeHighlight>,
    pub top_subject_by_max_grades: Option<MaxGradeHighlight>,
    pub global_success_rate: f64,
    pub global_average: f64,
    pub top_negative_subjects: Vec<NegativeHighlight>,
}

/// Computes every cohort ranking from one consistent snapshot.
pub fn rank_cohort(
    students: &[StudentRecord],
    subjects: &[String],
    stats: &[SubjectStats],
    cycle: Cycle,
) -> CohortRankings {
    let max_grade = cycle.max_grade();
    let ranked: Vec<&SubjectStats> = stats.iter().filter(|s| s.count > 0).collect();

    CohortRankings {
        best_subject: subject_by(&ranked, |a, b| b.avg.total_cmp(&a.avg), |s| s.avg),
        worst_subject: subject_by(&ranked, |a, b| a.avg.total_cmp(&b.avg), |s| s.avg),
        highest_std_dev_subject: subject_by(
            &ranked,
            |a, b| b.std_dev.total_cmp(&a.std_dev),
            |s| s.std_dev,
        ),
        best_student: best_student(students, subjects),
        top_student_by_max_grades: top_student_by_max_grades(students, subjects, max_grade),
        top_subject_by_max_grades: top_subject_by_max_grades(stats, max_grade),
        global_success_rate: global_success_rate(stats),
        global_average: round1(mean(
            &ranked.iter().map(|s| s.avg).collect::<Vec<f64>>(),
        )),
        top_negative_subjects: top_negative_subjects(&ranked),
    }
}

fn subject_by(
    ranked: &[&SubjectStats],
    cmp: impl Fn(&SubjectStats, &SubjectStats) -> std::cmp::Ordering,
    value: impl Fn(&SubjectStats) -> f64,
) -> Option<SubjectHighlight> {
    let mut sorted = ranked.to_vec();
    sorted.sort_by(|a, b| cmp(a, b));
    sorted.first().map(|&s| SubjectHighlight {
        subject: s.subject.clone(),
        value: value(s),
    })
}

/// Top student by average of positive grades. Students with no valid
/// grades (average 0) are excluded entirely.
fn best_student(students: &[StudentRecord], subjects: &[String]) -> Option<StudentHighlight> {
    let mut averages: Vec<StudentHighlight> = students
        .iter()
        .map(|student| {
            let grades: Vec<f64> = subjects.iter().filter_map(|s| student.grade(s)).collect();
            StudentHighlight {
                name: student.aluno.clone(),
                avg: mean(&grades),
            }
        })
        .filter(|s| s.avg > 0.0)
        .collect();

    averages.sort_by(|a, b| b.avg.total_cmp(&a.avg));
    averages.into_iter().next()
}

fn top_student_by_max_grades(
    students: &[StudentRecord],
    subjects: &[String],
    max_grade: f64,
) -> Option<MaxGradeHighlight> {
    let mut counts: Vec<MaxGradeHighlight> = students
        .iter()
        .map(|student| MaxGradeHighlight {
            name: student.aluno.clone(),
            count: subjects
                .iter()
                .filter(|s| student.grade(s).is_some_and(|g| g >= max_grade))
                .count(),
        })
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.into_iter().next()
}

fn top_subject_by_max_grades(stats: &[SubjectStats], max_grade: f64) -> Option<MaxGradeHighlight> {
    let mut counts: Vec<MaxGradeHighlight> = stats
        .iter()
        .map(|s| MaxGradeHighlight {
            name: s.subject.clone(),
            count: s.grades.iter().filter(|&&g| g >= max_grade).count(),
        })
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.into_iter().next()
}

/// Total passes over total evaluations across all subjects, as a
/// percentage. Zero when nothing was evaluated anywhere.
pub fn global_success_rate(stats: &[SubjectStats]) -> f64 {
    let total_positives: usize = stats.iter().map(|s| s.count - s.count_below_threshold).sum();
    let total_evaluations: usize = stats.iter().map(|s| s.count).sum();

    if total_evaluations == 0 {
        0.0
    } else {
        100.0 * total_positives as f64 / total_evaluations as f64
    }
}

fn top_negative_subjects(ranked: &[&SubjectStats]) -> Vec<NegativeHighlight> {
    let mut sorted = ranked.to_vec();
    sorted.sort_by(|a, b| {
        b.percentage_below_threshold
            .total_cmp(&a.percentage_below_threshold)
    });

    sorted
        .into_iter()
        .take(NEGATIVE_RANK_COLORS.len())
        .zip(NEGATIVE_RANK_COLORS)
        .map(|(s, color)| NegativeHighlight {
            subject: s.subject.clone(),
            percentage_below_threshold: s.percentage_below_threshold,
            color,
        })
        .collect()
}
