//! Per-subject descriptive statistics and grade distributions.
//!
//! All functions here are pure and synchronous; they are recomputed in full
//! whenever the snapshot changes. Grades of `0` (absences) never reach this
//! module: the model converts them to `None` and the valid set below only
//! collects recorded grades.

use serde::Serialize;

use crate::cycle::Cycle;
use crate::model::StudentRecord;

/// One fixed partition of the valid grade set, for diverging bar charts.
///
/// `chart_value` is `-count` for the lowest (negative) bucket and `+count`
/// for the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeBucket {
    pub label: String,
    pub count: usize,
    pub chart_value: i64,
    pub color: &'static str,
}

/// Descriptive statistics for one subject under one grading convention.
///
/// All displayed numeric fields are rounded to one decimal at construction
/// so repeated reads are stable.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectStats {
    pub subject: String,
    pub avg: f64,
    pub std_dev: f64,
    pub max: f64,
    pub min: f64,
    pub count: usize,
    pub count_below_threshold: usize,
    pub percentage_below_threshold: f64,
    pub percentage_positive: f64,
    pub distribution: Vec<GradeBucket>,
    /// Valid grade set, kept for the ranking engine.
    #[serde(skip)]
    pub grades: Vec<f64>,
}

/// Rounds to one decimal place, half away from zero.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Aggregates one statistics record per subject, in subject-list order.
///
/// A subject with no valid grades yields an all-zero record with zero-count
/// buckets; nothing here divides by zero.
pub fn aggregate(students: &[StudentRecord], subjects: &[String], cycle: Cycle) -> Vec<SubjectStats> {
    subjects
        .iter()
        .map(|subject| subject_stats(students, subject, cycle))
        .collect()
}

fn subject_stats(students: &[StudentRecord], subject: &str, cycle: Cycle) -> SubjectStats {
    let grades: Vec<f64> = students.iter().filter_map(|s| s.grade(subject)).collect();
    let count = grades.len();

    let avg = mean(&grades);
    let std_dev = stddev(&grades, avg);

    let threshold = cycle.positive_threshold();
    let count_below_threshold = match cycle {
        Cycle::PreSchool => grades.iter().filter(|&&g| g == 1.0).count(),
        Cycle::FirstCycle => grades.iter().filter(|&&g| g <= 2.0).count(),
        _ => grades.iter().filter(|&&g| g < threshold).count(),
    };

    let percentage_below_threshold = if count > 0 {
        round1(100.0 * count_below_threshold as f64 / count as f64)
    } else {
        0.0
    };

    // Qualitative cycles take the exact complement so the two percentages
    // always sum to 100 despite rounding.
    let percentage_positive = if cycle.is_qualitative() {
        round1(100.0 - percentage_below_threshold)
    } else if count > 0 {
        round1(100.0 * (count - count_below_threshold) as f64 / count as f64)
    } else {
        0.0
    };

    SubjectStats {
        subject: subject.to_string(),
        avg: round1(avg),
        std_dev: round1(std_dev),
        max: grades.iter().copied().fold(0.0, f64::max),
        min: if count > 0 {
            grades.iter().copied().fold(f64::INFINITY, f64::min)
        } else {
            0.0
        },
        count,
        count_below_threshold,
        percentage_below_threshold,
        percentage_positive,
        distribution: distribution(&grades, cycle),
        grades,
    }
}

fn bucket(label: &str, count: usize, negative: bool, color: &'static str) -> GradeBucket {
    GradeBucket {
        label: label.to_string(),
        count,
        chart_value: if negative {
            -(count as i64)
        } else {
            count as i64
        },
        color,
    }
}

fn distribution(grades: &[f64], cycle: Cycle) -> Vec<GradeBucket> {
    let count_if = |pred: &dyn Fn(f64) -> bool| grades.iter().filter(|&&g| pred(g)).count();

    match cycle {
        Cycle::PreSchool => vec![
            bucket("Não Adq.", count_if(&|g| g == 1.0), true, "#f43f5e"),
            bucket("Em Aq.", count_if(&|g| g == 2.0), false, "#f59e0b"),
            bucket("Adquirido", count_if(&|g| g >= 3.0), false, "#10b981"),
        ],
        Cycle::FirstCycle | Cycle::SecondThirdCycle => {
            let first = cycle == Cycle::FirstCycle;
            vec![
                bucket(
                    if first { "Insuf." } else { "1-2" },
                    count_if(&|g| g <= 2.0),
                    true,
                    "#f43f5e",
                ),
                bucket(
                    if first { "Suf." } else { "3" },
                    count_if(&|g| g == 3.0),
                    false,
                    "#10b981",
                ),
                bucket(
                    if first { "Bom" } else { "4" },
                    count_if(&|g| g == 4.0),
                    false,
                    "#22d3ee",
                ),
                bucket(
                    if first { "M.Bom" } else { "5" },
                    count_if(&|g| g == 5.0),
                    false,
                    "#d946ef",
                ),
            ]
        }
        Cycle::Secondary | Cycle::Default => vec![
            bucket("< 10", count_if(&|g| g < 10.0), true, "#f43f5e"),
            bucket(
                "10-13",
                count_if(&|g| (10.0..=13.0).contains(&g)),
                false,
                "#f59e0b",
            ),
            bucket(
                "14-17",
                count_if(&|g| (14.0..=17.0).contains(&g)),
                false,
                "#22d3ee",
            ),
            bucket("18-20", count_if(&|g| g >= 18.0), false, "#d946ef"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn students_for(subject: &str, grades: &[f64]) -> Vec<StudentRecord> {
        grades
            .iter()
            .enumerate()
            .map(|(i, &g)| {
                let mut map = HashMap::new();
                map.insert(subject.to_string(), if g > 0.0 { Some(g) } else { None });
                StudentRecord {
                    numero: i as u32 + 1,
                    aluno: format!("Aluno {}", i + 1),
                    grades: map,
                }
            })
            .collect()
    }

    fn stats_for(subject: &str, grades: &[f64], cycle: Cycle) -> SubjectStats {
        let students = students_for(subject, grades);
        aggregate(&students, &[subject.to_string()], cycle).remove(0)
    }

    #[test]
    fn test_pre_school_example() {
        let s = stats_for("Linguagem", &[1.0, 1.0, 2.0, 3.0, 3.0, 3.0], Cycle::PreSchool);

        assert_eq!(s.count, 6);
        assert_eq!(s.count_below_threshold, 2);
        assert_eq!(s.percentage_below_threshold, 33.3);
        assert_eq!(s.percentage_positive, 66.7);

        let counts: Vec<usize> = s.distribution.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 3]);
        assert_eq!(s.distribution[0].chart_value, -2);
        assert_eq!(s.distribution[1].chart_value, 1);
    }

    #[test]
    fn test_secondary_example_excludes_absences() {
        let s = stats_for("Matemática", &[8.0, 12.0, 15.0, 19.0, 0.0], Cycle::Secondary);

        assert_eq!(s.count, 4);
        assert_eq!(s.avg, 13.5);
        assert_eq!(s.count_below_threshold, 1);
        assert_eq!(s.percentage_below_threshold, 25.0);
        assert_eq!(s.max, 19.0);
        assert_eq!(s.min, 8.0);

        let counts: Vec<usize> = s.distribution.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 1]);
        assert_eq!(s.distribution[0].chart_value, -1);
    }

    #[test]
    fn test_empty_subject_is_all_zero() {
        let s = stats_for("Inglês", &[0.0, 0.0], Cycle::Secondary);

        assert_eq!(s.count, 0);
        assert_eq!(s.avg, 0.0);
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.max, 0.0);
        assert_eq!(s.min, 0.0);
        assert_eq!(s.percentage_below_threshold, 0.0);
        assert_eq!(s.percentage_positive, 0.0);
        assert!(s.distribution.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_qualitative_percentages_are_exact_complements() {
        let s = stats_for("Estudo do Meio", &[2.0, 2.0, 3.0], Cycle::FirstCycle);
        assert_eq!(s.percentage_below_threshold + s.percentage_positive, 100.0);

        let s = stats_for(
            "Português",
            &[2.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0],
            Cycle::FirstCycle,
        );
        assert_eq!(s.percentage_below_threshold + s.percentage_positive, 100.0);
    }

    #[test]
    fn test_complement_holds_for_every_class_size() {
        // Every split of class sizes 1..=40 must still sum to exactly 100.
        for n in 1..=40usize {
            for below in 0..=n {
                let mut grades = vec![2.0; below];
                grades.resize(n, 3.0);

                let s = stats_for("Português", &grades, Cycle::FirstCycle);
                assert_eq!(
                    s.percentage_below_threshold + s.percentage_positive,
                    100.0,
                    "size {n}, {below} below threshold"
                );
            }
        }
    }

    #[test]
    fn test_first_cycle_counts_two_as_below() {
        let s = stats_for("Matemática", &[2.0, 3.0, 4.0, 5.0], Cycle::FirstCycle);
        assert_eq!(s.count_below_threshold, 1);
        assert_eq!(s.distribution[0].label, "Insuf.");
        assert_eq!(s.distribution[0].count, 1);
    }

    #[test]
    fn test_second_third_cycle_uses_numeric_labels() {
        let s = stats_for("História", &[2.0, 3.0, 4.0, 5.0], Cycle::SecondThirdCycle);
        let labels: Vec<&str> = s.distribution.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["1-2", "3", "4", "5"]);
    }

    #[test]
    fn test_population_std_dev() {
        // [2, 4] has mean 3 and population variance 1.
        let s = stats_for("Física", &[2.0, 4.0], Cycle::Secondary);
        assert_eq!(s.std_dev, 1.0);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        // 2.25 is exactly representable, so 22.5 rounds away from zero.
        assert_eq!(round1(2.25), 2.3);
        assert_eq!(round1(-2.25), -2.3);
        assert_eq!(round1(2.24), 2.2);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let students = students_for("Matemática", &[8.0, 12.0, 15.0, 19.0]);
        let subjects = vec!["Matemática".to_string()];

        let a = aggregate(&students, &subjects, Cycle::Secondary);
        let b = aggregate(&students, &subjects, Cycle::Secondary);

        assert_eq!(a[0].avg, b[0].avg);
        assert_eq!(a[0].distribution, b[0].distribution);
        assert_eq!(a[0].grades, b[0].grades);
    }

    #[test]
    fn test_below_count_plus_above_count_equals_count() {
        let s = stats_for("Química", &[8.0, 9.0, 10.0, 14.0, 18.0], Cycle::Secondary);
        let above = s.count - s.count_below_threshold;
        assert_eq!(s.count_below_threshold + above, s.count);
        assert_eq!(s.count_below_threshold, 2);
    }
}
