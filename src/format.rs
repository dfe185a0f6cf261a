//! Locale-aware presentation formatting.
//!
//! Numbers render the pt-PT way: comma decimal separator, at most one
//! fractional digit, no trailing zero decimal. Grades render as the
//! qualitative label of the active cycle where one exists.

use crate::cycle::Cycle;
use crate::stats::round1;

/// Placeholder shown for an absent grade.
pub const ABSENT_MARKER: &str = "-";

/// Formats a number with at most one fractional digit and a comma
/// separator ("13,5"; "13" rather than "13,0").
pub fn format_decimal(value: f64) -> String {
    let rounded = round1(value);
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.1}", rounded).replace('.', ",")
    }
}

/// Parses a decimal that may use a comma as its separator.
///
/// Inverse of [`format_decimal`], for callers ingesting pt-PT numeral
/// text. The extraction schema already delivers numeric scores, so no
/// internal path parses grade text.
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse::<f64>().ok()
}

/// Renders a grade for table display under the given cycle.
///
/// Absent grades always render as the placeholder marker; values outside a
/// qualitative cycle's label set fall back to the numeric rendering.
pub fn grade_label(cycle: Cycle, grade: Option<f64>) -> String {
    let Some(g) = grade else {
        return ABSENT_MARKER.to_string();
    };

    match cycle {
        Cycle::PreSchool => {
            if g == 1.0 {
                "Não Adquirido".to_string()
            } else if g == 2.0 {
                "Em Aquisição".to_string()
            } else if g >= 3.0 {
                "Adquirido".to_string()
            } else {
                format_decimal(g)
            }
        }
        Cycle::FirstCycle => {
            if g <= 2.0 {
                "Insuficiente".to_string()
            } else if g == 3.0 {
                "Suficiente".to_string()
            } else if g == 4.0 {
                "Bom".to_string()
            } else if g >= 5.0 {
                "Muito Bom".to_string()
            } else {
                format_decimal(g)
            }
        }
        _ => format_decimal(g),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_decimal_drops_zero_fraction() {
        assert_eq!(format_decimal(13.0), "13");
        assert_eq!(format_decimal(0.0), "0");
    }

    #[test]
    fn test_format_decimal_uses_comma() {
        assert_eq!(format_decimal(13.5), "13,5");
        assert_eq!(format_decimal(33.333), "33,3");
    }

    #[test]
    fn test_parse_decimal_accepts_comma_and_dot() {
        assert_eq!(parse_decimal("12,3"), Some(12.3));
        assert_eq!(parse_decimal("12.3"), Some(12.3));
        assert_eq!(parse_decimal(" 7 "), Some(7.0));
        assert_eq!(parse_decimal("n/a"), None);
    }

    #[test]
    fn test_absent_grade_renders_placeholder() {
        assert_eq!(grade_label(Cycle::PreSchool, None), "-");
        assert_eq!(grade_label(Cycle::Secondary, None), "-");
    }

    #[test]
    fn test_pre_school_labels() {
        assert_eq!(grade_label(Cycle::PreSchool, Some(1.0)), "Não Adquirido");
        assert_eq!(grade_label(Cycle::PreSchool, Some(2.0)), "Em Aquisição");
        assert_eq!(grade_label(Cycle::PreSchool, Some(3.0)), "Adquirido");
    }

    #[test]
    fn test_first_cycle_labels() {
        assert_eq!(grade_label(Cycle::FirstCycle, Some(2.0)), "Insuficiente");
        assert_eq!(grade_label(Cycle::FirstCycle, Some(3.0)), "Suficiente");
        assert_eq!(grade_label(Cycle::FirstCycle, Some(4.0)), "Bom");
        assert_eq!(grade_label(Cycle::FirstCycle, Some(5.0)), "Muito Bom");
    }

    #[test]
    fn test_numeric_cycles_render_numbers() {
        assert_eq!(grade_label(Cycle::Secondary, Some(14.0)), "14");
        assert_eq!(grade_label(Cycle::SecondThirdCycle, Some(5.0)), "5");
        assert_eq!(grade_label(Cycle::Default, Some(9.5)), "9,5");
    }
}
