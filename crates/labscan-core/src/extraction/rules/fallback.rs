//! Line-proximity value recovery for tabular layouts.
//!
//! OCR of a results table often puts a parameter name on one line and its
//! result a line or two below. The scanner pairs each label line with the
//! first standalone number found on the following lines. It is a heuristic:
//! in multi-column layouts the number may belong to a neighbouring column.

use lazy_static::lazy_static;
use regex::Regex;

use super::{FallbackLabel, UnitNormalizer};

lazy_static! {
    /// A whole decimal numeral not glued to a preceding word or dot.
    static ref NUMERIC_TOKEN: Regex = Regex::new(r"(?:^|[^\w.])(\d+(?:\.\d+)?)").unwrap();
}

/// First standalone number on `line`. A unit may follow directly
/// (`13.5g/dL`), a trailing dot may not (`4.` or `1.2.3`).
fn first_number(line: &str) -> Option<&str> {
    NUMERIC_TOKEN
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .find(|m| !line[m.end()..].starts_with('.'))
        .map(|m| m.as_str())
}

/// A value recovered from a label line's window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackHit {
    pub field: &'static str,
    /// Normalized value, unit appended.
    pub value: String,
    /// Zero-based index of the label line.
    pub label_line: usize,
    /// Zero-based index of the line the value came from.
    pub value_line: usize,
}

/// Scans for label keywords and takes the nearest following number.
#[derive(Debug, Clone, Copy)]
pub struct TabularFallbackScanner {
    window: usize,
    normalizer: UnitNormalizer,
}

impl Default for TabularFallbackScanner {
    fn default() -> Self {
        Self::new(2)
    }
}

impl TabularFallbackScanner {
    /// Scanner looking at most `window` lines past each label line.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            normalizer: UnitNormalizer::new(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Recover at most one value per label field.
    ///
    /// Each non-blank line is attributed to the first label (in declaration
    /// order) whose keyword it contains. The earliest label line with a hit
    /// wins for its field; within the window the earliest line wins, and
    /// within that line the earliest numeric token.
    pub fn scan(&self, text: &str, labels: &[FallbackLabel]) -> Vec<FallbackHit> {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut hits: Vec<FallbackHit> = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some(label) = labels.iter().find(|l| l.matches(line)) else {
                continue;
            };
            if hits.iter().any(|h| h.field == label.field) {
                continue;
            }

            let window_end = i.saturating_add(self.window).min(lines.len().saturating_sub(1));
            let found = (i + 1..=window_end)
                .find_map(|j| first_number(lines[j]).map(|token| (j, token)));

            if let Some((j, token)) = found {
                let value = match label.unit {
                    Some(unit) => self.normalizer.normalize(token, unit),
                    None => token.to_string(),
                };
                hits.push(FallbackHit {
                    field: label.field,
                    value,
                    label_line: i,
                    value_line: j,
                });
            }
        }

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels() -> Vec<FallbackLabel> {
        vec![
            FallbackLabel::new("RBC", &["Red Blood Cell Count", "RBC"]),
            FallbackLabel::new("Hemoglobin", &["Hemoglobin"]),
        ]
    }

    #[test]
    fn test_value_on_following_line() {
        let text = "Test\nRed Blood Cell Count\n4.52\nHemoglobin\n\n13.1 g/dL";
        let hits = TabularFallbackScanner::default().scan(text, &labels());

        assert_eq!(
            hits,
            vec![
                FallbackHit {
                    field: "RBC",
                    value: "4.52 x 10^12/L".to_string(),
                    label_line: 1,
                    value_line: 2,
                },
                FallbackHit {
                    field: "Hemoglobin",
                    value: "13.1 g/dL".to_string(),
                    label_line: 3,
                    value_line: 5,
                },
            ]
        );
    }

    #[test]
    fn test_same_line_value_is_ignored() {
        let text = "Hemoglobin 13.5\nno numbers here\nstill none";
        assert!(TabularFallbackScanner::default().scan(text, &labels()).is_empty());
    }

    #[test]
    fn test_window_is_bounded() {
        let text = "Hemoglobin\na\nb\n13.5";
        assert!(TabularFallbackScanner::new(2).scan(text, &labels()).is_empty());

        let hits = TabularFallbackScanner::new(3).scan(text, &labels());
        assert_eq!(hits[0].value, "13.5 g/dL");
    }

    #[test]
    fn test_earliest_label_line_wins() {
        let text = "RBC\n4.1\nRBC\n5.9";
        let hits = TabularFallbackScanner::default().scan(text, &labels());

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].value, "4.1 x 10^12/L");
        assert_eq!(hits[0].label_line, 0);
    }

    #[test]
    fn test_earliest_token_in_line_wins() {
        let text = "Hemoglobin\nResult 12.9 (11.5 - 16.5)";
        let hits = TabularFallbackScanner::default().scan(text, &labels());
        assert_eq!(hits[0].value, "12.9 g/dL");
    }

    #[test]
    fn test_numbers_embedded_in_words_are_skipped() {
        let text = "Hemoglobin\nB12 panel\n14.2";
        let hits = TabularFallbackScanner::default().scan(text, &labels());

        assert_eq!(hits[0].value, "14.2 g/dL");
        assert_eq!(hits[0].value_line, 2);
    }

    #[test]
    fn test_unit_glued_to_value_keeps_whole_number() {
        let text = "Hemoglobin\n13.5g/dL\nRed Blood Cell Count\n4.52x10^12/L";
        let hits = TabularFallbackScanner::default().scan(text, &labels());

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].field, "Hemoglobin");
        assert_eq!(hits[0].value, "13.5 g/dL");
        assert_eq!(hits[1].field, "RBC");
        assert_eq!(hits[1].value, "4.52 x 10^12/L");
    }

    #[test]
    fn test_partial_decimals_are_not_tokens() {
        assert_eq!(first_number("4.52x10^12/L"), Some("4.52"));
        assert_eq!(first_number("ref 1.2.3 then 7"), Some("7"));
        assert_eq!(first_number("B12 .5 x10"), None);
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let text = "Hemoglobin\n\n14.0";
        let hits = TabularFallbackScanner::new(usize::MAX).scan(text, &labels());
        assert_eq!(hits[0].value, "14.0 g/dL");
    }

    #[test]
    fn test_first_label_per_line() {
        // Both keywords on one line: only the first declared label is tried.
        let text = "RBC Hemoglobin\n4.6\n13.9";
        let hits = TabularFallbackScanner::default().scan(text, &labels());

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].field, "RBC");
    }
}
