//! First-match-wins field matching.

use lazy_static::lazy_static;
use regex::Regex;

use super::FieldSpec;

lazy_static! {
    /// Separators between label/value cells on one OCR line.
    static ref CELL_BREAK: Regex = Regex::new(r":|\t|\s{2,}").unwrap();
}

/// Start of the label cell that ends at `match_start`.
///
/// Walks back over the current line to the last colon or wide gap, so a
/// value or label from a neighbouring cell never leaks into the context.
fn label_start(text: &str, match_start: usize) -> usize {
    let line_start = text[..match_start].rfind('\n').map_or(0, |i| i + 1);
    CELL_BREAK
        .find_iter(&text[line_start..match_start])
        .last()
        .map_or(line_start, |m| line_start + m.end())
}

/// A field value found by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    /// Trimmed captured value.
    pub value: String,
    /// Index of the candidate that produced the value.
    pub candidate: usize,
    /// Occurrences skipped by the field's exclusion before the hit.
    pub excluded: usize,
    /// Byte span of the whole match in the source text.
    pub span: (usize, usize),
}

/// Resolves a field against document text.
///
/// Candidates are tried in declaration order and the first one producing a
/// value decides the result. Within a candidate, occurrences are scanned in
/// text order; an occurrence rejected by the field's exclusion, or capturing
/// only whitespace, is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMatcher;

impl FieldMatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn find(&self, text: &str, spec: &FieldSpec) -> Option<FieldMatch> {
        let mut excluded = 0;

        for (index, candidate) in spec.candidates.iter().enumerate() {
            for caps in candidate.regex().captures_iter(text) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let captured = caps.get(candidate.group());

                if let Some(exclusion) = &spec.exclusion {
                    let context_start = label_start(text, whole.start());
                    let context_end = captured.map_or(whole.end(), |m| m.start());
                    if exclusion.excludes(&text[context_start..context_end]) {
                        excluded += 1;
                        continue;
                    }
                }

                let value = match (candidate.fixed_value(), captured) {
                    (Some(fixed), _) => fixed,
                    (None, Some(m)) => m.as_str().trim(),
                    (None, None) => continue,
                };
                if value.is_empty() {
                    continue;
                }

                return Some(FieldMatch {
                    value: value.to_string(),
                    candidate: index,
                    excluded,
                    span: (whole.start(), whole.end()),
                });
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date_spec() -> FieldSpec {
        FieldSpec::new("Date")
            .pattern(r"Date:\s*(.+)")
            .pattern(r"Collection\s*Date:\s*(.+)")
            .excluding(r"\b(?:birth|dob)\b")
    }

    #[test]
    fn test_first_candidate_wins() {
        let spec = FieldSpec::new("Doctor")
            .pattern(r"Doctor:\s*(.+)")
            .pattern(r"Physician:\s*(.+)");

        // Physician appears first in the text, but Doctor is declared first.
        let text = "Physician: Dr. Brown\nDoctor: Dr. Green";
        let m = FieldMatcher::new().find(text, &spec).unwrap();

        assert_eq!(m.value, "Dr. Green");
        assert_eq!(m.candidate, 0);
    }

    #[test]
    fn test_value_is_trimmed() {
        let spec = FieldSpec::new("Patient").pattern(r"Patient:\s*(.+)");
        let m = FieldMatcher::new().find("Patient:   Jane Doe   \n", &spec).unwrap();
        assert_eq!(m.value, "Jane Doe");
    }

    #[test]
    fn test_case_insensitive() {
        let spec = FieldSpec::new("Patient").pattern(r"Patient:\s*(.+)");
        let m = FieldMatcher::new().find("PATIENT: JOHN SMITH", &spec).unwrap();
        assert_eq!(m.value, "JOHN SMITH");
    }

    #[test]
    fn test_date_of_birth_does_not_satisfy_date() {
        let matcher = FieldMatcher::new();
        assert_eq!(matcher.find("Date of Birth: 01/01/1990", &date_spec()), None);
        assert_eq!(matcher.find("Birth Date: 01/01/1990", &date_spec()), None);
    }

    #[test]
    fn test_exclusion_continues_to_later_occurrence() {
        let text = "Birth Date: 01/01/1990\nDate: 12/03/2024";
        let m = FieldMatcher::new().find(text, &date_spec()).unwrap();

        assert_eq!(m.value, "12/03/2024");
        assert_eq!(m.candidate, 0);
        assert_eq!(m.excluded, 1);
    }

    #[test]
    fn test_birth_date_in_neighbouring_cell_is_not_context() {
        let matcher = FieldMatcher::new();

        let text = "Patient: Jane Doe\nDate of Birth: 01/01/1990   Date: 12/03/2024";
        let m = matcher.find(text, &date_spec()).unwrap();
        assert_eq!(m.value, "12/03/2024");
        assert_eq!(m.excluded, 0);

        let text = "DOB: 01/01/1990   Collection Date: 12/03/2024";
        assert_eq!(matcher.find(text, &date_spec()).unwrap().value, "12/03/2024");

        let text = "DOB: 01/01/1990\tDate: 12/03/2024";
        assert_eq!(matcher.find(text, &date_spec()).unwrap().value, "12/03/2024");
    }

    #[test]
    fn test_exclusion_still_sees_own_label() {
        let text = "Ref: 991   Birth Date: 01/01/1990";
        assert_eq!(FieldMatcher::new().find(text, &date_spec()), None);
    }

    #[test]
    fn test_exclusion_continues_to_next_candidate() {
        let spec = FieldSpec::new("Patient")
            .pattern(r"Name:\s*(.+)")
            .pattern(r"Patient:\s*(.+)")
            .excluding(r"\b(?:doctor|physician)\b");

        let text = "Doctor Name: Dr. Green\nPatient: Jane Doe";
        let m = FieldMatcher::new().find(text, &spec).unwrap();

        assert_eq!(m.value, "Jane Doe");
        assert_eq!(m.candidate, 1);
    }

    #[test]
    fn test_fixed_candidate() {
        let spec = FieldSpec::new("Laboratory")
            .pattern(r"Laboratory:\s*(.+)")
            .fixed(r"CENTRAL\s*MEDICAL\s*LABORATORY", "Central Medical Laboratory");

        let m = FieldMatcher::new()
            .find("central medical laboratory\nFULL BLOOD COUNT", &spec)
            .unwrap();
        assert_eq!(m.value, "Central Medical Laboratory");
    }

    #[test]
    fn test_blank_capture_is_absent() {
        let spec = FieldSpec::new("Doctor").pattern(r"Doctor:[ \t]*([^\n]*)");
        assert_eq!(FieldMatcher::new().find("Doctor:   \nNext", &spec), None);
    }
}
