//! Behavioural guarantees of the extraction engine.

use labscan_core::extraction::rules::{Unit, UnitNormalizer};
use labscan_core::{
    extract_text, DocumentFormat, ExtractionConfig, ExtractionOutcome, NullSink, PatternParser,
    RecordingSink, ReportParser,
};
use pretty_assertions::assert_eq;

const NOISY_FBC: &str = "FULL BLOOD COUNT\n\
    Patient: Jane Doe\n\
    Patient Name: Someone Else\n\
    Date of Birth: 01/01/1990\n\
    Collection Date: 12/03/2024\n\
    Hemoglobin\n\
    13.1\n\
    Hemoglobin: 13.5 g/dL\n\
    RBC 4.8\n\
    RBC: 5.0 x 10^12/L";

#[test]
fn record_has_no_duplicate_keys() {
    for format in DocumentFormat::ALL {
        let record = PatternParser::new(format).parse(NOISY_FBC, &NullSink).unwrap();
        let mut names: Vec<_> = record.field_names().collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total, "{}", format);
    }
}

#[test]
fn first_declared_candidate_wins() {
    // "Patient:" is declared before "Patient Name:" and both match.
    let record = PatternParser::new(DocumentFormat::Fbc)
        .parse(NOISY_FBC, &NullSink)
        .unwrap();
    assert_eq!(record.get("Patient"), Some("Jane Doe"));
    // RBC's unit-bearing candidate outranks the bare one found earlier.
    assert_eq!(record.get("RBC"), Some("5.0 x 10^12/L"));
}

#[test]
fn date_of_birth_is_not_a_date() {
    for format in DocumentFormat::ALL {
        let record = PatternParser::new(format)
            .parse("Date of Birth: 01/01/1990", &NullSink)
            .unwrap();
        assert_eq!(record.get("Date"), None, "{}", format);
    }

    let record = PatternParser::new(DocumentFormat::Fbc)
        .parse(NOISY_FBC, &NullSink)
        .unwrap();
    assert_eq!(record.get("Date"), Some("12/03/2024"));
}

#[test]
fn report_date_beside_birth_date_is_kept() {
    let parser = PatternParser::new(DocumentFormat::Fbc);

    let record = parser
        .parse("Patient: Jane Doe\nDate of Birth: 01/01/1990   Date: 12/03/2024", &NullSink)
        .unwrap();
    assert_eq!(record.get("Date"), Some("12/03/2024"));

    let record = parser
        .parse("DOB: 01/01/1990   Collection Date: 12/03/2024", &NullSink)
        .unwrap();
    assert_eq!(record.get("Date"), Some("12/03/2024"));
}

#[test]
fn fallback_keeps_decimals_with_glued_units() {
    let record = PatternParser::new(DocumentFormat::Fbc)
        .parse("Hemoglobin\n13.5g/dL\nRed Blood Cell Count\n4.52x10^12/L", &NullSink)
        .unwrap();

    // Hemoglobin is found by the primary pass, RBC only by the fallback.
    assert_eq!(record.get("Hemoglobin"), Some("13.5g/dL"));
    assert_eq!(record.get("RBC"), Some("4.52 x 10^12/L"));
}

#[test]
fn normalization_is_idempotent() {
    let normalizer = UnitNormalizer::new();
    let once = normalizer.normalize("120", Unit::MilligramsPerDecilitre);
    assert_eq!(once, "120 mg/dL");
    assert_eq!(normalizer.normalize(&once, Unit::MilligramsPerDecilitre), "120 mg/dL");
}

#[test]
fn fallback_never_overwrites_primary_values() {
    let sink = RecordingSink::new();
    let report = PatternParser::new(DocumentFormat::Fbc)
        .parse_detailed(NOISY_FBC, &sink)
        .unwrap();

    assert!(report.fallback_ran);
    // The fallback pairs the first "Hemoglobin" label with "13.1".
    assert!(sink.contains("fallback Hemoglobin: \"13.1 g/dL\" at line 6 (ignored)"));
    assert_eq!(report.record.get("Hemoglobin"), Some("13.5 g/dL"));
}

#[test]
fn end_to_end_success() {
    let outcome: ExtractionOutcome = extract_text(
        "Patient: Jane Doe\nHemoglobin: 13.5 g/dL\nRBC 4.8",
        "fbc",
        &ExtractionConfig::default(),
        &NullSink,
    )
    .into();

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        outcome.to_json().unwrap(),
        r#"{"Patient":"Jane Doe","Hemoglobin":"13.5 g/dL","RBC":"4.8 x 10^12/L"}"#
    );
}

#[test]
fn end_to_end_unsupported_format() {
    let outcome: ExtractionOutcome = extract_text(
        "Patient: Jane Doe",
        "xray",
        &ExtractionConfig::default(),
        &NullSink,
    )
    .into();

    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(
        outcome.to_json().unwrap(),
        r#"{"error":"Extraction failed: Invalid file format: xray"}"#
    );
}

#[test]
fn fallback_trigger_boundary() {
    let four = "Patient: Jane Doe\nDate: 12/03/2024\nDoctor: Dr. Green\nHemoglobin: 13.5 g/dL";
    let five = format!("{}\nMCV 88", four);

    let below = PatternParser::new(DocumentFormat::Fbc)
        .parse_detailed(four, &NullSink)
        .unwrap();
    assert_eq!(below.primary_fields, 4);
    assert!(below.fallback_ran);

    let sink = RecordingSink::new();
    let at = PatternParser::new(DocumentFormat::Fbc)
        .parse_detailed(&five, &sink)
        .unwrap();
    assert_eq!(at.primary_fields, 5);
    assert!(!at.fallback_ran);
    assert!(!sink.contains("fallback"));
}

#[test]
fn parsing_is_deterministic() {
    let parser = PatternParser::new(DocumentFormat::Fbc);
    let runs: Vec<_> = (0..5)
        .map(|_| parser.parse(NOISY_FBC, &NullSink).unwrap())
        .collect();
    assert!(runs.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn concurrent_parsing_matches_sequential() {
    let expected = PatternParser::new(DocumentFormat::Fbc)
        .parse(NOISY_FBC, &NullSink)
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            std::thread::spawn(|| {
                PatternParser::new(DocumentFormat::Fbc)
                    .parse(NOISY_FBC, &NullSink)
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
