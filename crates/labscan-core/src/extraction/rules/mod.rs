//! Table-driven field rules for clinical documents.
//!
//! A document type is described by a [`PatternLibrary`]: an ordered list of
//! [`FieldSpec`]s plus optional [`FallbackLabel`]s for tabular layouts. The
//! libraries themselves live in [`patterns`].

pub mod fallback;
pub mod matcher;
pub mod patterns;
pub mod units;

pub use fallback::{FallbackHit, TabularFallbackScanner};
pub use matcher::{FieldMatch, FieldMatcher};
pub use units::{canonical_unit, Unit, UnitNormalizer, CANONICAL_UNITS};

use regex::{Regex, RegexBuilder};

use super::router::DocumentFormat;

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// One alternative matcher for a field.
#[derive(Debug, Clone)]
pub struct PatternCandidate {
    regex: Regex,
    group: usize,
    fixed: Option<&'static str>,
}

impl PatternCandidate {
    /// Candidate whose value is capture group 1.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Self::with_group(pattern, 1)
    }

    /// Candidate whose value is the given capture group (0 = whole match).
    pub fn with_group(pattern: &str, group: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: case_insensitive(pattern)?,
            group,
            fixed: None,
        })
    }

    /// Candidate that yields a constant value whenever it matches.
    pub fn fixed(pattern: &str, value: &'static str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: case_insensitive(pattern)?,
            group: 0,
            fixed: Some(value),
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn group(&self) -> usize {
        self.group
    }

    pub fn fixed_value(&self) -> Option<&'static str> {
        self.fixed
    }
}

/// Rejects a candidate occurrence that actually denotes a different field.
///
/// The predicate is evaluated against the occurrence's own label: the text
/// from the start of its cell (after the last colon or wide gap on the line)
/// up to where the captured value begins.
#[derive(Debug, Clone)]
pub struct Exclusion {
    context: Regex,
}

impl Exclusion {
    pub fn context(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            context: case_insensitive(pattern)?,
        })
    }

    pub fn excludes(&self, context: &str) -> bool {
        self.context.is_match(context)
    }
}

/// Specification of one extractable field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name as it appears in the record.
    pub name: &'static str,
    /// Candidates in priority order.
    pub candidates: Vec<PatternCandidate>,
    /// Canonical unit appended to bare values.
    pub unit: Option<Unit>,
    /// Context predicate for occurrences that belong to another field.
    pub exclusion: Option<Exclusion>,
}

impl FieldSpec {
    /// New field with its canonical unit taken from [`CANONICAL_UNITS`].
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            candidates: Vec::new(),
            unit: canonical_unit(name),
            exclusion: None,
        }
    }

    /// Append a candidate capturing group 1.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex. Libraries are static tables
    /// built once and covered by tests.
    pub fn pattern(self, pattern: &str) -> Self {
        self.pattern_group(pattern, 1)
    }

    /// Append a candidate capturing the given group.
    pub fn pattern_group(mut self, pattern: &str, group: usize) -> Self {
        self.candidates.push(PatternCandidate::with_group(pattern, group).unwrap());
        self
    }

    /// Append a candidate that yields `value` whenever `pattern` matches.
    pub fn fixed(mut self, pattern: &str, value: &'static str) -> Self {
        self.candidates.push(PatternCandidate::fixed(pattern, value).unwrap());
        self
    }

    /// Skip occurrences whose line context matches `pattern`.
    pub fn excluding(mut self, pattern: &str) -> Self {
        self.exclusion = Some(Exclusion::context(pattern).unwrap());
        self
    }
}

/// Label keywords that introduce a value on a following line.
#[derive(Debug, Clone)]
pub struct FallbackLabel {
    pub field: &'static str,
    /// Case-sensitive substrings identifying the label line.
    pub keywords: &'static [&'static str],
    pub unit: Option<Unit>,
}

impl FallbackLabel {
    pub fn new(field: &'static str, keywords: &'static [&'static str]) -> Self {
        Self {
            field,
            keywords,
            unit: canonical_unit(field),
        }
    }

    /// Whether `line` contains any of the label keywords.
    pub fn matches(&self, line: &str) -> bool {
        self.keywords.iter().any(|k| line.contains(k))
    }
}

/// Immutable field table for one document type.
#[derive(Debug)]
pub struct PatternLibrary {
    pub format: DocumentFormat,
    pub fields: Vec<FieldSpec>,
    pub fallback_labels: Vec<FallbackLabel>,
}

impl PatternLibrary {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    pub fn has_fallback(&self) -> bool {
        !self.fallback_labels.is_empty()
    }
}
