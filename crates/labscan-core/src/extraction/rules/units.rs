//! Canonical units and value normalization.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Quantity kinds with a canonical unit string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Cell count, x 10^12/L.
    TeraPerLitre,
    /// Cell count, x 10^9/L.
    GigaPerLitre,
    GramsPerDecilitre,
    Percent,
    Femtolitre,
    Picogram,
    MillimetresPerHour,
    MilligramsPerDecilitre,
    MilliequivalentsPerLitre,
    UnitsPerLitre,
    MilliUnitsPerLitre,
    Years,
}

lazy_static! {
    static ref CELL_COUNT_ALIASES: Regex = Regex::new(
        r"(?i)(?:x|×|\*)\s*10|10\s*[\^*]\s*\d|\d\s*e\d|/\s*(?:cumm|mm3|µl|ul)\b"
    ).unwrap();

    static ref MASS_CONCENTRATION_ALIASES: Regex = Regex::new(
        r"(?i)g\s*/\s*(?:dl|l)\b"
    ).unwrap();

    static ref VOLUME_ALIASES: Regex = Regex::new(
        r"(?i)\bfl\b|[µu]m3"
    ).unwrap();

    static ref RATE_ALIASES: Regex = Regex::new(
        r"(?i)mm\s*/\s*h"
    ).unwrap();

    static ref CHEMISTRY_ALIASES: Regex = Regex::new(
        r"(?i)mg\s*/\s*dl|[mµu]mol\s*/\s*l"
    ).unwrap();

    static ref ELECTROLYTE_ALIASES: Regex = Regex::new(
        r"(?i)m(?:eq|mol)\s*/\s*l"
    ).unwrap();

    static ref ENZYME_ALIASES: Regex = Regex::new(
        r"(?i)\bi?u\s*/\s*l\b"
    ).unwrap();

    static ref HORMONE_ALIASES: Regex = Regex::new(
        r"(?i)(?:\b[mµu]iu|\bmu)\s*/\s*m?l\b"
    ).unwrap();

    static ref AGE_ALIASES: Regex = Regex::new(
        r"(?i)\b(?:years?|yrs?|y/?o|months?|days?)\b"
    ).unwrap();

    /// Canonical unit per field name, shared by every document type.
    pub static ref CANONICAL_UNITS: HashMap<&'static str, Unit> = {
        let mut m = HashMap::new();
        // Full blood count
        m.insert("Hemoglobin", Unit::GramsPerDecilitre);
        m.insert("RBC", Unit::TeraPerLitre);
        m.insert("Hematocrit", Unit::Percent);
        m.insert("MCV", Unit::Femtolitre);
        m.insert("MCH", Unit::Picogram);
        m.insert("MCHC", Unit::GramsPerDecilitre);
        m.insert("WBC", Unit::GigaPerLitre);
        m.insert("Neutrophils", Unit::Percent);
        m.insert("Lymphocytes", Unit::Percent);
        m.insert("Monocytes", Unit::Percent);
        m.insert("Eosinophils", Unit::Percent);
        m.insert("Basophils", Unit::Percent);
        m.insert("Platelets", Unit::GigaPerLitre);
        m.insert("MPV", Unit::Femtolitre);
        m.insert("ESR", Unit::MillimetresPerHour);
        // Chemistry
        m.insert("Cholesterol", Unit::MilligramsPerDecilitre);
        m.insert("Glucose", Unit::MilligramsPerDecilitre);
        m.insert("Creatinine", Unit::MilligramsPerDecilitre);
        m.insert("BUN", Unit::MilligramsPerDecilitre);
        m.insert("LDL", Unit::MilligramsPerDecilitre);
        m.insert("HDL", Unit::MilligramsPerDecilitre);
        m.insert("Triglycerides", Unit::MilligramsPerDecilitre);
        m.insert("Sodium", Unit::MilliequivalentsPerLitre);
        m.insert("Potassium", Unit::MilliequivalentsPerLitre);
        m.insert("ALT", Unit::UnitsPerLitre);
        m.insert("AST", Unit::UnitsPerLitre);
        m.insert("TSH", Unit::MilliUnitsPerLitre);
        // Demographics
        m.insert("Age", Unit::Years);
        m
    };
}

/// Look up the canonical unit of a field.
pub fn canonical_unit(field: &str) -> Option<Unit> {
    CANONICAL_UNITS.get(field).copied()
}

impl Unit {
    /// The string appended to bare values.
    pub fn canonical(self) -> &'static str {
        match self {
            Unit::TeraPerLitre => "x 10^12/L",
            Unit::GigaPerLitre => "x 10^9/L",
            Unit::GramsPerDecilitre => "g/dL",
            Unit::Percent => "%",
            Unit::Femtolitre => "fL",
            Unit::Picogram => "pg",
            Unit::MillimetresPerHour => "mm/hr",
            Unit::MilligramsPerDecilitre => "mg/dL",
            Unit::MilliequivalentsPerLitre => "mEq/L",
            Unit::UnitsPerLitre => "U/L",
            Unit::MilliUnitsPerLitre => "mIU/L",
            Unit::Years => "years",
        }
    }

    /// Other spellings of a unit for the same quantity.
    fn aliases(self) -> Option<&'static Regex> {
        match self {
            Unit::TeraPerLitre | Unit::GigaPerLitre => Some(&CELL_COUNT_ALIASES),
            Unit::GramsPerDecilitre => Some(&MASS_CONCENTRATION_ALIASES),
            Unit::Femtolitre => Some(&VOLUME_ALIASES),
            Unit::MillimetresPerHour => Some(&RATE_ALIASES),
            Unit::MilligramsPerDecilitre => Some(&CHEMISTRY_ALIASES),
            Unit::MilliequivalentsPerLitre => Some(&ELECTROLYTE_ALIASES),
            Unit::UnitsPerLitre => Some(&ENZYME_ALIASES),
            Unit::MilliUnitsPerLitre => Some(&HORMONE_ALIASES),
            Unit::Years => Some(&AGE_ALIASES),
            Unit::Percent | Unit::Picogram => None,
        }
    }

    /// Whether `value` already carries this unit or an alias of it.
    pub fn is_present_in(self, value: &str) -> bool {
        let canonical = self.canonical().to_lowercase();
        if value.to_lowercase().contains(&canonical) {
            return true;
        }
        self.aliases().is_some_and(|re| re.is_match(value))
    }
}

/// Appends canonical units to bare values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitNormalizer;

impl UnitNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Append `unit` to `value` unless a unit for the quantity is present.
    ///
    /// Idempotent: `normalize(normalize(v)) == normalize(v)`.
    pub fn normalize(&self, value: &str, unit: Unit) -> String {
        if unit.is_present_in(value) {
            value.to_string()
        } else {
            format!("{} {}", value, unit.canonical())
        }
    }
}
