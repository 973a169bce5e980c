//! Documents and extraction records.

use indexmap::IndexMap;
use serde::Serialize;

/// Raw text of one scanned document, as produced by the OCR collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Full text, pages joined with newlines.
    pub text: String,
    /// Number of pages the text came from.
    pub page_count: usize,
}

impl Document {
    /// Build a document from per-page texts.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        let mut page_count = 0;
        for page in pages {
            text.push('\n');
            text.push_str(page.as_ref());
            page_count += 1;
        }
        Self { text, page_count }
    }
}

/// Ordered mapping of field name to normalized value.
///
/// Keys keep the order they were inserted in. A key is never inserted twice
/// and never maps to an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractionRecord {
    fields: IndexMap<String, String>,
}

impl ExtractionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field if it is not already present.
    ///
    /// Returns `false` and leaves the record untouched when the field exists
    /// or the value is blank.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.trim().is_empty() {
            return false;
        }
        match self.fields.entry(field.into()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_never_overwrites() {
        let mut record = ExtractionRecord::new();
        assert!(record.insert("Hemoglobin", "13.5 g/dL"));
        assert!(!record.insert("Hemoglobin", "4.8 g/dL"));

        assert_eq!(record.len(), 1);
        assert_eq!(record.get("Hemoglobin"), Some("13.5 g/dL"));
    }

    #[test]
    fn test_blank_values_are_absent() {
        let mut record = ExtractionRecord::new();
        assert!(!record.insert("Patient", "   "));
        assert!(!record.contains("Patient"));
        assert!(record.is_empty());
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let mut record = ExtractionRecord::new();
        record.insert("Patient", "Jane Doe");
        record.insert("Hemoglobin", "13.5 g/dL");
        record.insert("RBC", "4.8 x 10^12/L");

        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"Patient":"Jane Doe","Hemoglobin":"13.5 g/dL","RBC":"4.8 x 10^12/L"}"#
        );
    }

    #[test]
    fn test_document_from_pages() {
        let doc = Document::from_pages(["page one", "page two"]);
        assert_eq!(doc.page_count, 2);
        assert_eq!(doc.text, "\npage one\npage two");
    }
}
