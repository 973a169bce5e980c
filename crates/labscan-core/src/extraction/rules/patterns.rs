//! Field tables for each supported document type.
//!
//! Candidates are listed in priority order and compiled case-insensitive.
//! Canonical units come from [`super::CANONICAL_UNITS`].

use lazy_static::lazy_static;

use super::{FallbackLabel, FieldSpec, PatternLibrary};
use crate::extraction::router::DocumentFormat;

/// Line contexts that name a birth date rather than a document date.
const BIRTH_CONTEXT: &str = r"\b(?:birth|dob)\b";

lazy_static! {
    pub static ref FBC_LIBRARY: PatternLibrary = PatternLibrary {
        format: DocumentFormat::Fbc,
        fields: vec![
            FieldSpec::new("Patient")
                .pattern(r"Patient:\s*(.+)")
                .pattern(r"Patient\s*Name:\s*(.+)")
                .pattern(r"Name:\s*(.+)")
                .excluding(r"\b(?:doctor|physician|lab(?:oratory)?)\b"),
            FieldSpec::new("Date")
                .pattern(r"Date:\s*(.+)")
                .pattern(r"Collection\s*Date:\s*(.+)")
                .pattern(r"Report\s*Date:\s*(.+)")
                .excluding(BIRTH_CONTEXT),
            FieldSpec::new("Doctor")
                .pattern(r"Doctor:\s*(.+)")
                .pattern(r"Ordering\s*Physician:\s*(.+)")
                .pattern(r"Physician:\s*(.+)"),
            FieldSpec::new("Laboratory")
                .pattern(r"Laboratory:\s*(.+)")
                .pattern(r"Lab:\s*(.+)")
                .fixed(r"CENTRAL\s*MEDICAL\s*LABORATORY", "Central Medical Laboratory"),
            FieldSpec::new("Hemoglobin")
                .pattern(r"Hemoglobin[:.\s]*([\d\.]+\s*g[/\s]*dL)")
                .pattern(r"Hb[:.\s]*([\d\.]+\s*g[/\s]*dL)")
                .pattern(r"Hemoglobin\s*\(Hb\)[:.\s]*([\d\.]+)"),
            FieldSpec::new("RBC")
                .pattern(r"RBC[:.\s]*([\d\.]+\s*x?\s*10[\*\^]?\d+[/\s]*L)")
                .pattern(r"Red\s*Blood\s*Cell\s*Count\s*\(RBC\)[:.\s]*([\d\.]+)")
                .pattern(r"RBC\s*([\d\.]+)"),
            FieldSpec::new("Hematocrit")
                .pattern(r"Hematocrit[:.\s]*([\d\.]+\s*%)")
                .pattern(r"Hct[:.\s]*([\d\.]+\s*%)")
                .pattern(r"Hematocrit\s*\(Hct\)[:.\s]*([\d\.]+)"),
            FieldSpec::new("MCV")
                .pattern(r"MCV[:.\s]*([\d\.]+\s*fL)")
                .pattern(r"MCV\s*([\d\.]+)")
                .pattern(r"Mean\s*Cell\s*Volume\s*\(MCV\)[:.\s]*([\d\.]+)"),
            FieldSpec::new("MCH")
                .pattern(r"MCH[:.\s]*([\d\.]+\s*pg)")
                .pattern(r"MCH\s*([\d\.]+)")
                .pattern(r"Mean\s*Cell\s*Hemoglobin\s*\(MCH\)[:.\s]*([\d\.]+)"),
            FieldSpec::new("MCHC")
                .pattern(r"MCHC[:.\s]*([\d\.]+\s*g[/\s]*dL)")
                .pattern(r"MCHC\s*([\d\.]+)")
                .pattern(r"Mean\s*Cell\s*Hemoglobin\s*Concentration\s*\(MCHC\)[:.\s]*([\d\.]+)"),
            FieldSpec::new("WBC")
                .pattern(r"WBC[:.\s]*([\d\.]+\s*x?\s*10[^\s]*[/\s]*L)")
                .pattern(r"White\s*Blood\s*Cell\s*Count\s*\(WBC\)[:.\s]*([\d\.]+)")
                .pattern(r"WBC\s*([\d\.]+)"),
            FieldSpec::new("Neutrophils")
                .pattern(r"Neutrophils[:.\s]*([\d\.]+\s*%)")
                .pattern(r"Neutrophils\s*([\d\.]+)"),
            FieldSpec::new("Lymphocytes")
                .pattern(r"Lymphocytes[:.\s]*([\d\.]+\s*%)")
                .pattern(r"Lymphocytes\s*([\d\.]+)"),
            FieldSpec::new("Monocytes")
                .pattern(r"Monocytes[:.\s]*([\d\.]+\s*%)")
                .pattern(r"Monocytes\s*([\d\.]+)"),
            FieldSpec::new("Eosinophils")
                .pattern(r"Eosinophils[:.\s]*([\d\.]+\s*%)")
                .pattern(r"Eosinophils\s*([\d\.]+)"),
            FieldSpec::new("Basophils")
                .pattern(r"Basophils[:.\s]*([\d\.]+\s*%)")
                .pattern(r"Basophils\s*([\d\.]+)"),
            FieldSpec::new("Platelets")
                .pattern(r"Platelets[:.\s]*([\d\.]+\s*x?\s*10[\*\^]?\d+[/\s]*L)")
                .pattern(r"Platelet\s*Count[:.\s]*([\d\.]+)")
                .pattern(r"Platelets\s*([\d\.]+)"),
            FieldSpec::new("MPV")
                .pattern(r"MPV[:.\s]*([\d\.]+\s*fL)")
                .pattern(r"MPV\s*([\d\.]+)"),
            FieldSpec::new("ESR")
                .pattern(r"ESR[:.\s]*([\d\.]+\s*mm[/\s]*hr)")
                .pattern(r"ESR\s*([\d\.]+)"),
        ],
        fallback_labels: vec![
            FallbackLabel::new("RBC", &["Red Blood Cell Count", "RBC"]),
            FallbackLabel::new("Hemoglobin", &["Hemoglobin"]),
            FallbackLabel::new("WBC", &["White Blood Cell Count", "WBC"]),
            FallbackLabel::new("Hematocrit", &["Hematocrit"]),
            FallbackLabel::new("Platelets", &["Platelet Count", "Platelets"]),
        ],
    };

    pub static ref LAB_REPORT_LIBRARY: PatternLibrary = PatternLibrary {
        format: DocumentFormat::LabReport,
        fields: vec![
            FieldSpec::new("Patient").pattern(r"Patient[:\s]*([A-Za-z \t]+)"),
            FieldSpec::new("Date")
                .pattern(r"Date[:\s]*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})")
                .excluding(BIRTH_CONTEXT),
            FieldSpec::new("Doctor").pattern(r"Doctor[:\s]*([A-Za-z \t\.]+)"),
            FieldSpec::new("Laboratory").pattern(r"Laboratory[:\s]*([^\n\r]+)"),
            // Vital signs
            FieldSpec::new("Blood_Pressure").pattern(r"Blood\s*Pressure[:\s]*(\d+[/\\]\d+)"),
            FieldSpec::new("Heart_Rate").pattern(r"Heart\s*Rate[:\s]*(\d+)"),
            FieldSpec::new("Temperature").pattern(r"Temperature[:\s]*(\d+\.?\d*)"),
            // Blood tests
            FieldSpec::new("Cholesterol")
                .pattern(r"Cholesterol[:\s]*(\d+\.?\d*\s*mg/dL)")
                .excluding(r"\b(?:hdl|ldl|vldl)\b"),
            FieldSpec::new("Glucose")
                .pattern(r"Glucose[:\s]*(\d+\.?\d*\s*mg/dL)")
                .pattern(r"Blood\s*Sugar[:\s]*(\d+\.?\d*\s*mg/dL)"),
            FieldSpec::new("Hemoglobin")
                .pattern(r"Hemoglobin[:\s]*(\d+\.?\d*\s*g/dL)")
                .pattern(r"\bHb[:\s]*(\d+\.?\d*\s*g/dL)"),
            FieldSpec::new("Sodium").pattern(r"Sodium[:\s]*(\d+\.?\d*\s*mEq/L)"),
            FieldSpec::new("Potassium").pattern(r"Potassium[:\s]*(\d+\.?\d*\s*mEq/L)"),
            FieldSpec::new("Creatinine").pattern(r"Creatinine[:\s]*(\d+\.?\d*\s*mg/dL)"),
            FieldSpec::new("BUN").pattern(r"\bBUN[:\s]*(\d+\.?\d*\s*mg/dL)"),
            // Liver function
            FieldSpec::new("ALT").pattern(r"\bALT[:\s]*(\d+\.?\d*\s*U/L)"),
            FieldSpec::new("AST").pattern(r"\bAST[:\s]*(\d+\.?\d*\s*U/L)"),
            // Thyroid function
            FieldSpec::new("TSH").pattern(r"\bTSH[:\s]*(\d+\.?\d*\s*mIU/L)"),
            // Lipid panel
            FieldSpec::new("LDL")
                .pattern(r"LDL(?:\s*Cholesterol)?[:\s]*(\d+\.?\d*\s*mg/dL)")
                .excluding(r"\bvldl\b"),
            FieldSpec::new("HDL").pattern(r"HDL(?:\s*Cholesterol)?[:\s]*(\d+\.?\d*\s*mg/dL)"),
            FieldSpec::new("Triglycerides").pattern(r"Triglycerides[:\s]*(\d+\.?\d*\s*mg/dL)"),
        ],
        fallback_labels: Vec::new(),
    };

    pub static ref PATIENT_DETAILS_LIBRARY: PatternLibrary = PatternLibrary {
        format: DocumentFormat::PatientDetails,
        fields: vec![
            FieldSpec::new("Name")
                .pattern(r"Patient\s*Name\s*:\s*(.+)")
                .pattern(r"Full\s*Name\s*:\s*(.+)")
                .pattern(r"Name\s*:\s*(.+)")
                .excluding(r"\b(?:doctor|physician|emergency|contact|kin|guardian|father|mother|spouse)\b"),
            FieldSpec::new("Patient_ID")
                .pattern(r"Patient\s*ID\s*[:#]?\s*([A-Z0-9][A-Z0-9/-]*)")
                .pattern(r"\bMRN\s*[:#]?\s*([A-Z0-9][A-Z0-9/-]*)")
                .pattern(r"Reg(?:istration|\.)?\s*No\.?\s*[:#]?\s*([A-Z0-9][A-Z0-9/-]*)"),
            FieldSpec::new("Date_of_Birth")
                .pattern(r"Date\s*of\s*Birth\s*:\s*(.+)")
                .pattern(r"\bDOB\s*:\s*(.+)")
                .pattern(r"Birth\s*Date\s*:\s*(.+)"),
            FieldSpec::new("Age")
                .pattern(r"\bAge\s*:\s*(\d{1,3}(?:\s*(?:years?|yrs?))?)"),
            FieldSpec::new("Gender")
                .pattern(r"\b(?:Gender|Sex)\s*:\s*(Male|Female|Other|M|F)\b"),
            FieldSpec::new("Blood_Group")
                .pattern(r"Blood\s*(?:Group|Type)\s*:\s*((?:AB|A|B|O)\s*(?:\+|-|positive\b|negative\b)?)"),
            FieldSpec::new("Phone")
                .pattern(r"(?:Phone|Tel(?:ephone)?|Mobile|Contact\s*No\.?)\s*:\s*(\+?[\d ()-]{7,})")
                .excluding(r"\bemergency\b"),
            FieldSpec::new("Email")
                .pattern(r"E-?mail\s*:\s*([\w.+-]+@[\w-]+(?:\.[\w-]+)+)")
                .pattern(r"\b([\w.+-]+@[\w-]+(?:\.[\w-]+)+)\b"),
            FieldSpec::new("Address").pattern(r"Address\s*:\s*(.+)"),
            FieldSpec::new("Emergency_Contact")
                .pattern(r"Emergency\s*Contact(?:\s*Name)?\s*:\s*(.+)")
                .pattern(r"Next\s*of\s*Kin\s*:\s*(.+)"),
            FieldSpec::new("Date")
                .pattern(r"(?:Registration|Admission|Visit)\s*Date\s*:\s*(.+)")
                .pattern(r"Date\s*:\s*(.+)")
                .excluding(BIRTH_CONTEXT),
        ],
        fallback_labels: Vec::new(),
    };

    pub static ref PRESCRIPTION_LIBRARY: PatternLibrary = PatternLibrary {
        format: DocumentFormat::Prescription,
        fields: vec![
            FieldSpec::new("Patient")
                .pattern(r"Patient(?:\s*Name)?\s*:\s*(.+)")
                .pattern(r"Name\s*:\s*(.+)")
                .excluding(r"\b(?:doctor|physician|prescriber|pharmacy|medicine|drug)\b"),
            FieldSpec::new("Age")
                .pattern(r"\bAge\s*:\s*(\d{1,3}(?:\s*(?:years?|yrs?))?)"),
            FieldSpec::new("Doctor")
                .pattern(r"(?:Doctor|Prescriber|Physician)\s*:\s*(.+)")
                .pattern(r"(?m)^\s*(Dr\.?\s+[A-Za-z. ]+?)\s*$"),
            FieldSpec::new("Date")
                .pattern(r"Date\s*:\s*(.+)")
                .excluding(BIRTH_CONTEXT),
            FieldSpec::new("Medicine")
                .pattern(r"(?:Medicine|Medication|Drug)(?:\s*Name)?\s*:\s*(.+)")
                .pattern(r"(?m)^\s*Rx\s*:?\s*(.+)"),
            FieldSpec::new("Dosage")
                .pattern(r"(?:Dosage|Dose|Strength)\s*:\s*(.+)")
                .pattern(r"\b(\d+(?:\.\d+)?\s*(?:mg|mcg|µg|g|ml|iu|units?))\b"),
            FieldSpec::new("Frequency")
                .pattern(r"Frequency\s*:\s*(.+)")
                .pattern_group(r"\b(?:once|twice|three\s+times|four\s+times)\s+(?:a\s+)?daily\b", 0)
                .pattern(r"\b(OD|BD|BID|TDS|TID|QID|QDS|PRN|STAT)\b"),
            FieldSpec::new("Duration")
                .pattern(r"Duration\s*:\s*(.+)")
                .pattern(r"\bfor\s+(\d+\s*(?:days?|weeks?|months?))\b"),
            FieldSpec::new("Route")
                .pattern(r"Route\s*:\s*(.+)")
                .pattern(r"\b(orally|by\s+mouth|topical(?:ly)?|intravenous(?:ly)?|subcutaneous(?:ly)?|intramuscular(?:ly)?)\b"),
            FieldSpec::new("Refills").pattern(r"Refills?\s*:\s*(\d+)"),
            FieldSpec::new("Instructions")
                .pattern(r"(?:Additional\s*)?Instructions?\s*:\s*(.+)")
                .pattern(r"\bNotes?\s*:\s*(.+)"),
        ],
        fallback_labels: Vec::new(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::rules::FieldMatcher;
    use pretty_assertions::assert_eq;

    fn find(library: &PatternLibrary, field: &str, text: &str) -> Option<String> {
        let spec = library.field(field).unwrap();
        FieldMatcher::new().find(text, spec).map(|m| m.value)
    }

    #[test]
    fn test_libraries_compile() {
        for library in [
            &*FBC_LIBRARY,
            &*LAB_REPORT_LIBRARY,
            &*PATIENT_DETAILS_LIBRARY,
            &*PRESCRIPTION_LIBRARY,
        ] {
            assert!(!library.fields.is_empty());
            assert!(library.fields.iter().all(|f| !f.candidates.is_empty()));
        }
    }

    #[test]
    fn test_field_names_unique() {
        for library in [
            &*FBC_LIBRARY,
            &*LAB_REPORT_LIBRARY,
            &*PATIENT_DETAILS_LIBRARY,
            &*PRESCRIPTION_LIBRARY,
        ] {
            let mut names: Vec<_> = library.field_names().collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "{:?}", library.format);
        }
    }

    #[test]
    fn test_fbc_blood_parameters() {
        let text = "RBC: 4.8 x 10^12/L\nWBC 7.2 x10^9/L\nHematocrit: 41.5 %\nMCHC 33.1\nESR 12 mm/hr";
        assert_eq!(find(&FBC_LIBRARY, "RBC", text).as_deref(), Some("4.8 x 10^12/L"));
        assert_eq!(find(&FBC_LIBRARY, "WBC", text).as_deref(), Some("7.2 x10^9/L"));
        assert_eq!(find(&FBC_LIBRARY, "Hematocrit", text).as_deref(), Some("41.5 %"));
        assert_eq!(find(&FBC_LIBRARY, "MCHC", text).as_deref(), Some("33.1"));
        assert_eq!(find(&FBC_LIBRARY, "MCH", text), None);
        assert_eq!(find(&FBC_LIBRARY, "ESR", text).as_deref(), Some("12 mm/hr"));
    }

    #[test]
    fn test_fbc_patient_skips_doctor_name() {
        let text = "Doctor Name: Dr. Perera\nName: Nimal Silva";
        assert_eq!(find(&FBC_LIBRARY, "Patient", text).as_deref(), Some("Nimal Silva"));
    }

    #[test]
    fn test_lab_report_name_stays_on_line() {
        let text = "Patient: John Smith\nDate: 05/11/2024\nDoctor: Dr. Adams";
        assert_eq!(find(&LAB_REPORT_LIBRARY, "Patient", text).as_deref(), Some("John Smith"));
        assert_eq!(find(&LAB_REPORT_LIBRARY, "Date", text).as_deref(), Some("05/11/2024"));
        assert_eq!(find(&LAB_REPORT_LIBRARY, "Doctor", text).as_deref(), Some("Dr. Adams"));
    }

    #[test]
    fn test_lab_report_cholesterol_excludes_fractions() {
        let text = "HDL Cholesterol: 52 mg/dL\nTotal Cholesterol: 190 mg/dL";
        assert_eq!(find(&LAB_REPORT_LIBRARY, "Cholesterol", text).as_deref(), Some("190 mg/dL"));
        assert_eq!(find(&LAB_REPORT_LIBRARY, "HDL", text).as_deref(), Some("52 mg/dL"));
    }

    #[test]
    fn test_patient_details_fields() {
        let text = "Patient Name: Kamala Perera\nDate of Birth: 14/02/1985\nAge: 39\n\
                    Sex: F\nBlood Group: O+\nPhone: +94 77 123 4567\n\
                    Emergency Contact: Sunil Perera\nRegistration Date: 01/03/2024";

        assert_eq!(find(&PATIENT_DETAILS_LIBRARY, "Name", text).as_deref(), Some("Kamala Perera"));
        assert_eq!(find(&PATIENT_DETAILS_LIBRARY, "Date_of_Birth", text).as_deref(), Some("14/02/1985"));
        assert_eq!(find(&PATIENT_DETAILS_LIBRARY, "Age", text).as_deref(), Some("39"));
        assert_eq!(find(&PATIENT_DETAILS_LIBRARY, "Gender", text).as_deref(), Some("F"));
        assert_eq!(find(&PATIENT_DETAILS_LIBRARY, "Blood_Group", text).as_deref(), Some("O+"));
        assert_eq!(find(&PATIENT_DETAILS_LIBRARY, "Phone", text).as_deref(), Some("+94 77 123 4567"));
        assert_eq!(find(&PATIENT_DETAILS_LIBRARY, "Emergency_Contact", text).as_deref(), Some("Sunil Perera"));
        assert_eq!(find(&PATIENT_DETAILS_LIBRARY, "Date", text).as_deref(), Some("01/03/2024"));
    }

    #[test]
    fn test_prescription_fields() {
        let text = "Dr. Anne Fernando\nPatient: Ravi Kumar\nRx: Amoxicillin 500 mg\n\
                    Take twice daily for 7 days\nRefills: 0";

        assert_eq!(find(&PRESCRIPTION_LIBRARY, "Doctor", text).as_deref(), Some("Dr. Anne Fernando"));
        assert_eq!(find(&PRESCRIPTION_LIBRARY, "Patient", text).as_deref(), Some("Ravi Kumar"));
        assert_eq!(find(&PRESCRIPTION_LIBRARY, "Medicine", text).as_deref(), Some("Amoxicillin 500 mg"));
        assert_eq!(find(&PRESCRIPTION_LIBRARY, "Dosage", text).as_deref(), Some("500 mg"));
        assert_eq!(find(&PRESCRIPTION_LIBRARY, "Frequency", text).as_deref(), Some("twice daily"));
        assert_eq!(find(&PRESCRIPTION_LIBRARY, "Duration", text).as_deref(), Some("7 days"));
        assert_eq!(find(&PRESCRIPTION_LIBRARY, "Refills", text).as_deref(), Some("0"));
    }
}
