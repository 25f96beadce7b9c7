use crate::abi::Token;

use serde::Serialize;
use std::{collections::BTreeMap, fmt};
use thiserror::Error;

/// One CSV line keyed by header name.
pub type Row = BTreeMap<String, String>;

const PATIENT_INT_FIELDS: [&str; 8] = [
    "patient_id", "age", "highBP", "highChol", "cholCheck", "bmi", "smoker", "stroke",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Patient,
    Doctor,
}

impl RecordKind {
    pub fn id_field(self) -> &'static str {
        match self {
            RecordKind::Patient => "patient_id",
            RecordKind::Doctor  => "doctor_id",
        }
    }

    // the second field a row must carry besides its id
    pub fn required_field(self) -> &'static str {
        match self {
            RecordKind::Patient => "age",
            RecordKind::Doctor  => "doctor_name",
        }
    }

    pub fn method(self, action: Action) -> &'static str {
        match (self, action) {
            (RecordKind::Patient, Action::Add)    => "addPatient",
            (RecordKind::Patient, Action::Delete) => "deletePatient",
            (RecordKind::Doctor,  Action::Add)    => "addDoctor",
            (RecordKind::Doctor,  Action::Delete) => "deleteDoctor",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Patient => "patient",
            RecordKind::Doctor  => "doctor",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Add,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Add    => "add",
            Action::Delete => "delete",
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("{kind} row {id}: missing field `{field}`")]
    MissingField { kind: RecordKind, id: String, field: &'static str },

    #[error("{kind} row {id}: field `{field}` is not an integer: `{value}`")]
    NotAnInteger { kind: RecordKind, id: String, field: &'static str, value: String },
}

// Key names follow the CSV headers so the pinned JSON mirrors the source row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientRecord {
    pub patient_id: u64,
    pub age:        u64,
    #[serde(rename = "highBP")]
    pub high_bp:    u64,
    #[serde(rename = "highChol")]
    pub high_chol:  u64,
    #[serde(rename = "cholCheck")]
    pub chol_check: u64,
    pub bmi:        u64,
    pub smoker:     u64,
    pub stroke:     u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DoctorRecord {
    pub doctor_id:     u64,
    pub doctor_name:   String,
    #[serde(rename = "crdntls")]
    pub credentials:   String,
    pub gender:        String,
    pub hospital_name: String,
    pub country:       String,
    pub specialty:     String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TypedRecord {
    Patient(PatientRecord),
    Doctor(DoctorRecord),
}

impl TypedRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            TypedRecord::Patient(_) => RecordKind::Patient,
            TypedRecord::Doctor(_)  => RecordKind::Doctor,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            TypedRecord::Patient(p) => p.patient_id,
            TypedRecord::Doctor(d)  => d.doctor_id,
        }
    }

    /// Arguments of the add call in contract order; the content id, when
    /// present, goes last.
    pub fn add_args(&self, content_ref: Option<&str>) -> Vec<Token> {
        let mut args = match self {
            TypedRecord::Patient(p) => vec![
                Token::Uint(p.patient_id),
                Token::Uint(p.age),
                Token::Uint(p.high_bp),
                Token::Uint(p.high_chol),
                Token::Uint(p.chol_check),
                Token::Uint(p.bmi),
                Token::Uint(p.smoker),
                Token::Uint(p.stroke),
            ],
            TypedRecord::Doctor(d) => vec![
                Token::Uint(d.doctor_id),
                Token::Str(d.doctor_name.clone()),
                Token::Str(d.credentials.clone()),
                Token::Str(d.gender.clone()),
                Token::Str(d.hospital_name.clone()),
                Token::Str(d.country.clone()),
                Token::Str(d.specialty.clone()),
            ],
        };
        if let Some(cid) = content_ref {
            args.push(Token::Str(cid.to_string()));
        }
        args
    }

    pub fn delete_args(&self) -> Vec<Token> {
        vec![Token::Uint(self.id())]
    }

    pub fn args(&self, action: Action, content_ref: Option<&str>) -> Vec<Token> {
        match action {
            Action::Add    => self.add_args(content_ref),
            Action::Delete => self.delete_args(),
        }
    }

    /// RFC 8785 canonical JSON, the form that gets pinned.
    pub fn canonical_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_jcs::to_vec(self)
    }
}

/// Raw id as it appears in the row, trimmed; empty when absent.
pub fn raw_id(kind: RecordKind, row: &Row) -> &str {
    row.get(kind.id_field()).map(|s| s.trim()).unwrap_or("")
}

/// Name of the first required field that is absent or blank.
pub fn missing_required(kind: RecordKind, row: &Row) -> Option<&'static str> {
    [kind.id_field(), kind.required_field()]
        .into_iter()
        .find(|f| row.get(*f).is_none_or(|v| v.trim().is_empty()))
}

pub fn coerce(kind: RecordKind, row: &Row) -> Result<TypedRecord, RecordError> {
    let id = raw_id(kind, row).to_string();
    let field = |name: &'static str| {
        row.get(name)
            .map(|v| v.trim())
            .ok_or_else(|| RecordError::MissingField { kind, id: id.clone(), field: name })
    };
    let int = |name: &'static str| -> Result<u64, RecordError> {
        let v = field(name)?;
        v.parse::<u64>().map_err(|_| RecordError::NotAnInteger {
            kind,
            id: id.clone(),
            field: name,
            value: v.to_string(),
        })
    };

    match kind {
        RecordKind::Patient => {
            let mut v = [0u64; 8];
            for (slot, name) in v.iter_mut().zip(PATIENT_INT_FIELDS) {
                *slot = int(name)?;
            }
            let [patient_id, age, high_bp, high_chol, chol_check, bmi, smoker, stroke] = v;
            Ok(TypedRecord::Patient(PatientRecord {
                patient_id, age, high_bp, high_chol, chol_check, bmi, smoker, stroke,
            }))
        }
        RecordKind::Doctor => Ok(TypedRecord::Doctor(DoctorRecord {
            doctor_id:     int("doctor_id")?,
            doctor_name:   field("doctor_name")?.to_string(),
            credentials:   field("crdntls")?.to_string(),
            gender:        field("gender")?.to_string(),
            hospital_name: field("hospital_name")?.to_string(),
            country:       field("country")?.to_string(),
            specialty:     field("specialty")?.to_string(),
        })),
    }
}
