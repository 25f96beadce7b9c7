use crate::records::{Action, RecordKind};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{fmt, fs, path::Path, str::FromStr, time::Duration};

/// Wall-clock time of one call, kept in hundredths of a millisecond so the
/// two-decimal text form round-trips exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ElapsedMs {
    hundredths: u64,
}

impl ElapsedMs {
    pub fn from_hundredths(hundredths: u64) -> Self {
        Self { hundredths }
    }

    // rounds half up at 10µs
    pub fn from_duration(d: Duration) -> Self {
        let nanos = d.as_nanos();
        Self { hundredths: ((nanos + 5_000) / 10_000) as u64 }
    }

    pub fn as_millis_f64(&self) -> f64 {
        self.hundredths as f64 / 100.0
    }
}

impl fmt::Display for ElapsedMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.hundredths / 100, self.hundredths % 100)
    }
}

impl FromStr for ElapsedMs {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bad = || format!("invalid millisecond value `{}`", s);
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty() || frac.len() > 2 {
            return Err(bad());
        }
        let whole: u64 = whole.parse().map_err(|_| bad())?;
        let frac: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| bad())? * 10,
            _ => frac.parse().map_err(|_| bad())?,
        };
        Ok(Self { hundredths: whole * 100 + frac })
    }
}

impl Serialize for ElapsedMs {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ElapsedMs {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(de::Error::custom)
    }
}

// gas is written as a decimal string
mod gas_string {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(v: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(v)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOutcome {
    pub id:                String,
    #[serde(with = "gas_string")]
    pub gas_used:          u64,
    pub execution_time_ms: ElapsedMs,
}

impl CallOutcome {
    pub fn new(id: impl Into<String>, gas_used: u64, elapsed: Duration) -> Self {
        Self {
            id: id.into(),
            gas_used,
            execution_time_ms: ElapsedMs::from_duration(elapsed),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientMetrics {
    pub add_patient:    Vec<CallOutcome>,
    pub delete_patient: Vec<CallOutcome>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorMetrics {
    pub add_doctor:    Vec<CallOutcome>,
    pub delete_doctor: Vec<CallOutcome>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub patient: PatientMetrics,
    pub doctor:  DoctorMetrics,
}

impl MetricsReport {
    pub fn outcomes(&self, kind: RecordKind, action: Action) -> &[CallOutcome] {
        match (kind, action) {
            (RecordKind::Patient, Action::Add)    => &self.patient.add_patient,
            (RecordKind::Patient, Action::Delete) => &self.patient.delete_patient,
            (RecordKind::Doctor,  Action::Add)    => &self.doctor.add_doctor,
            (RecordKind::Doctor,  Action::Delete) => &self.doctor.delete_doctor,
        }
    }

    pub fn record(&mut self, kind: RecordKind, action: Action, outcome: CallOutcome) {
        let seq = match (kind, action) {
            (RecordKind::Patient, Action::Add)    => &mut self.patient.add_patient,
            (RecordKind::Patient, Action::Delete) => &mut self.patient.delete_patient,
            (RecordKind::Doctor,  Action::Add)    => &mut self.doctor.add_doctor,
            (RecordKind::Doctor,  Action::Delete) => &mut self.doctor.delete_doctor,
        };
        seq.push(outcome);
    }

    pub fn total_calls(&self) -> usize {
        self.patient.add_patient.len()
            + self.patient.delete_patient.len()
            + self.doctor.add_doctor.len()
            + self.doctor.delete_doctor.len()
    }
}

/// Writes the report as pretty JSON. The bytes go to a sibling temp file that
/// is then renamed over `dest`, so readers never see a half-written report.
pub fn persist(report: &MetricsReport, dest: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("serialising metrics report")?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory `{}`", parent.display()))?;
    }

    let file_name = dest
        .file_name()
        .with_context(|| format!("report path `{}` has no file name", dest.display()))?;
    let tmp = dest.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let written = fs::write(&tmp, json)
        .with_context(|| format!("writing `{}`", tmp.display()))
        .and_then(|()| {
            fs::rename(&tmp, dest)
                .with_context(|| format!("moving report into place at `{}`", dest.display()))
        });
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

pub fn load(path: &Path) -> Result<MetricsReport> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("reading report `{}`", path.display()))?;
    serde_json::from_str(&s)
        .with_context(|| format!("parsing `{}` as a metrics report", path.display()))
}
