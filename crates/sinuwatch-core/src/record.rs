//! Grade record model
//!
//! A `GradeRecord` is one row of the portal's current-session grade table.
//! Records are matched across runs by the identity key
//! `(subject, year, semester)`; only the `grade` field is change-tracked.
//! `kind` and `date` are descriptive, not identity-bearing.

use serde::{Deserialize, Serialize};

/// One decoded grade-table row
///
/// All fields are opaque decoded text. The identity key is not strictly
/// unique (a retaken course could repeat it), but is treated as unique per
/// comparison run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRecord {
    /// Study year as displayed, e.g. "1"
    pub year: String,

    /// Semester as displayed, e.g. "2"
    pub semester: String,

    /// Subject name, NBSP-normalized and trimmed
    pub subject: String,

    /// Exam/assessment type column
    ///
    /// Serialized as `"type"` so snapshot files match the portal's wording.
    #[serde(rename = "type")]
    pub kind: String,

    /// Date column as displayed
    pub date: String,

    /// Grade value as displayed; compared exactly, case-sensitive
    pub grade: String,
}

impl GradeRecord {
    /// The identity key used to match this record across runs
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.subject, &self.year, &self.semester)
    }
}

/// Collapse non-breaking-space variants to regular spaces and trim
///
/// The portal pads subject cells with U+00A0; the normalized form is what
/// participates in the identity key.
pub fn normalize_subject(raw: &str) -> String {
    raw.replace('\u{a0}', " ").trim().to_string()
}
