//! Snapshot diffing
//!
//! Pure comparison of the previous snapshot against the freshly extracted
//! records. A current record whose identity key is absent from the previous
//! snapshot is *new*; one whose stored grade differs (exact, case-sensitive
//! string compare) is *changed*; everything else is silent. Records present
//! only in the previous snapshot are not reported; disappearance is not
//! modeled as an event.

use std::collections::HashMap;

use crate::record::GradeRecord;

/// A grade that changed between runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeChange {
    /// Grade stored in the previous snapshot
    pub old_grade: String,
    /// Grade seen in the current extraction
    pub new_grade: String,
    pub subject: String,
    pub year: String,
    pub semester: String,
    /// Date column of the current record
    pub date: String,
}

/// Result of comparing two record sequences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeDiff {
    /// Records whose identity key was not in the previous snapshot,
    /// in current-page order
    pub new_records: Vec<GradeRecord>,
    /// Records whose grade differs from the stored one,
    /// in current-page order
    pub changed: Vec<GradeChange>,
}

impl GradeDiff {
    /// True when the run produced nothing to report
    pub fn is_empty(&self) -> bool {
        self.new_records.is_empty() && self.changed.is_empty()
    }
}

/// Classify `current` records against the `previous` snapshot
///
/// Duplicate identity keys within `previous` collapse last-write-wins while
/// building the lookup; the portal has not been observed to emit duplicates,
/// but a retaken course would be compared against its most recent entry only.
pub fn diff(previous: &[GradeRecord], current: &[GradeRecord]) -> GradeDiff {
    let mut previous_grades: HashMap<(&str, &str, &str), &str> = HashMap::new();
    for record in previous {
        previous_grades.insert(record.key(), &record.grade);
    }

    let mut result = GradeDiff::default();
    for record in current {
        match previous_grades.get(&record.key()) {
            None => result.new_records.push(record.clone()),
            Some(old_grade) if **old_grade != *record.grade => {
                result.changed.push(GradeChange {
                    old_grade: (*old_grade).to_string(),
                    new_grade: record.grade.clone(),
                    subject: record.subject.clone(),
                    year: record.year.clone(),
                    semester: record.semester.clone(),
                    date: record.date.clone(),
                });
            }
            Some(_) => {}
        }
    }

    result
}
