//! Conflict findings and the verification report.
//!
//! A finding is an output value, not an error: the verifier collects every
//! finding and returns them all. Reports are generated fresh on every run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// One faculty member in two sessions at the same day/slot.
    FacultyDoubleBooking,
    /// One room hosting two sessions at the same day/slot.
    RoomDoubleBooking,
    /// Groups that share students placed at the same day/slot.
    StudentGroupOverlap,
    /// Summed group headcount above the room's capacity.
    RoomCapacity,
    /// Too many consecutive slots for one faculty member on one day.
    FacultyWorkload,
    /// A session names a room or group that does not exist.
    UnresolvedReference,
}

impl ConflictKind {
    /// Severity implied by the kind.
    pub fn severity(self) -> Severity {
        match self {
            Self::FacultyDoubleBooking
            | Self::RoomDoubleBooking
            | Self::StudentGroupOverlap
            | Self::RoomCapacity => Severity::Hard,
            Self::FacultyWorkload => Severity::Soft,
            Self::UnresolvedReference => Severity::Info,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FacultyDoubleBooking => "faculty-double-booking",
            Self::RoomDoubleBooking => "room-double-booking",
            Self::StudentGroupOverlap => "student-group-overlap",
            Self::RoomCapacity => "room-capacity",
            Self::FacultyWorkload => "faculty-workload",
            Self::UnresolvedReference => "unresolved-reference",
        };
        f.write_str(s)
    }
}

/// How bad a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The schedule is invalid.
    Hard,
    /// The schedule is valid but undesirable.
    Soft,
    /// Data quality issue; the affected check was partially skipped.
    Info,
}

/// A detected rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictFinding {
    /// Type of finding.
    pub kind: ConflictKind,
    /// Severity, derived from `kind`.
    pub severity: Severity,
    /// Related entity: faculty, room, session, or `g1/g2` group pair.
    pub entity_id: String,
    /// Day the finding applies to, if any.
    pub day: Option<String>,
    /// Human-readable description.
    pub message: String,
    /// Implicated sessions, sorted.
    pub session_ids: Vec<String>,
}

impl ConflictFinding {
    /// Creates a finding; `session_ids` are sorted and deduplicated.
    pub fn new(
        kind: ConflictKind,
        entity_id: impl Into<String>,
        day: Option<String>,
        message: impl Into<String>,
        mut session_ids: Vec<String>,
    ) -> Self {
        session_ids.sort();
        session_ids.dedup();
        Self {
            kind,
            severity: kind.severity(),
            entity_id: entity_id.into(),
            day,
            message: message.into(),
            session_ids,
        }
    }

    /// Whether the finding makes the schedule invalid.
    pub fn is_hard(&self) -> bool {
        self.severity == Severity::Hard
    }
}

/// All findings of one verification run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Findings ordered by kind, entity, day, then sessions.
    pub findings: Vec<ConflictFinding>,
}

impl ConflictReport {
    /// Creates a report, ordering findings deterministically.
    pub fn new(mut findings: Vec<ConflictFinding>) -> Self {
        findings.sort_by(|a, b| {
            (a.kind, &a.entity_id, &a.day, &a.session_ids, &a.message)
                .cmp(&(b.kind, &b.entity_id, &b.day, &b.session_ids, &b.message))
        });
        Self { findings }
    }

    /// No findings at all.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Whether any hard conflict was found.
    pub fn has_hard_conflicts(&self) -> bool {
        self.findings.iter().any(ConflictFinding::is_hard)
    }

    /// Number of findings of a kind.
    pub fn count(&self, kind: ConflictKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Findings of a kind.
    pub fn of_kind(&self, kind: ConflictKind) -> impl Iterator<Item = &ConflictFinding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    /// Number of findings.
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Whether the report is empty.
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}
