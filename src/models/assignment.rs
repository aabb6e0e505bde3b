//! Teaching assignment model.
//!
//! A teaching assignment is one unit of teaching work (a subject
//! component taught by one faculty member to one or more student groups).
//! Assignments are produced upstream; this crate only fills in their
//! [`Constraints`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A unit of teaching work.
///
/// Fields not modelled here (titles, names, priorities, ...) are kept in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeachingAssignment {
    /// Unique assignment identifier.
    pub assignment_id: String,
    /// Subject code (e.g. "24MCA31").
    pub subject_code: String,
    /// Component identifier (e.g. "24MCA31_TH").
    #[serde(default)]
    pub component_id: String,
    /// Component type: theory, practical, tutorial.
    #[serde(default)]
    pub component_type: String,
    /// Teaching faculty member.
    pub faculty_id: String,
    /// Participating student groups.
    pub student_group_ids: Vec<String>,
    /// Section labels covered by this assignment.
    #[serde(default)]
    pub sections: Vec<String>,
    /// Slots per session (1 = single, 2 = contiguous double).
    #[serde(default = "default_session_duration")]
    pub session_duration: u32,
    /// Sessions per week.
    #[serde(default)]
    pub sessions_per_week: u32,
    /// Whether this is an elective offering.
    #[serde(default)]
    pub is_elective: bool,
    /// Whether the subject is pinned to a day/slot by policy.
    #[serde(default, alias = "isDiffSubject")]
    pub has_fixed_timing: bool,
    /// Rooms preferred for this assignment.
    #[serde(default)]
    pub preferred_rooms: Vec<String>,
    /// Scheduling constraints; `None` until assembled.
    #[serde(default)]
    pub constraints: Option<Constraints>,
    /// Pass-through fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_session_duration() -> u32 {
    1
}

/// Constraints attached to a teaching assignment.
///
/// Upstream records carry an empty or partially filled object; absent
/// keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Constraints {
    /// Groups that cannot share a slot with this assignment's groups.
    pub student_group_conflicts: BTreeSet<String>,
    /// Faculty who cannot be double-booked: the assignment's own faculty.
    pub faculty_conflicts: BTreeSet<String>,
    /// Pinned day, if the subject has fixed timing.
    pub fixed_day: Option<String>,
    /// Pinned slot, if the subject has fixed timing.
    pub fixed_slot: Option<String>,
    /// Pre-allocated room.
    pub must_be_in_room: Option<String>,
}

/// Subject attributes relevant to constraint assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub subject_code: String,
    #[serde(default)]
    pub fixed_timing: Option<FixedTiming>,
}

/// Day/slot a subject is pinned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedTiming {
    pub day: String,
    #[serde(alias = "slot")]
    pub slots: String,
}

/// Room preferences and allocations for one subject component and group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPreference {
    pub subject_code: String,
    pub component_type: String,
    pub student_group_id: String,
    #[serde(default)]
    pub preferred_rooms: Vec<String>,
    /// Room overrides keyed by `<componentId>_<section>` or `<componentId>`.
    #[serde(default)]
    pub room_allocations: BTreeMap<String, String>,
}

impl TeachingAssignment {
    /// Creates an assignment with a single component and no constraints.
    pub fn new(
        assignment_id: impl Into<String>,
        subject_code: impl Into<String>,
        faculty_id: impl Into<String>,
        student_group_ids: Vec<String>,
    ) -> Self {
        Self {
            assignment_id: assignment_id.into(),
            subject_code: subject_code.into(),
            component_id: String::new(),
            component_type: String::new(),
            faculty_id: faculty_id.into(),
            student_group_ids,
            sections: Vec::new(),
            session_duration: 1,
            sessions_per_week: 0,
            is_elective: false,
            has_fixed_timing: false,
            preferred_rooms: Vec::new(),
            constraints: None,
            extra: BTreeMap::new(),
        }
    }

    /// Sets the component id and type.
    pub fn with_component(
        mut self,
        component_id: impl Into<String>,
        component_type: impl Into<String>,
    ) -> Self {
        self.component_id = component_id.into();
        self.component_type = component_type.into();
        self
    }

    /// Adds a section label.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.sections.push(section.into());
        self
    }

    /// Marks the assignment as pinned by its subject's fixed timing.
    pub fn with_fixed_timing(mut self) -> Self {
        self.has_fixed_timing = true;
        self
    }

    /// Marks the assignment as elective.
    pub fn elective(mut self) -> Self {
        self.is_elective = true;
        self
    }
}

impl Subject {
    /// Creates a subject without fixed timing.
    pub fn new(subject_code: impl Into<String>) -> Self {
        Self {
            subject_code: subject_code.into(),
            fixed_timing: None,
        }
    }

    /// Pins the subject to a day and slot.
    pub fn with_fixed_timing(mut self, day: impl Into<String>, slots: impl Into<String>) -> Self {
        self.fixed_timing = Some(FixedTiming {
            day: day.into(),
            slots: slots.into(),
        });
        self
    }
}

impl RoomPreference {
    /// Creates an empty preference record.
    pub fn new(
        subject_code: impl Into<String>,
        component_type: impl Into<String>,
        student_group_id: impl Into<String>,
    ) -> Self {
        Self {
            subject_code: subject_code.into(),
            component_type: component_type.into(),
            student_group_id: student_group_id.into(),
            preferred_rooms: Vec::new(),
            room_allocations: BTreeMap::new(),
        }
    }

    /// Adds a preferred room.
    pub fn with_preferred_room(mut self, room_id: impl Into<String>) -> Self {
        self.preferred_rooms.push(room_id.into());
        self
    }

    /// Adds a room allocation override.
    pub fn with_allocation(mut self, key: impl Into<String>, room_id: impl Into<String>) -> Self {
        self.room_allocations.insert(key.into(), room_id.into());
        self
    }
}
