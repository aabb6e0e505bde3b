//! Scheduled session and room models.
//!
//! A scheduled session is one concrete placement of an assignment's
//! session: day, slot (single or contiguous double), room, and the
//! resolved faculty and student groups. Sessions are read-only input.
//!
//! # Slot ids
//! A slot id is a single token (`S3`) or two tokens joined by `+`
//! (`S3+S4`) for a contiguous double slot. A double slot occupies each
//! of its tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the tokens of a multi-slot id.
pub const SLOT_SEPARATOR: char = '+';

/// A slot id, single or multi-slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotRef(String);

impl SlotRef {
    /// Wraps a raw slot id.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Underlying single-slot tokens, in declaration order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0
            .split(SLOT_SEPARATOR)
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Whether the id spans more than one slot.
    pub fn is_multi(&self) -> bool {
        self.tokens().count() > 1
    }

    /// Whether the id has no tokens at all.
    pub fn is_empty(&self) -> bool {
        self.tokens().next().is_none()
    }

    /// Ordinal of a single-slot token, taken from its trailing digits
    /// (`S6` → 6). `None` if the token has no trailing digits.
    pub fn ordinal(token: &str) -> Option<u32> {
        let digits_start = token
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i)?;
        token[digits_start..].parse().ok()
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlotRef {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// One concrete placement of a teaching assignment's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSession {
    /// Explicit session id; derived from assignment and number if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Assignment this session belongs to.
    pub assignment_id: String,
    /// Sequence number within the assignment (1-based).
    pub session_number: u32,
    /// Day, `None` if not yet placed.
    #[serde(default)]
    pub day: Option<String>,
    /// Slot id, `None` if not yet placed.
    #[serde(default)]
    pub slot_id: Option<SlotRef>,
    /// Room id.
    #[serde(default)]
    pub room_id: Option<String>,
    /// Resolved faculty member.
    #[serde(default)]
    pub faculty_id: String,
    /// Resolved student groups.
    #[serde(default)]
    pub student_group_ids: Vec<String>,
    /// Semester (informational).
    #[serde(default)]
    pub semester: Option<u32>,
}

impl ScheduledSession {
    /// Creates an unplaced session.
    pub fn new(assignment_id: impl Into<String>, session_number: u32) -> Self {
        Self {
            session_id: None,
            assignment_id: assignment_id.into(),
            session_number,
            day: None,
            slot_id: None,
            room_id: None,
            faculty_id: String::new(),
            student_group_ids: Vec::new(),
            semester: None,
        }
    }

    /// Places the session on a day and slot.
    pub fn at(mut self, day: impl Into<String>, slot: impl Into<String>) -> Self {
        self.day = Some(day.into());
        self.slot_id = Some(SlotRef::new(slot));
        self
    }

    /// Sets the room.
    pub fn in_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    /// Sets the faculty member.
    pub fn taught_by(mut self, faculty_id: impl Into<String>) -> Self {
        self.faculty_id = faculty_id.into();
        self
    }

    /// Adds a student group.
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.student_group_ids.push(group_id.into());
        self
    }

    /// Sets an explicit session id.
    pub fn with_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Session id: the explicit one, or `<assignmentId>_S<sessionNumber>`.
    pub fn id(&self) -> String {
        match &self.session_id {
            Some(id) => id.clone(),
            None => format!("{}_S{}", self.assignment_id, self.session_number),
        }
    }

    /// Day and slot, if the session has been placed.
    ///
    /// Empty strings count as not placed.
    pub fn placement(&self) -> Option<(&str, &SlotRef)> {
        let day = self.day.as_deref().filter(|d| !d.trim().is_empty())?;
        let slot = self.slot_id.as_ref().filter(|s| !s.is_empty())?;
        Some((day, slot))
    }
}

/// A teaching room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Unique room identifier.
    pub room_id: String,
    /// Room type: lecture, lab, tutorial, seminar.
    #[serde(rename = "type", default)]
    pub room_type: String,
    /// Seats available.
    pub capacity: u32,
}

impl Room {
    /// Creates a room.
    pub fn new(room_id: impl Into<String>, room_type: impl Into<String>, capacity: u32) -> Self {
        Self {
            room_id: room_id.into(),
            room_type: room_type.into(),
            capacity,
        }
    }
}
