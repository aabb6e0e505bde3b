//! Per-assignment constraint assembly.
//!
//! Fills the [`Constraints`] record of every teaching assignment from the
//! overlap matrix, the subject's fixed timing, and room-allocation
//! overrides. Assembly for one assignment never depends on another, so
//! the result is the same in any order.
//!
//! | Field | Source |
//! |-------|--------|
//! | `studentGroupConflicts` | union of matrix conflicts of the assignment's groups, minus those groups |
//! | `facultyConflicts` | `{facultyId}` |
//! | `fixedDay` / `fixedSlot` | subject fixed timing, only if the assignment is pinned |
//! | `mustBeInRoom` | first allocation found for `<componentId>_<section>`, then `<componentId>` |

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use crate::error::DataError;
use crate::models::{Constraints, FixedTiming, RoomPreference, Subject, TeachingAssignment};
use crate::overlap::OverlapMatrix;

/// Builds constraints for teaching assignments.
#[derive(Debug, Clone)]
pub struct ConstraintAssembler<'a> {
    matrix: &'a OverlapMatrix,
    fixed_timings: HashMap<String, FixedTiming>,
    room_preferences: Vec<RoomPreference>,
}

impl<'a> ConstraintAssembler<'a> {
    /// Creates an assembler with no subject or room data.
    pub fn new(matrix: &'a OverlapMatrix) -> Self {
        Self {
            matrix,
            fixed_timings: HashMap::new(),
            room_preferences: Vec::new(),
        }
    }

    /// Registers subject records; only those with fixed timing are kept.
    pub fn with_subjects(mut self, subjects: impl IntoIterator<Item = Subject>) -> Self {
        for subject in subjects {
            if let Some(timing) = subject.fixed_timing {
                self.fixed_timings.insert(subject.subject_code, timing);
            }
        }
        self
    }

    /// Registers room preference and allocation records.
    pub fn with_room_preferences(
        mut self,
        prefs: impl IntoIterator<Item = RoomPreference>,
    ) -> Self {
        self.room_preferences.extend(prefs);
        self
    }

    /// Builds the constraints for one assignment.
    ///
    /// # Errors
    /// `DataError::UnknownGroup` if the assignment names a group absent
    /// from the matrix. Missing subject or room data is not an error.
    pub fn assemble(&self, assignment: &TeachingAssignment) -> Result<Constraints, DataError> {
        let own: BTreeSet<&str> = assignment.student_group_ids.iter().map(String::as_str).collect();

        let mut student_group_conflicts = BTreeSet::new();
        for group_id in &assignment.student_group_ids {
            for other in self.matrix.conflicts(group_id)? {
                if !own.contains(other.as_str()) {
                    student_group_conflicts.insert(other.clone());
                }
            }
        }

        let fixed = if assignment.has_fixed_timing {
            self.fixed_timings.get(&assignment.subject_code)
        } else {
            None
        };

        let constraints = Constraints {
            student_group_conflicts,
            faculty_conflicts: BTreeSet::from([assignment.faculty_id.clone()]),
            fixed_day: fixed.map(|t| t.day.clone()),
            fixed_slot: fixed.map(|t| t.slots.clone()),
            must_be_in_room: self.allocated_room(assignment),
        };

        debug!(
            assignment = %assignment.assignment_id,
            conflicts = constraints.student_group_conflicts.len(),
            fixed = constraints.fixed_day.is_some(),
            room = ?constraints.must_be_in_room,
            "Assembled constraints"
        );
        Ok(constraints)
    }

    /// Preferred rooms across the assignment's groups, first-seen order.
    pub fn preferred_rooms(&self, assignment: &TeachingAssignment) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.matching_preferences(assignment)
            .flat_map(|p| p.preferred_rooms.iter())
            .filter(|room| seen.insert(*room))
            .cloned()
            .collect()
    }

    /// Fills `constraints` and `preferredRooms` of every assignment.
    ///
    /// Either every assignment is updated or, on error, none is.
    pub fn apply(&self, assignments: &mut [TeachingAssignment]) -> Result<(), DataError> {
        let assembled = assignments
            .iter()
            .map(|a| -> Result<_, DataError> { Ok((self.assemble(a)?, self.preferred_rooms(a))) })
            .collect::<Result<Vec<_>, DataError>>()?;

        let mut pinned = 0;
        let mut with_room = 0;
        for (assignment, (constraints, rooms)) in assignments.iter_mut().zip(assembled) {
            pinned += usize::from(constraints.fixed_day.is_some());
            with_room += usize::from(constraints.must_be_in_room.is_some());
            assignment.constraints = Some(constraints);
            assignment.preferred_rooms = rooms;
        }

        info!(
            assignments = assignments.len(),
            pinned,
            with_room,
            "Assembled assignment constraints"
        );
        Ok(())
    }

    fn matching_preferences<'s>(
        &'s self,
        assignment: &'s TeachingAssignment,
    ) -> impl Iterator<Item = &'s RoomPreference> + 's {
        assignment.student_group_ids.iter().flat_map(move |group_id| {
            self.room_preferences.iter().filter(move |p| {
                p.subject_code == assignment.subject_code
                    && p.component_type == assignment.component_type
                    && &p.student_group_id == group_id
            })
        })
    }

    fn allocated_room(&self, assignment: &TeachingAssignment) -> Option<String> {
        let component = assignment.component_id.as_str();
        if component.is_empty() {
            return None;
        }
        let sectioned = assignment
            .sections
            .first()
            .filter(|s| !s.is_empty())
            .map(|s| format!("{component}_{s}"));

        self.matching_preferences(assignment).find_map(|pref| {
            sectioned
                .as_ref()
                .and_then(|key| pref.room_allocations.get(key))
                .or_else(|| pref.room_allocations.get(component))
                .cloned()
        })
    }
}
