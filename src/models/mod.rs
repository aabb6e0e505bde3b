//! Timetable domain models.
//!
//! Records exchanged with the surrounding pipeline: student groups and
//! their hierarchy links, teaching assignments and their constraints,
//! scheduled sessions and rooms, and verification findings.
//!
//! # Pipeline Mappings
//!
//! | u-timetable | Produced by | Consumed by |
//! |-------------|-------------|-------------|
//! | StudentGroup / HierarchyLinks | group stage | hierarchy, verifier |
//! | TeachingAssignment | assignment generator | constraint assembler |
//! | Constraints | constraint assembler | external solver |
//! | ScheduledSession | solver + enrichment | verifier |
//! | ConflictReport | verifier | report rendering |

mod assignment;
mod finding;
mod group;
mod session;

pub use assignment::{Constraints, FixedTiming, RoomPreference, Subject, TeachingAssignment};
pub use finding::{ConflictFinding, ConflictKind, ConflictReport, Severity};
pub use group::{ElectiveCategory, GroupDocument, GroupRecord, HierarchyLinks, StudentGroup};
pub use session::{Room, ScheduledSession, SlotRef, SLOT_SEPARATOR};
