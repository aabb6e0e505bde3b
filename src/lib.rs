//! Academic timetable constraint model.
//!
//! Turns a student-group hierarchy into a pairwise overlap matrix, derives
//! per-assignment scheduling constraints from it, and verifies placed
//! schedules against it. Placement itself is done by an external solver;
//! this crate defines what the solver must respect and checks its output.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `StudentGroup`, `HierarchyLinks`,
//!   `TeachingAssignment`, `Constraints`, `ScheduledSession`, `Room`,
//!   `ConflictFinding`, `ConflictReport`
//! - **`hierarchy`**: Parent/child graph over student groups
//! - **`overlap`**: Overlap rules and the `OverlapMatrix`
//! - **`constraints`**: Per-assignment constraint assembly
//! - **`verifier`**: Post-hoc conflict detection on placed sessions
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling links, cycles)
//! - **`config`**, **`io`**, **`error`**: Verifier settings, JSON files, error type
//!
//! # Architecture
//!
//! ```text
//! GroupDocument ─► GroupHierarchy ─► OverlapMatrix ─┬─► ConstraintAssembler ─► solver
//!                                                   └─► ScheduleVerifier ◄── placed sessions
//! ```
//!
//! The matrix is the single source of truth for "may these two groups
//! meet at the same time". Pairs it cannot decide are treated as
//! conflicts unless the verifier is configured otherwise.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod config;
pub mod constraints;
pub mod error;
pub mod hierarchy;
pub mod io;
pub mod models;
pub mod overlap;
pub mod validation;
pub mod verifier;

pub use config::{UnknownPairPolicy, VerifierConfig};
pub use constraints::ConstraintAssembler;
pub use error::DataError;
pub use hierarchy::GroupHierarchy;
pub use overlap::{GroupRelation, OverlapMatrix, OverlapMatrixBuilder};
pub use verifier::ScheduleVerifier;
