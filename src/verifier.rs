//! Schedule verification.
//!
//! Re-checks a placed schedule against the overlap matrix, room
//! capacities, and the faculty workload limit. Single pass, no state:
//! the verifier indexes the sessions by `(entity, day, slot)` and reports
//! every key with more than one occupant.
//!
//! # Checks
//!
//! | Kind | Severity | Rule |
//! |------|----------|------|
//! | faculty-double-booking | hard | same faculty, day, slot |
//! | room-double-booking | hard | same room, day, slot |
//! | student-group-overlap | hard | groups sharing students in one day/slot; across sessions also pairs not known parallel |
//! | room-capacity | hard | summed headcount > room capacity |
//! | faculty-workload | soft | run of adjacent slots on one day > limit, once per faculty/day |
//! | unresolved-reference | info | room or group id not declared |
//!
//! # Placement
//! Sessions without a day or slot are unscheduled, not conflicting, and
//! are skipped by every placement check. A multi-slot id (`S1+S2`)
//! occupies each of its tokens in every index and in the workload runs;
//! collisions of the same sessions in several tokens merge into one finding.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info, warn};

use crate::config::{UnknownPairPolicy, VerifierConfig};
use crate::models::{
    ConflictFinding, ConflictKind, ConflictReport, Room, ScheduledSession, SlotRef, StudentGroup,
};
use crate::overlap::{GroupRelation, OverlapMatrix};

/// A placed session with its derived id and slot tokens.
struct Placed<'s> {
    id: String,
    day: &'s str,
    tokens: Vec<&'s str>,
    session: &'s ScheduledSession,
}

/// `(entity, day, slot)` → indexes into the placed list.
type OccupancyIndex<'s> = BTreeMap<(&'s str, &'s str, &'s str), Vec<usize>>;

/// Verifies placed schedules.
#[derive(Debug, Clone)]
pub struct ScheduleVerifier<'a> {
    matrix: &'a OverlapMatrix,
    config: VerifierConfig,
    capacities: HashMap<String, u32>,
    headcounts: HashMap<String, u32>,
}

impl<'a> ScheduleVerifier<'a> {
    /// Creates a verifier with no room or group records.
    pub fn new(matrix: &'a OverlapMatrix, config: VerifierConfig) -> Self {
        Self {
            matrix,
            config,
            capacities: HashMap::new(),
            headcounts: HashMap::new(),
        }
    }

    /// Registers room records.
    pub fn with_rooms<'r>(mut self, rooms: impl IntoIterator<Item = &'r Room>) -> Self {
        self.capacities
            .extend(rooms.into_iter().map(|r| (r.room_id.clone(), r.capacity)));
        self
    }

    /// Registers student group records.
    pub fn with_groups<'g>(mut self, groups: impl IntoIterator<Item = &'g StudentGroup>) -> Self {
        self.headcounts
            .extend(groups.into_iter().map(|g| (g.id.clone(), g.headcount)));
        self
    }

    /// Runs every check and returns the full report.
    ///
    /// Never fails: bad references become `unresolved-reference` findings
    /// and the remaining checks still run.
    pub fn verify(&self, sessions: &[ScheduledSession]) -> ConflictReport {
        let placed = place(sessions);
        if placed.len() < sessions.len() {
            debug!(skipped = sessions.len() - placed.len(), "Skipping unscheduled sessions");
        }

        let mut findings = Vec::new();
        findings.extend(self.unresolved_references(sessions));

        let faculty = index_by(&placed, |s| Some(s.faculty_id.as_str()).filter(|f| !f.is_empty()));
        findings.extend(double_bookings(&placed, &faculty, ConflictKind::FacultyDoubleBooking));

        let rooms = index_by(&placed, |s| s.room_id.as_deref().filter(|r| !r.is_empty()));
        findings.extend(double_bookings(&placed, &rooms, ConflictKind::RoomDoubleBooking));

        findings.extend(self.group_overlaps(&placed));
        findings.extend(self.capacity_overflows(&placed));
        findings.extend(self.workload_runs(&placed));

        let report = ConflictReport::new(findings);
        info!(
            sessions = sessions.len(),
            placed = placed.len(),
            faculty_double_bookings = report.count(ConflictKind::FacultyDoubleBooking),
            room_double_bookings = report.count(ConflictKind::RoomDoubleBooking),
            group_overlaps = report.count(ConflictKind::StudentGroupOverlap),
            capacity = report.count(ConflictKind::RoomCapacity),
            workload = report.count(ConflictKind::FacultyWorkload),
            unresolved = report.count(ConflictKind::UnresolvedReference),
            "Verified schedule"
        );
        report
    }

    fn group_known(&self, group_id: &str) -> bool {
        self.matrix.contains(group_id) && self.headcounts.contains_key(group_id)
    }

    /// One finding per session naming every undeclared room or group.
    fn unresolved_references(&self, sessions: &[ScheduledSession]) -> Vec<ConflictFinding> {
        let mut findings = Vec::new();
        for session in sessions {
            let mut missing = Vec::new();
            if let Some(room) = session.room_id.as_deref().filter(|r| !r.is_empty()) {
                if !self.capacities.contains_key(room) {
                    missing.push(format!("room '{room}'"));
                }
            }
            for group in &session.student_group_ids {
                if !self.group_known(group) {
                    missing.push(format!("group '{group}'"));
                }
            }
            if missing.is_empty() {
                continue;
            }

            let id = session.id();
            warn!(session = %id, missing = ?missing, "Unresolvable session references");
            findings.push(ConflictFinding::new(
                ConflictKind::UnresolvedReference,
                id.clone(),
                session.day.clone(),
                format!("Session {id} references unknown {}", missing.join(", ")),
                vec![id],
            ));
        }
        findings
    }

    /// Pairs of groups present in the same day/slot that share students.
    ///
    /// Groups of different sessions are checked under the unknown-pair
    /// policy. Groups combined in one session are checked for confirmed
    /// conflicts only.
    fn group_overlaps(&self, placed: &[Placed<'_>]) -> Vec<ConflictFinding> {
        let mut by_slot: BTreeMap<(&str, &str), Vec<usize>> = BTreeMap::new();
        for (i, p) in placed.iter().enumerate() {
            for &token in &p.tokens {
                by_slot.entry((p.day, token)).or_default().push(i);
            }
        }

        // (day, g1, g2) with g1 <= g2 → merged occurrence
        let mut overlaps: BTreeMap<(&str, &str, &str), GroupOverlap<'_>> = BTreeMap::new();
        for ((day, token), occupants) in &by_slot {
            for (n, &i) in occupants.iter().enumerate() {
                for &j in &occupants[n + 1..] {
                    for g1 in &placed[i].session.student_group_ids {
                        for g2 in &placed[j].session.student_group_ids {
                            let Some(confirmed) = self.pair_conflicts(g1, g2) else {
                                continue;
                            };
                            let entry = overlaps.entry(pair_key(*day, g1, g2)).or_default();
                            entry.sessions.extend([i, j]);
                            entry.slots.insert(*token);
                            entry.confirmed |= confirmed;
                        }
                    }
                }
            }
        }

        for (i, p) in placed.iter().enumerate() {
            let groups = &p.session.student_group_ids;
            for (n, g1) in groups.iter().enumerate() {
                for g2 in &groups[n + 1..] {
                    if g1 == g2 || !self.confirmed_conflict(g1, g2) {
                        continue;
                    }
                    let entry = overlaps.entry(pair_key(p.day, g1, g2)).or_default();
                    entry.sessions.insert(i);
                    entry.slots.extend(p.tokens.iter().copied());
                    entry.confirmed = true;
                }
            }
        }

        overlaps
            .into_iter()
            .map(|((day, g1, g2), overlap)| {
                let ids = session_ids(placed, overlap.sessions.iter().copied());
                let sessions = ids.join(", ");
                let slots = join(overlap.slots.iter().copied());
                let (entity, message) = if g1 == g2 {
                    (
                        g1.to_string(),
                        format!(
                            "Group {g1} is double-booked on {day} at {slots} (sessions {sessions})"
                        ),
                    )
                } else if overlap.confirmed {
                    (
                        format!("{g1}/{g2}"),
                        format!(
                            "Groups {g1} and {g2} share students but meet on {day} at {slots} \
                             (sessions {sessions})"
                        ),
                    )
                } else {
                    (
                        format!("{g1}/{g2}"),
                        format!(
                            "Groups {g1} and {g2} have no confirmed parallel relation but meet \
                             on {day} at {slots} (sessions {sessions})"
                        ),
                    )
                };
                ConflictFinding::new(
                    ConflictKind::StudentGroupOverlap,
                    entity,
                    Some(day.to_string()),
                    message,
                    ids,
                )
            })
            .collect()
    }

    fn confirmed_conflict(&self, g1: &str, g2: &str) -> bool {
        matches!(self.matrix.relation(g1, g2), Ok(GroupRelation::Conflict))
    }

    /// `Some(true)` for a known conflict, `Some(false)` for an unknown pair
    /// reported under the conservative policy, `None` when the pair is fine
    /// or cannot be resolved.
    fn pair_conflicts(&self, g1: &str, g2: &str) -> Option<bool> {
        match self.matrix.relation(g1, g2).ok()? {
            GroupRelation::Conflict => Some(true),
            GroupRelation::Parallel => None,
            GroupRelation::Unknown => match self.config.unknown_pair_policy {
                UnknownPairPolicy::Conflict => Some(false),
                UnknownPairPolicy::Ignore => None,
            },
        }
    }

    fn capacity_overflows(&self, placed: &[Placed<'_>]) -> Vec<ConflictFinding> {
        let mut findings = Vec::new();
        for p in placed {
            let Some(room) = p.session.room_id.as_deref() else {
                continue;
            };
            // unknown rooms are already reported as unresolved
            let Some(&capacity) = self.capacities.get(room) else {
                continue;
            };

            let total: u32 = p
                .session
                .student_group_ids
                .iter()
                .filter_map(|g| self.headcounts.get(g))
                .sum();
            if total > capacity {
                findings.push(ConflictFinding::new(
                    ConflictKind::RoomCapacity,
                    room,
                    Some(p.day.to_string()),
                    format!(
                        "Session {} has {total} students in room {room} with capacity {capacity}",
                        p.id
                    ),
                    vec![p.id.clone()],
                ));
            }
        }
        findings
    }

    /// Runs of adjacent slot ordinals per faculty and day.
    fn workload_runs(&self, placed: &[Placed<'_>]) -> Vec<ConflictFinding> {
        let max = self.config.max_consecutive_slots;

        // faculty → day → ordinal → sessions
        let mut grid: BTreeMap<&str, BTreeMap<&str, BTreeMap<u32, Vec<usize>>>> = BTreeMap::new();
        for (i, p) in placed.iter().enumerate() {
            let faculty = p.session.faculty_id.as_str();
            if faculty.is_empty() {
                continue;
            }
            for ordinal in p.tokens.iter().filter_map(|t| SlotRef::ordinal(t)) {
                grid.entry(faculty)
                    .or_default()
                    .entry(p.day)
                    .or_default()
                    .entry(ordinal)
                    .or_default()
                    .push(i);
            }
        }

        let mut findings = Vec::new();
        for (faculty, days) in &grid {
            for (day, slots) in days {
                let runs = adjacent_runs(slots.keys().copied());
                let offending: Vec<&(u32, u32)> =
                    runs.iter().filter(|(lo, hi)| (hi - lo + 1) as usize > max).collect();
                let Some(longest) = offending.iter().map(|(lo, hi)| hi - lo + 1).max() else {
                    continue;
                };

                let sessions = offending.iter().flat_map(|&&(lo, hi)| {
                    slots.range(lo..=hi).flat_map(|(_, ids)| ids.iter().copied())
                });
                let ids = session_ids(placed, sessions);
                let spans = join(offending.iter().map(|(lo, hi)| format!("slots {lo}-{hi}")));

                findings.push(ConflictFinding::new(
                    ConflictKind::FacultyWorkload,
                    *faculty,
                    Some(day.to_string()),
                    format!(
                        "Faculty {faculty} teaches {longest} consecutive slots on {day} ({spans}), \
                         above the limit of {max}"
                    ),
                    ids,
                ));
            }
        }
        findings
    }
}

#[derive(Default)]
struct GroupOverlap<'s> {
    sessions: BTreeSet<usize>,
    slots: BTreeSet<&'s str>,
    confirmed: bool,
}

fn place(sessions: &[ScheduledSession]) -> Vec<Placed<'_>> {
    sessions
        .iter()
        .filter_map(|session| {
            let (day, slot) = session.placement()?;
            let mut tokens: Vec<&str> = slot.tokens().collect();
            tokens.sort_unstable();
            tokens.dedup();
            Some(Placed {
                id: session.id(),
                day,
                tokens,
                session,
            })
        })
        .collect()
}

fn index_by<'s>(
    placed: &[Placed<'s>],
    entity: impl Fn(&'s ScheduledSession) -> Option<&'s str>,
) -> OccupancyIndex<'s> {
    let mut index = OccupancyIndex::new();
    for (i, p) in placed.iter().enumerate() {
        let Some(e) = entity(p.session) else {
            continue;
        };
        for &token in &p.tokens {
            index.entry((e, p.day, token)).or_default().push(i);
        }
    }
    index
}

/// Keys with several occupants; identical occupant sets on the same
/// entity and day are merged across slots.
fn double_bookings(
    placed: &[Placed<'_>],
    index: &OccupancyIndex<'_>,
    kind: ConflictKind,
) -> Vec<ConflictFinding> {
    let mut merged: BTreeMap<(&str, &str, &[usize]), Vec<&str>> = BTreeMap::new();
    for ((entity, day, token), occupants) in index {
        if occupants.len() > 1 {
            merged
                .entry((*entity, *day, occupants.as_slice()))
                .or_default()
                .push(*token);
        }
    }

    let label = match kind {
        ConflictKind::FacultyDoubleBooking => "Faculty",
        _ => "Room",
    };
    merged
        .into_iter()
        .map(|((entity, day, occupants), slots)| {
            let ids = session_ids(placed, occupants.iter().copied());
            ConflictFinding::new(
                kind,
                entity,
                Some(day.to_string()),
                format!(
                    "{label} {entity} is double-booked on {day} at {} (sessions {})",
                    join(slots.into_iter()),
                    ids.join(", ")
                ),
                ids,
            )
        })
        .collect()
}

/// Overlap key with the group pair in sorted order.
fn pair_key<'k>(day: &'k str, g1: &'k str, g2: &'k str) -> (&'k str, &'k str, &'k str) {
    if g1 <= g2 {
        (day, g1, g2)
    } else {
        (day, g2, g1)
    }
}

/// Maximal runs of consecutive values in an ascending sequence.
fn adjacent_runs(ordinals: impl Iterator<Item = u32>) -> Vec<(u32, u32)> {
    let mut runs: Vec<(u32, u32)> = Vec::new();
    for n in ordinals {
        match runs.last_mut() {
            Some((_, hi)) if *hi + 1 == n => *hi = n,
            _ => runs.push((n, n)),
        }
    }
    runs
}

fn session_ids(placed: &[Placed<'_>], indexes: impl Iterator<Item = usize>) -> Vec<String> {
    let ids: BTreeSet<&str> = indexes.map(|i| placed[i].id.as_str()).collect();
    ids.into_iter().map(String::from).collect()
}

fn join<S: AsRef<str>>(items: impl Iterator<Item = S>) -> String {
    items
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::GroupHierarchy;
    use crate::models::{HierarchyLinks, Severity};

    fn groups() -> Vec<StudentGroup> {
        vec![
            StudentGroup::new("MCA_SEM3_A", 3).with_section("A").with_headcount(40),
            StudentGroup::new("MCA_SEM3_B", 3).with_section("B").with_headcount(38),
            StudentGroup::new("ELEC_AD_A1", 3)
                .with_section("A")
                .with_category("AD")
                .with_headcount(25),
            StudentGroup::new("ELEC_AD_B1", 3)
                .with_section("B")
                .with_category("AD")
                .with_headcount(20),
            StudentGroup::new("MCA_SEM1_A", 1).with_section("A").with_headcount(60),
        ]
    }

    fn matrix() -> OverlapMatrix {
        let child = |c: &str, p: &str| {
            (
                c.to_string(),
                HierarchyLinks {
                    parent: Some(p.to_string()),
                    ..Default::default()
                },
            )
        };
        let h = GroupHierarchy::new(
            groups(),
            vec![child("ELEC_AD_A1", "MCA_SEM3_A"), child("ELEC_AD_B1", "MCA_SEM3_B")],
        )
        .unwrap();
        OverlapMatrix::build(&h)
    }

    fn rooms() -> Vec<Room> {
        vec![
            Room::new("R101", "lecture", 60),
            Room::new("R102", "lecture", 60),
            Room::new("R103", "lecture", 60),
            Room::new("LAB1", "lab", 30),
        ]
    }

    fn verify_with(config: VerifierConfig, sessions: &[ScheduledSession]) -> ConflictReport {
        let m = matrix();
        let g = groups();
        let r = rooms();
        ScheduleVerifier::new(&m, config)
            .with_rooms(&r)
            .with_groups(&g)
            .verify(sessions)
    }

    fn verify(sessions: &[ScheduledSession]) -> ConflictReport {
        verify_with(VerifierConfig::default(), sessions)
    }

    fn session(
        assignment: &str,
        day: &str,
        slot: &str,
        room: &str,
        faculty: &str,
        group: &str,
    ) -> ScheduledSession {
        ScheduledSession::new(assignment, 1)
            .at(day, slot)
            .in_room(room)
            .taught_by(faculty)
            .with_group(group)
    }

    #[test]
    fn test_clean_schedule() {
        let report = verify(&[
            session("TA1", "Mon", "S1", "R101", "F1", "MCA_SEM3_A"),
            session("TA2", "Mon", "S1", "R102", "F2", "MCA_SEM3_B"),
            session("TA3", "Mon", "S2", "R101", "F1", "MCA_SEM3_A"),
            session("TA4", "Tue", "S1", "R101", "F2", "MCA_SEM1_A"),
        ]);
        assert!(report.is_clean(), "{:?}", report.findings);
        assert!(!report.has_hard_conflicts());
    }

    #[test]
    fn test_faculty_double_booking() {
        let report = verify(&[
            session("TA1", "Mon", "S1", "R101", "F1", "MCA_SEM3_A"),
            session("TA2", "Mon", "S1", "R102", "F1", "MCA_SEM3_B"),
        ]);

        assert_eq!(report.count(ConflictKind::FacultyDoubleBooking), 1);
        let f = report.of_kind(ConflictKind::FacultyDoubleBooking).next().unwrap();
        assert_eq!(f.session_ids, vec!["TA1_S1", "TA2_S1"]);
        assert_eq!(f.entity_id, "F1");
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_room_double_booking() {
        let report = verify(&[
            session("TA1", "Mon", "S1", "R101", "F1", "MCA_SEM3_A"),
            session("TA2", "Mon", "S1", "R101", "F2", "MCA_SEM3_B"),
        ]);

        assert_eq!(report.count(ConflictKind::RoomDoubleBooking), 1);
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_conflicting_groups_overlap() {
        // parent section and its own elective cohort in the same slot
        let report = verify(&[
            session("TA1", "Wed", "S3", "R101", "F1", "MCA_SEM3_A"),
            session("TA2", "Wed", "S3", "R102", "F2", "ELEC_AD_A1"),
        ]);

        assert_eq!(report.count(ConflictKind::StudentGroupOverlap), 1);
        let f = report.of_kind(ConflictKind::StudentGroupOverlap).next().unwrap();
        assert_eq!(f.entity_id, "ELEC_AD_A1/MCA_SEM3_A");
        assert_eq!(f.session_ids, vec!["TA1_S1", "TA2_S1"]);
        assert_eq!(f.severity, Severity::Hard);
    }

    #[test]
    fn test_parallel_groups_do_not_overlap() {
        let report = verify(&[
            session("TA1", "Wed", "S3", "R101", "F1", "ELEC_AD_A1"),
            session("TA2", "Wed", "S3", "R102", "F2", "ELEC_AD_B1"),
        ]);
        assert_eq!(report.count(ConflictKind::StudentGroupOverlap), 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_same_group_in_two_sessions() {
        let report = verify(&[
            session("TA1", "Thu", "S2", "R101", "F1", "MCA_SEM3_B"),
            session("TA2", "Thu", "S2", "R102", "F2", "MCA_SEM3_B"),
        ]);

        assert_eq!(report.count(ConflictKind::StudentGroupOverlap), 1);
        let f = report.of_kind(ConflictKind::StudentGroupOverlap).next().unwrap();
        assert_eq!(f.entity_id, "MCA_SEM3_B");
    }

    #[test]
    fn test_conflicting_groups_in_one_session() {
        // parent section combined with its own elective cohort
        let report = verify(&[session("TA1", "Fri", "S1+S2", "R101", "F1", "MCA_SEM3_A")
            .with_group("ELEC_AD_A1")]);

        assert_eq!(report.count(ConflictKind::StudentGroupOverlap), 1);
        let f = report.of_kind(ConflictKind::StudentGroupOverlap).next().unwrap();
        assert_eq!(f.entity_id, "ELEC_AD_A1/MCA_SEM3_A");
        assert_eq!(f.session_ids, vec!["TA1_S1"]);
        assert!(f.message.contains("S1, S2"));
    }

    #[test]
    fn test_parallel_groups_in_one_session() {
        let report = verify(&[session("TA1", "Fri", "S1", "R101", "F1", "ELEC_AD_A1")
            .with_group("ELEC_AD_B1")]);
        assert!(report.is_clean(), "{:?}", report.findings);
    }

    #[test]
    fn test_unknown_pair_in_one_session_not_reported() {
        let report = verify(&[session("TA1", "Fri", "S1", "R101", "F1", "MCA_SEM3_A")
            .with_group("MCA_SEM1_A")]);
        assert_eq!(report.count(ConflictKind::StudentGroupOverlap), 0);
    }

    #[test]
    fn test_unknown_pair_policy() {
        // sections of different semesters: no rule determines the pair
        let sessions = [
            session("TA1", "Fri", "S4", "R101", "F1", "MCA_SEM3_A"),
            session("TA2", "Fri", "S4", "R102", "F2", "MCA_SEM1_A"),
        ];

        let strict = verify(&sessions);
        assert_eq!(strict.count(ConflictKind::StudentGroupOverlap), 1);
        let f = strict.of_kind(ConflictKind::StudentGroupOverlap).next().unwrap();
        assert!(f.message.contains("no confirmed parallel relation"));

        let lenient = verify_with(
            VerifierConfig::default().with_unknown_pair_policy(UnknownPairPolicy::Ignore),
            &sessions,
        );
        assert!(lenient.is_clean());
    }

    #[test]
    fn test_room_capacity() {
        // 40 + 25 = 65 students in a 60-seat room
        let report = verify(&[session("TA1", "Mon", "S1", "R101", "F1", "MCA_SEM3_A")
            .with_group("ELEC_AD_A1")]);

        assert_eq!(report.count(ConflictKind::RoomCapacity), 1);
        let f = report.of_kind(ConflictKind::RoomCapacity).next().unwrap();
        assert!(f.message.contains("65"));
        assert!(f.message.contains("60"));
        assert_eq!(f.session_ids, vec!["TA1_S1"]);
    }

    #[test]
    fn test_faculty_workload_reported_once_per_day() {
        let report = verify(&[
            session("TA1", "Tue", "S1", "R101", "F1", "MCA_SEM3_A"),
            session("TA2", "Tue", "S2", "R101", "F1", "MCA_SEM3_A"),
            session("TA3", "Tue", "S3", "R101", "F1", "MCA_SEM3_A"),
            session("TA4", "Tue", "S4", "R101", "F1", "MCA_SEM3_A"),
        ]);

        assert_eq!(report.count(ConflictKind::FacultyWorkload), 1);
        let f = report.of_kind(ConflictKind::FacultyWorkload).next().unwrap();
        assert_eq!(f.entity_id, "F1");
        assert_eq!(f.day.as_deref(), Some("Tue"));
        assert_eq!(f.session_ids.len(), 4);
        assert!(!report.has_hard_conflicts());
    }

    #[test]
    fn test_workload_gap_resets_run() {
        let report = verify(&[
            session("TA1", "Tue", "S1", "R101", "F1", "MCA_SEM3_A"),
            session("TA2", "Tue", "S2", "R101", "F1", "MCA_SEM3_A"),
            session("TA3", "Tue", "S4", "R101", "F1", "MCA_SEM3_A"),
            session("TA4", "Tue", "S5", "R101", "F1", "MCA_SEM3_A"),
            session("TA5", "Wed", "S3", "R101", "F1", "MCA_SEM3_A"),
        ]);
        assert_eq!(report.count(ConflictKind::FacultyWorkload), 0);
    }

    #[test]
    fn test_double_slot_counts_toward_workload() {
        let report = verify(&[
            session("TA1", "Tue", "S1+S2", "LAB1", "F1", "ELEC_AD_A1"),
            session("TA2", "Tue", "S3+S4", "LAB1", "F1", "ELEC_AD_A1"),
        ]);
        assert_eq!(report.count(ConflictKind::FacultyWorkload), 1);
    }

    #[test]
    fn test_double_slot_collides_with_second_half() {
        let report = verify(&[
            session("TA1", "Mon", "S1+S2", "LAB1", "F1", "ELEC_AD_A1"),
            session("TA2", "Mon", "S2", "LAB1", "F1", "MCA_SEM3_A"),
        ]);

        assert_eq!(report.count(ConflictKind::FacultyDoubleBooking), 1);
        assert_eq!(report.count(ConflictKind::RoomDoubleBooking), 1);
        assert_eq!(report.count(ConflictKind::StudentGroupOverlap), 1);
    }

    #[test]
    fn test_identical_double_slots_merge() {
        let report = verify(&[
            session("TA1", "Mon", "S1+S2", "LAB1", "F1", "ELEC_AD_A1"),
            session("TA2", "Mon", "S1+S2", "LAB1", "F2", "ELEC_AD_B1"),
        ]);

        assert_eq!(report.count(ConflictKind::RoomDoubleBooking), 1);
        let f = report.of_kind(ConflictKind::RoomDoubleBooking).next().unwrap();
        assert!(f.message.contains("S1, S2"));
    }

    #[test]
    fn test_unscheduled_sessions_skipped() {
        let unplaced = ScheduledSession::new("TA2", 1)
            .in_room("R101")
            .taught_by("F1")
            .with_group("MCA_SEM3_A");
        let report = verify(&[session("TA1", "Mon", "S1", "R101", "F1", "MCA_SEM3_A"), unplaced]);
        assert!(report.is_clean());
    }

    #[test]
    fn test_unresolved_references_do_not_stop_run() {
        let report = verify(&[
            session("TA1", "Mon", "S1", "R999", "F1", "GHOST"),
            session("TA2", "Mon", "S1", "R101", "F1", "MCA_SEM3_A"),
        ]);

        assert_eq!(report.count(ConflictKind::UnresolvedReference), 1);
        let f = report.of_kind(ConflictKind::UnresolvedReference).next().unwrap();
        assert!(f.message.contains("R999"));
        assert!(f.message.contains("GHOST"));
        assert_eq!(f.severity, Severity::Info);
        // remaining checks still ran
        assert_eq!(report.count(ConflictKind::FacultyDoubleBooking), 1);
    }

    #[test]
    fn test_adjacent_runs() {
        assert_eq!(adjacent_runs([1, 2, 3, 5, 7, 8].into_iter()), vec![(1, 3), (5, 5), (7, 8)]);
        assert!(adjacent_runs(std::iter::empty()).is_empty());
    }
}
