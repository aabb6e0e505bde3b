//! Student group overlap matrix.
//!
//! For every declared group, the set of groups it can never share a
//! day/slot with (they have students in common) and the set it has been
//! confirmed safe to run in parallel with. A pair in neither set is
//! [`GroupRelation::Unknown`]; consumers must treat it as a potential
//! conflict unless it is explicitly parallel.
//!
//! # Rules
//!
//! `shares_students(g1, g2)`, first match wins:
//!
//! | # | Condition | Result |
//! |---|-----------|--------|
//! | 1 | `g1 == g2` | shares |
//! | 2 | both have a category and the categories differ | disjoint |
//! | 3 | one is a direct child of the other | shares |
//! | 4 | both have exactly one parent, the same one | shares |
//! | 5 | a mixed (multi-parent) group vs. one of its parents, or vs. a sibling under those parents with the same or no category | shares |
//! | 6 | otherwise | disjoint |
//!
//! Rule 2 precedes every hierarchy rule: elective tracks are mutually
//! exclusive enrollments.
//!
//! `can_run_parallel(g1, g2)` is only asked when students are not shared.
//! It holds for differing categories and for distinct sections of the
//! same semester and category. Pairs declared through
//! [`OverlapMatrixBuilder::with_parallel_pair`] are added on top.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::error::DataError;
use crate::hierarchy::GroupHierarchy;

/// Relationship between two groups as recorded in the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRelation {
    /// The groups share students.
    Conflict,
    /// The groups are confirmed disjoint and may share a slot.
    Parallel,
    /// No rule determined the relationship.
    Unknown,
}

/// Whether two groups have students in common.
///
/// Both ids must be declared in `hierarchy`; undeclared ids have no
/// links and no category, so only rule 1 can match them.
pub fn shares_students(hierarchy: &GroupHierarchy, g1: &str, g2: &str) -> bool {
    if g1 == g2 {
        return true;
    }

    let cat1 = hierarchy.category_of(g1);
    let cat2 = hierarchy.category_of(g2);
    if let (Some(c1), Some(c2)) = (cat1, cat2) {
        if c1 != c2 {
            return false;
        }
    }

    let empty = BTreeSet::new();
    let children1 = hierarchy.children_of(g1).unwrap_or(&empty);
    let children2 = hierarchy.children_of(g2).unwrap_or(&empty);
    if children1.contains(g2) || children2.contains(g1) {
        return true;
    }

    let parents1 = hierarchy.parents_of(g1).unwrap_or(&empty);
    let parents2 = hierarchy.parents_of(g2).unwrap_or(&empty);
    if parents1.len() == 1 && parents1 == parents2 {
        return true;
    }

    mixed_overlaps(hierarchy, g1, parents1, g2) || mixed_overlaps(hierarchy, g2, parents2, g1)
}

/// Rule 5 from the side of `mixed`, a group with `mixed_parents`.
fn mixed_overlaps(
    hierarchy: &GroupHierarchy,
    mixed: &str,
    mixed_parents: &BTreeSet<String>,
    other: &str,
) -> bool {
    if mixed_parents.len() <= 1 {
        return false;
    }
    if mixed_parents.contains(other) {
        return true;
    }

    let other_category = hierarchy.category_of(other);
    let compatible = other_category.is_none() || other_category == hierarchy.category_of(mixed);
    compatible
        && mixed_parents.iter().any(|parent| {
            hierarchy
                .children_of(parent)
                .is_some_and(|siblings| siblings.contains(other))
        })
}

/// Whether two groups that do not share students are confirmed parallel-safe
/// by the structural rules (declared pairs are handled by the builder).
pub fn can_run_parallel(hierarchy: &GroupHierarchy, g1: &str, g2: &str) -> bool {
    let (Ok(a), Ok(b)) = (hierarchy.group(g1), hierarchy.group(g2)) else {
        return false;
    };

    match (&a.category, &b.category) {
        (Some(c1), Some(c2)) if c1 != c2 => return true,
        _ => {}
    }

    match (&a.section, &b.section) {
        (Some(s1), Some(s2)) => s1 != s2 && a.semester == b.semester && a.category == b.category,
        _ => false,
    }
}

/// Immutable overlap matrix over every declared group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapMatrix {
    cannot_overlap_with: BTreeMap<String, BTreeSet<String>>,
    can_run_parallel_with: BTreeMap<String, BTreeSet<String>>,
}

impl OverlapMatrix {
    /// Builds the matrix using only the structural rules.
    pub fn build(hierarchy: &GroupHierarchy) -> Self {
        OverlapMatrixBuilder::new(hierarchy).build_unchecked()
    }

    /// Groups that cannot overlap with `group_id` (including itself).
    pub fn conflicts(&self, group_id: &str) -> Result<&BTreeSet<String>, DataError> {
        self.cannot_overlap_with
            .get(group_id)
            .ok_or_else(|| DataError::UnknownGroup(group_id.to_string()))
    }

    /// Groups confirmed parallel-safe with `group_id`.
    pub fn parallel(&self, group_id: &str) -> Result<&BTreeSet<String>, DataError> {
        self.can_run_parallel_with
            .get(group_id)
            .ok_or_else(|| DataError::UnknownGroup(group_id.to_string()))
    }

    /// Recorded relationship between two groups.
    pub fn relation(&self, g1: &str, g2: &str) -> Result<GroupRelation, DataError> {
        let conflicts = self.conflicts(g1)?;
        let parallel = self.parallel(g1)?;
        if !self.contains(g2) {
            return Err(DataError::UnknownGroup(g2.to_string()));
        }

        Ok(if conflicts.contains(g2) {
            GroupRelation::Conflict
        } else if parallel.contains(g2) {
            GroupRelation::Parallel
        } else {
            GroupRelation::Unknown
        })
    }

    /// Whether two groups may be placed in the same slot.
    ///
    /// Only an explicit `Parallel` relation permits it; `Unknown` is
    /// treated as a conflict.
    pub fn may_share_slot(&self, g1: &str, g2: &str) -> Result<bool, DataError> {
        Ok(self.relation(g1, g2)? == GroupRelation::Parallel)
    }

    /// Whether `group_id` is a key of the matrix.
    pub fn contains(&self, group_id: &str) -> bool {
        self.cannot_overlap_with.contains_key(group_id)
    }

    /// All group ids, sorted.
    pub fn group_ids(&self) -> impl Iterator<Item = &str> {
        self.cannot_overlap_with.keys().map(String::as_str)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.cannot_overlap_with.len()
    }

    /// Whether the matrix has no groups.
    pub fn is_empty(&self) -> bool {
        self.cannot_overlap_with.is_empty()
    }

    /// Parses a matrix persisted by [`OverlapMatrix::to_json_pretty`].
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        serde_json::from_str(json).map_err(|source| DataError::Json {
            context: "overlap matrix".into(),
            source,
        })
    }

    /// Serializes with sorted keys and sorted member lists.
    pub fn to_json_pretty(&self) -> Result<String, DataError> {
        serde_json::to_string_pretty(self).map_err(|source| DataError::Json {
            context: "overlap matrix".into(),
            source,
        })
    }
}

/// Builder for [`OverlapMatrix`] with optional declared parallel pairs.
#[derive(Debug, Clone)]
pub struct OverlapMatrixBuilder<'a> {
    hierarchy: &'a GroupHierarchy,
    parallel_pairs: BTreeSet<(String, String)>,
}

impl<'a> OverlapMatrixBuilder<'a> {
    /// Creates a builder over a hierarchy.
    pub fn new(hierarchy: &'a GroupHierarchy) -> Self {
        Self {
            hierarchy,
            parallel_pairs: BTreeSet::new(),
        }
    }

    /// Declares a pair as parallel-safe.
    ///
    /// A declaration never overrides a shared-students result.
    pub fn with_parallel_pair(mut self, g1: impl Into<String>, g2: impl Into<String>) -> Self {
        self.parallel_pairs.insert(sorted_pair(g1.into(), g2.into()));
        self
    }

    /// Builds the matrix.
    ///
    /// # Errors
    /// `DataError::UnknownParallelPair` if a declared pair names an
    /// undeclared group.
    pub fn build(self) -> Result<OverlapMatrix, DataError> {
        for (first, second) in &self.parallel_pairs {
            if !self.hierarchy.contains(first) || !self.hierarchy.contains(second) {
                return Err(DataError::UnknownParallelPair {
                    first: first.clone(),
                    second: second.clone(),
                });
            }
        }
        Ok(self.build_unchecked())
    }

    fn build_unchecked(self) -> OverlapMatrix {
        let ids: Vec<&str> = self.hierarchy.ids().collect();

        let mut cannot_overlap_with: BTreeMap<String, BTreeSet<String>> = ids
            .iter()
            .map(|id| (id.to_string(), BTreeSet::new()))
            .collect();
        let mut can_run_parallel_with = cannot_overlap_with.clone();

        // Both predicates are symmetric: evaluate each unordered pair once.
        for (i, &g1) in ids.iter().enumerate() {
            for &g2 in &ids[i..] {
                let target = if shares_students(self.hierarchy, g1, g2) {
                    &mut cannot_overlap_with
                } else if self.is_parallel(g1, g2) {
                    &mut can_run_parallel_with
                } else {
                    continue;
                };
                insert_symmetric(target, g1, g2);
            }
        }

        let conflict_links: usize = cannot_overlap_with.values().map(BTreeSet::len).sum();
        let parallel_links: usize = can_run_parallel_with.values().map(BTreeSet::len).sum();
        info!(
            groups = ids.len(),
            conflict_links,
            parallel_links,
            declared_pairs = self.parallel_pairs.len(),
            "Built overlap matrix"
        );

        OverlapMatrix {
            cannot_overlap_with,
            can_run_parallel_with,
        }
    }

    fn is_parallel(&self, g1: &str, g2: &str) -> bool {
        if can_run_parallel(self.hierarchy, g1, g2) {
            return true;
        }
        let declared = self
            .parallel_pairs
            .contains(&sorted_pair(g1.to_string(), g2.to_string()));
        if declared {
            debug!(g1, g2, "Parallel by declaration");
        }
        declared
    }
}

fn sorted_pair(a: String, b: String) -> (String, String) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn insert_symmetric(map: &mut BTreeMap<String, BTreeSet<String>>, g1: &str, g2: &str) {
    if let Some(set) = map.get_mut(g1) {
        set.insert(g2.to_string());
    }
    if let Some(set) = map.get_mut(g2) {
        set.insert(g1.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HierarchyLinks, StudentGroup};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn child_of(owner: &str, parents: &[&str]) -> (String, HierarchyLinks) {
        let links = if parents.len() == 1 {
            HierarchyLinks {
                parent: Some(parents[0].to_string()),
                ..Default::default()
            }
        } else {
            HierarchyLinks {
                parents: parents.iter().map(|p| p.to_string()).collect(),
                ..Default::default()
            }
        };
        (owner.to_string(), links)
    }

    /// Two semester-3 sections, per-section AD electives, a mixed SS
    /// cohort drawn from both sections, and two semester-1 sections.
    fn sample_hierarchy() -> GroupHierarchy {
        GroupHierarchy::new(
            vec![
                StudentGroup::new("MCA_SEM3_A", 3).with_section("A").with_headcount(60),
                StudentGroup::new("MCA_SEM3_B", 3).with_section("B").with_headcount(60),
                StudentGroup::new("ELEC_AD_A1", 3).with_section("A").with_category("AD"),
                StudentGroup::new("ELEC_AD_A2", 3).with_section("A").with_category("AD"),
                StudentGroup::new("ELEC_AD_B1", 3).with_section("B").with_category("AD"),
                StudentGroup::new("ELEC_SS_G1", 3).with_category("SS"),
                StudentGroup::new("LAB_A1", 3).with_section("A"),
                StudentGroup::new("MCA_SEM1_A", 1).with_section("A"),
                StudentGroup::new("MCA_SEM1_B", 1).with_section("B"),
            ],
            vec![
                child_of("ELEC_AD_A1", &["MCA_SEM3_A"]),
                child_of("ELEC_AD_A2", &["MCA_SEM3_A"]),
                child_of("ELEC_AD_B1", &["MCA_SEM3_B"]),
                child_of("LAB_A1", &["MCA_SEM3_A"]),
                child_of("ELEC_SS_G1", &["MCA_SEM3_A", "MCA_SEM3_B"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_identity_conflicts() {
        let h = sample_hierarchy();
        assert!(shares_students(&h, "MCA_SEM3_A", "MCA_SEM3_A"));
    }

    #[test]
    fn test_parent_child_conflict() {
        let m = OverlapMatrix::build(&sample_hierarchy());
        assert_eq!(m.relation("MCA_SEM3_A", "ELEC_AD_A1").unwrap(), GroupRelation::Conflict);
        assert_eq!(m.relation("ELEC_AD_B1", "MCA_SEM3_B").unwrap(), GroupRelation::Conflict);
    }

    #[test]
    fn test_shared_single_parent_conflict() {
        let m = OverlapMatrix::build(&sample_hierarchy());
        assert_eq!(m.relation("ELEC_AD_A1", "ELEC_AD_A2").unwrap(), GroupRelation::Conflict);
        assert_eq!(m.relation("ELEC_AD_A1", "LAB_A1").unwrap(), GroupRelation::Conflict);
    }

    #[test]
    fn test_mixed_group_rules() {
        let m = OverlapMatrix::build(&sample_hierarchy());
        // parents of the mixed group
        assert_eq!(m.relation("ELEC_SS_G1", "MCA_SEM3_A").unwrap(), GroupRelation::Conflict);
        assert_eq!(m.relation("ELEC_SS_G1", "MCA_SEM3_B").unwrap(), GroupRelation::Conflict);
        // uncategorised sibling
        assert_eq!(m.relation("ELEC_SS_G1", "LAB_A1").unwrap(), GroupRelation::Conflict);
        // sibling in another track is disjoint and parallel-safe
        assert_eq!(m.relation("ELEC_SS_G1", "ELEC_AD_A1").unwrap(), GroupRelation::Parallel);
    }

    #[test]
    fn test_mixed_sibling_needs_matching_category() {
        // mixed group with no category vs. categorised sibling: no rule applies
        let h = GroupHierarchy::new(
            vec![
                StudentGroup::new("P1", 3).with_section("A"),
                StudentGroup::new("P2", 3).with_section("B"),
                StudentGroup::new("MIX", 3),
                StudentGroup::new("ELEC_AD_A1", 3).with_category("AD"),
                StudentGroup::new("ELEC_AD_B1", 3).with_category("AD"),
                StudentGroup::new("MIX_AD", 3).with_category("AD"),
            ],
            vec![
                child_of("MIX", &["P1", "P2"]),
                child_of("MIX_AD", &["P1", "P2"]),
                child_of("ELEC_AD_A1", &["P1"]),
                child_of("ELEC_AD_B1", &["P2"]),
            ],
        )
        .unwrap();

        assert!(!shares_students(&h, "MIX", "ELEC_AD_A1"));
        assert!(!shares_students(&h, "ELEC_AD_B1", "MIX"));
        assert!(shares_students(&h, "MIX_AD", "ELEC_AD_A1"));
        assert!(shares_students(&h, "ELEC_AD_B1", "MIX_AD"));
    }

    #[test]
    fn test_parallel_sections() {
        let m = OverlapMatrix::build(&sample_hierarchy());
        assert_eq!(m.relation("MCA_SEM3_A", "MCA_SEM3_B").unwrap(), GroupRelation::Parallel);
        assert_eq!(m.relation("MCA_SEM1_B", "MCA_SEM1_A").unwrap(), GroupRelation::Parallel);
        assert_eq!(m.relation("ELEC_AD_A1", "ELEC_AD_B1").unwrap(), GroupRelation::Parallel);
        assert!(m.may_share_slot("ELEC_AD_A1", "ELEC_AD_B1").unwrap());
    }

    #[test]
    fn test_unknown_relation_is_not_safe() {
        let m = OverlapMatrix::build(&sample_hierarchy());
        // regular section vs. an elective cohort of the other section
        assert_eq!(m.relation("MCA_SEM3_A", "ELEC_AD_B1").unwrap(), GroupRelation::Unknown);
        assert!(!m.may_share_slot("MCA_SEM3_A", "ELEC_AD_B1").unwrap());
        // same section label across semesters
        assert_eq!(m.relation("MCA_SEM1_A", "MCA_SEM3_A").unwrap(), GroupRelation::Unknown);
    }

    #[test]
    fn test_disjointness_precedes_hierarchy() {
        // an AD cohort declared as a child of an SS cohort
        let h = GroupHierarchy::new(
            vec![
                StudentGroup::new("SEC", 3).with_section("A"),
                StudentGroup::new("ELEC_SS_X", 3).with_category("SS"),
                StudentGroup::new("ELEC_AD_Y", 3).with_category("AD"),
            ],
            vec![
                child_of("ELEC_SS_X", &["SEC"]),
                child_of("ELEC_AD_Y", &["ELEC_SS_X"]),
            ],
        )
        .unwrap();
        let m = OverlapMatrix::build(&h);

        assert!(!m.conflicts("ELEC_SS_X").unwrap().contains("ELEC_AD_Y"));
        assert!(!m.conflicts("ELEC_AD_Y").unwrap().contains("ELEC_SS_X"));
        assert!(m.parallel("ELEC_AD_Y").unwrap().contains("ELEC_SS_X"));
    }

    #[test]
    fn test_every_group_is_a_key() {
        let h = GroupHierarchy::new(vec![StudentGroup::new("LONE", 1)], vec![]).unwrap();
        let m = OverlapMatrix::build(&h);

        assert_eq!(m.len(), 1);
        assert_eq!(m.conflicts("LONE").unwrap().len(), 1);
        assert!(m.parallel("LONE").unwrap().is_empty());
    }

    #[test]
    fn test_declared_parallel_pair() {
        let h = sample_hierarchy();
        let m = OverlapMatrixBuilder::new(&h)
            .with_parallel_pair("MCA_SEM3_A", "MCA_SEM1_A")
            // cannot override a shared-students result
            .with_parallel_pair("MCA_SEM3_A", "ELEC_AD_A1")
            .build()
            .unwrap();

        assert_eq!(m.relation("MCA_SEM1_A", "MCA_SEM3_A").unwrap(), GroupRelation::Parallel);
        assert_eq!(m.relation("MCA_SEM3_A", "ELEC_AD_A1").unwrap(), GroupRelation::Conflict);
    }

    #[test]
    fn test_declared_pair_unknown_group() {
        let h = sample_hierarchy();
        let err = OverlapMatrixBuilder::new(&h)
            .with_parallel_pair("MCA_SEM3_A", "GHOST")
            .build()
            .unwrap_err();
        assert!(matches!(err, DataError::UnknownParallelPair { .. }));
    }

    #[test]
    fn test_unknown_group_query_is_caller_error() {
        let m = OverlapMatrix::build(&sample_hierarchy());
        assert!(matches!(m.conflicts("GHOST"), Err(DataError::UnknownGroup(_))));
        assert!(m.relation("MCA_SEM3_A", "GHOST").is_err());
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let h = sample_hierarchy();
        let first = OverlapMatrix::build(&h).to_json_pretty().unwrap();
        let second = OverlapMatrix::build(&h).to_json_pretty().unwrap();
        assert_eq!(first, second);

        let parsed = OverlapMatrix::from_json_str(&first).unwrap();
        assert_eq!(parsed, OverlapMatrix::build(&h));
        assert!(first.contains("\"cannotOverlapWith\""));
        assert!(first.contains("\"canRunParallelWith\""));
    }

    fn random_hierarchy(rng: &mut StdRng, n: usize) -> GroupHierarchy {
        let categories = [None, Some("AD"), Some("SS")];
        let sections = [None, Some("A"), Some("B")];

        let mut groups = Vec::new();
        let mut links = Vec::new();
        for i in 0..n {
            let mut g = StudentGroup::new(format!("G{i:02}"), rng.random_range(1..=2));
            if let Some(s) = sections[rng.random_range(0..sections.len())] {
                g = g.with_section(s);
            }
            if let Some(c) = categories[rng.random_range(0..categories.len())] {
                g = g.with_category(c);
            }
            groups.push(g);

            // parents only among earlier groups keeps the relation acyclic
            if i > 0 {
                let parent_count = rng.random_range(0..=2.min(i));
                let parents: BTreeSet<String> = (0..parent_count)
                    .map(|_| format!("G{:02}", rng.random_range(0..i)))
                    .collect();
                if !parents.is_empty() {
                    links.push((
                        format!("G{i:02}"),
                        HierarchyLinks {
                            parents: parents.into_iter().collect(),
                            ..Default::default()
                        },
                    ));
                }
            }
        }
        GroupHierarchy::new(groups, links).unwrap()
    }

    #[test]
    fn test_random_hierarchies_reflexive_symmetric_exclusive() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..25 {
            let h = random_hierarchy(&mut rng, 12);
            let m = OverlapMatrix::build(&h);
            let ids: Vec<&str> = h.ids().collect();

            for &g1 in &ids {
                assert!(m.conflicts(g1).unwrap().contains(g1), "{g1} not reflexive");
                for &g2 in &ids {
                    let c12 = m.conflicts(g1).unwrap().contains(g2);
                    let c21 = m.conflicts(g2).unwrap().contains(g1);
                    let p12 = m.parallel(g1).unwrap().contains(g2);
                    let p21 = m.parallel(g2).unwrap().contains(g1);
                    assert_eq!(c12, c21, "conflict asymmetric for {g1}/{g2}");
                    assert_eq!(p12, p21, "parallel asymmetric for {g1}/{g2}");
                    assert!(!(c12 && p12), "{g1}/{g2} both conflict and parallel");

                    let cat1 = h.elective_category(g1).unwrap();
                    let cat2 = h.elective_category(g2).unwrap();
                    if let (Some(a), Some(b)) = (cat1, cat2) {
                        if a != b {
                            assert!(!c12 && p12, "{g1}/{g2} differing tracks must be parallel");
                        }
                    }
                }
            }
        }
    }
}
