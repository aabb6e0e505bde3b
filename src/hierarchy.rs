//! Group hierarchy model.
//!
//! A read-only, queryable view over student groups and their parent/child
//! links. The relation is a DAG (in practice section → elective cohort →
//! mixed cohort) but no fixed depth is assumed.
//!
//! Links may be declared on either end of an edge; construction mirrors
//! them so `children(p)` contains `c` exactly when `parents(c)` contains `p`.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::DataError;
use crate::models::{ElectiveCategory, GroupDocument, HierarchyLinks, StudentGroup};
use crate::validation::validate_groups;

/// Immutable group hierarchy.
#[derive(Debug, Clone)]
pub struct GroupHierarchy {
    groups: BTreeMap<String, StudentGroup>,
    parents: BTreeMap<String, BTreeSet<String>>,
    children: BTreeMap<String, BTreeSet<String>>,
}

impl GroupHierarchy {
    /// Builds the hierarchy from group entities and declared links.
    ///
    /// # Errors
    /// `DataError::Validation` if ids are duplicated, a link references an
    /// undeclared group, or the links contain a cycle.
    pub fn new(
        groups: Vec<StudentGroup>,
        links: Vec<(String, HierarchyLinks)>,
    ) -> Result<Self, DataError> {
        validate_groups(&groups, &links).map_err(DataError::Validation)?;

        let mut parents: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut children: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for g in &groups {
            parents.insert(g.id.clone(), BTreeSet::new());
            children.insert(g.id.clone(), BTreeSet::new());
        }

        // Validation guarantees every id below is a declared key.
        for (owner, link) in &links {
            for parent in link.all_parents() {
                add_edge(&mut parents, &mut children, parent, owner);
            }
            for child in &link.children {
                add_edge(&mut parents, &mut children, owner, child);
            }
        }

        let groups: BTreeMap<String, StudentGroup> =
            groups.into_iter().map(|g| (g.id.clone(), g)).collect();

        debug!(
            groups = groups.len(),
            mixed = parents.values().filter(|p| p.len() > 1).count(),
            "Built group hierarchy"
        );

        Ok(Self {
            groups,
            parents,
            children,
        })
    }

    /// Builds the hierarchy from a parsed group document.
    pub fn from_document(doc: GroupDocument, infer_categories: bool) -> Result<Self, DataError> {
        let (groups, links) = doc.into_parts(infer_categories);
        Self::new(groups, links)
    }

    /// Children of a group.
    pub fn children(&self, group_id: &str) -> Result<&BTreeSet<String>, DataError> {
        self.children
            .get(group_id)
            .ok_or_else(|| DataError::UnknownGroup(group_id.to_string()))
    }

    /// Parents of a group: none, one, or several (mixed cohorts).
    pub fn parents(&self, group_id: &str) -> Result<&BTreeSet<String>, DataError> {
        self.parents
            .get(group_id)
            .ok_or_else(|| DataError::UnknownGroup(group_id.to_string()))
    }

    /// Elective category of a group, `None` for regular groups.
    pub fn elective_category(
        &self,
        group_id: &str,
    ) -> Result<Option<&ElectiveCategory>, DataError> {
        self.group(group_id).map(|g| g.category.as_ref())
    }

    /// Looks up a group.
    pub fn group(&self, group_id: &str) -> Result<&StudentGroup, DataError> {
        self.groups
            .get(group_id)
            .ok_or_else(|| DataError::UnknownGroup(group_id.to_string()))
    }

    /// Whether a group id is declared.
    pub fn contains(&self, group_id: &str) -> bool {
        self.groups.contains_key(group_id)
    }

    /// All groups, ordered by id.
    pub fn groups(&self) -> impl Iterator<Item = &StudentGroup> {
        self.groups.values()
    }

    /// All group ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the hierarchy has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    // Infallible lookups for ids already known to be declared.

    pub(crate) fn children_of(&self, group_id: &str) -> Option<&BTreeSet<String>> {
        self.children.get(group_id)
    }

    pub(crate) fn parents_of(&self, group_id: &str) -> Option<&BTreeSet<String>> {
        self.parents.get(group_id)
    }

    pub(crate) fn category_of(&self, group_id: &str) -> Option<&ElectiveCategory> {
        self.groups.get(group_id).and_then(|g| g.category.as_ref())
    }
}

fn add_edge(
    parents: &mut BTreeMap<String, BTreeSet<String>>,
    children: &mut BTreeMap<String, BTreeSet<String>>,
    parent: &str,
    child: &str,
) {
    if let Some(set) = parents.get_mut(child) {
        set.insert(parent.to_string());
    }
    if let Some(set) = children.get_mut(parent) {
        set.insert(child.to_string());
    }
}
