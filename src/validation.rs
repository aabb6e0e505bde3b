//! Input validation for student group data.
//!
//! Checks structural integrity of group records and hierarchy links
//! before the hierarchy model is built. Detects:
//! - Duplicate group IDs
//! - Links to groups that were never declared
//! - Groups listed as their own parent or child
//! - Cycles in the parent → child relation (DAG validation)
//!
//! All problems are collected; validation does not stop at the first one.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use crate::models::{HierarchyLinks, StudentGroup};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two groups share the same ID.
    DuplicateId,
    /// A hierarchy link references a group that doesn't exist.
    UnknownGroupReference,
    /// A group is linked to itself.
    SelfReference,
    /// The parent → child relation contains a cycle.
    CyclicHierarchy,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates group records and their hierarchy links.
///
/// Checks:
/// 1. No duplicate group IDs
/// 2. Every link owner, parent, and child is a declared group
/// 3. No group is its own parent or child
/// 4. No cycles in the parent → child relation
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_groups(
    groups: &[StudentGroup],
    links: &[(String, HierarchyLinks)],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut group_ids = HashSet::new();
    for g in groups {
        if !group_ids.insert(g.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate group ID: {}", g.id),
            ));
        }
    }

    for (owner, link) in links {
        if !group_ids.contains(owner.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownGroupReference,
                format!("Hierarchy entry for unknown group '{owner}'"),
            ));
        }

        for parent in link.all_parents() {
            check_reference(owner, parent, "parent", &group_ids, &mut errors);
        }
        for child in &link.children {
            check_reference(owner, child, "child", &group_ids, &mut errors);
        }
    }

    if let Some(cycle_err) = detect_cycles(links) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_reference(
    owner: &str,
    target: &str,
    role: &str,
    group_ids: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    if owner == target {
        errors.push(ValidationError::new(
            ValidationErrorKind::SelfReference,
            format!("Group '{owner}' lists itself as its own {role}"),
        ));
    } else if !group_ids.contains(target) {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnknownGroupReference,
            format!("Group '{owner}' references unknown {role} '{target}'"),
        ));
    }
}

/// Detects cycles in the parent → child relation using DFS.
///
/// Edges from both declaration forms (`parent`/`parents` on the child,
/// `children` on the parent) are merged first. Self-loops are reported
/// separately as `SelfReference` and skipped here.
///
/// # Algorithm
/// Topological sort via DFS. If a back-edge is found (visiting a node
/// currently in the recursion stack), a cycle exists.
///
/// # Reference
/// Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4
fn detect_cycles(links: &[(String, HierarchyLinks)]) -> Option<ValidationError> {
    // parent → children; BTree keeps the reported node deterministic
    let mut adj: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for (owner, link) in links {
        for parent in link.all_parents() {
            if parent != owner {
                adj.entry(parent.as_str()).or_default().insert(owner.as_str());
            }
        }
        for child in &link.children {
            if child != owner {
                adj.entry(owner.as_str()).or_default().insert(child.as_str());
            }
        }
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for &node in adj.keys() {
        if !visited.contains(node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicHierarchy,
                format!("Circular group hierarchy detected involving '{node}'"),
            ));
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &BTreeMap<&'a str, BTreeSet<&'a str>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(children) = adj.get(node) {
        for &next in children {
            if in_stack.contains(next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(node);
    false
}
