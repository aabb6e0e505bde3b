//! Student group model.
//!
//! A student group is a cohort sharing a timetable: a regular section
//! (e.g. semester 3, section A), an elective cohort within a section, or a
//! mixed elective cohort drawn from several sections.
//!
//! Section and elective category are first-class attributes. They are not
//! derived from the group id unless a document load explicitly opts into
//! [`ElectiveCategory::infer_from_id`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Elective track tag.
///
/// Tracks partition elective offerings into mutually exclusive choices:
/// a student enrolled in one track never appears in another.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElectiveCategory(String);

impl ElectiveCategory {
    /// Creates a category tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Legacy id-based inference: `ELEC_AD_A1` → `AD`.
    ///
    /// Looks for an `ELEC_` token and takes the segment that follows it up
    /// to the next underscore. Ids without that token yield `None`, which
    /// callers treat as "no category".
    pub fn infer_from_id(group_id: &str) -> Option<Self> {
        let start = group_id.find("ELEC_")? + "ELEC_".len();
        let rest = &group_id[start..];
        let tag = rest.split('_').next().unwrap_or_default();
        if tag.is_empty() {
            None
        } else {
            Some(Self::new(tag))
        }
    }
}

impl fmt::Display for ElectiveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cohort of students scheduled together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGroup {
    /// Unique group identifier.
    #[serde(rename = "studentGroupId")]
    pub id: String,
    /// Semester the cohort belongs to.
    pub semester: u32,
    /// Section label. `None` for mixed/elective cohorts spanning sections.
    pub section: Option<String>,
    /// Elective track. `None` for regular (non-elective) groups.
    pub category: Option<ElectiveCategory>,
    /// Number of enrolled students.
    #[serde(rename = "studentCount")]
    pub headcount: u32,
}

impl StudentGroup {
    /// Creates a group with no section, no category, and zero headcount.
    pub fn new(id: impl Into<String>, semester: u32) -> Self {
        Self {
            id: id.into(),
            semester,
            section: None,
            category: None,
            headcount: 0,
        }
    }

    /// Sets the section label.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Sets the elective category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(ElectiveCategory::new(category));
        self
    }

    /// Sets the headcount.
    pub fn with_headcount(mut self, headcount: u32) -> Self {
        self.headcount = headcount;
        self
    }

    /// Whether this group carries an elective category.
    pub fn is_elective(&self) -> bool {
        self.category.is_some()
    }
}

/// Declared hierarchy links for one group.
///
/// Either side of a parent/child edge may declare it; the hierarchy model
/// mirrors every edge so both directions agree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyLinks {
    /// Single parent (most groups).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Multiple parents (mixed elective groups).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    /// Child groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl HierarchyLinks {
    /// All declared parents, single and multiple forms combined.
    pub fn all_parents(&self) -> impl Iterator<Item = &String> {
        self.parent.iter().chain(self.parents.iter())
    }

    /// Whether no link is declared.
    pub fn is_empty(&self) -> bool {
        self.parent.is_none() && self.parents.is_empty() && self.children.is_empty()
    }
}

/// A group record as produced by the upstream group stage.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub student_group_id: String,
    pub semester: u32,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default, alias = "electiveCategory")]
    pub category: Option<ElectiveCategory>,
    #[serde(default, alias = "headcount")]
    pub student_count: u32,
    #[serde(flatten)]
    pub links: HierarchyLinks,
}

/// The group document: regular groups, elective groups, and an optional
/// hierarchy map keyed by group id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDocument {
    #[serde(default)]
    pub student_groups: Vec<GroupRecord>,
    #[serde(default)]
    pub elective_student_groups: Vec<GroupRecord>,
    #[serde(default)]
    pub group_hierarchy: BTreeMap<String, HierarchyLinks>,
}

impl GroupDocument {
    /// Splits the document into group entities and hierarchy links.
    ///
    /// With `infer_categories`, a record without an explicit category gets
    /// one from [`ElectiveCategory::infer_from_id`].
    pub fn into_parts(
        self,
        infer_categories: bool,
    ) -> (Vec<StudentGroup>, Vec<(String, HierarchyLinks)>) {
        let mut groups = Vec::new();
        let mut links = Vec::new();

        for record in self
            .student_groups
            .into_iter()
            .chain(self.elective_student_groups)
        {
            let category = match record.category {
                Some(c) => Some(c),
                None if infer_categories => {
                    ElectiveCategory::infer_from_id(&record.student_group_id)
                }
                None => None,
            };
            if !record.links.is_empty() {
                links.push((record.student_group_id.clone(), record.links));
            }
            groups.push(StudentGroup {
                id: record.student_group_id,
                semester: record.semester,
                section: record.section,
                category,
                headcount: record.student_count,
            });
        }

        links.extend(self.group_hierarchy);
        (groups, links)
    }
}
