// In-memory view of the account's album hierarchy, one level deep.
//
// The snapshot is flat: the root Group plus every Group directly under
// it, each with the titles of the PhotoSets it directly contains.
// Groups nested further down are not represented.

use crate::error::Result;
use crate::remote::PhotoService;
use tracing::debug;

/// Title given to the account's top-level Group.
pub const ROOT_GROUP_TITLE: &str = "RootGroup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub title: String,
    pub id: i64,
    pub photo_sets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchySnapshot {
    groups: Vec<GroupEntry>,
}

impl HierarchySnapshot {
    /// Start a snapshot from the root Group's entry.
    pub fn new(root: GroupEntry) -> Self {
        HierarchySnapshot { groups: vec![root] }
    }

    pub fn root(&self) -> &GroupEntry {
        &self.groups[0]
    }

    pub fn root_id(&self) -> i64 {
        self.root().id
    }

    pub fn groups(&self) -> &[GroupEntry] {
        &self.groups
    }

    pub fn group_titles(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.title.clone()).collect()
    }

    /// First Group whose title matches exactly.
    pub fn find(&self, title: &str) -> Option<&GroupEntry> {
        self.groups.iter().find(|g| g.title == title)
    }

    pub fn photo_sets(&self, group_title: &str) -> &[String] {
        self.find(group_title)
            .map(|g| g.photo_sets.as_slice())
            .unwrap_or(&[])
    }

    /// Add a Group created after the snapshot was built.
    pub fn record_group(&mut self, title: &str, id: i64) {
        if self.groups.iter().any(|g| g.id == id) {
            return;
        }
        self.groups.push(GroupEntry {
            title: title.to_string(),
            id,
            photo_sets: Vec::new(),
        });
    }

    /// Add a PhotoSet created after the snapshot was built.
    pub fn record_photo_set(&mut self, group_id: i64, title: &str) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.id == group_id) {
            if !group.photo_sets.iter().any(|t| t == title) {
                group.photo_sets.push(title.to_string());
            }
        }
    }
}

/// Load the root Group and each Group directly under it.
pub fn build_hierarchy<S: PhotoService + ?Sized>(service: &S) -> Result<HierarchySnapshot> {
    let root_id = service.load_root_group_id()?;
    let root = service.load_group(root_id)?;

    let mut snapshot = HierarchySnapshot::new(GroupEntry {
        title: ROOT_GROUP_TITLE.to_string(),
        id: root.id,
        photo_sets: root.photo_sets().map(|p| p.title.clone()).collect(),
    });

    for child in root.groups() {
        let group = service.load_group(child.id)?;
        snapshot.groups.push(GroupEntry {
            title: child.title.clone(),
            id: child.id,
            photo_sets: group.photo_sets().map(|p| p.title.clone()).collect(),
        });
    }

    debug!(groups = snapshot.groups.len(), "hierarchy loaded");
    Ok(snapshot)
}
