// Boundary to the photo-hosting service. The orchestrator and the
// hierarchy cache only talk to a `PhotoService`; `api::ZenfolioClient`
// is the real implementation and tests use an in-memory one.

use crate::error::Result;
use crate::session::Credential;
use std::path::Path;

/// What a Group element is. Anything the service adds later lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Group,
    PhotoSet,
    Other,
}

/// One direct child of a Group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupElement {
    pub kind: ElementKind,
    pub id: i64,
    pub title: String,
}

/// A Group and its direct children, in service order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupContents {
    pub id: i64,
    pub title: String,
    pub elements: Vec<GroupElement>,
}

impl GroupContents {
    pub fn photo_sets(&self) -> impl Iterator<Item = &GroupElement> {
        self.elements.iter().filter(|e| e.kind == ElementKind::PhotoSet)
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupElement> {
        self.elements.iter().filter(|e| e.kind == ElementKind::Group)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhotoSet {
    pub id: i64,
    pub title: String,
    pub custom_reference: Option<String>,
    pub page_url: Option<String>,
    /// Present once the set was loaded or created with full detail.
    pub upload_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: i64,
    pub file_name: String,
}

/// Blocking operations against the remote album hierarchy. Nothing here
/// retries; a failed call is reported as-is.
pub trait PhotoService {
    /// Any failure, whatever its cause, is `UploaderError::AuthFailure`.
    fn authenticate(&mut self, credential: &Credential) -> Result<()>;

    /// Id of the account's top-level group.
    fn load_root_group_id(&self) -> Result<i64>;

    fn load_group(&self, group_id: i64) -> Result<GroupContents>;

    fn create_group(&self, parent_id: i64, title: &str) -> Result<GroupElement>;

    fn create_photo_set(
        &self,
        group_id: i64,
        title: &str,
        custom_reference: &str,
    ) -> Result<PhotoSet>;

    /// Resolve a PhotoSet element found in a Group listing.
    fn load_photo_set(&self, photo_set_id: i64) -> Result<PhotoSet>;

    fn list_photos(&self, photo_set: &PhotoSet) -> Result<Vec<Photo>>;

    fn delete_photo(&self, photo_id: i64) -> Result<()>;

    fn upload_photo(&self, photo_set: &PhotoSet, path: &Path) -> Result<()>;
}
