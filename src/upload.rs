// Upload orchestration.
//
// Resolves the destination Group and PhotoSet (creating either when
// missing) and uploads every supported file of a directory into it,
// replacing remote photos that carry the same file name. The whole run
// is sequential and stops at the first failed remote call; files sent
// before the failure stay uploaded.

use crate::error::{Result, UploaderError};
use crate::files::list_supported_files;
use crate::hierarchy::HierarchySnapshot;
use crate::remote::{PhotoService, PhotoSet};
use std::path::Path;
use tracing::{info, warn};

/// Progress notifications, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    FilesFound { total: usize },
    GroupCreated { title: String },
    PhotoSetFound { title: String },
    PhotoSetCreated { title: String },
    Replacing { file_name: String },
    Uploading { file_name: String },
    Uploaded { file_name: String, uploaded: usize, total: usize },
}

pub trait UploadObserver {
    fn notify(&mut self, event: UploadEvent);
}

impl<F: FnMut(UploadEvent)> UploadObserver for F {
    fn notify(&mut self, event: UploadEvent) {
        self(event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub group_title: String,
    pub photo_set_title: String,
    /// Public page of the PhotoSet, when the service reported one.
    pub destination_url: Option<String>,
    pub uploaded: usize,
    pub total: usize,
    pub group_created: bool,
    pub photo_set_created: bool,
}

/// Upload every supported file in `directory` to `photo_set_title` inside
/// `group_title`.
///
/// Groups are looked up in `snapshot`; a Group created here is added to it,
/// as is the PhotoSet, so selection lists stay current without a new login.
pub fn resolve_and_upload<S: PhotoService + ?Sized>(
    service: &S,
    snapshot: &mut HierarchySnapshot,
    group_title: &str,
    photo_set_title: &str,
    directory: &Path,
    observer: &mut dyn UploadObserver,
) -> Result<UploadResult> {
    if group_title.trim().is_empty() {
        return Err(UploaderError::InvalidTarget("group title is empty".into()));
    }
    if photo_set_title.trim().is_empty() {
        return Err(UploaderError::InvalidTarget("photo set title is empty".into()));
    }

    let files = list_supported_files(directory);
    if files.is_empty() {
        return Err(UploaderError::NoFilesFound {
            directory: directory.to_path_buf(),
        });
    }
    let total = files.len();
    observer.notify(UploadEvent::FilesFound { total });

    let (group_id, group_created) = match snapshot.find(group_title).map(|g| g.id) {
        Some(id) => (id, false),
        None => {
            let group = service.create_group(snapshot.root_id(), group_title)?;
            info!(group = group_title, id = group.id, "group created");
            snapshot.record_group(group_title, group.id);
            observer.notify(UploadEvent::GroupCreated {
                title: group_title.to_string(),
            });
            (group.id, true)
        }
    };

    let (photo_set, photo_set_created) = resolve_photo_set(service, group_id, photo_set_title)?;
    snapshot.record_photo_set(group_id, photo_set_title);
    observer.notify(if photo_set_created {
        UploadEvent::PhotoSetCreated {
            title: photo_set_title.to_string(),
        }
    } else {
        UploadEvent::PhotoSetFound {
            title: photo_set_title.to_string(),
        }
    });

    let mut uploaded = 0;
    for path in &files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // Listed again for every file; the set changes as we go.
        let existing = service.list_photos(&photo_set)?;
        for photo in existing.iter().filter(|p| p.file_name == file_name) {
            warn!(file = %file_name, photo_id = photo.id, "replacing existing photo");
            observer.notify(UploadEvent::Replacing {
                file_name: file_name.clone(),
            });
            service.delete_photo(photo.id)?;
        }

        observer.notify(UploadEvent::Uploading {
            file_name: file_name.clone(),
        });
        service.upload_photo(&photo_set, path)?;
        uploaded += 1;
        info!(file = %file_name, uploaded, total, "uploaded");
        observer.notify(UploadEvent::Uploaded {
            file_name,
            uploaded,
            total,
        });
    }

    Ok(UploadResult {
        group_title: group_title.to_string(),
        photo_set_title: photo_set_title.to_string(),
        destination_url: photo_set.page_url,
        uploaded,
        total,
        group_created,
        photo_set_created,
    })
}

/// Find `title` among the Group's current PhotoSets, or create it with the
/// title doubling as its custom reference.
fn resolve_photo_set<S: PhotoService + ?Sized>(
    service: &S,
    group_id: i64,
    title: &str,
) -> Result<(PhotoSet, bool)> {
    let contents = service.load_group(group_id)?;
    if let Some(element) = contents.photo_sets().find(|e| e.title == title) {
        return Ok((service.load_photo_set(element.id)?, false));
    }
    let photo_set = service.create_photo_set(group_id, title, title)?;
    info!(photo_set = title, id = photo_set.id, "photo set created");
    Ok((photo_set, true))
}
