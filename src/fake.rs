// In-memory `PhotoService` used by the unit tests. Keeps a tiny album
// tree, records every call and can be told to fail a given operation.

use crate::error::{Result, UploaderError};
use crate::remote::{ElementKind, GroupContents, GroupElement, Photo, PhotoService, PhotoSet};
use crate::session::Credential;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Authenticate,
    LoadRootGroupId,
    LoadGroup(i64),
    CreateGroup { parent: i64, title: String },
    CreatePhotoSet { group: i64, title: String, custom_reference: String },
    LoadPhotoSet(i64),
    ListPhotos(i64),
    DeletePhoto(i64),
    UploadPhoto { photo_set: i64, file_name: String },
}

struct Node {
    id: i64,
    parent: Option<i64>,
    kind: ElementKind,
    title: String,
    custom_reference: Option<String>,
}

struct StoredPhoto {
    id: i64,
    photo_set: i64,
    file_name: String,
}

#[derive(Default)]
struct State {
    next_id: i64,
    nodes: Vec<Node>,
    photos: Vec<StoredPhoto>,
    calls: Vec<Call>,
    counts: HashMap<&'static str, usize>,
    // operation -> failing call number (0 = every call)
    failures: HashMap<&'static str, usize>,
}

impl State {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn node(&self, id: i64, kind: ElementKind) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id && n.kind == kind)
    }
}

pub struct FakeService {
    login: String,
    password: String,
    authenticated: bool,
    root: i64,
    state: RefCell<State>,
}

impl FakeService {
    pub fn new(login: &str, password: &str) -> Self {
        let mut state = State {
            next_id: 100,
            ..State::default()
        };
        let root = state.allocate();
        state.nodes.push(Node {
            id: root,
            parent: None,
            kind: ElementKind::Group,
            title: "Root".into(),
            custom_reference: None,
        });
        FakeService {
            login: login.into(),
            password: password.into(),
            authenticated: false,
            root,
            state: RefCell::new(state),
        }
    }

    pub fn logged_in() -> Self {
        let mut service = FakeService::new("user", "pass");
        service.authenticated = true;
        service
    }

    pub fn root_id(&self) -> i64 {
        self.root
    }

    pub fn add_group(&mut self, parent: i64, title: &str) -> i64 {
        self.insert(parent, ElementKind::Group, title, None)
    }

    pub fn add_photo_set(&mut self, group: i64, title: &str) -> i64 {
        self.insert(group, ElementKind::PhotoSet, title, Some(title.to_string()))
    }

    pub fn add_photo(&mut self, photo_set: i64, file_name: &str) -> i64 {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.photos.push(StoredPhoto {
            id,
            photo_set,
            file_name: file_name.into(),
        });
        id
    }

    pub fn group_id(&self, title: &str) -> Option<i64> {
        self.find(None, ElementKind::Group, title)
    }

    pub fn photo_set_id(&self, group: i64, title: &str) -> Option<i64> {
        self.find(Some(group), ElementKind::PhotoSet, title)
    }

    pub fn photo_set_reference(&self, photo_set: i64) -> Option<String> {
        let state = self.state.borrow();
        state
            .node(photo_set, ElementKind::PhotoSet)
            .and_then(|n| n.custom_reference.clone())
    }

    pub fn photo_names(&self, photo_set: i64) -> Vec<String> {
        let state = self.state.borrow();
        state
            .photos
            .iter()
            .filter(|p| p.photo_set == photo_set)
            .map(|p| p.file_name.clone())
            .collect()
    }

    pub fn photo_ids(&self, photo_set: i64) -> Vec<i64> {
        let state = self.state.borrow();
        state
            .photos
            .iter()
            .filter(|p| p.photo_set == photo_set)
            .map(|p| p.id)
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Every call of `operation` fails.
    pub fn fail_on(&self, operation: &'static str) {
        self.fail_on_call(operation, 0);
    }

    /// The `nth` (1-based) call of `operation` fails.
    pub fn fail_on_call(&self, operation: &'static str, nth: usize) {
        self.state.borrow_mut().failures.insert(operation, nth);
    }

    fn insert(&mut self, parent: i64, kind: ElementKind, title: &str, custom_reference: Option<String>) -> i64 {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.nodes.push(Node {
            id,
            parent: Some(parent),
            kind,
            title: title.into(),
            custom_reference,
        });
        id
    }

    fn find(&self, parent: Option<i64>, kind: ElementKind, title: &str) -> Option<i64> {
        self.state
            .borrow()
            .nodes
            .iter()
            .find(|n| n.kind == kind && n.title == title && (parent.is_none() || n.parent == parent))
            .map(|n| n.id)
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        let count = {
            let count = state.counts.entry(operation).or_insert(0);
            *count += 1;
            *count
        };
        match state.failures.get(operation) {
            Some(&nth) if nth == 0 || nth == count => {
                Err(UploaderError::remote(operation, "injected failure"))
            }
            _ => Ok(()),
        }
    }

    fn photo_set(state: &State, id: i64) -> Option<PhotoSet> {
        state.node(id, ElementKind::PhotoSet).map(|n| PhotoSet {
            id: n.id,
            title: n.title.clone(),
            custom_reference: n.custom_reference.clone(),
            page_url: Some(format!("https://fake.example/p{}", n.id)),
            upload_url: Some(format!("https://fake.example/upload/{}", n.id)),
        })
    }
}

impl PhotoService for FakeService {
    fn authenticate(&mut self, credential: &Credential) -> Result<()> {
        self.record("Authenticate", Call::Authenticate)
            .map_err(|_| UploaderError::AuthFailure)?;
        self.authenticated = credential.login() == self.login && credential.password() == self.password;
        if self.authenticated {
            Ok(())
        } else {
            Err(UploaderError::AuthFailure)
        }
    }

    fn load_root_group_id(&self) -> Result<i64> {
        self.record("LoadPublicProfile", Call::LoadRootGroupId)?;
        if !self.authenticated {
            return Err(UploaderError::remote("LoadPublicProfile", "not logged in"));
        }
        Ok(self.root)
    }

    fn load_group(&self, group_id: i64) -> Result<GroupContents> {
        self.record("LoadGroup", Call::LoadGroup(group_id))?;
        let state = self.state.borrow();
        let group = state
            .node(group_id, ElementKind::Group)
            .ok_or_else(|| UploaderError::remote("LoadGroup", "no such group"))?;
        Ok(GroupContents {
            id: group.id,
            title: group.title.clone(),
            elements: state
                .nodes
                .iter()
                .filter(|n| n.parent == Some(group_id))
                .map(|n| GroupElement {
                    kind: n.kind,
                    id: n.id,
                    title: n.title.clone(),
                })
                .collect(),
        })
    }

    fn create_group(&self, parent_id: i64, title: &str) -> Result<GroupElement> {
        self.record(
            "CreateGroup",
            Call::CreateGroup {
                parent: parent_id,
                title: title.into(),
            },
        )?;
        let mut state = self.state.borrow_mut();
        if state.node(parent_id, ElementKind::Group).is_none() {
            return Err(UploaderError::remote("CreateGroup", "no such parent"));
        }
        let id = state.allocate();
        state.nodes.push(Node {
            id,
            parent: Some(parent_id),
            kind: ElementKind::Group,
            title: title.into(),
            custom_reference: None,
        });
        Ok(GroupElement {
            kind: ElementKind::Group,
            id,
            title: title.into(),
        })
    }

    fn create_photo_set(&self, group_id: i64, title: &str, custom_reference: &str) -> Result<PhotoSet> {
        self.record(
            "CreatePhotoSet",
            Call::CreatePhotoSet {
                group: group_id,
                title: title.into(),
                custom_reference: custom_reference.into(),
            },
        )?;
        let mut state = self.state.borrow_mut();
        if state.node(group_id, ElementKind::Group).is_none() {
            return Err(UploaderError::remote("CreatePhotoSet", "no such group"));
        }
        let id = state.allocate();
        state.nodes.push(Node {
            id,
            parent: Some(group_id),
            kind: ElementKind::PhotoSet,
            title: title.into(),
            custom_reference: Some(custom_reference.into()),
        });
        FakeService::photo_set(&state, id).ok_or_else(|| UploaderError::remote("CreatePhotoSet", "lost"))
    }

    fn load_photo_set(&self, photo_set_id: i64) -> Result<PhotoSet> {
        self.record("LoadPhotoSet", Call::LoadPhotoSet(photo_set_id))?;
        let state = self.state.borrow();
        FakeService::photo_set(&state, photo_set_id)
            .ok_or_else(|| UploaderError::remote("LoadPhotoSet", "no such photo set"))
    }

    fn list_photos(&self, photo_set: &PhotoSet) -> Result<Vec<Photo>> {
        self.record("LoadPhotoSetPhotos", Call::ListPhotos(photo_set.id))?;
        let state = self.state.borrow();
        Ok(state
            .photos
            .iter()
            .filter(|p| p.photo_set == photo_set.id)
            .map(|p| Photo {
                id: p.id,
                file_name: p.file_name.clone(),
            })
            .collect())
    }

    fn delete_photo(&self, photo_id: i64) -> Result<()> {
        self.record("DeletePhoto", Call::DeletePhoto(photo_id))?;
        let mut state = self.state.borrow_mut();
        let before = state.photos.len();
        state.photos.retain(|p| p.id != photo_id);
        if state.photos.len() == before {
            return Err(UploaderError::remote("DeletePhoto", "no such photo"));
        }
        Ok(())
    }

    fn upload_photo(&self, photo_set: &PhotoSet, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record(
            "UploadPhoto",
            Call::UploadPhoto {
                photo_set: photo_set.id,
                file_name: file_name.clone(),
            },
        )?;
        if !path.is_file() {
            return Err(UploaderError::remote("UploadPhoto", "file missing"));
        }
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.photos.push(StoredPhoto {
            id,
            photo_set: photo_set.id,
            file_name,
        });
        Ok(())
    }
}
