// API client module: a small blocking JSON-RPC client for the Zenfolio
// API. Each remote operation is one POST to the API endpoint; uploads go
// to the PhotoSet's own upload URL.

use crate::config::Settings;
use crate::error::{Result, UploaderError};
use crate::remote::{ElementKind, GroupContents, GroupElement, Photo, PhotoService, PhotoSet};
use crate::session::Credential;
use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const TOKEN_HEADER: &str = "X-Zenfolio-Token";
const USER_AGENT_HEADER: &str = "X-Zenfolio-User-Agent";
const PHOTO_PAGE_SIZE: usize = 500;

/// Failure of a single call, before it is mapped onto `UploaderError`.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected status {status}: {text}")]
    UnexpectedStatus { status: StatusCode, text: String },
    #[error("{code}: {message}")]
    Rpc { code: String, message: String },
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Blocking Zenfolio client. Holds the session token once
/// `authenticate` succeeded; the token lives in memory only.
pub struct ZenfolioClient {
    client: Client,
    settings: Settings,
    token: Option<String>,
    login: Option<String>,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcFault>,
}

#[derive(Deserialize)]
struct RpcFault {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthChallenge {
    #[serde(deserialize_with = "byte_string")]
    password_salt: Vec<u8>,
    #[serde(deserialize_with = "byte_string")]
    challenge: Vec<u8>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireUser {
    root_group: WireGroupRef,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireGroupRef {
    id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireGroup {
    id: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    elements: Option<Vec<WireElement>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireElement {
    #[serde(rename = "$type", default)]
    kind: String,
    id: i64,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WirePhotoSet {
    id: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    custom_reference: Option<String>,
    #[serde(default)]
    page_url: Option<String>,
    #[serde(default)]
    upload_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WirePhoto {
    id: i64,
    #[serde(default)]
    file_name: Option<String>,
}

impl From<WireElement> for GroupElement {
    fn from(e: WireElement) -> Self {
        let kind = match e.kind.as_str() {
            "Group" => ElementKind::Group,
            "PhotoSet" => ElementKind::PhotoSet,
            _ => ElementKind::Other,
        };
        GroupElement {
            kind,
            id: e.id,
            title: e.title.unwrap_or_default(),
        }
    }
}

impl From<WireGroup> for GroupContents {
    fn from(g: WireGroup) -> Self {
        GroupContents {
            id: g.id,
            title: g.title.unwrap_or_default(),
            elements: g
                .elements
                .unwrap_or_default()
                .into_iter()
                .map(GroupElement::from)
                .collect(),
        }
    }
}

impl From<WirePhotoSet> for PhotoSet {
    fn from(p: WirePhotoSet) -> Self {
        PhotoSet {
            id: p.id,
            title: p.title.unwrap_or_default(),
            custom_reference: p.custom_reference,
            page_url: p.page_url,
            upload_url: p.upload_url,
        }
    }
}

impl From<WirePhoto> for Photo {
    fn from(p: WirePhoto) -> Self {
        Photo {
            id: p.id,
            file_name: p.file_name.unwrap_or_default(),
        }
    }
}

/// Byte strings come back either as integer arrays or base64 text.
fn byte_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Bytes {
        List(Vec<u8>),
        Text(String),
    }

    match Bytes::deserialize(deserializer)? {
        Bytes::List(bytes) => Ok(bytes),
        Bytes::Text(text) => BASE64.decode(text).map_err(serde::de::Error::custom),
    }
}

/// `SHA-256(challenge ++ SHA-256(salt ++ password))`
pub(crate) fn challenge_proof(salt: &[u8], challenge: &[u8], password: &str) -> Vec<u8> {
    let password_hash = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize();
    Sha256::new()
        .chain_update(challenge)
        .chain_update(password_hash)
        .finalize()
        .to_vec()
}

fn decode_response<T: DeserializeOwned>(text: &str) -> std::result::Result<T, CallError> {
    let envelope: RpcResponse = serde_json::from_str(text)?;
    if let Some(fault) = envelope.error {
        return Err(CallError::Rpc {
            code: fault.code.unwrap_or_default(),
            message: fault.message,
        });
    }
    Ok(serde_json::from_value(envelope.result)?)
}

/// Map an HTTP reply onto the call's result. Faults usually arrive with a
/// 500 and a regular error envelope; any other failed status is reported
/// with its body.
fn decode_reply<T: DeserializeOwned>(status: StatusCode, text: String) -> std::result::Result<T, CallError> {
    if status.is_success() {
        return decode_response(&text);
    }
    match decode_response::<Value>(&text) {
        Err(rpc @ CallError::Rpc { .. }) => Err(rpc),
        _ => Err(CallError::UnexpectedStatus { status, text }),
    }
}

/// Read `fetch(start, count)` pages until one comes back short.
fn read_pages<T, F>(page_size: usize, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(usize, usize) -> Result<Vec<T>>,
{
    let mut items = Vec::new();
    loop {
        let page = fetch(items.len(), page_size)?;
        let fetched = page.len();
        items.extend(page);
        if fetched < page_size {
            return Ok(items);
        }
    }
}

/// The PhotoSet's upload URL, loading the set when the listing left it out.
fn upload_url_for(
    photo_set: &PhotoSet,
    load: impl FnOnce(i64) -> Result<PhotoSet>,
) -> Result<String> {
    if let Some(url) = &photo_set.upload_url {
        return Ok(url.clone());
    }
    load(photo_set.id)?.upload_url.ok_or_else(|| {
        UploaderError::remote("UploadPhoto", format!("photo set {} has no upload URL", photo_set.id))
    })
}

impl ZenfolioClient {
    /// Create a client configured from `ZENFOLIO_API_URL` /
    /// `ZENFOLIO_USER_AGENT`, see `Settings::from_env`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(Settings::from_env())
    }

    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ZenfolioClient {
            client,
            settings,
            token: None,
            login: None,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Agent header always, session token once logged in.
    fn with_session(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header(USER_AGENT_HEADER, self.settings.user_agent.as_str());
        match &self.token {
            Some(token) => req.header(TOKEN_HEADER, token.as_str()),
            None => req,
        }
    }

    /// POST one JSON-RPC call and decode its `result`.
    fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> std::result::Result<T, CallError> {
        debug!(method, "zenfolio call");
        let request = RpcRequest {
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };
        let res = self
            .with_session(self.client.post(&self.settings.api_url))
            .json(&request)
            .send()?;
        let status = res.status();
        let text = res.text()?;
        decode_reply(status, text)
    }

    /// `call`, with failures reported as `RemoteOperationFailure`.
    fn invoke<T: DeserializeOwned>(&self, method: &'static str, params: Value) -> Result<T> {
        self.call(method, params)
            .map_err(|e| UploaderError::remote(method, e))
    }

    fn request_token(&self, credential: &Credential) -> std::result::Result<String, CallError> {
        let challenge: AuthChallenge = self.call("GetChallenge", json!([credential.login()]))?;
        let proof = challenge_proof(
            &challenge.password_salt,
            &challenge.challenge,
            credential.password(),
        );
        self.call("Authenticate", json!([challenge.challenge, proof]))
    }

    fn send_file(&self, upload_url: &str, path: &Path) -> std::result::Result<(), CallError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = File::open(path)?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let res = self
            .with_session(self.client.post(upload_url))
            .query(&[("filename", file_name.as_str())])
            .header(CONTENT_TYPE, mime.essence_str())
            .body(file)
            .send()?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().unwrap_or_default();
            return Err(CallError::UnexpectedStatus { status, text });
        }
        Ok(())
    }
}

impl PhotoService for ZenfolioClient {
    fn authenticate(&mut self, credential: &Credential) -> Result<()> {
        self.token = None;
        self.login = None;
        match self.request_token(credential) {
            Ok(token) => {
                self.token = Some(token);
                self.login = Some(credential.login().to_string());
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "authentication failed");
                Err(UploaderError::AuthFailure)
            }
        }
    }

    fn load_root_group_id(&self) -> Result<i64> {
        let login = self
            .login
            .as_deref()
            .ok_or_else(|| UploaderError::remote("LoadPublicProfile", "not logged in"))?;
        let user: WireUser = self.invoke("LoadPublicProfile", json!([login]))?;
        Ok(user.root_group.id)
    }

    fn load_group(&self, group_id: i64) -> Result<GroupContents> {
        let group: WireGroup = self.invoke("LoadGroup", json!([group_id, "Level1", true]))?;
        Ok(group.into())
    }

    fn create_group(&self, parent_id: i64, title: &str) -> Result<GroupElement> {
        let group: WireGroup = self.invoke("CreateGroup", json!([parent_id, { "Title": title }]))?;
        Ok(GroupElement {
            kind: ElementKind::Group,
            id: group.id,
            title: group.title.unwrap_or_else(|| title.to_string()),
        })
    }

    fn create_photo_set(&self, group_id: i64, title: &str, custom_reference: &str) -> Result<PhotoSet> {
        let updater = json!({ "Title": title, "CustomReference": custom_reference });
        let set: WirePhotoSet = self.invoke("CreatePhotoSet", json!([group_id, "Gallery", updater]))?;
        Ok(set.into())
    }

    fn load_photo_set(&self, photo_set_id: i64) -> Result<PhotoSet> {
        let set: WirePhotoSet = self.invoke("LoadPhotoSet", json!([photo_set_id, "Level1", false]))?;
        Ok(set.into())
    }

    fn list_photos(&self, photo_set: &PhotoSet) -> Result<Vec<Photo>> {
        read_pages(PHOTO_PAGE_SIZE, |start, count| {
            let page: Vec<WirePhoto> =
                self.invoke("LoadPhotoSetPhotos", json!([photo_set.id, start, count]))?;
            Ok(page.into_iter().map(Photo::from).collect())
        })
    }

    fn delete_photo(&self, photo_id: i64) -> Result<()> {
        let _: Value = self.invoke("DeletePhoto", json!([photo_id]))?;
        Ok(())
    }

    fn upload_photo(&self, photo_set: &PhotoSet, path: &Path) -> Result<()> {
        let upload_url = upload_url_for(photo_set, |id| self.load_photo_set(id))?;
        self.send_file(&upload_url, path)
            .map_err(|e| UploaderError::remote("UploadPhoto", format!("{}: {}", path.display(), e)))
    }
}
