// Library root
// -----------
// The orchestration core of the uploader. The binary (`main.rs`) wires
// these modules to an interactive terminal front end.
//
// Module responsibilities:
// - `remote`: the `PhotoService` contract and the types it trades in.
// - `api`: the Zenfolio JSON-RPC client implementing `PhotoService`.
// - `files`: lists the uploadable files of a directory.
// - `hierarchy`: the one-level Group/PhotoSet snapshot built at login.
// - `session`: credentials, login and snapshot queries.
// - `upload`: resolves the destination and drives the per-file upload.
// - `ui`: the terminal prompts, spinner and progress bar.
//
// Only `ui` knows about threads or the terminal; everything else is plain
// blocking code and is tested against an in-memory `PhotoService`.
pub mod api;
pub mod config;
pub mod error;
pub mod files;
pub mod hierarchy;
pub mod remote;
pub mod session;
pub mod ui;
pub mod upload;

#[cfg(test)]
mod fake;

pub use error::{Result, UploaderError};
