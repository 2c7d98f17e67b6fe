// UI layer: an interactive terminal front end built on `dialoguer` and
// `indicatif`. Long remote operations run on a worker thread so the
// spinner and progress bar keep moving while the calls block.

use crate::api::ZenfolioClient;
use crate::error::UploaderError;
use crate::files::{describe_formats, list_supported_files};
use crate::hierarchy::HierarchySnapshot;
use crate::remote::PhotoService;
use crate::session::{self, Credential};
use crate::upload::{resolve_and_upload, UploadEvent, UploadResult};
use anyhow::{anyhow, Result};
use crossterm::style::{style, Stylize};
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const NEW_GROUP: &str = "New Group...";
const NEW_PHOTO_SET: &str = "New PhotoSet...";
const DEFAULT_GROUP: &str = "Uploads";

/// Main interactive menu. Runs until the user chooses "Exit".
///
/// The hierarchy snapshot only exists after a successful login. Every new
/// login attempt replaces it, and a failed one leaves the shell logged out.
pub fn main_menu(mut api: ZenfolioClient) -> Result<()> {
    let mut snapshot: Option<HierarchySnapshot> = None;
    loop {
        let items = vec!["Log in", "Upload a directory", "Exit"];
        let selection = Select::new()
            .with_prompt("Zenfolio Uploader")
            .items(&items)
            .default(if snapshot.is_some() { 1 } else { 0 })
            .interact()?;
        match selection {
            0 => snapshot = handle_login(&mut api)?,
            1 => match snapshot.as_mut() {
                Some(snapshot) => handle_upload(&api, snapshot)?,
                None => println!("{}", style("Please log into Zenfolio first.").yellow()),
            },
            2 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Ask for credentials, log in and load the Group/PhotoSet hierarchy.
fn handle_login(api: &mut ZenfolioClient) -> Result<Option<HierarchySnapshot>> {
    let login: String = Input::new()
        .with_prompt("Zenfolio ID")
        .allow_empty(true)
        .interact_text()?;
    let password: String = Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()?;
    attempt_login(api, &Credential::new(login.trim(), password))
}

/// Log in on a worker thread. `None` whenever the attempt did not produce
/// a fresh snapshot, so the caller drops whatever it held before.
fn attempt_login<S: PhotoService + Send + ?Sized>(
    service: &mut S,
    credential: &Credential,
) -> Result<Option<HierarchySnapshot>> {
    if !credential.is_complete() {
        println!("{}", style("Please Enter ID & Password").yellow());
        return Ok(None);
    }

    let outcome = in_background("Logging into Zenfolio and retrieving Groups & PhotoSets...", || {
        session::login(&mut *service, credential)
    })?;
    match outcome {
        Ok(snapshot) => {
            println!("{}", style("Success!").green());
            println!(
                "Found {} Groups. Supported formats: {}",
                snapshot.groups().len(),
                describe_formats()
            );
            Ok(Some(snapshot))
        }
        Err(e) => {
            println!("{}", style(e).red());
            Ok(None)
        }
    }
}

/// Pick a directory and a destination, then upload with a progress bar.
fn handle_upload(api: &ZenfolioClient, snapshot: &mut HierarchySnapshot) -> Result<()> {
    let Some((directory, count)) = choose_directory()? else {
        return Ok(());
    };
    let group = choose_group(snapshot)?;
    let photo_set = choose_photo_set(snapshot, &group, &directory)?;

    let proceed = Confirm::new()
        .with_prompt(format!("Upload {} files to {} / {}?", count, group, photo_set))
        .default(true)
        .interact()?;
    if !proceed {
        println!("Upload cancelled");
        return Ok(());
    }

    match run_upload(api, snapshot, &group, &photo_set, &directory)? {
        Ok(result) => print_summary(&result),
        Err(e) => println!("{}", style(format!("Upload stopped: {}", e)).red()),
    }
    Ok(())
}

fn choose_directory() -> Result<Option<(PathBuf, usize)>> {
    let start = dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let path: String = Input::new()
        .with_prompt("Directory")
        .default(start.display().to_string())
        .interact_text()?;
    let directory = PathBuf::from(path.trim());

    let count = list_supported_files(&directory).len();
    if count == 0 {
        println!("{}", style("Supported Files Not Found").yellow());
        return Ok(None);
    }
    println!("Directory Selected: {}", directory.display());
    println!("Number of Files Found: {}", count);
    Ok(Some((directory, count)))
}

fn choose_group(snapshot: &HierarchySnapshot) -> Result<String> {
    let mut items = snapshot.group_titles();
    let default = items.iter().position(|t| t == DEFAULT_GROUP).unwrap_or(0);
    items.push(NEW_GROUP.to_string());

    let selection = Select::new()
        .with_prompt("Group")
        .items(&items)
        .default(default)
        .interact()?;
    if items[selection] == NEW_GROUP {
        let title: String = Input::new()
            .with_prompt("New Group name")
            .default(DEFAULT_GROUP.to_string())
            .interact_text()?;
        return Ok(title.trim().to_string());
    }
    Ok(items[selection].clone())
}

/// The directory's own name is offered first, as an existing PhotoSet when
/// one carries it and as the default new name otherwise.
fn choose_photo_set(snapshot: &HierarchySnapshot, group: &str, directory: &Path) -> Result<String> {
    let suggested = directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut items = session::list_photo_sets(snapshot, group);
    items.push(NEW_PHOTO_SET.to_string());
    let default = items
        .iter()
        .position(|t| *t == suggested)
        .unwrap_or(items.len() - 1);

    let selection = Select::new()
        .with_prompt("PhotoSet")
        .items(&items)
        .default(default)
        .interact()?;
    if items[selection] == NEW_PHOTO_SET {
        let title: String = Input::new()
            .with_prompt("New PhotoSet name")
            .default(suggested)
            .interact_text()?;
        return Ok(title.trim().to_string());
    }
    Ok(items[selection].clone())
}

/// Run the upload on a worker thread and render its events here.
fn run_upload(
    api: &ZenfolioClient,
    snapshot: &mut HierarchySnapshot,
    group: &str,
    photo_set: &str,
    directory: &Path,
) -> Result<Result<UploadResult, UploaderError>> {
    let bar = ProgressBar::new(0);
    bar.set_style(ProgressStyle::with_template(
        "[{bar:40.cyan/blue}] {pos} of {len} Files Uploaded",
    )?);

    let (tx, rx) = mpsc::channel();
    let joined = thread::scope(|s| {
        let worker = s.spawn(move || {
            let mut forward = |event: UploadEvent| {
                let _ = tx.send(event);
            };
            resolve_and_upload(api, snapshot, group, photo_set, directory, &mut forward)
        });
        // Ends once the worker drops its sender.
        for event in rx {
            render(&bar, event);
        }
        worker.join()
    });
    bar.finish();
    joined.map_err(|_| anyhow!("upload worker panicked"))
}

fn render(bar: &ProgressBar, event: UploadEvent) {
    match event {
        UploadEvent::FilesFound { total } => bar.set_length(total as u64),
        UploadEvent::GroupCreated { title } => bar.println(format!("New Group Created: {}", title)),
        UploadEvent::PhotoSetFound { title } => bar.println(format!("Existing PhotoSet Found: {}", title)),
        UploadEvent::PhotoSetCreated { title } => bar.println(format!("PhotoSet {} created", title)),
        UploadEvent::Replacing { file_name } => bar.println(format!("Replacing {}", file_name)),
        UploadEvent::Uploading { file_name } => bar.println(format!("Uploading {}", file_name)),
        UploadEvent::Uploaded { uploaded, .. } => bar.set_position(uploaded as u64),
    }
}

fn print_summary(result: &UploadResult) {
    let mut lines = summary_lines(result);
    let banner = lines.pop().unwrap_or_default();
    println!();
    for line in lines {
        println!("{}", line);
    }
    println!("\n{}\n", style(banner).green());
}

/// Destination, optional page URL, then the closing banner.
fn summary_lines(result: &UploadResult) -> Vec<String> {
    let mut lines = vec![format!("{} / {}", result.group_title, result.photo_set_title)];
    if let Some(url) = &result.destination_url {
        lines.push(url.clone());
    }
    lines.push(format!(
        "===   {} of {} Files Uploaded   ===",
        result.uploaded, result.total
    ));
    lines
}

/// Run `work` on a worker thread while a spinner ticks on this one.
fn in_background<T: Send>(message: &str, work: impl FnOnce() -> T + Send) -> Result<T> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = thread::scope(|s| s.spawn(work).join());
    spinner.finish_and_clear();
    result.map_err(|_| anyhow!("background task panicked"))
}
