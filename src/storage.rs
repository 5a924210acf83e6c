//! The outside world as the drawing surface sees it: somewhere to upsert a
//! named drawing, and somewhere to offer a file to the user.
//!
//! Both are traits so the editor never knows whether a save creates or
//! updates, or where a download ends up. The local implementations keep
//! everything in plain directories.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use chrono::{DateTime, Local};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::executor::block_on_stream;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::util::time;

/// Display name used when a drawing has none.
pub const UNTITLED: &str = "Untitled Drawing";

/// Errors raised by the storage collaborators
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode drawing record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid file name: {0:?}")]
    InvalidName(String),
}

/// One save: which drawing, its display name and its payload string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub id: Uuid,
    pub name: String,
    pub content: String,
}

/// A downloadable payload with its suggested file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub content: String,
}

/// A drawing as the local store keeps it on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingRecord {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub updated_at: u64,
}

/// The "upsert drawing" collaborator.
pub trait DrawingStore: Send + Sync {
    fn upsert(&self, request: &SaveRequest) -> Result<(), StoreError>;
}

/// The "offer file to user" collaborator. Returns where the file went.
pub trait FileOffer: Send + Sync {
    fn offer(&self, filename: &str, content: &[u8]) -> Result<PathBuf, StoreError>;
}

/// Keeps one `<id>.json` record per drawing in a directory.
#[derive(Debug)]
pub struct LocalDrawingStore {
    dir: PathBuf,
    /// Serializes writes coming from concurrent save threads
    write_lock: Mutex<()>,
}

impl LocalDrawingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Read one record back. `Ok(None)` if it was never saved.
    pub fn load(&self, id: Uuid) -> Result<Option<DrawingRecord>, StoreError> {
        let json = match std::fs::read_to_string(self.record_path(id)) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// All readable records, most recently updated first.
    pub fn list(&self) -> Result<Vec<DrawingRecord>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut records: Vec<DrawingRecord> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "json"))
            .filter_map(|entry| {
                let json = std::fs::read_to_string(entry.path()).ok()?;
                match serde_json::from_str(&json) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        log::warn!("ignoring unreadable drawing {:?}: {err}", entry.path());
                        None
                    }
                }
            })
            .collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }
}

impl DrawingStore for LocalDrawingStore {
    fn upsert(&self, request: &SaveRequest) -> Result<(), StoreError> {
        let record = DrawingRecord {
            id: request.id,
            name: request.name.clone(),
            content: request.content.clone(),
            updated_at: time::timestamp_secs(),
        };
        let json = serde_json::to_string_pretty(&record)?;

        let _guard = self.write_lock.lock();
        std::fs::create_dir_all(&self.dir)?;
        let path = self.record_path(request.id);
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, json)?;
        std::fs::rename(&staging, &path)?;
        log::info!("saved drawing {:?} to {:?}", request.name, path);
        Ok(())
    }
}

/// Offers files by writing them into a downloads directory.
#[derive(Debug, Clone)]
pub struct DirectoryOffer {
    dir: PathBuf,
}

impl DirectoryOffer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileOffer for DirectoryOffer {
    fn offer(&self, filename: &str, content: &[u8]) -> Result<PathBuf, StoreError> {
        if filename.is_empty() || filename.contains(['/', '\\']) || filename.starts_with('.') {
            return Err(StoreError::InvalidName(filename.to_owned()));
        }
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, content)?;
        log::info!("offered {filename:?} at {path:?}");
        Ok(path)
    }
}

/// Turn a display name into a file stem: characters file systems reject
/// become `_`, and a blank name becomes [`UNTITLED`].
pub fn file_stem(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        UNTITLED.to_owned()
    } else {
        cleaned.to_owned()
    }
}

/// Suggested download name for a drawing: `<name>.json`.
pub fn download_filename(name: &str) -> String {
    format!("{}.json", file_stem(name))
}

/// How a background save ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: Uuid,
    pub name: String,
    pub result: Result<(), String>,
    pub finished_at: DateTime<Local>,
}

/// Runs saves off the UI thread and hands their outcomes back.
///
/// The surface never waits on a save: [`SaveWorker::submit`] returns at
/// once and [`SaveWorker::drain`] is polled each frame. One worker thread
/// takes requests in submission order, so a later save of a drawing always
/// lands after an earlier one.
pub struct SaveWorker {
    requests: Option<UnboundedSender<SaveRequest>>,
    outcomes: UnboundedReceiver<SaveOutcome>,
    thread: Option<JoinHandle<()>>,
    in_flight: usize,
}

impl SaveWorker {
    pub fn new(store: Arc<dyn DrawingStore>) -> Result<Self, StoreError> {
        let (requests, queue) = unbounded::<SaveRequest>();
        let (sender, outcomes) = unbounded();
        let thread = std::thread::Builder::new()
            .name("save-worker".to_owned())
            .spawn(move || {
                for request in block_on_stream(queue) {
                    let result = store.upsert(&request).map_err(|err| {
                        log::error!("saving {:?} failed: {err}", request.name);
                        err.to_string()
                    });
                    let outcome = SaveOutcome {
                        id: request.id,
                        name: request.name,
                        result,
                        finished_at: Local::now(),
                    };
                    // The receiver is gone once the app shut down.
                    let _ = sender.unbounded_send(outcome);
                }
                log::debug!("save worker stopped");
            })?;

        Ok(Self {
            requests: Some(requests),
            outcomes,
            thread: Some(thread),
            in_flight: 0,
        })
    }

    pub fn submit(&mut self, request: SaveRequest) {
        log::debug!("submitting save of {:?}", request.name);
        let Some(requests) = &self.requests else {
            return;
        };
        match requests.unbounded_send(request) {
            Ok(()) => self.in_flight += 1,
            Err(err) => log::error!("save worker is gone, dropping save of {:?}", err.into_inner().name),
        }
    }

    /// Collect every outcome that has arrived since the last call, oldest
    /// first.
    pub fn drain(&mut self) -> Vec<SaveOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(Some(outcome)) = self.outcomes.try_next() {
            self.in_flight = self.in_flight.saturating_sub(1);
            outcomes.push(outcome);
        }
        outcomes
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight > 0
    }
}

impl Drop for SaveWorker {
    /// Finish the queued saves before going away.
    fn drop(&mut self) {
        self.requests.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("save worker panicked");
            }
        }
    }
}
