//! Configuration change notification
//!
//! The engine only needs to ask "has the file changed since I last
//! looked?" without ever blocking. [`ConfigWatch`] is that question;
//! two answers are provided:
//!
//! - [`NotifyWatch`]: native notifications (inotify, FSEvents,
//!   ReadDirectoryChangesW) via the `notify` crate. The watcher's own
//!   thread pushes events into a channel which `poll` drains.
//! - [`MtimeWatch`]: compares modification time and size on each poll.
//!   No background thread, one `stat` per poll.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crossbeam_channel::{unbounded, Receiver};
use notify::event::{AccessKind, AccessMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::error::WatchError;

/// Non-blocking change detection on the configuration resource
pub trait ConfigWatch: Send {
    /// True if the resource changed since the previous poll.
    ///
    /// # Real-time Safety
    /// Must never block.
    fn poll(&mut self) -> bool;
}

/// Watches the file through the platform's native notification API.
///
/// The parent directory is watched rather than the file itself, so editors
/// that save by replacing the file are still seen.
pub struct NotifyWatch {
    // Dropping the watcher ends the subscription
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    file_name: OsString,
}

impl NotifyWatch {
    /// Start watching `path`. Its parent directory must exist.
    pub fn subscribe(path: &Path) -> Result<Self, WatchError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| WatchError::InvalidPath(path.to_path_buf()))?
            .to_os_string();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = unbounded();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Receiver gone means the engine shut down
            let _ = tx.send(res);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        debug!("Watching {:?} for configuration changes", path);
        Ok(Self {
            _watcher: watcher,
            events: rx,
            file_name,
        })
    }

    fn is_relevant(&self, event: &Event) -> bool {
        let touches_file = event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(self.file_name.as_os_str()));

        touches_file && is_content_change(&event.kind)
    }
}

impl ConfigWatch for NotifyWatch {
    fn poll(&mut self) -> bool {
        let mut changed = false;

        for result in self.events.try_iter() {
            match result {
                Ok(event) => changed |= self.is_relevant(&event),
                Err(e) => warn!("Configuration watcher error: {}", e),
            }
        }

        changed
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(_)
            | EventKind::Access(AccessKind::Close(AccessMode::Write))
    )
}

/// Fingerprint of the file as last seen
type Stamp = (SystemTime, u64);

fn stamp(path: &Path) -> Option<Stamp> {
    let meta = fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}

/// Detects changes by comparing modification time and size.
///
/// Two writes of equal length inside the filesystem's timestamp
/// granularity look like one.
pub struct MtimeWatch {
    path: PathBuf,
    last: Option<Stamp>,
}

impl MtimeWatch {
    /// Start watching `path`. The file must exist.
    pub fn subscribe(path: &Path) -> Result<Self, WatchError> {
        let meta = fs::metadata(path).map_err(|source| WatchError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            last: meta.modified().ok().map(|t| (t, meta.len())),
        })
    }
}

impl ConfigWatch for MtimeWatch {
    fn poll(&mut self) -> bool {
        let current = stamp(&self.path);
        let changed = current.is_some() && current != self.last;
        self.last = current;
        changed
    }
}
