//! Follows the node's log file and streams new lines into a panel.

use std::fs::Metadata;
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, BufReader};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{LocateError, WidgetError};
use crate::panel::SharedPanel;

const WIDGET: &str = "log";

/// Longest line kept in memory; longer input is split at this size.
const MAX_LINE_BYTES: usize = 64 * 1024;

/// Maps a log category such as `validator` to the file holding that log.
pub trait LogLocator: Send + Sync {
    fn locate(&self, category: &str) -> Result<PathBuf, LocateError>;
}

/// Finds the newest `<category>*.log` file in a directory.
#[derive(Debug, Clone)]
pub struct LogDirLocator {
    dir: PathBuf,
}

impl LogDirLocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LogLocator for LogDirLocator {
    fn locate(&self, category: &str) -> Result<PathBuf, LocateError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| LocateError::ReadDir {
            dir: self.dir.clone(),
            source,
        })?;

        entries
            .filter_map(Result::ok)
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name.starts_with(category) && name.ends_with(".log")
            })
            .filter_map(|entry| {
                let meta = entry.metadata().ok()?;
                if !meta.is_file() {
                    return None;
                }
                let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                Some((modified, entry.path()))
            })
            .max_by_key(|(modified, _)| *modified)
            .map(|(_, path)| path)
            .ok_or_else(|| LocateError::NotFound {
                category: category.to_string(),
                dir: self.dir.clone(),
            })
    }
}

/// Identifies a file across renames so rotation can be detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    fn of(meta: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: meta.dev(),
            ino: meta.ino(),
        })
    }

    #[cfg(not(unix))]
    fn of(_meta: &Metadata) -> Option<Self> {
        None
    }
}

/// Read position within the followed file.
struct TailCursor {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    position: u64,
    identity: Option<FileIdentity>,
    /// Bytes of a line whose newline has not arrived yet
    pending: Vec<u8>,
}

impl TailCursor {
    /// Cursor at the current end of `path`, or at the start of a file that
    /// does not exist yet.
    ///
    /// An existing file is opened right away so that lines written to it
    /// before a rotation are still read.
    fn at_end(path: PathBuf) -> Self {
        let mut cursor = Self {
            path,
            reader: None,
            position: 0,
            identity: None,
            pending: Vec::new(),
        };

        if let Ok(mut file) = std::fs::File::open(&cursor.path) {
            let identity = file.metadata().ok().and_then(|meta| FileIdentity::of(&meta));
            if let Ok(end) = file.seek(SeekFrom::End(0)) {
                cursor.position = end;
                cursor.identity = identity;
                cursor.reader = Some(BufReader::new(File::from_std(file)));
            }
        }

        cursor
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Forget the open handle; the next poll reopens from the start.
    fn restart(&mut self) {
        self.reader = None;
        self.position = 0;
        self.pending.clear();
    }

    async fn open(&mut self, identity: Option<FileIdentity>, len: u64) -> io::Result<()> {
        let mut file = File::open(&self.path).await?;

        if identity != self.identity || len < self.position {
            self.position = 0;
            self.pending.clear();
        }
        file.seek(SeekFrom::Start(self.position)).await?;

        self.identity = identity;
        self.reader = Some(BufReader::new(file));
        Ok(())
    }

    /// Complete lines appended since the last poll.
    async fn poll(&mut self) -> io::Result<Vec<String>> {
        let meta = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let lines = if self.reader.is_some() {
                    debug!(path = %self.path.display(), "Log file gone, waiting for it to return");
                    self.drain().await?
                } else {
                    Vec::new()
                };
                self.restart();
                self.identity = None;
                return Ok(lines);
            }
            Err(e) => return Err(e),
        };

        let identity = FileIdentity::of(&meta);
        let mut lines = Vec::new();
        if self.reader.is_some() && identity != self.identity {
            // The open handle still points at the rotated file
            info!(path = %self.path.display(), "Log file rotated, reopening");
            lines = self.drain().await?;
            self.restart();
        } else if self.reader.is_some() && meta.len() < self.position {
            info!(path = %self.path.display(), "Log file truncated, reopening");
            self.restart();
        }

        if self.reader.is_none() {
            self.open(identity, meta.len()).await?;
        }

        lines.extend(self.read_lines().await?);
        Ok(lines)
    }

    /// Everything left in the open file, including an unterminated last line.
    async fn drain(&mut self) -> io::Result<Vec<String>> {
        let mut lines = self.read_lines().await?;
        if !self.pending.is_empty() {
            lines.push(String::from_utf8_lossy(&self.pending).into_owned());
            self.pending.clear();
        }
        Ok(lines)
    }

    async fn read_lines(&mut self) -> io::Result<Vec<String>> {
        let mut lines = Vec::new();
        let Some(reader) = self.reader.as_mut() else {
            return Ok(lines);
        };

        loop {
            // pending stays below MAX_LINE_BYTES between reads
            let room = (MAX_LINE_BYTES - self.pending.len()) as u64;
            let n = (&mut *reader)
                .take(room)
                .read_until(b'\n', &mut self.pending)
                .await?;
            if n == 0 {
                break;
            }
            self.position += n as u64;

            if self.pending.last() == Some(&b'\n') {
                self.pending.pop();
                if self.pending.last() == Some(&b'\r') {
                    self.pending.pop();
                }
                lines.push(String::from_utf8_lossy(&self.pending).into_owned());
                self.pending.clear();
            } else if self.pending.len() >= MAX_LINE_BYTES {
                lines.push(String::from_utf8_lossy(&self.pending).into_owned());
                self.pending.clear();
            }
        }

        Ok(lines)
    }
}

/// Stream lines appended to the `category` log into `panel` until `cancel`
/// fires.
///
/// The end of the file is recorded before this returns, so nothing written
/// earlier is shown. If the log cannot be located the error text is written
/// to the panel once and the task ends.
pub fn start_tail(
    locator: &dyn LogLocator,
    category: &str,
    panel: SharedPanel,
    cancel: CancellationToken,
    poll_interval: Duration,
) -> JoinHandle<Result<(), WidgetError>> {
    let path = match locator.locate(category) {
        Ok(path) => path,
        Err(e) => {
            warn!(category, error = %e, "Cannot locate log file");
            let result = panel
                .lock()
                .write(&e.to_string())
                .map_err(|source| WidgetError::Render {
                    widget: WIDGET,
                    source,
                });
            return tokio::spawn(async move { result });
        }
    };

    info!(category, path = %path.display(), "Tailing log file");
    let cursor = TailCursor::at_end(path);
    tokio::spawn(follow(cursor, panel, cancel, poll_interval))
}

async fn follow(
    mut cursor: TailCursor,
    panel: SharedPanel,
    cancel: CancellationToken,
    poll_interval: Duration,
) -> Result<(), WidgetError> {
    let mut interval = time::interval(poll_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(path = %cursor.path().display(), "Log tail cancelled");
                return Ok(());
            }
            _ = interval.tick() => {}
        }

        let lines = match cursor.poll().await {
            Ok(lines) => lines,
            Err(e) => {
                warn!(path = %cursor.path().display(), error = %e, "Log read failed");
                cursor.restart();
                continue;
            }
        };

        if lines.is_empty() {
            continue;
        }

        let mut target = panel.lock();
        for line in &lines {
            target
                .write(line)
                .and_then(|_| target.write("\n"))
                .map_err(|source| WidgetError::Render {
                    widget: WIDGET,
                    source,
                })?;
        }
    }
}
