use crate::record::{replay, LogRecord};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace};
use tunnel_core::repository::{LinkRepository, Result};
use tunnel_core::{Binding, Clock, LinkInfo, ShortCode, StorageError, SystemClock};

/// Flush/sync strategy for appends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Hand every line to the OS before `save` returns.
    #[default]
    Flush,
    /// Additionally `fdatasync` after every line.
    Fsync,
}

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub sync_mode: SyncMode,
}

/// Mutable state behind the write lock.
struct LogWriter {
    file: File,
    /// The file does not end with a newline, so the next append must start one.
    torn: bool,
}

/// An append-only link log with an in-memory index.
///
/// Opening the log replays it front-to-back into the index, last write
/// winning. Each `save` appends one JSON line and updates the index while
/// holding a single lock, so saves are totally ordered and the index never
/// runs ahead of the file. Lookups only touch the index.
pub struct LinkLog<C: Clock = SystemClock> {
    path: PathBuf,
    writer: Mutex<LogWriter>,
    index: DashMap<String, Binding>,
    sync_mode: SyncMode,
    clock: C,
}

impl LinkLog<SystemClock> {
    /// Opens (or creates) the log at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, LogOptions::default(), SystemClock)
    }
}

impl<C: Clock> LinkLog<C> {
    /// Opens (or creates) the log at `path`, replaying any existing records.
    ///
    /// Missing parent directories are created. A missing file yields an
    /// empty index.
    pub fn open_with(path: impl AsRef<Path>, options: LogOptions, clock: C) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let index = DashMap::new();
        let mut torn = false;

        match File::open(path) {
            Ok(file) => {
                let replayed = replay(BufReader::new(file))?;
                let now = clock.now();
                for record in replayed.records {
                    match record {
                        LogRecord::Put(put) => {
                            let binding = put.into_binding(now);
                            index.insert(binding.code.as_str().to_owned(), binding);
                        }
                    }
                }
                torn = replayed.torn_tail;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no link log yet; starting empty");
            }
            Err(e) => return Err(e.into()),
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        info!(
            path = %path.display(),
            bindings = index.len(),
            "link log opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(LogWriter { file, torn }),
            index,
            sync_mode: options.sync_mode,
            clock,
        })
    }

    /// Appends a binding for `code` and makes it visible to lookups.
    ///
    /// Any earlier binding for `code` is shadowed. On an I/O error the index
    /// is left untouched and the error is returned as is.
    pub fn save(&self, code: &ShortCode, url: &str, ttl_seconds: Option<NonZeroU64>) -> Result<()> {
        let mut writer = self.writer.lock();

        let binding = Binding::create(code.clone(), url, self.clock.now(), ttl_seconds)?;

        let mut line = Vec::with_capacity(url.len() + 96);
        if writer.torn {
            line.push(b'\n');
        }
        serde_json::to_writer(&mut line, &LogRecord::from(&binding))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        line.push(b'\n');

        if let Err(e) = writer.append(&line, self.sync_mode) {
            // part of the line may have reached the file
            writer.torn = true;
            return Err(e.into());
        }
        writer.torn = false;

        self.index.insert(code.as_str().to_owned(), binding);
        drop(writer);

        debug!(code = %code, bytes = line.len(), "link record appended");
        Ok(())
    }

    /// Returns the URL bound to `code` unless it is unknown or expired.
    pub fn fetch(&self, code: &ShortCode) -> Option<String> {
        let binding = self.index.get(code.as_str())?;
        if binding.is_expired_at(self.clock.now()) {
            trace!(code = %code, "binding expired");
            return None;
        }
        Some(binding.url.clone())
    }

    /// Returns the metadata of `code`, whether or not it has expired.
    pub fn peek(&self, code: &ShortCode) -> Option<LinkInfo> {
        self.index
            .get(code.as_str())
            .map(|binding| binding.info_at(self.clock.now()))
    }

    /// Number of codes in the index, expired ones included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogWriter {
    fn append(&mut self, line: &[u8], sync_mode: SyncMode) -> io::Result<()> {
        self.file.write_all(line)?;
        self.file.flush()?;
        if sync_mode == SyncMode::Fsync {
            self.file.sync_data()?;
        }
        Ok(())
    }
}

/// [`LinkRepository`] backed by a [`LinkLog`].
///
/// Appends run on the blocking thread pool; lookups are served from the
/// index directly. Cloning shares the same log.
pub struct LogRepository<C: Clock = SystemClock> {
    log: Arc<LinkLog<C>>,
}

impl LogRepository<SystemClock> {
    /// Opens the log at `path` with default options and the system clock.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(LinkLog::open(path)?))
    }
}

impl<C: Clock> LogRepository<C> {
    pub fn new(log: LinkLog<C>) -> Self {
        Self { log: Arc::new(log) }
    }

    /// Returns a reference to the underlying log.
    pub fn log(&self) -> &LinkLog<C> {
        &self.log
    }
}

impl<C: Clock> Clone for LogRepository<C> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
        }
    }
}

#[async_trait]
impl<C: Clock> LinkRepository for LogRepository<C> {
    async fn save(
        &self,
        code: &ShortCode,
        url: &str,
        ttl_seconds: Option<NonZeroU64>,
    ) -> Result<()> {
        let log = Arc::clone(&self.log);
        let code = code.clone();
        let url = url.to_owned();

        tokio::task::spawn_blocking(move || log.save(&code, &url, ttl_seconds))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }

    async fn fetch(&self, code: &ShortCode) -> Result<Option<String>> {
        Ok(self.log.fetch(code))
    }

    async fn peek(&self, code: &ShortCode) -> Result<Option<LinkInfo>> {
        Ok(self.log.peek(code))
    }
}
