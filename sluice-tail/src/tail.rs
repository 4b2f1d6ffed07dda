//! File tailing loop
//!
//! Copies bytes appended to a file into a sink by polling: read a chunk, relay
//! it, and sleep whenever the end of the file is reached. The loop stops when a
//! deferred interrupt is pending or, on an empty read, when the parent process
//! is gone. Both are normal stops, not errors.

use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::config::TailConfig;
use crate::interrupt::DeferredInterrupts;
use crate::orphan::{self, OrphanCheck};

/// Why a tail session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailOutcome {
    /// An interrupt was pending at the start of an iteration
    Interrupted,
    /// The file had no new data and the parent process was gone
    Orphaned,
}

/// A single tailing run over one file
///
/// The read cursor is the file handle's own position, so every byte is read
/// exactly once no matter how reads interleave with the writer.
pub struct TailSession<W, R = File> {
    path: PathBuf,
    source: R,
    sink: W,
    orphan_check: Option<Box<dyn OrphanCheck>>,
    interrupts: DeferredInterrupts,
    config: TailConfig,
    bytes_written: u64,
}

impl<W> TailSession<W, File>
where
    W: AsyncWrite + Unpin,
{
    /// Opens `path` for reading from its beginning
    ///
    /// # Errors
    /// Any error opening the file is returned as-is
    pub async fn open(
        path: impl AsRef<Path>,
        sink: W,
        interrupts: DeferredInterrupts,
        config: TailConfig,
    ) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await?;

        Ok(Self::from_reader(path, file, sink, interrupts, config))
    }
}

impl<W, R> TailSession<W, R>
where
    W: AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    /// Builds a session over an already opened source
    pub fn from_reader(
        path: PathBuf,
        source: R,
        sink: W,
        interrupts: DeferredInterrupts,
        config: TailConfig,
    ) -> Self {
        Self {
            path,
            source,
            sink,
            orphan_check: None,
            interrupts,
            config,
            bytes_written: 0,
        }
    }

    /// Stop once `check` reports the parent gone
    pub fn with_orphan_check(mut self, check: Box<dyn OrphanCheck>) -> Self {
        self.orphan_check = Some(check);
        self
    }

    /// Track `parent_pid` with the platform's preferred orphan check
    pub fn with_parent_pid(self, parent_pid: u32) -> Self {
        self.with_orphan_check(orphan::for_parent(parent_pid))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total bytes relayed to the sink so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn into_sink(self) -> W {
        self.sink
    }

    /// Relays new data until interrupted or orphaned
    ///
    /// Interrupts are only honored between iterations, so a chunk that was read
    /// is always written and flushed in full.
    pub async fn run(&mut self) -> std::io::Result<TailOutcome> {
        let mut buffer = vec![0u8; self.config.chunk_size];

        debug!(
            "Tailing {} (chunk size {}, poll interval {:?})",
            self.path.display(),
            self.config.chunk_size,
            self.config.poll_interval
        );

        loop {
            if self.interrupts.pop() {
                info!("Got an interrupt, stopping tail of {}", self.path.display());
                return Ok(TailOutcome::Interrupted);
            }

            let n = self.source.read(&mut buffer).await?;

            if n > 0 {
                self.sink.write_all(&buffer[..n]).await?;
                self.sink.flush().await?;
                self.bytes_written += n as u64;
                continue;
            }

            if let Some(check) = &self.orphan_check {
                if check.is_orphaned() {
                    info!(
                        "Current process is orphaned, stopping tail of {}",
                        self.path.display()
                    );
                    return Ok(TailOutcome::Orphaned);
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
