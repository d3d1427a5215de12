//! Readers handed out by the cache
//!
//! Buffered content is read straight from memory. Streamed content flows
//! through a bounded in-process pipe filled by a background copy task that
//! owns the source file and the sending side of the pipe.

use bytes::{Bytes, BytesMut};
use std::io::{self, Cursor};
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::error::FileCacheError;

/// Uniform reader over cached or streamed file content
#[derive(Debug)]
pub enum ContentReader {
    /// View over bytes held by the cache
    Buffered(Cursor<Bytes>),
    /// Read side of a streaming pipe
    Streamed(StreamReader),
}

impl ContentReader {
    pub(crate) fn buffered(data: Bytes) -> Self {
        Self::Buffered(Cursor::new(data))
    }

    pub fn is_streamed(&self) -> bool {
        matches!(self, Self::Streamed(_))
    }

    /// Drain the reader into memory
    pub async fn read_to_vec(mut self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.read_to_end(&mut out).await?;
        Ok(out)
    }
}

impl AsyncRead for ContentReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Buffered(cursor) => Pin::new(cursor).poll_read(cx, buf),
            Self::Streamed(reader) => Pin::new(reader).poll_read(cx, buf),
        }
    }
}

/// Receiving side of a streaming pipe
#[derive(Debug)]
pub struct StreamReader {
    rx: mpsc::Receiver<io::Result<Bytes>>,
    chunk: Bytes,
    done: bool,
}

impl StreamReader {
    fn new(rx: mpsc::Receiver<io::Result<Bytes>>) -> Self {
        Self {
            rx,
            chunk: Bytes::new(),
            done: false,
        }
    }
}

impl AsyncRead for StreamReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        loop {
            if !this.chunk.is_empty() {
                let n = this.chunk.len().min(buf.remaining());
                buf.put_slice(&this.chunk.split_to(n));
                return Poll::Ready(Ok(()));
            }
            if this.done {
                return Poll::Ready(Ok(()));
            }
            match ready!(this.rx.poll_recv(cx)) {
                Some(Ok(chunk)) => this.chunk = chunk,
                Some(Err(e)) => {
                    this.done = true;
                    return Poll::Ready(Err(e));
                }
                // Sender gone: copy finished or was cancelled
                None => {
                    this.done = true;
                    return Poll::Ready(Ok(()));
                }
            }
        }
    }
}

/// Cancellation handle for an in-flight streaming copy.
///
/// Dropping the handle detaches it; the copy keeps running until the reader
/// drains or is dropped.
#[derive(Debug)]
pub struct StreamHandle {
    path: PathBuf,
    task: JoinHandle<()>,
}

impl StreamHandle {
    /// Abort the copy. The source file is closed and the reader sees
    /// end-of-stream after any chunks already in the pipe.
    ///
    /// That end-of-stream is a plain EOF: the reader cannot tell a cancelled
    /// stream from a completed one. Takes `&self` so the caller can still
    /// [`join`](Self::join) the task afterwards.
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            debug!("STREAM cancel path={}", self.path.display());
        }
        self.task.abort();
    }

    /// Whether the copy task has terminated
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the copy task has terminated, whether it completed or was
    /// cancelled
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                warn!("STREAM task failed path={}: {}", self.path.display(), e);
            }
        }
    }
}

/// Start copying `file` into a new pipe on a background task
pub(crate) fn spawn_copy(
    path: PathBuf,
    file: File,
    chunk_size: usize,
    capacity: usize,
) -> (StreamReader, StreamHandle) {
    let (tx, rx) = mpsc::channel(capacity);
    let task = tokio::spawn(copy_file(path.clone(), file, tx, chunk_size));
    (StreamReader::new(rx), StreamHandle { path, task })
}

async fn copy_file(
    path: PathBuf,
    mut file: File,
    tx: mpsc::Sender<io::Result<Bytes>>,
    chunk_size: usize,
) {
    let mut copied: u64 = 0;
    loop {
        let mut buf = BytesMut::with_capacity(chunk_size);
        match file.read_buf(&mut buf).await {
            Ok(0) => {
                debug!("STREAM done path={}, bytes={}", path.display(), copied);
                break;
            }
            Ok(n) => {
                copied += n as u64;
                if tx.send(Ok(buf.freeze())).await.is_err() {
                    debug!(
                        "STREAM reader dropped path={}, bytes={}",
                        path.display(),
                        copied
                    );
                    break;
                }
            }
            Err(e) => {
                warn!(
                    "STREAM copy aborted path={}, bytes={}: {}",
                    path.display(),
                    copied,
                    e
                );
                let err = FileCacheError::CopyAborted {
                    path: path.clone(),
                    source: e,
                };
                let _ = tx.send(Err(err.into_io_error())).await;
                break;
            }
        }
    }
}
