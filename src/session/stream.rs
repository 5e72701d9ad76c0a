//! Tokio-backed [`Session`] over any byte stream.
//!
//! [`StreamSession`] adapts an [`AsyncRead`] + [`AsyncWrite`] transport
//! (a TCP socket, a duplex pipe) to the callback-driven session surface.
//! Asynchronous transfers run on a spawned task; synchronous transfers
//! block the calling context until the transfer finishes, while still
//! delivering the result through the completion callback.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Instant,
};

use bytes::{Bytes, BytesMut};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf},
    sync::Mutex,
};
use tracing::debug;

use super::{ReadCallback, Session, SessionId, WriteCallback};

/// Process-wide source of session identifiers.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Callback-driven session over a tokio byte stream.
///
/// Synchronous transfers are driven with a local executor, so the
/// surrounding tokio runtime must keep its reactor running on another
/// worker (a multi-threaded runtime). Asynchronous transfers are spawned
/// onto the ambient runtime.
pub struct StreamSession<T> {
    id: SessionId,
    open: AtomicBool,
    reader: Mutex<ReadHalf<T>>,
    writer: Mutex<WriteHalf<T>>,
}

impl<T> StreamSession<T>
where
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Wrap a byte stream in a new session with a fresh identifier.
    #[must_use]
    pub fn new(stream: T) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            id: SessionId::new(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)),
            open: AtomicBool::new(true),
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }

    /// Mark the session closed; pending resolutions observe it immediately.
    pub fn close(&self) { self.open.store(false, Ordering::Release); }

    fn mark_closed_on_error<V>(&self, result: &io::Result<V>) {
        if result.is_err() {
            self.close();
        }
    }

    async fn read_exact_into(
        &self,
        buf: &mut BytesMut,
        target_len: usize,
        deadline: Option<Instant>,
    ) -> io::Result<usize> {
        let start = buf.len();
        if target_len <= start {
            return Ok(0);
        }
        buf.resize(target_len, 0);
        let mut reader = self.reader.lock().await;
        let result = with_deadline(deadline, reader.read_exact(&mut buf[start..])).await;
        if result.is_err() {
            buf.truncate(start);
        }
        self.mark_closed_on_error(&result);
        result
    }

    async fn write_all_from(&self, src: &Bytes, deadline: Option<Instant>) -> io::Result<usize> {
        let mut writer = self.writer.lock().await;
        let result = with_deadline(deadline, writer.write_all(src)).await.map(|()| src.len());
        self.mark_closed_on_error(&result);
        result
    }
}

async fn with_deadline<V>(
    deadline: Option<Instant>,
    transfer: impl Future<Output = io::Result<V>>,
) -> io::Result<V> {
    match deadline {
        Some(at) => tokio::time::timeout_at(at.into(), transfer)
            .await
            .unwrap_or_else(|_| {
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "transfer deadline exceeded",
                ))
            }),
        None => transfer.await,
    }
}

impl<T> Session for StreamSession<T>
where
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    fn id(&self) -> SessionId { self.id }

    fn is_open(&self) -> bool { self.open.load(Ordering::Acquire) }

    fn read(
        self: Arc<Self>,
        sync: bool,
        mut buf: BytesMut,
        target_len: usize,
        deadline: Option<Instant>,
        on_complete: ReadCallback,
    ) {
        // The sync branch blocks on the transfer alone and invokes the
        // callback after the executor has exited, so a continuation that
        // issues a further sync operation never nests executors.
        if sync {
            let result =
                futures::executor::block_on(self.read_exact_into(&mut buf, target_len, deadline));
            debug!(session = %self.id, ?result, "read transfer finished");
            on_complete(result, buf);
        } else {
            tokio::spawn(async move {
                let result = self.read_exact_into(&mut buf, target_len, deadline).await;
                debug!(session = %self.id, ?result, "read transfer finished");
                on_complete(result, buf);
            });
        }
    }

    fn write(
        self: Arc<Self>,
        sync: bool,
        src: Bytes,
        deadline: Option<Instant>,
        on_complete: WriteCallback,
    ) {
        if sync {
            let result = futures::executor::block_on(self.write_all_from(&src, deadline));
            debug!(session = %self.id, ?result, "write transfer finished");
            on_complete(result);
        } else {
            tokio::spawn(async move {
                let result = self.write_all_from(&src, deadline).await;
                debug!(session = %self.id, ?result, "write transfer finished");
                on_complete(result);
            });
        }
    }
}
