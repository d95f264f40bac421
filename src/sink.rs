use std::future::Future;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Same default high-water mark as a buffered writable stream.
pub const DEFAULT_HIGH_WATER_MARK: usize = 16 * 1024;

/// Trait which defines how serialized lines are handed to an output with its own flow control
pub trait LineSink {
    /// Queues one line. The line is always taken; the returned flag tells the
    /// writer whether it may keep writing (`true`) or has to wait for `drained`.
    fn write_line(&mut self, line: &str) -> std::io::Result<bool>;

    /// Resolves once the backed up data has been flushed and writes are accepted again.
    fn drained(&mut self) -> impl Future<Output = std::io::Result<()>>;

    /// Flushes everything still queued.
    fn finish(&mut self) -> impl Future<Output = std::io::Result<()>>;
}

/// Buffers lines in memory and signals saturation once the buffer reaches the high-water mark.
pub struct TsvFileSink<W> {
    inner: W,
    buffer: Vec<u8>,
    high_water_mark: usize,
}

impl TsvFileSink<File> {
    pub async fn create(path: impl AsRef<Path>, high_water_mark: usize) -> std::io::Result<Self> {
        let file = File::create(path).await?;
        Ok(TsvFileSink::new(file, high_water_mark))
    }
}

impl<W> TsvFileSink<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(inner: W, high_water_mark: usize) -> Self {
        TsvFileSink {
            inner,
            buffer: Vec::with_capacity(high_water_mark),
            high_water_mark: high_water_mark.max(1),
        }
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    async fn flush_buffer(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            trace!("flushing {} buffered bytes", self.buffer.len());
            self.inner.write_all(&self.buffer).await?;
            self.buffer.clear();
        }
        Ok(())
    }
}

impl<W> LineSink for TsvFileSink<W>
where
    W: AsyncWrite + Unpin,
{
    fn write_line(&mut self, line: &str) -> std::io::Result<bool> {
        self.buffer.extend_from_slice(line.as_bytes());
        Ok(self.buffer.len() < self.high_water_mark)
    }

    async fn drained(&mut self) -> std::io::Result<()> {
        self.flush_buffer().await
    }

    async fn finish(&mut self) -> std::io::Result<()> {
        self.flush_buffer().await?;
        self.inner.flush().await?;
        self.inner.shutdown().await
    }
}
