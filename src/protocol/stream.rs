//! Async framing over a byte stream.
//!
//! [`FrameReader`] buffers whatever the stream delivers and hands out one
//! decoded message at a time; [`FrameWriter`] writes each outbound burst with a
//! single `write_all` followed by a flush.

use std::time::Duration;

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::{codec, Message, ProtocolError};

const READ_CHUNK: usize = 4096;

fn closed(e: std::io::Error) -> ProtocolError {
    debug!("stream i/o error: {}", e);
    ProtocolError::TransportClosed
}

pub struct FrameReader<R> {
    inner: R,
    buf: Vec<u8>,
    timeout: Option<Duration>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_timeout(inner, None)
    }

    /// Reader whose every underlying read gives up after `timeout`.
    pub fn with_timeout(inner: R, timeout: Option<Duration>) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(READ_CHUNK),
            timeout,
        }
    }

    /// Wait for the next complete frame.
    ///
    /// Cancel safe: bytes already received stay buffered for the next call.
    pub async fn read_message(&mut self) -> Result<Message, ProtocolError> {
        loop {
            if let Some((msg, used)) = codec::decode(&self.buf)? {
                self.buf.drain(..used);
                return Ok(msg);
            }
            self.fill().await?;
        }
    }

    /// Wait for one bare length-prefixed string.
    pub async fn read_string(&mut self) -> Result<String, ProtocolError> {
        loop {
            if let Some((text, used)) = codec::decode_string(&self.buf)? {
                self.buf.drain(..used);
                return Ok(text);
            }
            self.fill().await?;
        }
    }

    async fn fill(&mut self) -> Result<(), ProtocolError> {
        let mut chunk = [0u8; READ_CHUNK];
        let read = self.inner.read(&mut chunk);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, read).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("no data from peer for {:?}, giving up", limit);
                    return Err(ProtocolError::TransportClosed);
                }
            },
            None => read.await,
        };
        let n = result.map_err(closed)?;
        if n == 0 {
            if !self.buf.is_empty() {
                debug!("stream ended mid-frame with {} bytes pending", self.buf.len());
            }
            return Err(ProtocolError::TransportClosed);
        }
        self.buf.extend_from_slice(&chunk[..n]);
        Ok(())
    }
}

pub struct FrameWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write `msgs` back to back, in order, as one buffer.
    pub async fn send_all(&mut self, msgs: &[Message]) -> Result<(), ProtocolError> {
        if msgs.is_empty() {
            return Ok(());
        }
        let mut buf = Vec::new();
        for msg in msgs {
            codec::encode_into(msg, &mut buf);
        }
        self.write(&buf).await
    }

    pub async fn send(&mut self, msg: &Message) -> Result<(), ProtocolError> {
        self.write(&codec::encode(msg)).await
    }

    /// Write one bare length-prefixed string.
    pub async fn write_string(&mut self, text: &str) -> Result<(), ProtocolError> {
        let mut buf = Vec::with_capacity(text.len() + 2);
        codec::encode_string(text, &mut buf);
        self.write(&buf).await
    }

    pub async fn shutdown(&mut self) -> Result<(), ProtocolError> {
        self.inner.shutdown().await.map_err(closed)
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        self.inner.write_all(bytes).await.map_err(closed)?;
        self.inner.flush().await.map_err(closed)
    }
}
