//! Byte-stream transports a session can run over.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::machine::Role;

pub mod in_memory;
pub mod tcp;

pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Something that can produce one ordered, reliable duplex byte stream.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Establish the connection and split it into its read and write halves.
    async fn open(self: Box<Self>) -> anyhow::Result<(BoxedReader, BoxedWriter)>;

    /// Which end of the connection this transport is.
    fn role(&self) -> Role;
}
