use tokio::io::DuplexStream;

use crate::machine::Role;
use crate::transport::{BoxedReader, BoxedWriter, Transport};

const PIPE_CAPACITY: usize = 64 * 1024;

/// One end of an in-process byte pipe.
pub struct InMemoryTransport {
    stream: DuplexStream,
    role: Role,
}

impl InMemoryTransport {
    /// Two connected ends. The first plays the host.
    pub fn pair() -> (Self, Self) {
        let (a, b) = tokio::io::duplex(PIPE_CAPACITY);
        (
            Self {
                stream: a,
                role: Role::Host,
            },
            Self {
                stream: b,
                role: Role::Guest,
            },
        )
    }
}

#[async_trait::async_trait]
impl Transport for InMemoryTransport {
    async fn open(self: Box<Self>) -> anyhow::Result<(BoxedReader, BoxedWriter)> {
        let (reader, writer) = tokio::io::split(self.stream);
        Ok((Box::new(reader), Box::new(writer)))
    }

    fn role(&self) -> Role {
        self.role
    }
}
