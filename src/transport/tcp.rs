use std::net::SocketAddr;

use log::{debug, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, Duration};

use crate::machine::Role;
use crate::transport::{BoxedReader, BoxedWriter, Transport};

/// Connection attempts made by [`TcpTransport::connect`] before giving up.
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 10;

/// Pause between two connection attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

enum Endpoint {
    Listen(TcpListener),
    Connect {
        addr: String,
        attempts: u32,
        delay: Duration,
    },
    Connected(TcpStream, Role),
}

/// TCP transport. A listening transport accepts exactly one peer.
pub struct TcpTransport {
    endpoint: Endpoint,
}

impl TcpTransport {
    /// Bind `addr` now; the peer is accepted when the transport is opened.
    pub async fn listen(addr: &str) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("listening on {}", listener.local_addr()?);
        Ok(Self {
            endpoint: Endpoint::Listen(listener),
        })
    }

    /// Connect to `addr` when opened, retrying while nobody listens yet.
    pub fn connect(addr: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::Connect {
                addr: addr.into(),
                attempts: DEFAULT_CONNECT_ATTEMPTS,
                delay: DEFAULT_RETRY_DELAY,
            },
        }
    }

    /// Change the retry policy of a connecting transport.
    pub fn with_retries(mut self, attempts: u32, delay: Duration) -> Self {
        if let Endpoint::Connect {
            attempts: a,
            delay: d,
            ..
        } = &mut self.endpoint
        {
            *a = attempts.max(1);
            *d = delay;
        }
        self
    }

    /// Wrap an already established stream.
    pub fn from_stream(stream: TcpStream, role: Role) -> Self {
        Self {
            endpoint: Endpoint::Connected(stream, role),
        }
    }

    /// Address a listening transport is bound to.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        match &self.endpoint {
            Endpoint::Listen(listener) => Ok(listener.local_addr()?),
            Endpoint::Connected(stream, _) => Ok(stream.local_addr()?),
            Endpoint::Connect { .. } => Err(anyhow::anyhow!("transport is not connected yet")),
        }
    }
}

async fn connect_with_retry(addr: &str, attempts: u32, delay: Duration) -> anyhow::Result<TcpStream> {
    let mut attempt = 1;
    loop {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) if attempt < attempts => {
                debug!("connect to {} failed ({}), attempt {}/{}", addr, e, attempt, attempts);
                attempt += 1;
                sleep(delay).await;
            }
            Err(e) => {
                warn!("giving up on {} after {} attempts", addr, attempts);
                return Err(anyhow::anyhow!("could not connect to {}: {}", addr, e));
            }
        }
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn open(self: Box<Self>) -> anyhow::Result<(BoxedReader, BoxedWriter)> {
        let stream = match self.endpoint {
            Endpoint::Listen(listener) => {
                let (stream, peer) = listener.accept().await?;
                info!("accepted connection from {}", peer);
                // listener dropped here: one peer per game
                stream
            }
            Endpoint::Connect {
                addr,
                attempts,
                delay,
            } => {
                let stream = connect_with_retry(&addr, attempts, delay).await?;
                info!("connected to {}", addr);
                stream
            }
            Endpoint::Connected(stream, _) => stream,
        };
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        Ok((Box::new(reader), Box::new(writer)))
    }

    fn role(&self) -> Role {
        match &self.endpoint {
            Endpoint::Listen(_) => Role::Host,
            Endpoint::Connect { .. } => Role::Guest,
            Endpoint::Connected(_, role) => *role,
        }
    }
}
