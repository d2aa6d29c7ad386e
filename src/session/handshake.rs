use log::info;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::MAX_STRING_LEN;
use crate::protocol::stream::{FrameReader, FrameWriter};
use crate::protocol::ProtocolError;

/// Send our name, then wait for the peer's.
///
/// Both sides write before they read, so the exchange cannot deadlock.
/// Any failure ends the session before the first frame.
pub(crate) async fn exchange_names<R, W>(
    reader: &mut FrameReader<R>,
    writer: &mut FrameWriter<W>,
    self_name: &str,
) -> Result<String, ProtocolError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if self_name.len() > MAX_STRING_LEN {
        return Err(ProtocolError::HandshakeFailed(format!(
            "name is {} bytes long, at most {} fit",
            self_name.len(),
            MAX_STRING_LEN
        )));
    }
    writer
        .write_string(self_name)
        .await
        .map_err(|e| ProtocolError::HandshakeFailed(format!("could not send name: {}", e)))?;
    let peer_name = reader
        .read_string()
        .await
        .map_err(|e| ProtocolError::HandshakeFailed(format!("could not read peer name: {}", e)))?;
    info!("handshake complete, playing against {:?}", peer_name);
    Ok(peer_name)
}
