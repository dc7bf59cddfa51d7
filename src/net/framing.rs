//! Frames for the lobby statistics protocol
//!
//! Each frame is a 4-byte little-endian payload length followed by one JSON
//! message from [`crate::net::protocol`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest payload accepted in either direction
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Framing errors on the lobby connection
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    #[error("Lobby service closed the connection")]
    ConnectionClosed,
    #[error("Frame of {0} bytes exceeds the {max} byte limit", max = MAX_FRAME_LEN)]
    FrameTooLarge(usize),
    #[error("Frame is not a lobby message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Socket error: {0}")]
    Io(#[from] io::Error),
}

/// Fill `buf`, treating a short read as the peer hanging up
async fn fill<R: AsyncRead + Unpin>(stream: &mut R, buf: &mut [u8]) -> Result<(), FramingError> {
    match stream.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(FramingError::ConnectionClosed),
        Err(e) => Err(FramingError::Io(e)),
    }
}

/// Read one frame's payload
pub async fn read_frame<R: AsyncRead + Unpin>(stream: &mut R) -> Result<Vec<u8>, FramingError> {
    let mut header = [0u8; 4];
    fill(stream, &mut header).await?;

    let len = u32::from_le_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(FramingError::FrameTooLarge(len));
    }

    let mut payload = vec![0u8; len];
    fill(stream, &mut payload).await?;
    Ok(payload)
}

/// Write `payload` as one frame (header and body in a single write)
pub async fn write_frame<W: AsyncWrite + Unpin>(
    stream: &mut W,
    payload: &[u8],
) -> Result<(), FramingError> {
    if payload.len() > MAX_FRAME_LEN {
        return Err(FramingError::FrameTooLarge(payload.len()));
    }

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(payload);

    stream.write_all(&frame).await?;
    stream.flush().await?;
    Ok(())
}

/// Read one frame and decode it as JSON
pub async fn read_json<T, R>(stream: &mut R) -> Result<T, FramingError>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    let payload = read_frame(stream).await?;
    Ok(serde_json::from_slice(&payload)?)
}

/// Encode `value` as JSON and write it as one frame
pub async fn write_json<T, W>(stream: &mut W, value: &T) -> Result<(), FramingError>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_vec(value)?;
    write_frame(stream, &payload).await
}
