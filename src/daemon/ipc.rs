//! Framing for daemon IPC
//!
//! Every frame is a little-endian `u32` length followed by a bincode (serde)
//! payload.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame either side accepts (1MB)
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = bincode::serde::encode_to_vec(value, bincode::config::standard())
        .context("Failed to serialize frame")?;

    let length = u32::try_from(payload.len()).context("Frame too large to encode")?;

    writer.write_all(&length.to_le_bytes()).await
        .context("Failed to write frame length")?;
    writer.write_all(&payload).await
        .context("Failed to write frame payload")?;
    writer.flush().await
        .context("Failed to flush frame")?;

    Ok(())
}

/// Read one frame; `Ok(None)` when the peer closed before sending one.
pub async fn read_frame<R, T>(reader: &mut R, max_size: usize) -> Result<Option<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut length_bytes = [0u8; 4];
    match reader.read_exact(&mut length_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e).context("Failed to read frame length"),
    }

    let length = u32::from_le_bytes(length_bytes) as usize;
    if length > max_size {
        return Err(anyhow::anyhow!(
            "Frame too large: {} bytes (max: {})",
            length,
            max_size
        ));
    }

    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).await
        .context("Failed to read frame payload")?;

    let (value, _): (T, usize) =
        bincode::serde::decode_from_slice(&payload, bincode::config::standard())
            .context("Failed to deserialize frame")?;

    Ok(Some(value))
}
