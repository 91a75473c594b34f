//! Newline-delimited JSON framing.
//!
//! Every frame is one JSON object on its own line. A request carries a
//! caller-chosen `id`, the fully-qualified method name and the encoded
//! request message; the response echoes the `id` and holds either `result`
//! or `error`.
//!
//! This is not gRPC: a protobuf/HTTP2 client cannot talk to this server.
//! Callers use `ExternalConverterClient` or speak the framing above.

use crate::rpc::status::Status;
use crate::utils::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAX_FRAME_LEN: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFrame {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFrame {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
}

impl ResponseFrame {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: u64, status: Status) -> Self {
        Self {
            id,
            result: None,
            error: Some(status),
        }
    }

    pub fn into_result(self) -> std::result::Result<Value, Status> {
        match (self.error, self.result) {
            (Some(status), _) => Err(status),
            (None, Some(result)) => Ok(result),
            (None, None) => Err(Status::internal("response carries neither result nor error")),
        }
    }
}

/// Reads one frame. `Ok(None)` means the peer closed the stream between frames.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    // 上限不含結尾換行
    let mut line = String::new();
    let read = (&mut *reader)
        .take(MAX_FRAME_LEN as u64 + 2)
        .read_line(&mut line)
        .await?;

    if read == 0 {
        return Ok(None);
    }

    let frame_len = line.strip_suffix('\n').unwrap_or(&line).len();
    if frame_len > MAX_FRAME_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("frame exceeds {} bytes", MAX_FRAME_LEN),
        )
        .into());
    }

    let frame = serde_json::from_str(line.trim_end())?;
    Ok(Some(frame))
}

pub async fn write_frame<W, T>(writer: &mut W, frame: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut bytes = serde_json::to_vec(frame)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}
