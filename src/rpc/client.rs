use crate::domain::model::Empty;
use crate::rpc::codec::{self, RequestFrame, ResponseFrame};
use crate::rpc::service::ExternalConverterClient;
use crate::rpc::status::Status;
use crate::utils::error::{ConverterError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

/// A single connection that issues unary calls one at a time.
pub struct RpcChannel {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    next_id: u64,
}

impl RpcChannel {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        tracing::debug!("Connected to {}", peer);

        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
            next_id: 0,
        })
    }

    pub async fn unary<Req, Resp>(&mut self, method: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        self.next_id += 1;
        let id = self.next_id;

        let frame = RequestFrame {
            id,
            method: method.to_string(),
            payload: serde_json::to_value(request)?,
        };
        codec::write_frame(&mut self.writer, &frame).await?;

        let response: ResponseFrame = codec::read_frame(&mut self.reader)
            .await?
            .ok_or(ConverterError::ConnectionClosed)?;

        // 無法解析的請求會以 id 0 回覆錯誤
        let unparsed_request = response.id == 0 && response.error.is_some();
        if response.id != id && !unparsed_request {
            return Err(Status::internal(format!(
                "response id {} does not match request id {}",
                response.id, id
            ))
            .into());
        }

        let value = response.into_result()?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Calls `GetRandomNumber` `iterations` times in sequence, writing one line per result to `out`.
///
/// The first failed call is logged and ends the loop; nothing is retried.
/// Returns the number of completed calls.
pub async fn run_client_loop<W: Write>(
    client: &mut ExternalConverterClient,
    iterations: usize,
    out: &mut W,
) -> Result<usize> {
    for index in 0..iterations {
        match client.get_random_number(Empty {}).await {
            Ok(response) => {
                writeln!(
                    out,
                    "index {} Received random number: {}",
                    index, response.random_number
                )?;
            }
            Err(e) => {
                tracing::error!("❌ GetRandomNumber failed at index {}: {}", index, e);
                return Err(e);
            }
        }
    }
    Ok(iterations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RandomNumberResponse;
    use crate::rpc::status::Code;
    use tokio::net::TcpListener;

    /// Accepts one connection, reads one request and answers with `reply`.
    async fn scripted_server(reply: ResponseFrame) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut reader = BufReader::new(reader);
            let _request: Option<RequestFrame> = codec::read_frame(&mut reader).await.unwrap();
            codec::write_frame(&mut writer, &reply).await.unwrap();
            // 保持連線直到客戶端讀完回覆
            let _: Option<RequestFrame> = codec::read_frame(&mut reader).await.unwrap_or(None);
        });

        addr
    }

    #[tokio::test]
    async fn test_error_for_another_call_is_rejected() {
        let addr = scripted_server(ResponseFrame::failure(
            99,
            Status::unavailable("meant for call 99"),
        ))
        .await;
        let mut channel = RpcChannel::connect(addr).await.unwrap();

        let result: Result<RandomNumberResponse> = channel
            .unary("ExternalConverterService/GetRandomNumber", &Empty {})
            .await;

        match result {
            Err(ConverterError::RpcError(status)) => {
                assert_eq!(status.code, Code::Internal);
                assert!(status.message.contains("does not match"));
            }
            other => panic!("expected id mismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparsed_request_error_is_surfaced() {
        let addr = scripted_server(ResponseFrame::failure(
            0,
            Status::invalid_argument("malformed frame"),
        ))
        .await;
        let mut channel = RpcChannel::connect(addr).await.unwrap();

        let result: Result<RandomNumberResponse> = channel
            .unary("ExternalConverterService/GetRandomNumber", &Empty {})
            .await;

        match result {
            Err(ConverterError::RpcError(status)) => {
                assert_eq!(status.code, Code::InvalidArgument);
            }
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_for_another_call_is_rejected() {
        let addr = scripted_server(ResponseFrame::success(
            5,
            serde_json::json!({"random_number": 3}),
        ))
        .await;
        let mut channel = RpcChannel::connect(addr).await.unwrap();

        let result: Result<RandomNumberResponse> = channel
            .unary("ExternalConverterService/GetRandomNumber", &Empty {})
            .await;

        assert!(matches!(result, Err(ConverterError::RpcError(_))));
    }
}
