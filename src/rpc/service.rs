use crate::domain::model::{Empty, RandomNumberResponse};
use crate::rpc::client::RpcChannel;
use crate::rpc::status::Status;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::net::ToSocketAddrs;

pub const SERVICE_NAME: &str = "ExternalConverterService";
pub const GET_RANDOM_NUMBER: &str = "ExternalConverterService/GetRandomNumber";

/// Server side of `ExternalConverterService`.
#[async_trait]
pub trait ExternalConverterService: Send + Sync + 'static {
    async fn get_random_number(
        &self,
        request: Empty,
    ) -> std::result::Result<RandomNumberResponse, Status>;
}

/// Decodes `payload` for `method`, invokes the service and encodes its reply.
pub async fn route<S>(
    service: &S,
    method: &str,
    payload: Value,
) -> std::result::Result<Value, Status>
where
    S: ExternalConverterService + ?Sized,
{
    match method {
        GET_RANDOM_NUMBER => {
            let request: Empty = decode(payload)?;
            let response = service.get_random_number(request).await?;
            encode(&response)
        }
        other => Err(Status::unimplemented(format!(
            "{} has no method {}",
            SERVICE_NAME, other
        ))),
    }
}

fn decode<T: DeserializeOwned>(payload: Value) -> std::result::Result<T, Status> {
    // 空請求可能以 null 傳送
    let payload = if payload.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        payload
    };
    serde_json::from_value(payload)
        .map_err(|e| Status::invalid_argument(format!("invalid request payload: {}", e)))
}

fn encode<T: Serialize>(response: &T) -> std::result::Result<Value, Status> {
    serde_json::to_value(response)
        .map_err(|e| Status::internal(format!("failed to encode response: {}", e)))
}

/// Typed client stub for `ExternalConverterService`.
pub struct ExternalConverterClient {
    channel: RpcChannel,
}

impl ExternalConverterClient {
    pub fn new(channel: RpcChannel) -> Self {
        Self { channel }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        Ok(Self::new(RpcChannel::connect(addr).await?))
    }

    pub async fn get_random_number(&mut self, request: Empty) -> Result<RandomNumberResponse> {
        self.channel.unary(GET_RANDOM_NUMBER, &request).await
    }
}
