use anyhow::Result;
use async_trait::async_trait;
use converter_external::core::random::{RANDOM_MAX, RANDOM_MIN};
use converter_external::domain::model::{Empty, RandomNumberResponse};
use converter_external::rpc::codec::{self, RequestFrame, ResponseFrame};
use converter_external::rpc::{
    run_client_loop, Code, ExternalConverterService, RpcChannel, ServerState, Status,
};
use converter_external::{
    ConverterError, ExternalConverterClient, RandomNumberListener, RpcServer, ServerConfig,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

fn test_config() -> ServerConfig {
    ServerConfig {
        address: "127.0.0.1:0".to_string(),
        max_workers: 1,
        grace_period: Duration::from_secs(2),
        heartbeat: Duration::from_secs(60),
    }
}

struct RunningServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<converter_external::Result<()>>,
    state: tokio::sync::watch::Receiver<ServerState>,
}

async fn start_server<S: ExternalConverterService>(service: S, config: ServerConfig) -> RunningServer {
    let server = RpcServer::bind(service, config).await.unwrap();
    let addr = server.local_addr().unwrap();
    let state = server.state();
    let (shutdown, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(server.serve_with_shutdown(async {
        let _ = rx.await;
    }));

    RunningServer {
        addr,
        shutdown,
        handle,
        state,
    }
}

#[tokio::test]
async fn test_end_to_end_prints_one_line_per_call() -> Result<()> {
    let server = start_server(RandomNumberListener, test_config()).await;

    let mut client = ExternalConverterClient::connect(server.addr).await?;
    let mut output = Vec::new();
    let completed = run_client_loop(&mut client, 25, &mut output).await?;

    assert_eq!(completed, 25);
    let text = String::from_utf8(output)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 25);

    for (index, line) in lines.iter().enumerate() {
        let prefix = format!("index {} Received random number: ", index);
        assert!(line.starts_with(&prefix), "unexpected line: {}", line);
        let value: i32 = line[prefix.len()..].parse()?;
        assert!((RANDOM_MIN..=RANDOM_MAX).contains(&value));
    }

    drop(client);
    server.shutdown.send(()).ok();
    server.handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_repeated_calls_stay_in_range() -> Result<()> {
    let server = start_server(RandomNumberListener, test_config()).await;
    let mut client = ExternalConverterClient::connect(server.addr).await?;

    for _ in 0..500 {
        let response = client.get_random_number(Empty {}).await?;
        assert!((RANDOM_MIN..=RANDOM_MAX).contains(&response.random_number));
    }

    server.shutdown.send(()).ok();
    server.handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_unknown_method_returns_unimplemented() -> Result<()> {
    let server = start_server(RandomNumberListener, test_config()).await;
    let mut channel = RpcChannel::connect(server.addr).await?;

    let result: converter_external::Result<RandomNumberResponse> = channel
        .unary("ExternalConverterService/Convert", &Empty {})
        .await;

    match result {
        Err(ConverterError::RpcError(status)) => assert_eq!(status.code, Code::Unimplemented),
        other => panic!("expected Unimplemented, got {:?}", other),
    }

    // 連線仍可繼續使用
    let response: RandomNumberResponse = channel
        .unary("ExternalConverterService/GetRandomNumber", &Empty {})
        .await?;
    assert!((RANDOM_MIN..=RANDOM_MAX).contains(&response.random_number));

    server.shutdown.send(()).ok();
    server.handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_malformed_frame_gets_invalid_argument() -> Result<()> {
    let server = start_server(RandomNumberListener, test_config()).await;

    let stream = TcpStream::connect(server.addr).await?;
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    tokio::io::AsyncWriteExt::write_all(&mut writer, b"this is not json\n").await?;
    let response: ResponseFrame = codec::read_frame(&mut reader).await?.unwrap();
    assert_eq!(response.error.unwrap().code, Code::InvalidArgument);

    let request = RequestFrame {
        id: 9,
        method: "ExternalConverterService/GetRandomNumber".to_string(),
        payload: serde_json::json!({}),
    };
    codec::write_frame(&mut writer, &request).await?;
    let response: ResponseFrame = codec::read_frame(&mut reader).await?.unwrap();
    assert_eq!(response.id, 9);
    assert!(response.result.is_some());

    server.shutdown.send(()).ok();
    server.handle.await??;
    Ok(())
}

/// Holds every call for a fixed delay so shutdown can be observed mid-call.
struct SlowService {
    delay: Duration,
}

#[async_trait]
impl ExternalConverterService for SlowService {
    async fn get_random_number(&self, _request: Empty) -> Result<RandomNumberResponse, Status> {
        tokio::time::sleep(self.delay).await;
        Ok(RandomNumberResponse { random_number: 7 })
    }
}

#[tokio::test]
async fn test_shutdown_stops_accepting_and_reports_stopped() -> Result<()> {
    let server = start_server(RandomNumberListener, test_config()).await;
    let mut state = server.state.clone();
    assert_eq!(*state.borrow(), ServerState::Serving);

    // 閒置中的連線不應拖延關閉
    let idle = TcpStream::connect(server.addr).await?;

    server.shutdown.send(()).ok();
    tokio::time::timeout(Duration::from_secs(2), server.handle).await???;

    state.changed().await.ok();
    assert_eq!(*state.borrow(), ServerState::Stopped);
    assert!(TcpStream::connect(server.addr).await.is_err());

    drop(idle);
    Ok(())
}

#[tokio::test]
async fn test_in_flight_call_completes_within_grace_period() -> Result<()> {
    let server = start_server(
        SlowService {
            delay: Duration::from_millis(300),
        },
        test_config(),
    )
    .await;

    let mut client = ExternalConverterClient::connect(server.addr).await?;
    let call = tokio::spawn(async move { client.get_random_number(Empty {}).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    server.shutdown.send(()).ok();

    let response = call.await??;
    assert_eq!(response.random_number, 7);
    tokio::time::timeout(Duration::from_secs(2), server.handle).await???;
    Ok(())
}

#[tokio::test]
async fn test_calls_beyond_grace_period_are_aborted() -> Result<()> {
    let config = ServerConfig {
        grace_period: Duration::from_millis(200),
        ..test_config()
    };
    let server = start_server(
        SlowService {
            delay: Duration::from_secs(30),
        },
        config,
    )
    .await;

    let mut client = ExternalConverterClient::connect(server.addr).await?;
    let call = tokio::spawn(async move { client.get_random_number(Empty {}).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let started = std::time::Instant::now();
    server.shutdown.send(()).ok();

    tokio::time::timeout(Duration::from_secs(5), server.handle).await???;
    assert!(started.elapsed() < Duration::from_secs(5));

    let result = call.await?;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_single_worker_serializes_calls() -> Result<()> {
    let delay = Duration::from_millis(200);
    let server = start_server(SlowService { delay }, test_config()).await;

    let mut first = ExternalConverterClient::connect(server.addr).await?;
    let mut second = ExternalConverterClient::connect(server.addr).await?;

    let started = std::time::Instant::now();
    let (a, b) = tokio::join!(
        first.get_random_number(Empty {}),
        second.get_random_number(Empty {})
    );
    a?;
    b?;

    assert!(started.elapsed() >= delay * 2);

    server.shutdown.send(()).ok();
    server.handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_client_loop_stops_at_first_failure() -> Result<()> {
    let server = start_server(RandomNumberListener, test_config()).await;
    let mut client = ExternalConverterClient::connect(server.addr).await?;

    server.shutdown.send(()).ok();
    server.handle.await??;

    let mut output = Vec::new();
    let result = run_client_loop(&mut client, 10, &mut output).await;

    assert!(result.is_err());
    assert!(output.is_empty());
    Ok(())
}
