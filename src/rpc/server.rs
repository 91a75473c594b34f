use crate::config::ServerConfig;
use crate::rpc::codec::{self, RequestFrame, ResponseFrame};
use crate::rpc::service::{self, ExternalConverterService};
use crate::rpc::status::Status;
use crate::utils::error::{ConverterError, Result};
use crate::utils::validation::Validate;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Serving,
    Stopped,
}

/// TCP server for an `ExternalConverterService`.
///
/// Calls from all connections share a pool of `max_workers` permits, so with
/// the default of one they are handled strictly one after another.
pub struct RpcServer<S: ExternalConverterService> {
    listener: TcpListener,
    service: Arc<S>,
    config: ServerConfig,
    state: watch::Sender<ServerState>,
}

impl<S: ExternalConverterService> RpcServer<S> {
    pub async fn bind(service: S, config: ServerConfig) -> Result<Self> {
        // 心跳間隔與 worker 數必須大於零
        config.validate()?;

        tracing::info!("Attempting to initialize RPC server on {}", config.address);
        let listener = TcpListener::bind(config.address.as_str()).await?;
        let (state, _) = watch::channel(ServerState::Serving);

        Ok(Self {
            listener,
            service: Arc::new(service),
            config,
            state,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn state(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Self {
            listener,
            service,
            config,
            state,
        } = self;

        let workers = Arc::new(Semaphore::new(config.max_workers));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut connections = JoinSet::new();

        let mut heartbeat = tokio::time::interval(config.heartbeat);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "🚀 Serving {} on {} ({} worker(s))",
            service::SERVICE_NAME,
            listener.local_addr()?,
            config.max_workers
        );

        tokio::pin!(signal);
        loop {
            tokio::select! {
                _ = &mut signal => {
                    tracing::info!("Detected interrupt, stopping server");
                    break;
                }
                _ = heartbeat.tick() => {
                    tracing::info!("Server listening");
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!("Accepted connection from {}", peer);
                        connections.spawn(handle_connection(
                            stream,
                            peer,
                            Arc::clone(&service),
                            Arc::clone(&workers),
                            shutdown_rx.clone(),
                        ));
                    }
                    Err(e) => tracing::warn!("Failed to accept connection: {}", e),
                },
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("Connection task failed: {}", e);
                    }
                }
            }
        }

        // 停止接受新連線，讓進行中的呼叫在寬限期內完成
        drop(listener);
        let _ = shutdown_tx.send(true);

        let drain = async {
            while let Some(joined) = connections.join_next().await {
                if let Err(e) = joined {
                    tracing::error!("Connection task failed: {}", e);
                }
            }
        };

        if tokio::time::timeout(config.grace_period, drain).await.is_err() {
            tracing::warn!(
                "Grace period of {:?} elapsed, aborting {} connection(s)",
                config.grace_period,
                connections.len()
            );
            connections.shutdown().await;
        }

        state.send_replace(ServerState::Stopped);
        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn handle_connection<S: ExternalConverterService>(
    stream: TcpStream,
    peer: SocketAddr,
    service: Arc<S>,
    workers: Arc<Semaphore>,
    mut shutdown: watch::Receiver<bool>,
) {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }

        let frame = tokio::select! {
            _ = shutdown.changed() => break,
            frame = codec::read_frame::<_, RequestFrame>(&mut reader) => frame,
        };

        let response = match frame {
            Ok(Some(request)) => dispatch(&*service, &workers, request).await,
            Ok(None) => break,
            Err(ConverterError::SerializationError(e)) => {
                tracing::warn!("Malformed frame from {}: {}", peer, e);
                ResponseFrame::failure(0, Status::invalid_argument(format!("malformed frame: {}", e)))
            }
            Err(e) => {
                tracing::debug!("Closing connection from {}: {}", peer, e);
                break;
            }
        };

        if let Err(e) = codec::write_frame(&mut writer, &response).await {
            tracing::debug!("Failed to write response to {}: {}", peer, e);
            break;
        }
    }

    tracing::debug!("Connection from {} closed", peer);
}

async fn dispatch<S: ExternalConverterService>(
    service: &S,
    workers: &Semaphore,
    request: RequestFrame,
) -> ResponseFrame {
    let RequestFrame {
        id,
        method,
        payload,
    } = request;

    let _permit = match workers.acquire().await {
        Ok(permit) => permit,
        Err(_) => return ResponseFrame::failure(id, Status::unavailable("server is shutting down")),
    };

    tracing::debug!("Dispatching {} (id {})", method, id);
    match service::route(service, &method, payload).await {
        Ok(result) => ResponseFrame::success(id, result),
        Err(status) => {
            tracing::warn!("{} (id {}) failed: {}", method, id, status);
            ResponseFrame::failure(id, status)
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
///
/// On Unix the handlers are registered when this is called, not when the
/// future is first polled, so a signal arriving in between is not lost.
/// Must be called from within a tokio runtime.
#[cfg(unix)]
pub fn shutdown_signal() -> impl Future<Output = ()> {
    use tokio::signal::unix::{signal, SignalKind};

    let interrupt = signal(SignalKind::interrupt());
    let terminate = signal(SignalKind::terminate());

    async move {
        let interrupt = async {
            match interrupt {
                Ok(mut sigint) => {
                    sigint.recv().await;
                }
                Err(e) => {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };
        let terminate = async {
            match terminate {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::error!("Failed to listen for SIGTERM: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            _ = interrupt => {}
            _ = terminate => {}
        }
    }
}

/// Resolves on Ctrl-C.
#[cfg(not(unix))]
pub fn shutdown_signal() -> impl Future<Output = ()> {
    async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::RandomNumberListener;
    use std::time::Duration;

    fn local_config() -> ServerConfig {
        ServerConfig {
            address: "127.0.0.1:0".to_string(),
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_bind_rejects_zero_heartbeat() {
        let config = ServerConfig {
            heartbeat: Duration::ZERO,
            ..local_config()
        };

        let result = RpcServer::bind(RandomNumberListener, config).await;

        match result {
            Err(ConverterError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, "server.heartbeat");
            }
            Err(other) => panic!("expected InvalidConfigValueError, got {:?}", other),
            Ok(_) => panic!("zero heartbeat was accepted"),
        }
    }

    #[tokio::test]
    async fn test_bind_rejects_zero_workers() {
        let config = ServerConfig {
            max_workers: 0,
            ..local_config()
        };

        let result = RpcServer::bind(RandomNumberListener, config).await;

        match result {
            Err(ConverterError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, "server.max_workers");
            }
            Err(other) => panic!("expected InvalidConfigValueError, got {:?}", other),
            Ok(_) => panic!("zero workers was accepted"),
        }
    }

    #[tokio::test]
    async fn test_bind_accepts_valid_config() {
        let server = RpcServer::bind(RandomNumberListener, local_config())
            .await
            .unwrap();

        assert_ne!(server.local_addr().unwrap().port(), 0);
        assert_eq!(*server.state().borrow(), ServerState::Serving);
    }
}
