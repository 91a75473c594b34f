pub mod client;
pub mod codec;
pub mod server;
pub mod service;
pub mod status;

pub use client::{run_client_loop, RpcChannel};
pub use server::{shutdown_signal, RpcServer, ServerState};
pub use service::{ExternalConverterClient, ExternalConverterService};
pub use status::{Code, Status};
