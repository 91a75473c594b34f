//! External converter service.
//!
//! Ships a random-number RPC server (`converter-external`), its client
//! (`rng-client`) and a `protoc` release fetcher (`get-protoc`).
//!
//! The RPC transport is newline-delimited JSON over TCP (see [`rpc::codec`]).
//! It is not wire-compatible with gRPC or protobuf clients.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod rpc;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{ClientArgs, FetchArgs, ServerArgs};

pub use adapters::ReqwestDownloader;
pub use config::{ClientConfig, FetchConfig, ServerConfig};
pub use core::{fetcher::ToolchainFetcher, random::RandomNumberListener};
pub use rpc::{ExternalConverterClient, RpcServer};
pub use utils::error::{ConverterError, Result};
