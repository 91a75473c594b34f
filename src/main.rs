use clap::Parser;
use converter_external::utils::{logger, validation::Validate};
use converter_external::rpc::shutdown_signal;
use converter_external::{RandomNumberListener, RpcServer, ServerArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ServerArgs::parse();

    // 載入配置 (命令列 > TOML > 預設值)
    let (config, log_format) = match args.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(args.verbose, log_format);

    tracing::info!("Starting converter-external RPC server");
    if args.verbose {
        tracing::debug!("Server config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    // 先註冊訊號處理，再開始監聽
    let signal = shutdown_signal();

    let server = match RpcServer::bind(RandomNumberListener, config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("❌ Failed to bind server: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    server.serve_with_shutdown(signal).await?;

    Ok(())
}
