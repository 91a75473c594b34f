use clap::Parser;
use converter_external::rpc::run_client_loop;
use converter_external::utils::{logger, validation::Validate};
use converter_external::{ClientArgs, ExternalConverterClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ClientArgs::parse();

    logger::init_cli_logger(args.verbose);

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    tracing::info!(
        "Calling GetRandomNumber {} times on {}",
        config.iterations,
        config.address
    );

    let mut client = match ExternalConverterClient::connect(config.address.as_str()).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("❌ Failed to connect to {}: {}", config.address, e);
            eprintln!("❌ Failed to connect to {}: {}", config.address, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            return Ok(());
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    // 任何一次呼叫失敗即結束迴圈，不重試
    match run_client_loop(&mut client, config.iterations, &mut out).await {
        Ok(completed) => tracing::info!("✅ Completed {} calls", completed),
        Err(e) => {
            eprintln!("❌ Failed to call GetRandomNumber: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
        }
    }

    Ok(())
}
