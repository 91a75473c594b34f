use clap::Parser;
use converter_external::domain::model::FetchOutcome;
use converter_external::utils::{logger, validation::Validate};
use converter_external::{ConverterError, FetchArgs, FetchConfig, ReqwestDownloader, ToolchainFetcher};

#[tokio::main]
async fn main() {
    let args = FetchArgs::parse();

    logger::init_cli_logger(args.verbose);

    let config = FetchConfig::from(args);
    tracing::debug!("Fetch config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let fetcher = ToolchainFetcher::new(ReqwestDownloader::new(), config);

    match fetcher.run().await {
        Ok(FetchOutcome::AlreadyPresent(path)) => {
            println!("protoc already present at {}", path.display());
            println!("Use --force to re-download");
        }
        Ok(FetchOutcome::Installed(path)) => {
            println!("protoc available at: {}", path.display());
            if let Some(bin_dir) = path.parent() {
                println!(
                    "You can add it to PATH, e.g. `export PATH={}:$PATH` (or on Windows, add to PATH)",
                    bin_dir.display()
                );
            }
        }
        Err(e) => {
            match &e {
                ConverterError::DownloadError { url, message } => {
                    println!("Download failed: {}", message);
                    println!("Checked URL: {}", url);
                }
                ConverterError::ExtractionError { message } => {
                    println!("Extraction failed: {}", message);
                }
                ConverterError::BinaryNotFound { path, extracted } => {
                    println!(
                        "Extraction completed but protoc not found at expected location {}",
                        path.display()
                    );
                    println!("List extracted files:");
                    for entry in extracted {
                        println!("{}", entry.display());
                    }
                }
                other => println!("❌ {}", other),
            }
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
