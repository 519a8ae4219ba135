use clap::Parser;
use posts_proxy::utils::logger;
use posts_proxy::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting posts-proxy");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Upstream timeout {}s, auth {}, aggregate limit {}",
        config.request_timeout_seconds,
        if config.require_auth { "required" } else { "disabled" },
        config.aggregate_limit
    );

    posts_proxy::serve(config).await?;

    Ok(())
}
