use bb_codebuild_hook::utils::{logger, validation::Validate};
use bb_codebuild_hook::{CliConfig, LocalBuildSystem, WebhookHandler, WebhookRequest};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting bb-codebuild-hook replay");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let event = std::fs::read_to_string(&config.event)
        .map_err(|e| anyhow::anyhow!("Failed to read event file '{}': {}", config.event, e))?;
    let request: WebhookRequest = serde_json::from_str(&event)?;

    let build_system = LocalBuildSystem::from_file(&config.catalog)?;
    let handler = WebhookHandler::new(build_system, &config)?;

    let correlation_id = config.correlation_id.clone().unwrap_or_else(|| {
        format!("local-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ"))
    });

    match handler.handle(&request, &correlation_id).await {
        Ok(response) => {
            for triggered in handler.build_system().triggered().await {
                tracing::info!("📦 Would start: {}", serde_json::to_string(&triggered)?);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Err(e) => {
            eprintln!("❌ {}", e);

            // 4xx 類錯誤（請求本身有問題）與內部錯誤用不同的結束碼
            let exit_code = if e.status_code() < 500 { 2 } else { 1 };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
