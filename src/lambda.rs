#[cfg(feature = "lambda")]
use aws_config::BehaviorVersion;
#[cfg(feature = "lambda")]
use bb_codebuild_hook::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use bb_codebuild_hook::{CodeBuildClient, LambdaConfig, WebhookHandler, WebhookRequest, WebhookResponse};
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

#[cfg(feature = "lambda")]
async fn function_handler(
    handler: &WebhookHandler<CodeBuildClient>,
    event: LambdaEvent<WebhookRequest>,
) -> Result<WebhookResponse, Error> {
    let correlation_id = event.context.request_id.clone();
    tracing::info!("Webhook invocation {}", correlation_id);

    // 403 以外的錯誤直接丟回 Lambda runtime
    let response = handler
        .handle(&event.payload, &correlation_id)
        .await
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    Ok(response)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = LambdaConfig::from_env()?;
    config.validate()?;

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let build_system = CodeBuildClient::new(aws_sdk_codebuild::Client::new(&aws_config));
    let handler = WebhookHandler::new(build_system, &config)?;
    let handler = &handler;

    run(service_fn(move |event: LambdaEvent<WebhookRequest>| async move {
        function_handler(handler, event).await
    }))
    .await
}
