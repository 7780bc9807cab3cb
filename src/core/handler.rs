use crate::core::dispatcher::BuildDispatcher;
use crate::core::extractor::{extract_changes, parse_push_event};
use crate::core::request::WebhookRequest;
use crate::core::resolver::resolve_projects;
use crate::core::response::{self, WebhookResponse};
use crate::core::validator::RequestValidator;
use crate::domain::model::DispatchResult;
use crate::domain::ports::{BuildSystem, ConfigProvider};
use crate::utils::error::{HookError, Result};
use crate::utils::template::ProjectNameTemplate;

/// Runs one webhook delivery through validation, extraction, lookup and dispatch.
pub struct WebhookHandler<B: BuildSystem> {
    build_system: B,
    template: ProjectNameTemplate,
    validator: RequestValidator,
}

impl<B: BuildSystem> WebhookHandler<B> {
    /// 樣板在這裡解析，設定錯誤會在啟動時就失敗
    pub fn new<C: ConfigProvider>(build_system: B, config: &C) -> Result<Self> {
        let template = ProjectNameTemplate::parse(config.pattern())?;
        tracing::debug!("Project name pattern: {}", template.pattern());

        Ok(Self {
            build_system,
            template,
            validator: RequestValidator::new(config.token()),
        })
    }

    pub fn build_system(&self) -> &B {
        &self.build_system
    }

    pub async fn process(&self, request: &WebhookRequest, correlation_id: &str) -> Result<DispatchResult> {
        self.validator.validate(request)?;

        if request.is_base64_encoded {
            return Err(HookError::malformed("base64-encoded bodies are not supported"));
        }
        let body = request
            .body
            .as_deref()
            .ok_or_else(|| HookError::malformed("request has no body"))?;

        let event = parse_push_event(body)?;
        let changes = extract_changes(&event, &self.template)?;

        let matches = resolve_projects(&self.build_system, &changes).await?;
        if matches.is_empty() {
            return Ok(response::no_build(correlation_id));
        }

        let build_ids = BuildDispatcher::new(&self.build_system)
            .dispatch(&matches)
            .await?;

        Ok(response::built(correlation_id, build_ids))
    }

    /// Token mismatches become a 403; every other error is returned to the caller.
    pub async fn handle(&self, request: &WebhookRequest, correlation_id: &str) -> Result<WebhookResponse> {
        match self.process(request, correlation_id).await {
            Ok(result) => {
                tracing::info!(
                    "✅ Webhook processed: {:?} ({} builds)",
                    result.action,
                    result.build_ids.len()
                );
                WebhookResponse::ok(&result)
            }
            Err(HookError::Unauthorized) => Ok(WebhookResponse::forbidden()),
            Err(e) => {
                tracing::error!("❌ Webhook processing failed: {}", e);
                Err(e)
            }
        }
    }
}
