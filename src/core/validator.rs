use crate::core::request::WebhookRequest;
use crate::utils::error::{HookError, Result};
use subtle::ConstantTimeEq;

pub const USER_AGENT_PREFIX: &str = "Bitbucket-Webhooks/";
pub const EVENT_KEY_HEADER: &str = "X-Event-Key";
pub const PUSH_EVENT_KEY: &str = "repo:push";

#[derive(Debug, Clone, Default)]
pub struct RequestValidator {
    token: Option<String>,
}

impl RequestValidator {
    pub fn new(token: &str) -> Self {
        Self {
            token: (!token.is_empty()).then(|| token.to_string()),
        }
    }

    pub fn validate(&self, request: &WebhookRequest) -> Result<()> {
        self.check_token(request)?;
        check_sender(request)?;
        check_event_key(request)
    }

    fn check_token(&self, request: &WebhookRequest) -> Result<()> {
        let Some(expected) = &self.token else {
            return Ok(());
        };

        let received = request.query("token").unwrap_or("");
        let matches: bool = expected.as_bytes().ct_eq(received.as_bytes()).into();
        if !matches {
            // 不記錄收到的 token 內容
            tracing::error!(
                "❌ Token received does not match configured value (received {} chars)",
                received.len()
            );
            return Err(HookError::Unauthorized);
        }

        Ok(())
    }
}

fn check_sender(request: &WebhookRequest) -> Result<()> {
    let user_agent = request.header("User-Agent").unwrap_or("");
    if !user_agent.starts_with(USER_AGENT_PREFIX) {
        return Err(HookError::bad_request(format!(
            "User-Agent is \"{}\", not \"{}*\"",
            user_agent, USER_AGENT_PREFIX
        )));
    }
    Ok(())
}

fn check_event_key(request: &WebhookRequest) -> Result<()> {
    let event_key = request.header(EVENT_KEY_HEADER).unwrap_or("");
    if event_key != PUSH_EVENT_KEY {
        return Err(HookError::bad_request(format!(
            "{} is \"{}\", not \"{}\"",
            EVENT_KEY_HEADER, event_key, PUSH_EVENT_KEY
        )));
    }
    Ok(())
}
