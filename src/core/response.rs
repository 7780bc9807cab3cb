use crate::domain::model::{DispatchAction, DispatchResult};
use crate::utils::error::Result;
use serde::Serialize;
use std::collections::HashMap;

pub fn no_build(correlation_id: &str) -> DispatchResult {
    DispatchResult {
        action: DispatchAction::NoBuild,
        correlation_id: correlation_id.to_string(),
        build_ids: Vec::new(),
    }
}

pub fn built(correlation_id: &str, build_ids: Vec<String>) -> DispatchResult {
    DispatchResult {
        action: DispatchAction::Build,
        correlation_id: correlation_id.to_string(),
        build_ids,
    }
}

/// API Gateway proxy-integration response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl WebhookResponse {
    pub fn ok(result: &DispatchResult) -> Result<Self> {
        Ok(Self {
            status_code: 200,
            headers: content_type("application/json"),
            body: serde_json::to_string(result)?,
        })
    }

    pub fn forbidden() -> Self {
        Self {
            status_code: 403,
            headers: content_type("text/plain"),
            body: "403 Forbidden".to_string(),
        }
    }
}

fn content_type(value: &str) -> HashMap<String, String> {
    HashMap::from([("Content-Type".to_string(), value.to_string())])
}
