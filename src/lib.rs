pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::{LocalBuildSystem, ProjectCatalog};
pub use config::lambda::LambdaConfig;

#[cfg(feature = "lambda")]
pub use config::lambda::CodeBuildClient;

pub use crate::core::{handler::WebhookHandler, request::WebhookRequest, response::WebhookResponse};
pub use utils::error::{HookError, Result};
