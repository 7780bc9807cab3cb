pub mod cli;
pub mod lambda;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::template::DEFAULT_PATTERN;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "bb-codebuild-hook")]
#[command(about = "Replay a Bitbucket push webhook against a local CodeBuild project catalog")]
pub struct CliConfig {
    /// API Gateway proxy event (JSON) holding the webhook delivery
    #[arg(long)]
    pub event: String,

    /// TOML catalog of build projects
    #[arg(long, default_value = "projects.toml")]
    pub catalog: String,

    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Shared secret expected in the `token` query parameter
    #[arg(long, default_value = "")]
    pub token: String,

    #[arg(long)]
    pub correlation_id: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn pattern(&self) -> &str {
        &self.pattern
    }

    fn token(&self) -> &str {
        &self.token
    }
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        use crate::utils::validation::*;

        validate_path("event", &self.event)?;
        validate_path("catalog", &self.catalog)?;
        validate_pattern("pattern", &self.pattern)?;

        if let Some(id) = &self.correlation_id {
            validate_non_empty_string("correlation_id", id)?;
        }

        tracing::debug!("✅ CLI configuration validation passed");
        Ok(())
    }
}
