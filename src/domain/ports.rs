use crate::domain::model::{BuildProject, BuildTriggerRequest};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The build service the webhook dispatches to.
#[async_trait]
pub trait BuildSystem: Send + Sync {
    /// Returns the projects whose names exactly match `names`; unknown names are simply absent.
    async fn batch_lookup_projects(&self, names: &[String]) -> Result<Vec<BuildProject>>;

    /// Starts one build and returns its id.
    async fn trigger_build(&self, request: &BuildTriggerRequest) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn pattern(&self) -> &str;
    /// Empty means no token check.
    fn token(&self) -> &str;
}
