use crate::core::resolver::ProjectMatch;
use crate::domain::model::{
    ArtifactOverride, ArtifactType, BuildProject, BuildTriggerRequest, EnvironmentOverride,
    RefChange,
};
use crate::domain::ports::BuildSystem;
use crate::utils::error::{HookError, Result};
use url::Url;

pub const EXPECTED_SOURCE_HOST: &str = "bitbucket.org";
pub const ARTIFACT_TAG_PLACEHOLDER: &str = "(tag)";
pub const ENV_GIT_COMMIT: &str = "GIT_COMMIT";
pub const ENV_GIT_BRANCH: &str = "GIT_BRANCH";

const DEFAULT_NAMESPACE_TYPE: &str = "NONE";
const DEFAULT_PACKAGING: &str = "NONE";

/// 確認專案的原始碼來自 Bitbucket 且走 https
pub fn verify_source(project: &BuildProject) -> Result<()> {
    let location = project.source.location.as_str();
    let host = Url::parse(location)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string));

    if !location.starts_with("https://") || host.as_deref() != Some(EXPECTED_SOURCE_HOST) {
        return Err(HookError::config(format!(
            "CodeBuild project {} is not Bitbucket-backed, src = {}",
            project.name, location
        )));
    }

    Ok(())
}

/// Artifact override for S3 projects whose artifact name carries the `(tag)` marker.
pub fn artifact_override(change: &RefChange, project: &BuildProject) -> Result<Option<ArtifactOverride>> {
    let artifacts = &project.artifacts;
    if artifacts.artifact_type != ArtifactType::S3 {
        return Ok(None);
    }

    let Some(name) = artifacts
        .name
        .as_deref()
        .filter(|name| name.contains(ARTIFACT_TAG_PLACEHOLDER))
    else {
        return Ok(None);
    };

    let location = artifacts.location.clone().ok_or_else(|| {
        HookError::config(format!(
            "CodeBuild project {} has S3 artifacts without a location",
            project.name
        ))
    })?;

    Ok(Some(ArtifactOverride {
        artifact_type: ArtifactType::S3,
        location,
        namespace_type: artifacts
            .namespace_type
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE_TYPE.to_string()),
        name: name.replace(ARTIFACT_TAG_PLACEHOLDER, &change.ref_name),
        packaging: artifacts
            .packaging
            .clone()
            .unwrap_or_else(|| DEFAULT_PACKAGING.to_string()),
        path: artifacts.path.clone(),
    }))
}

pub fn build_trigger_request(change: &RefChange, project: &BuildProject) -> Result<BuildTriggerRequest> {
    verify_source(project)?;

    Ok(BuildTriggerRequest {
        project_name: project.name.clone(),
        source_version: change.revision_hash.clone(),
        environment_overrides: vec![
            EnvironmentOverride {
                name: ENV_GIT_COMMIT.to_string(),
                value: change.revision_hash.clone(),
            },
            EnvironmentOverride {
                name: ENV_GIT_BRANCH.to_string(),
                value: change.ref_name.clone(),
            },
        ],
        artifacts_override: artifact_override(change, project)?,
    })
}

pub struct BuildDispatcher<'a, B: BuildSystem + ?Sized> {
    build_system: &'a B,
}

impl<'a, B: BuildSystem + ?Sized> BuildDispatcher<'a, B> {
    pub fn new(build_system: &'a B) -> Self {
        Self { build_system }
    }

    /// Starts one build per match and returns the build ids in processing order.
    ///
    /// Every request is built before the first trigger, so a misconfigured
    /// project aborts the batch without starting anything. A trigger failure
    /// aborts the rest; builds already started stay started.
    pub async fn dispatch(&self, matches: &[ProjectMatch]) -> Result<Vec<String>> {
        let requests = matches
            .iter()
            .map(|m| build_trigger_request(&m.change, &m.project))
            .collect::<Result<Vec<_>>>()?;

        let mut build_ids = Vec::with_capacity(requests.len());
        for request in &requests {
            tracing::info!("🚀 Starting CodeBuild project {}:", request.project_name);
            let build_id = self.build_system.trigger_build(request).await?;
            tracing::info!("--Build ID = {}", build_id);
            build_ids.push(build_id);
        }

        Ok(build_ids)
    }
}
