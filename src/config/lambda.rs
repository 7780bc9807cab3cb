use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::template::DEFAULT_PATTERN;
use std::env;

#[cfg(feature = "lambda")]
use crate::core::{BuildProject, BuildSystem, BuildTriggerRequest};
#[cfg(feature = "lambda")]
use crate::domain::model::{ArtifactConfig, ArtifactType, ProjectSource};
#[cfg(feature = "lambda")]
use crate::utils::error::HookError;
#[cfg(feature = "lambda")]
use aws_sdk_codebuild::error::DisplayErrorContext;
#[cfg(feature = "lambda")]
use aws_sdk_codebuild::types::{
    ArtifactNamespace, ArtifactPackaging, ArtifactsType, EnvironmentVariable,
    EnvironmentVariableType, Project, ProjectArtifacts,
};
#[cfg(feature = "lambda")]
use aws_sdk_codebuild::Client as CodeBuildSdkClient;

/// Lambda 的設定來自環境變數 `pattern` 與 `token`
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub pattern: String,
    pub token: String,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            pattern: lookup("pattern").unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
            token: lookup("token").unwrap_or_default(),
        })
    }
}

impl ConfigProvider for LambdaConfig {
    fn pattern(&self) -> &str {
        &self.pattern
    }

    fn token(&self) -> &str {
        &self.token
    }
}

impl crate::utils::validation::Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_pattern("pattern", &self.pattern)?;

        if self.token.is_empty() {
            tracing::warn!("No token configured, webhook requests are not authorized");
        }

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

/// BatchGetProjects accepts at most this many names per call.
#[cfg(feature = "lambda")]
const BATCH_GET_PROJECTS_LIMIT: usize = 100;

#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct CodeBuildClient {
    client: CodeBuildSdkClient,
}

#[cfg(feature = "lambda")]
impl CodeBuildClient {
    pub fn new(client: CodeBuildSdkClient) -> Self {
        Self { client }
    }
}

#[cfg(feature = "lambda")]
fn to_build_project(project: &Project) -> Result<BuildProject> {
    let name = project
        .name()
        .ok_or_else(|| HookError::ProjectLookupFailure {
            message: "CodeBuild returned a project without a name".to_string(),
        })?
        .to_string();

    let source = project
        .source()
        .map(|source| ProjectSource {
            source_type: source.r#type().as_str().to_string(),
            location: source.location().unwrap_or_default().to_string(),
        })
        .unwrap_or_else(|| ProjectSource {
            source_type: String::new(),
            location: String::new(),
        });

    let artifacts = project
        .artifacts()
        .map(|artifacts| ArtifactConfig {
            artifact_type: match artifacts.r#type() {
                ArtifactsType::S3 => ArtifactType::S3,
                ArtifactsType::Codepipeline => ArtifactType::Codepipeline,
                ArtifactsType::NoArtifacts => ArtifactType::NoArtifacts,
                _ => ArtifactType::Unknown,
            },
            location: artifacts.location().map(str::to_string),
            name: artifacts.name().map(str::to_string),
            namespace_type: artifacts.namespace_type().map(|n| n.as_str().to_string()),
            packaging: artifacts.packaging().map(|p| p.as_str().to_string()),
            path: artifacts.path().map(str::to_string),
        })
        .unwrap_or_default();

    Ok(BuildProject {
        name,
        source,
        artifacts,
    })
}

#[cfg(feature = "lambda")]
fn to_sdk_artifacts_type(artifact_type: ArtifactType) -> ArtifactsType {
    match artifact_type {
        ArtifactType::S3 => ArtifactsType::S3,
        ArtifactType::Codepipeline => ArtifactsType::Codepipeline,
        ArtifactType::NoArtifacts | ArtifactType::Unknown => ArtifactsType::NoArtifacts,
    }
}

#[cfg(feature = "lambda")]
#[async_trait::async_trait]
impl BuildSystem for CodeBuildClient {
    async fn batch_lookup_projects(&self, names: &[String]) -> Result<Vec<BuildProject>> {
        let mut projects = Vec::new();

        for chunk in names.chunks(BATCH_GET_PROJECTS_LIMIT) {
            let output = self
                .client
                .batch_get_projects()
                .set_names(Some(chunk.to_vec()))
                .send()
                .await
                .map_err(|e| HookError::ProjectLookupFailure {
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            if !output.projects_not_found().is_empty() {
                tracing::debug!("Projects not found: {:?}", output.projects_not_found());
            }

            for project in output.projects() {
                projects.push(to_build_project(project)?);
            }
        }

        Ok(projects)
    }

    async fn trigger_build(&self, request: &BuildTriggerRequest) -> Result<String> {
        let trigger_error = |message: String| HookError::BuildTriggerFailure {
            project: request.project_name.clone(),
            message,
        };

        let env_overrides = request
            .environment_overrides
            .iter()
            .map(|env| {
                EnvironmentVariable::builder()
                    .name(&env.name)
                    .value(&env.value)
                    .r#type(EnvironmentVariableType::Plaintext)
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| trigger_error(e.to_string()))?;

        let mut start_build = self
            .client
            .start_build()
            .project_name(&request.project_name)
            .source_version(&request.source_version)
            .set_environment_variables_override(Some(env_overrides));

        if let Some(artifacts) = &request.artifacts_override {
            let override_ = ProjectArtifacts::builder()
                .r#type(to_sdk_artifacts_type(artifacts.artifact_type))
                .location(&artifacts.location)
                .namespace_type(ArtifactNamespace::from(artifacts.namespace_type.as_str()))
                .name(&artifacts.name)
                .packaging(ArtifactPackaging::from(artifacts.packaging.as_str()))
                .set_path(artifacts.path.clone())
                .build()
                .map_err(|e| trigger_error(e.to_string()))?;
            start_build = start_build.artifacts_override(override_);
        }

        let output = start_build
            .send()
            .await
            .map_err(|e| trigger_error(DisplayErrorContext(&e).to_string()))?;

        output
            .build()
            .and_then(|build| build.id())
            .map(str::to_string)
            .ok_or_else(|| trigger_error("StartBuild response has no build id".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LambdaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.pattern, "$username-$reponame-$branch");
        assert_eq!(config.token, "");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_values() {
        let config =
            LambdaConfig::from_lookup(lookup(&[("pattern", "cb-$reponame-$branch-$username"), ("token", "abc")]))
                .unwrap();
        assert_eq!(config.pattern(), "cb-$reponame-$branch-$username");
        assert_eq!(config.token(), "abc");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pattern_without_branch_fails_validation() {
        let config = LambdaConfig::from_lookup(lookup(&[("pattern", "$username-$reponame")])).unwrap();
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "lambda")]
    #[test]
    fn test_to_build_project() {
        use aws_sdk_codebuild::types::{ProjectSource as SdkSource, SourceType};

        let project = Project::builder()
            .name("acme-widgets-main")
            .source(
                SdkSource::builder()
                    .r#type(SourceType::Bitbucket)
                    .location("https://bitbucket.org/acme/widgets.git")
                    .build()
                    .unwrap(),
            )
            .artifacts(
                ProjectArtifacts::builder()
                    .r#type(ArtifactsType::S3)
                    .location("bucket")
                    .name("(tag).zip")
                    .build()
                    .unwrap(),
            )
            .build();

        let converted = to_build_project(&project).unwrap();
        assert_eq!(converted.name, "acme-widgets-main");
        assert_eq!(converted.source.source_type, "BITBUCKET");
        assert_eq!(converted.artifacts.artifact_type, ArtifactType::S3);
        assert_eq!(converted.artifacts.path, None);
    }
}
