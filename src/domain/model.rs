use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    #[serde(alias = "named_branch", alias = "bookmark")]
    Branch,
    Tag,
}

impl std::fmt::Display for RefType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefType::Branch => write!(f, "branch"),
            RefType::Tag => write!(f, "tag"),
        }
    }
}

/// A branch or tag that was created or moved, paired with the project it should build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefChange {
    pub ref_type: RefType,
    pub ref_name: String,
    pub revision_hash: String,
    pub created: bool,
    pub project_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSource {
    #[serde(rename = "type", default)]
    pub source_type: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactType {
    S3,
    Codepipeline,
    #[default]
    NoArtifacts,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactConfig {
    #[serde(rename = "type", default)]
    pub artifact_type: ArtifactType,
    pub location: Option<String>,
    pub name: Option<String>,
    pub namespace_type: Option<String>,
    pub packaging: Option<String>,
    pub path: Option<String>,
}

/// CodeBuild 專案（唯讀，每次呼叫重新查詢）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildProject {
    pub name: String,
    pub source: ProjectSource,
    #[serde(default)]
    pub artifacts: ArtifactConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentOverride {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactOverride {
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    pub location: String,
    pub namespace_type: String,
    pub name: String,
    pub packaging: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTriggerRequest {
    pub project_name: String,
    pub source_version: String,
    #[serde(rename = "environmentVariablesOverride")]
    pub environment_overrides: Vec<EnvironmentOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts_override: Option<ArtifactOverride>,
}

impl BuildTriggerRequest {
    pub fn env(&self, name: &str) -> Option<&str> {
        self.environment_overrides
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DispatchAction {
    #[serde(rename = "no-build")]
    NoBuild,
    #[serde(rename = "build")]
    Build,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    pub action: DispatchAction,
    pub correlation_id: String,
    #[serde(rename = "buildId")]
    pub build_ids: Vec<String>,
}
