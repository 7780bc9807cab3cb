use crate::core::{BuildProject, BuildSystem, BuildTriggerRequest};
use crate::utils::error::{HookError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Build projects known to the offline build system, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectCatalog {
    #[serde(default)]
    pub projects: Vec<BuildProject>,
}

impl ProjectCatalog {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| HookError::InvalidConfigValueError {
            field: "catalog".to_string(),
            value: "<toml>".to_string(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    pub fn get(&self, name: &str) -> Option<&BuildProject> {
        self.projects.iter().find(|p| p.name == name)
    }
}

/// 離線重播用的建置系統：查詢讀目錄檔，觸發只記錄不執行
#[derive(Debug, Clone)]
pub struct LocalBuildSystem {
    catalog: ProjectCatalog,
    triggered: Arc<Mutex<Vec<BuildTriggerRequest>>>,
}

impl LocalBuildSystem {
    pub fn new(catalog: ProjectCatalog) -> Self {
        Self {
            catalog,
            triggered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(ProjectCatalog::from_file(path)?))
    }

    pub async fn triggered(&self) -> Vec<BuildTriggerRequest> {
        self.triggered.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl BuildSystem for LocalBuildSystem {
    async fn batch_lookup_projects(&self, names: &[String]) -> Result<Vec<BuildProject>> {
        let projects: Vec<BuildProject> = names
            .iter()
            .filter_map(|name| self.catalog.get(name).cloned())
            .collect();

        tracing::debug!(
            "Catalog lookup: {} requested, {} found",
            names.len(),
            projects.len()
        );
        Ok(projects)
    }

    async fn trigger_build(&self, request: &BuildTriggerRequest) -> Result<String> {
        if self.catalog.get(&request.project_name).is_none() {
            return Err(HookError::BuildTriggerFailure {
                project: request.project_name.clone(),
                message: "project not found in catalog".to_string(),
            });
        }

        let mut triggered = self.triggered.lock().await;
        triggered.push(request.clone());
        let build_id = format!("{}:local-{}", request.project_name, triggered.len());

        tracing::debug!("StartBuild request: {}", serde_json::to_string(request)?);
        Ok(build_id)
    }
}
