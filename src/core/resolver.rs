use crate::domain::model::{BuildProject, RefChange};
use crate::domain::ports::BuildSystem;
use crate::utils::error::Result;
use std::collections::HashSet;

/// A build project paired with the change that triggers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMatch {
    pub project: BuildProject,
    pub change: RefChange,
}

/// Distinct project names in first-seen order.
pub fn distinct_project_names(changes: &[RefChange]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for change in changes {
        if seen.insert(change.project_name.as_str()) {
            names.push(change.project_name.clone());
        }
    }
    names
}

/// 一次批次查詢所有衍生的專案名稱；沒有 change 時完全不呼叫建置系統。
///
/// Matches follow the order the build system returns projects in. When several
/// changes map to one project, the first change in payload order wins.
pub async fn resolve_projects<B>(build_system: &B, changes: &[RefChange]) -> Result<Vec<ProjectMatch>>
where
    B: BuildSystem + ?Sized,
{
    if changes.is_empty() {
        tracing::info!("No builds to create");
        return Ok(Vec::new());
    }

    let names = distinct_project_names(changes);
    let projects = build_system.batch_lookup_projects(&names).await?;

    let mut matched_names = HashSet::new();
    let mut matches = Vec::new();

    for project in projects {
        if !matched_names.insert(project.name.clone()) {
            tracing::warn!("Build system returned project {} twice, ignoring repeat", project.name);
            continue;
        }

        match changes.iter().find(|c| c.project_name == project.name) {
            Some(change) => matches.push(ProjectMatch {
                change: change.clone(),
                project,
            }),
            None => tracing::warn!(
                "Build system returned unrequested project {}, ignoring",
                project.name
            ),
        }
    }

    if matches.is_empty() {
        tracing::info!(
            "No CodeBuild projects exist for these changes: {:?}",
            names
        );
    }

    Ok(matches)
}
