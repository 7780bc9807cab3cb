use crate::domain::model::{RefChange, RefType};
use crate::domain::payload::{ChangeKind, PushEvent};
use crate::utils::error::{HookError, Result};
use crate::utils::template::{ProjectNameTemplate, TemplateValues};

/// Branch value substituted for every tag push, so tags never share a branch's project.
pub const TAG_BRANCH_TOKEN: &str = "all_tags";

pub fn parse_push_event(body: &str) -> Result<PushEvent> {
    serde_json::from_str(body).map_err(|e| {
        HookError::malformed(format!("Webhook request body is missing essential keys: {}", e))
    })
}

/// 依 payload 順序取出新增/更新的 ref，刪除的只記錄不處理
pub fn extract_changes(event: &PushEvent, template: &ProjectNameTemplate) -> Result<Vec<RefChange>> {
    let owner = event.repository.owner.username.as_str();
    let repo = event.repository.name.as_str();
    tracing::info!("📨 Received webhook notification for {}/{}:", owner, repo);

    let mut changes = Vec::new();

    for (index, change) in event.push.changes.iter().enumerate() {
        match change.kind() {
            ChangeKind::Updated { new, created } => {
                tracing::info!(
                    "--{} {} to {}{}",
                    new.ref_type,
                    new.name,
                    new.target.hash,
                    if created { " (created)" } else { "" }
                );

                let branch = match new.ref_type {
                    RefType::Branch => new.name.as_str(),
                    RefType::Tag => TAG_BRANCH_TOKEN,
                };

                let project_name = template.project_name(&TemplateValues {
                    username: owner,
                    reponame: repo,
                    branch,
                });

                changes.push(RefChange {
                    ref_type: new.ref_type,
                    ref_name: new.name.clone(),
                    revision_hash: new.target.hash.clone(),
                    created,
                    project_name,
                });
            }
            ChangeKind::Deleted { old: Some(old) } => {
                tracing::info!("--{} {} deleted", old.ref_type, old.name);
            }
            ChangeKind::Deleted { old: None } => {
                tracing::info!("--change #{} closed without a previous ref", index);
            }
            ChangeKind::Unknown => {
                return Err(HookError::malformed(format!(
                    "change #{} has no new ref and is not closed",
                    index
                )));
            }
        }
    }

    Ok(changes)
}
