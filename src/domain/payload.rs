//! Bitbucket Cloud `repo:push` webhook body.
//!
//! Only the fields the dispatcher reads are modelled; everything else in the
//! delivery is ignored by serde.

use crate::domain::model::RefType;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    pub push: Push,
    pub repository: Repository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Owner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Push {
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    pub new: Option<RefState>,
    pub old: Option<RefState>,
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefState {
    #[serde(rename = "type")]
    pub ref_type: RefType,
    pub name: String,
    pub target: Target,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    pub hash: String,
}

/// 一筆 change 的歸類結果
#[derive(Debug, Clone, Copy)]
pub enum ChangeKind<'a> {
    Updated { new: &'a RefState, created: bool },
    Deleted { old: Option<&'a RefState> },
    Unknown,
}

impl Change {
    pub fn kind(&self) -> ChangeKind<'_> {
        match (&self.new, self.closed) {
            (Some(new), _) => ChangeKind::Updated {
                new,
                created: self.created,
            },
            (None, true) => ChangeKind::Deleted {
                old: self.old.as_ref(),
            },
            (None, false) => ChangeKind::Unknown,
        }
    }
}
