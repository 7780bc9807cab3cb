use crate::utils::error::{HookError, Result};
use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_PATTERN: &str = "$username-$reponame-$branch";

// `$$`、`$name`、`${name}`，其餘的 `$` 一律視為無效
const PLACEHOLDER_RE: &str = r"(?i)\$(?:(?P<escaped>\$)|(?P<named>[_a-z][_a-z0-9]*)|\{(?P<braced>[_a-z][_a-z0-9]*)\}|(?P<invalid>))";

static PLACEHOLDERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_RE).expect("static regex is valid"));

static INVALID_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^-_A-Za-z0-9]").expect("static regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Username,
    RepoName,
    Branch,
}

impl Placeholder {
    const ALL: [Placeholder; 3] = [Placeholder::Username, Placeholder::RepoName, Placeholder::Branch];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "username" => Some(Placeholder::Username),
            "reponame" => Some(Placeholder::RepoName),
            "branch" => Some(Placeholder::Branch),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::Username => "username",
            Placeholder::RepoName => "reponame",
            Placeholder::Branch => "branch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Value(Placeholder),
}

/// Values substituted into a [`ProjectNameTemplate`].
#[derive(Debug, Clone, Copy)]
pub struct TemplateValues<'a> {
    pub username: &'a str,
    pub reponame: &'a str,
    pub branch: &'a str,
}

impl TemplateValues<'_> {
    fn get(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::Username => self.username,
            Placeholder::RepoName => self.reponame,
            Placeholder::Branch => self.branch,
        }
    }
}

/// CodeBuild 專案名稱樣板，建立時就檢查三個必要的 placeholder。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectNameTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl ProjectNameTemplate {
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in PLACEHOLDERS.captures_iter(pattern) {
            let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((last, last));
            literal.push_str(&pattern[last..whole.0]);
            last = whole.1;

            if caps.name("escaped").is_some() {
                literal.push('$');
                continue;
            }

            let name = caps
                .name("named")
                .or_else(|| caps.name("braced"))
                .map(|m| m.as_str());

            let Some(name) = name else {
                return Err(HookError::InvalidConfigValueError {
                    field: "pattern".to_string(),
                    value: pattern.to_string(),
                    reason: format!("Invalid placeholder at offset {}", whole.0),
                });
            };

            let placeholder =
                Placeholder::from_name(name).ok_or_else(|| HookError::InvalidConfigValueError {
                    field: "pattern".to_string(),
                    value: pattern.to_string(),
                    reason: format!("Unknown placeholder ${}", name),
                })?;

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Value(placeholder));
        }

        literal.push_str(&pattern[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let missing: Vec<String> = Placeholder::ALL
            .iter()
            .filter(|p| !segments.contains(&Segment::Value(**p)))
            .map(|p| format!("${}", p.name()))
            .collect();

        if !missing.is_empty() {
            return Err(HookError::config(format!(
                "pattern must contain $username, $reponame, $branch (missing {})",
                missing.join(", ")
            )));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn render(&self, values: &TemplateValues<'_>) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.as_str(),
                Segment::Value(placeholder) => values.get(*placeholder),
            })
            .collect()
    }

    /// Renders the template and replaces characters CodeBuild rejects.
    pub fn project_name(&self, values: &TemplateValues<'_>) -> String {
        clean_project_name(&self.render(values))
    }
}

impl Default for ProjectNameTemplate {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            segments: vec![
                Segment::Value(Placeholder::Username),
                Segment::Literal("-".to_string()),
                Segment::Value(Placeholder::RepoName),
                Segment::Literal("-".to_string()),
                Segment::Value(Placeholder::Branch),
            ],
        }
    }
}

/// 把 CodeBuild 專案名稱不允許的字元換成 `_`
pub fn clean_project_name(name: &str) -> String {
    INVALID_NAME_CHARS.replace_all(name, "_").into_owned()
}
