use async_trait::async_trait;
use bb_codebuild_hook::core::{BuildProject, BuildSystem, BuildTriggerRequest};
use bb_codebuild_hook::domain::model::{ArtifactConfig, ArtifactType, ProjectSource};
use bb_codebuild_hook::{HookError, LambdaConfig, Result, WebhookHandler, WebhookRequest};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct MockBuildSystem {
    projects: Vec<BuildProject>,
    fail_trigger_for: Option<String>,
    lookups: Arc<Mutex<Vec<Vec<String>>>>,
    triggers: Arc<Mutex<Vec<BuildTriggerRequest>>>,
}

impl MockBuildSystem {
    fn with_projects(projects: Vec<BuildProject>) -> Self {
        Self {
            projects,
            ..Default::default()
        }
    }

    async fn lookups(&self) -> Vec<Vec<String>> {
        self.lookups.lock().await.clone()
    }

    async fn triggers(&self) -> Vec<BuildTriggerRequest> {
        self.triggers.lock().await.clone()
    }
}

#[async_trait]
impl BuildSystem for MockBuildSystem {
    async fn batch_lookup_projects(&self, names: &[String]) -> Result<Vec<BuildProject>> {
        self.lookups.lock().await.push(names.to_vec());
        Ok(self
            .projects
            .iter()
            .filter(|p| names.contains(&p.name))
            .cloned()
            .collect())
    }

    async fn trigger_build(&self, request: &BuildTriggerRequest) -> Result<String> {
        if self.fail_trigger_for.as_deref() == Some(request.project_name.as_str()) {
            return Err(HookError::BuildTriggerFailure {
                project: request.project_name.clone(),
                message: "AccountLimitExceededException".to_string(),
            });
        }

        let mut triggers = self.triggers.lock().await;
        triggers.push(request.clone());
        Ok(format!("{}:build-{}", request.project_name, triggers.len()))
    }
}

fn config(token: &str) -> LambdaConfig {
    LambdaConfig {
        pattern: "$username-$reponame-$branch".to_string(),
        token: token.to_string(),
    }
}

fn project(name: &str) -> BuildProject {
    BuildProject {
        name: name.to_string(),
        source: ProjectSource {
            source_type: "BITBUCKET".to_string(),
            location: "https://bitbucket.org/acme/widgets.git".to_string(),
        },
        artifacts: ArtifactConfig::default(),
    }
}

fn branch(name: &str, hash: &str, created: bool) -> serde_json::Value {
    json!({
        "new": {"type": "branch", "name": name, "target": {"hash": hash}},
        "old": null,
        "created": created,
        "closed": false
    })
}

fn deleted_branch(name: &str) -> serde_json::Value {
    json!({
        "new": null,
        "old": {"type": "branch", "name": name, "target": {"hash": "dead"}},
        "created": false,
        "closed": true
    })
}

fn tag(name: &str, hash: &str) -> serde_json::Value {
    json!({
        "new": {"type": "tag", "name": name, "target": {"hash": hash}},
        "old": null,
        "created": true,
        "closed": false
    })
}

fn push_request(changes: serde_json::Value) -> WebhookRequest {
    let body = json!({
        "actor": {"username": "someone"},
        "push": {"changes": changes},
        "repository": {"name": "widgets", "owner": {"username": "acme"}}
    });

    WebhookRequest::default()
        .with_header("User-Agent", "Bitbucket-Webhooks/2.0")
        .with_header("X-Event-Key", "repo:push")
        .with_body(body.to_string())
}

fn body_json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn test_single_branch_push_triggers_one_build() {
    let build_system = MockBuildSystem::with_projects(vec![project("acme-widgets-main")]);
    let handler = WebhookHandler::new(build_system.clone(), &config("")).unwrap();

    let response = handler
        .handle(&push_request(json!([branch("main", "abc123", true)])), "req-1")
        .await
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.headers["Content-Type"], "application/json");
    assert_eq!(
        body_json(&response.body),
        json!({"action": "build", "correlation_id": "req-1", "buildId": ["acme-widgets-main:build-1"]})
    );

    let triggers = build_system.triggers().await;
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].source_version, "abc123");
    assert_eq!(triggers[0].env("GIT_BRANCH"), Some("main"));
    assert_eq!(triggers[0].env("GIT_COMMIT"), Some("abc123"));
    assert!(triggers[0].artifacts_override.is_none());
}

#[tokio::test]
async fn test_deletions_only_never_query_build_system() {
    let build_system = MockBuildSystem::with_projects(vec![project("acme-widgets-main")]);
    let handler = WebhookHandler::new(build_system.clone(), &config("")).unwrap();

    let result = handler
        .process(
            &push_request(json!([deleted_branch("main"), deleted_branch("dev")])),
            "req-2",
        )
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"action": "no-build", "correlation_id": "req-2", "buildId": []})
    );
    assert!(build_system.lookups().await.is_empty());
    assert!(build_system.triggers().await.is_empty());
}

#[tokio::test]
async fn test_no_matching_project_is_no_build() {
    let build_system = MockBuildSystem::with_projects(vec![project("acme-widgets-release")]);
    let handler = WebhookHandler::new(build_system.clone(), &config("")).unwrap();

    let response = handler
        .handle(&push_request(json!([branch("main", "abc123", false)])), "req-3")
        .await
        .unwrap();

    assert_eq!(body_json(&response.body)["action"], "no-build");
    assert_eq!(
        build_system.lookups().await,
        vec![vec!["acme-widgets-main".to_string()]]
    );
    assert!(build_system.triggers().await.is_empty());
}

#[tokio::test]
async fn test_wrong_token_is_forbidden_without_downstream_calls() {
    let build_system = MockBuildSystem::with_projects(vec![project("acme-widgets-main")]);
    let handler = WebhookHandler::new(build_system.clone(), &config("s3cret")).unwrap();

    let request = push_request(json!([branch("main", "abc123", true)])).with_query("token", "guess");
    let response = handler.handle(&request, "req-4").await.unwrap();

    assert_eq!(response.status_code, 403);
    assert_eq!(response.headers["Content-Type"], "text/plain");
    assert_eq!(response.body, "403 Forbidden");
    assert!(build_system.lookups().await.is_empty());
    assert!(build_system.triggers().await.is_empty());
}

#[tokio::test]
async fn test_matching_token_is_accepted() {
    let build_system = MockBuildSystem::with_projects(vec![project("acme-widgets-main")]);
    let handler = WebhookHandler::new(build_system.clone(), &config("s3cret")).unwrap();

    let request = push_request(json!([branch("main", "abc123", true)])).with_query("token", "s3cret");
    let response = handler.handle(&request, "req-5").await.unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(build_system.triggers().await.len(), 1);
}

#[tokio::test]
async fn test_empty_token_without_secret_is_authorized() {
    let build_system = MockBuildSystem::default();
    let handler = WebhookHandler::new(build_system, &config("")).unwrap();

    let request = push_request(json!([])).with_query("token", "");
    let response = handler.handle(&request, "req-6").await.unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(body_json(&response.body)["action"], "no-build");
}

#[tokio::test]
async fn test_s3_artifact_placeholder_replaced_with_ref_name() {
    let mut s3_project = project("acme-widgets-main");
    s3_project.artifacts = ArtifactConfig {
        artifact_type: ArtifactType::S3,
        location: Some("artifact-bucket".to_string()),
        name: Some("widgets-(tag).zip".to_string()),
        namespace_type: None,
        packaging: Some("ZIP".to_string()),
        path: None,
    };

    let build_system = MockBuildSystem::with_projects(vec![s3_project]);
    let handler = WebhookHandler::new(build_system.clone(), &config("")).unwrap();

    handler
        .process(&push_request(json!([branch("main", "abc123", true)])), "req-7")
        .await
        .unwrap();

    let triggers = build_system.triggers().await;
    let artifacts = triggers[0].artifacts_override.as_ref().unwrap();
    assert_eq!(artifacts.name, "widgets-main.zip");
    assert_eq!(artifacts.location, "artifact-bucket");
    assert_eq!(artifacts.namespace_type, "NONE");
    assert_eq!(artifacts.packaging, "ZIP");
    assert_eq!(artifacts.path, None);
}

#[tokio::test]
async fn test_duplicate_project_uses_first_change() {
    let build_system = MockBuildSystem::with_projects(vec![project("acme-widgets-main")]);
    let handler = WebhookHandler::new(build_system.clone(), &config("")).unwrap();

    let result = handler
        .process(
            &push_request(json!([branch("main", "first", false), branch("main", "second", false)])),
            "req-8",
        )
        .await
        .unwrap();

    assert_eq!(result.build_ids, vec!["acme-widgets-main:build-1".to_string()]);
    assert_eq!(
        build_system.lookups().await,
        vec![vec!["acme-widgets-main".to_string()]]
    );

    let triggers = build_system.triggers().await;
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].source_version, "first");
}

#[tokio::test]
async fn test_tags_build_the_all_tags_project() {
    let build_system = MockBuildSystem::with_projects(vec![project("acme-widgets-all_tags")]);
    let handler = WebhookHandler::new(build_system.clone(), &config("")).unwrap();

    handler
        .process(&push_request(json!([tag("v1.0", "aaa"), tag("v1.1", "bbb")])), "req-9")
        .await
        .unwrap();

    let triggers = build_system.triggers().await;
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].project_name, "acme-widgets-all_tags");
    assert_eq!(triggers[0].env("GIT_BRANCH"), Some("v1.0"));
    assert_eq!(triggers[0].source_version, "aaa");
}

#[tokio::test]
async fn test_batch_push_builds_each_project_in_lookup_order() {
    let build_system = MockBuildSystem::with_projects(vec![
        project("acme-widgets-dev"),
        project("acme-widgets-main"),
    ]);
    let handler = WebhookHandler::new(build_system.clone(), &config("")).unwrap();

    let result = handler
        .process(
            &push_request(json!([
                branch("main", "m1", false),
                deleted_branch("old"),
                branch("dev", "d1", false),
                branch("feature/x", "f1", true)
            ])),
            "req-10",
        )
        .await
        .unwrap();

    assert_eq!(
        result.build_ids,
        vec![
            "acme-widgets-dev:build-1".to_string(),
            "acme-widgets-main:build-2".to_string()
        ]
    );
    assert_eq!(
        build_system.lookups().await[0],
        vec![
            "acme-widgets-main".to_string(),
            "acme-widgets-dev".to_string(),
            "acme-widgets-feature_x".to_string()
        ]
    );
}

#[tokio::test]
async fn test_foreign_source_host_fails_before_any_trigger() {
    let mut github = project("acme-widgets-dev");
    github.source.location = "https://github.com/acme/widgets.git".to_string();

    let build_system = MockBuildSystem::with_projects(vec![project("acme-widgets-main"), github]);
    let handler = WebhookHandler::new(build_system.clone(), &config("")).unwrap();

    let err = handler
        .handle(
            &push_request(json!([branch("main", "m1", false), branch("dev", "d1", false)])),
            "req-11",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HookError::ConfigError { .. }));
    assert!(err.to_string().contains("github.com"));
    assert!(build_system.triggers().await.is_empty());
}

#[tokio::test]
async fn test_trigger_failure_is_fatal_and_keeps_earlier_builds() {
    let mut build_system = MockBuildSystem::with_projects(vec![
        project("acme-widgets-main"),
        project("acme-widgets-dev"),
    ]);
    build_system.fail_trigger_for = Some("acme-widgets-dev".to_string());
    let handler = WebhookHandler::new(build_system.clone(), &config("")).unwrap();

    let err = handler
        .process(
            &push_request(json!([branch("main", "m1", false), branch("dev", "d1", false)])),
            "req-12",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HookError::BuildTriggerFailure { .. }));
    assert_eq!(err.status_code(), 500);

    let triggers = build_system.triggers().await;
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].project_name, "acme-widgets-main");
}

#[tokio::test]
async fn test_unexpected_sender_is_bad_request() {
    let handler = WebhookHandler::new(MockBuildSystem::default(), &config("")).unwrap();

    let mut request = push_request(json!([branch("main", "m1", false)]));
    request = request.with_header("User-Agent", "GitHub-Hookshot/abc");
    let err = handler.handle(&request, "req-13").await.unwrap_err();
    assert!(matches!(err, HookError::BadRequest { .. }));

    let request = push_request(json!([])).with_header("X-Event-Key", "repo:fork");
    let err = handler.handle(&request, "req-14").await.unwrap_err();
    assert!(matches!(err, HookError::BadRequest { .. }));
}

#[tokio::test]
async fn test_payload_without_push_is_malformed() {
    let handler = WebhookHandler::new(MockBuildSystem::default(), &config("")).unwrap();

    let request = push_request(json!([]))
        .with_body(json!({"repository": {"name": "widgets", "owner": {"username": "acme"}}}).to_string());
    let err = handler.process(&request, "req-15").await.unwrap_err();
    assert!(matches!(err, HookError::MalformedPayload { .. }));

    let mut no_body = push_request(json!([]));
    no_body.body = None;
    let err = handler.process(&no_body, "req-16").await.unwrap_err();
    assert!(matches!(err, HookError::MalformedPayload { .. }));
}

#[test]
fn test_bad_pattern_fails_at_construction() {
    let bad = LambdaConfig {
        pattern: "$username-$branch".to_string(),
        token: String::new(),
    };
    let err = WebhookHandler::new(MockBuildSystem::default(), &bad)
        .err()
        .unwrap();
    assert!(matches!(err, HookError::ConfigError { .. }));
}
