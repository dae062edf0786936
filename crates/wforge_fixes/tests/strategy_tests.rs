//! Strategy behaviour against real widget directories.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use tempfile::{tempdir, TempDir};
use wforge_assist::{AssistResult, DiagnosisHelper, TextCompletion};
use wforge_fixes::{
    FixChain, FixContext, FixStrategy, GenerativeStrategy, HeuristicStrategy, KnowledgeStrategy,
    NucleusStrategy,
};
use wforge_nucleus::{
    ConfidenceTier, FixAction, KnowledgeCache, KnowledgeEntry, PatternStore, Provenance,
    SharedNucleus,
};
use wforge_runner::{MockRunner, PackageRunner, RunConfig};
use wforge_spec::WidgetConfig;

const REACT_IMPORT: &str = "import * as React from 'react';";

mock! {
    pub Completion {}

    #[async_trait]
    impl TextCompletion for Completion {
        async fn complete(&self, system: &str, prompt: &str) -> AssistResult<String>;
    }
}

fn widget_dir() -> TempDir {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"name": "badge", "scripts": {}}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("src/Badge.tsx"),
        "export function Badge() {\n    return <span>1</span>;\n}\n",
    )
    .unwrap();
    dir
}

fn context(diagnostic: &str, dir: &Path) -> FixContext {
    FixContext::new(diagnostic, dir, WidgetConfig::new("Badge"))
}

fn badge_source(dir: &Path) -> String {
    fs::read_to_string(dir.join("src/Badge.tsx")).unwrap()
}

#[tokio::test]
async fn test_react_import_pattern_ranked_first_and_applied() {
    let dir = widget_dir();
    let nucleus = SharedNucleus::in_memory();
    let diagnostic = "src/Badge.tsx(2,12): error TS2304: Cannot find name 'React'.";

    let ranked = nucleus.match_fixes(diagnostic);
    assert_eq!(ranked[0].id, "builtin-react-import");

    let outcome = NucleusStrategy::new(nucleus.clone())
        .try_fix(&context(diagnostic, dir.path()))
        .await;

    assert!(outcome.applied);
    assert_eq!(outcome.pattern_id.as_deref(), Some("builtin-react-import"));
    assert!(badge_source(dir.path()).starts_with(REACT_IMPORT));
    assert_eq!(nucleus.get("builtin-react-import").unwrap().success_count, 1);
}

#[tokio::test]
async fn test_repeated_prepend_leaves_file_unchanged() {
    let dir = widget_dir();
    let strategy = NucleusStrategy::new(SharedNucleus::in_memory());
    let ctx = context("error TS2304: Cannot find name 'React'.", dir.path());

    assert!(strategy.try_fix(&ctx).await.applied);
    let once = badge_source(dir.path());

    assert!(!strategy.try_fix(&ctx).await.applied);
    assert_eq!(badge_source(dir.path()), once);
    assert_eq!(once.matches(REACT_IMPORT).count(), 1);
}

#[tokio::test]
async fn test_knowledge_entry_applied_and_promoted() {
    let dir = widget_dir();
    let nucleus = SharedNucleus::new(PatternStore::empty());

    let mut cache = KnowledgeCache::in_memory();
    cache
        .append(
            KnowledgeEntry::new(
                "classnames import",
                serde_json::to_string(&FixAction::prepend(
                    "**/*.tsx",
                    "import classNames from 'classnames';",
                ))
                .unwrap(),
            )
            .tags(["classnames", "ts2307"])
            .confidence(ConfidenceTier::High),
        )
        .unwrap();

    let strategy = KnowledgeStrategy::new(Arc::new(cache), nucleus.clone());
    let outcome = strategy
        .try_fix(&context(
            "error TS2307: Cannot find module 'classnames'",
            dir.path(),
        ))
        .await;

    assert!(outcome.applied);
    assert!(badge_source(dir.path()).starts_with("import classNames"));
    assert_eq!(nucleus.len(), 1);
    assert_eq!(nucleus.stats().count(Provenance::Learned), 1);
}

#[tokio::test]
async fn test_knowledge_prose_does_not_crowd_out_file_edit() {
    let dir = widget_dir();
    let nucleus = SharedNucleus::new(PatternStore::empty());

    let mut cache = KnowledgeCache::in_memory();
    for n in 0..6 {
        cache
            .append(
                KnowledgeEntry::new(
                    format!("classnames note {}", n),
                    "Cannot find module 'classnames': add classnames to dependencies and reinstall.",
                )
                .tags(["classnames", "module"])
                .confidence(ConfidenceTier::High),
            )
            .unwrap();
    }
    cache
        .append(
            KnowledgeEntry::new(
                "classnames import",
                r#"{"type":"file-edit","file":"**/*.tsx","search":"","replace":"import classNames from \"classnames\";"}"#,
            )
            .tags(["classnames"])
            .confidence(ConfidenceTier::Low),
        )
        .unwrap();

    let strategy = KnowledgeStrategy::new(Arc::new(cache), nucleus.clone());
    let outcome = strategy
        .try_fix(&context("Cannot find module 'classnames'", dir.path()))
        .await;

    assert!(outcome.applied);
    assert!(badge_source(dir.path()).starts_with("import classNames from \"classnames\";"));
    assert_eq!(nucleus.len(), 1);
}

#[tokio::test]
async fn test_heuristic_installs_missing_package() {
    let dir = widget_dir();
    let nucleus = SharedNucleus::new(PatternStore::empty());
    let runner = MockRunner::new();
    let shared: Arc<dyn PackageRunner> = Arc::new(runner.clone());

    let strategy = HeuristicStrategy::new(nucleus.clone()).with_runner(shared, Default::default());
    let outcome = strategy
        .try_fix(&context(
            "error TS2307: Cannot find module 'classnames' or its corresponding type declarations.",
            dir.path(),
        ))
        .await;

    assert!(outcome.applied);
    assert_eq!(runner.installs(), vec![vec!["classnames".to_string()]]);
    assert_eq!(nucleus.len(), 1);
}

#[tokio::test]
async fn test_heuristic_without_runner_only_reports() {
    let dir = widget_dir();
    let nucleus = SharedNucleus::new(PatternStore::empty());
    let outcome = HeuristicStrategy::new(nucleus.clone())
        .try_fix(&context("Cannot find module 'classnames'", dir.path()))
        .await;

    assert!(!outcome.applied);
    assert!(outcome.description.contains("npm install classnames"));
    assert!(nucleus.is_empty());
}

#[tokio::test]
async fn test_heuristic_adds_missing_scripts() {
    let dir = widget_dir();
    let nucleus = SharedNucleus::new(PatternStore::empty());
    let outcome = HeuristicStrategy::new(nucleus.clone())
        .try_fix(&context("npm ERR! Missing script: \"build\"", dir.path()))
        .await;

    assert!(outcome.applied);
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("package.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["scripts"]["build"], "pluggable-widgets-tools build:web");
    assert_eq!(manifest["scripts"]["dev"], "pluggable-widgets-tools start:web");
    assert_eq!(nucleus.len(), 1);
}

#[tokio::test]
async fn test_null_safety_never_applied() {
    let dir = widget_dir();
    let before = badge_source(dir.path());
    let outcome = HeuristicStrategy::new(SharedNucleus::in_memory())
        .try_fix(&context("error TS2532: Object is possibly 'undefined'.", dir.path()))
        .await;

    assert!(!outcome.applied);
    assert_eq!(badge_source(dir.path()), before);
}

#[tokio::test]
async fn test_generative_applies_plan_with_learn_candidate() {
    let dir = widget_dir();
    let mut completion = MockCompletion::new();
    completion.expect_complete().times(1).returning(|_, _| {
        Ok(r#"{"analysis": "JSX needs createElement",
               "fixes": [{"file": "src/Badge.tsx", "action": "prepend", "content": "import { createElement } from 'react';"},
                         {"file": "src/Nope.tsx", "action": "replace", "search": "a", "replace": "b"}],
               "description": "Import createElement"}"#
            .to_string())
    });

    let strategy = GenerativeStrategy::new(DiagnosisHelper::new(Arc::new(completion)));
    let outcome = strategy
        .try_fix(&context("error TS2304: Cannot find name 'createElement'.", dir.path()))
        .await;

    assert!(outcome.applied);
    assert_eq!(outcome.description, "Import createElement");
    assert!(badge_source(dir.path()).starts_with("import { createElement } from 'react';"));

    let candidate = outcome.learn_candidate.unwrap();
    assert_eq!(
        candidate.fix,
        FixAction::prepend("Badge.tsx", "import { createElement } from 'react';")
    );
}

#[tokio::test]
async fn test_generative_offline_not_applied() {
    let dir = widget_dir();
    let outcome = GenerativeStrategy::new(DiagnosisHelper::offline())
        .try_fix(&context("anything", dir.path()))
        .await;
    assert!(!outcome.applied);
}

#[tokio::test]
async fn test_chain_stops_at_first_applied() {
    let dir = widget_dir();
    let mut completion = MockCompletion::new();
    completion.expect_complete().never();

    let chain = FixChain::standard(
        SharedNucleus::in_memory(),
        Arc::new(KnowledgeCache::in_memory()),
        None,
        RunConfig::default(),
        DiagnosisHelper::new(Arc::new(completion)),
    );
    let outcome = chain
        .try_fix(&context("error TS2304: Cannot find name 'React'.", dir.path()))
        .await;

    assert!(outcome.applied);
    assert_eq!(outcome.strategy, "nucleus");
}

#[tokio::test]
async fn test_standard_chain_installs_with_configured_run_config() {
    let dir = widget_dir();
    let runner = MockRunner::new();
    let mut completion = MockCompletion::new();
    completion.expect_complete().never();

    let chain = FixChain::standard(
        SharedNucleus::new(PatternStore::empty()),
        Arc::new(KnowledgeCache::in_memory()),
        Some(Arc::new(runner.clone())),
        RunConfig::default().timeout(45),
        DiagnosisHelper::new(Arc::new(completion)),
    );
    let outcome = chain
        .try_fix(&context(
            "error TS2307: Cannot find module 'classnames' or its corresponding type declarations.",
            dir.path(),
        ))
        .await;

    assert!(outcome.applied);
    assert_eq!(outcome.strategy, "heuristic");
    let configs = runner.run_configs();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].timeout_seconds, 45);
}
