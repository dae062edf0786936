//! Behavioural tests for ranking and learning in the nucleus.

use tempfile::tempdir;
use wforge_nucleus::{
    FixAction, FixPattern, LearnOutcome, PatternStore, Provenance, SharedNucleus,
};

fn manual(text: &str) -> FixAction {
    FixAction::Manual {
        instructions: text.to_string(),
    }
}

#[test]
fn confidence_moves_monotonically_and_stays_bounded() {
    let mut store = PatternStore::in_memory();
    let id = "builtin-missing-module";
    let mut previous = store.get(id).unwrap().confidence;

    for _ in 0..15 {
        let next = store.record_outcome(id, true).unwrap();
        assert!(next >= previous);
        assert!(next <= 1.0);
        previous = next;
    }
    assert!((previous - 1.0).abs() < 1e-9);

    for _ in 0..15 {
        let next = store.record_outcome(id, false).unwrap();
        assert!(next <= previous);
        assert!(next >= 0.1);
        previous = next;
    }
    assert!((previous - 0.1).abs() < 1e-9);
    assert_eq!(store.len(), wforge_nucleus::builtin::builtin_patterns().len());
}

#[test]
fn failed_novel_fix_is_not_promoted() {
    let mut store = PatternStore::in_memory();
    let before = store.len();

    let outcome = store
        .learn(
            "Webpack: Unexpected character '#' in Gallery.scss",
            "strip hash",
            manual("strip"),
            false,
        )
        .unwrap();

    assert_eq!(outcome, LearnOutcome::Discarded);
    assert_eq!(store.len(), before);
}

#[test]
fn equal_scores_keep_insertion_order() {
    let mut store = PatternStore::empty();
    for id in ["first", "second", "third"] {
        store
            .add_pattern(
                FixPattern::new(id, "Duplicate identifier", manual(id))
                    .confidence(0.8)
                    .provenance(Provenance::User),
            )
            .unwrap();
    }

    let ranked = store.match_fixes("error TS2300: Duplicate identifier 'props'.");
    let ids: Vec<_> = ranked.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}

#[test]
fn react_import_pattern_ranks_first() {
    let store = PatternStore::in_memory();
    let diagnostic = "ERROR in src/Badge.tsx\nsrc/Badge.tsx(5,12): error TS2304: Cannot find name 'React'.";

    let ranked = store.ranked_matches(diagnostic);
    assert_eq!(ranked[0].pattern.id, "builtin-react-import");
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(ranked.iter().all(|m| m.score > 0.0));
}

#[test]
fn learning_on_empty_store_creates_learned_pattern() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nucleus.json");
    let mut store = PatternStore::empty().with_path(&path);

    let outcome = store
        .learn(
            "error TS2339: Property 'displayValue' does not exist on type 'ListValue'.",
            "read displayValue from the linked attribute",
            FixAction::file_edit("*.tsx", "props.items.displayValue", "props.label.get(item).displayValue"),
            true,
        )
        .unwrap();

    let id = match outcome {
        LearnOutcome::Created(id) => id,
        other => panic!("expected a new pattern, got {:?}", other),
    };

    assert_eq!(store.len(), 1);
    let pattern = store.get(&id).unwrap();
    assert_eq!(pattern.provenance, Provenance::Learned);
    assert!((pattern.confidence - 0.7).abs() < 1e-9);
    assert_eq!(pattern.success_count, 1);
    assert_eq!(
        pattern.error_pattern,
        "error TS2339: Property 'displayValue' does not exist on type 'ListValue'."
    );

    let reloaded = PatternStore::load(&path);
    assert!(reloaded.get(&id).is_some());
}

#[test]
fn shared_handle_sees_learned_patterns() {
    let nucleus = SharedNucleus::new(PatternStore::empty());
    let clone = nucleus.clone();

    clone
        .learn("Module not found: Can't resolve './Badge.css'", "create css", manual("css"), true)
        .unwrap();

    assert_eq!(nucleus.len(), 1);
    assert_eq!(nucleus.match_fixes("Module not found: Can't resolve './Badge.css'").len(), 1);
}

#[test]
fn banner_lines_do_not_merge_unrelated_errors() {
    let banner = "\n> badge@1.0.0 build\n> pluggable-widgets-tools build:web\n\n";
    let react = format!("{}src/Badge.tsx(7,9): error TS2304: Cannot find name 'React'.\n", banner);
    let display = format!(
        "{}src/Badge.tsx(12,30): error TS2339: Property 'displayValue' does not exist on type 'ListValue'.\n",
        banner
    );
    let mut store = PatternStore::empty();

    let first = match store.learn(&react, "import React", manual("import React"), true).unwrap() {
        LearnOutcome::Created(id) => id,
        other => panic!("expected a new pattern, got {:?}", other),
    };
    let second = store
        .learn(&display, "read displayValue from the attribute", manual("use get(item)"), true)
        .unwrap();

    assert!(matches!(second, LearnOutcome::Created(_)));
    assert_eq!(store.len(), 2);

    let pattern = store.get(&first).unwrap();
    assert_eq!(pattern.error_pattern, "error TS2304: Cannot find name 'React'.");
    assert!(!pattern.keywords.iter().any(|k| k == "badge" || k == "pluggable-widgets-tools"));

    let fixes = store.match_fixes(&display);
    assert!(fixes.iter().all(|p| p.id != first));
}
