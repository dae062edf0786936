//! Patterns and records shipped with every new nucleus.

use crate::pattern::{FixAction, FixPattern, Provenance};
use crate::records::{BestPractice, SdkApiNote, WidgetTemplate};

/// Builtin fix patterns. Ids are stable so existing stores can be topped up.
pub fn builtin_patterns() -> Vec<FixPattern> {
    vec![
        FixPattern::new(
            "builtin-react-import",
            "Cannot find name 'React'",
            FixAction::prepend("**/*.tsx", "import * as React from 'react';"),
        )
        .keywords(["react", "ts2304", "umd", "jsx"])
        .description("Add the missing React namespace import to TSX sources")
        .confidence(0.95),
        FixPattern::new(
            "builtin-react-umd-global",
            "refers to a UMD global",
            FixAction::prepend("**/*.tsx", "import * as React from 'react';"),
        )
        .keywords(["umd", "global", "react", "ts2686"])
        .description("Import React instead of relying on the UMD global")
        .confidence(0.9),
        FixPattern::new(
            "builtin-missing-build-script",
            "Missing script: \"build\"",
            FixAction::scripts([
                ("build", "pluggable-widgets-tools build:web"),
                ("dev", "pluggable-widgets-tools start:web"),
                ("lint", "pluggable-widgets-tools lint"),
                ("release", "pluggable-widgets-tools release:web"),
            ]),
        )
        .keywords(["missing", "script", "build"])
        .description("Add the standard pluggable-widgets-tools scripts")
        .confidence(0.95),
        FixPattern::new(
            "builtin-missing-dev-script",
            "Missing script: \"dev\"",
            FixAction::scripts([("dev", "pluggable-widgets-tools start:web")]),
        )
        .keywords(["missing", "script", "dev"])
        .description("Add the dev script")
        .confidence(0.9),
        FixPattern::new(
            "builtin-missing-module",
            "Cannot find module",
            FixAction::DependencyAdd {
                packages: Vec::new(),
                dev: false,
            },
        )
        .keywords(["module", "resolve", "ts2307"])
        .description("A dependency is missing from package.json")
        .confidence(0.8),
        FixPattern::new(
            "builtin-classnames-module",
            "Cannot find module 'classnames'",
            FixAction::DependencyAdd {
                packages: vec!["classnames".to_string()],
                dev: false,
            },
        )
        .keywords(["classnames", "module"])
        .description("Install classnames")
        .confidence(0.85),
        FixPattern::new(
            "builtin-possibly-undefined",
            "Object is possibly 'undefined'",
            FixAction::Manual {
                instructions: "Guard the value with optional chaining or check `status === \"available\"` before reading it".to_string(),
            },
        )
        .keywords(["possibly", "undefined", "ts2532", "ts18048"])
        .description("Null-safety violation that needs a code change")
        .confidence(0.6),
        FixPattern::new(
            "builtin-possibly-null",
            "Object is possibly 'null'",
            FixAction::Manual {
                instructions: "Add a null check or use the non-null assertion only where the value is guaranteed".to_string(),
            },
        )
        .keywords(["possibly", "null", "ts2531"])
        .description("Null-safety violation that needs a code change")
        .confidence(0.6),
        FixPattern::new(
            "builtin-editable-value",
            "Property 'value' does not exist on type 'EditableValue",
            FixAction::Manual {
                instructions: "Read `.value` only after checking the attribute status; use `.displayValue` for formatted text".to_string(),
            },
        )
        .keywords(["editablevalue", "value", "status"])
        .description("Attribute values are wrapped in EditableValue")
        .confidence(0.65),
    ]
    .into_iter()
    .map(|p| p.provenance(Provenance::Builtin))
    .collect()
}

pub fn builtin_templates() -> Vec<WidgetTemplate> {
    vec![
        WidgetTemplate::new("display-basic", "Basic display widget")
            .category("Display")
            .description("Renders attribute values read-only")
            .keywords(["display", "readonly", "label", "badge"])
            .property_types(["attribute", "string", "textTemplate"]),
        WidgetTemplate::new("input-editable", "Editable input widget")
            .category("Input")
            .description("Two-way bound attribute editor with validation feedback")
            .keywords(["input", "form", "editable", "rating"])
            .property_types(["attribute", "action", "boolean"]),
        WidgetTemplate::new("list-datasource", "Datasource list widget")
            .category("Data")
            .description("Iterates a list datasource with linked attributes and item actions")
            .keywords(["list", "datasource", "items", "grid"])
            .property_types(["datasource", "attribute", "widgets", "action"]),
    ]
}

pub fn builtin_sdk_apis() -> Vec<SdkApiNote> {
    vec![
        SdkApiNote::new(
            "EditableValue",
            "mendix",
            "props.value.status === ValueStatus.Available ? props.value.value : undefined",
        )
        .note("`value` is undefined until the status is available")
        .note("Use `displayValue` for formatted text and `setValue` to write"),
        SdkApiNote::new(
            "ActionValue",
            "mendix",
            "if (props.onClick?.canExecute) { props.onClick.execute(); }",
        )
        .note("Guard `execute()` with `canExecute`"),
        SdkApiNote::new("ListValue", "mendix", "props.items.items?.map(item => ...)")
            .note("Items are undefined while loading")
            .note("Read linked attributes with `attr.get(item)`"),
        SdkApiNote::new("DynamicValue", "mendix", "props.caption.value ?? \"\"")
            .note("Expressions and text templates resolve asynchronously"),
    ]
}

pub fn builtin_best_practices() -> Vec<BestPractice> {
    vec![
        BestPractice::new(
            "ts-react-import",
            "typescript",
            "Import React explicitly in every TSX file",
            "The widget toolchain does not inject the React global",
        ),
        BestPractice::new(
            "ts-unavailable-values",
            "typescript",
            "Treat every SDK value as possibly unavailable",
            "Values load asynchronously and start in the loading state",
        ),
        BestPractice::new(
            "build-scripts",
            "build",
            "Keep build, dev, lint and release scripts in package.json",
            "The build loop invokes the build script directly",
        ),
        BestPractice::new(
            "css-prefix",
            "styling",
            "Prefix CSS classes with the widget package name",
            "Widgets share one page stylesheet",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids_unique() {
        let patterns = builtin_patterns();
        let ids: HashSet<_> = patterns.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), patterns.len());
        assert!(patterns.iter().all(|p| p.provenance == Provenance::Builtin));
    }
}
