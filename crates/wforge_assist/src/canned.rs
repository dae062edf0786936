//! Offline explanations for common widget build failures.

struct Canned {
    needles: &'static [&'static str],
    summary: &'static str,
}

const TABLE: &[Canned] = &[
    Canned {
        needles: &["cannot find name 'react'", "refers to a umd global"],
        summary: "The component uses JSX without React in scope. Add `import * as React from 'react';` \
                  (or import `createElement`) at the top of the component source.",
    },
    Canned {
        needles: &["missing script"],
        summary: "package.json lacks the script being run. Pluggable widgets expect build, dev, lint \
                  and release scripts that call pluggable-widgets-tools.",
    },
    Canned {
        needles: &["cannot find module"],
        summary: "A module could not be resolved. Install the package (npm install <name>) or fix the \
                  relative import path.",
    },
    Canned {
        needles: &["possibly 'undefined'", "possibly 'null'", "ts2531", "ts2532", "ts18048"],
        summary: "Strict null checks flagged a value that may be missing. Widget props such as \
                  EditableValue and DynamicValue are unavailable while loading; check `status` or use \
                  optional chaining before reading `value`.",
    },
    Canned {
        needles: &["is not assignable to type"],
        summary: "A value does not match the generated prop typings. Compare the component code \
                  against typings/*Props.d.ts, which are derived from the widget XML.",
    },
    Canned {
        needles: &["enoent", "no such file or directory"],
        summary: "A referenced file is missing. Regenerate the widget or check paths in package.xml \
                  and the widget XML.",
    },
    Canned {
        needles: &["command not found", "is not recognized as an internal or external command"],
        summary: "The package manager or build tool is not on PATH. Install Node.js and run the \
                  install step before building.",
    },
];

/// Best canned explanation for `diagnostic`, if any rule matches.
pub fn canned_explanation(diagnostic: &str) -> Option<&'static str> {
    let lowered = diagnostic.to_lowercase();
    TABLE
        .iter()
        .find(|c| c.needles.iter().any(|n| lowered.contains(n)))
        .map(|c| c.summary)
}

/// Generic advice when nothing in the table matches.
pub const FALLBACK_EXPLANATION: &str = "No known explanation for this failure. Re-run with -v to see \
                                        the full build output, or configure a language model for a \
                                        detailed diagnosis.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_matches_case_insensitively() {
        let text = "src/Badge.tsx(3,5): error TS2304: Cannot find name 'React'.";
        assert!(canned_explanation(text).unwrap().contains("import * as React"));
        assert!(canned_explanation("error TS18048: 'x' is possibly 'undefined'.")
            .unwrap()
            .contains("optional chaining"));
    }

    #[test]
    fn test_canned_no_match() {
        assert!(canned_explanation("segmentation fault").is_none());
    }
}
