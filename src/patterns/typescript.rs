//! TypeScript/JavaScript pattern registry — type-safety escapes and leftover
//! debugging constructs.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{line_of_offset, CheckMatch, Detection, PatternRegistry, PatternRule};
use crate::review::model::Severity;

pub fn registry() -> PatternRegistry {
    PatternRegistry {
        name: "typescript",
        rules: vec![
            PatternRule {
                id: "ts-explicit-any",
                name: "explicit any",
                severity: Severity::Medium,
                description: "Explicit `any` disables type checking for this value",
                fix: Some("Replace `any` with a concrete type or `unknown`"),
                category: "typescript",
                detection: Detection::Regex(
                    Regex::new(r":\s*any\b").expect("regex: explicit any"),
                ),
            },
            PatternRule {
                id: "ts-suppression-comment",
                name: "ts-ignore comment",
                severity: Severity::Medium,
                description: "@ts-ignore/@ts-nocheck hides type errors instead of fixing them",
                fix: Some("Fix the underlying type error, or use @ts-expect-error with a reason"),
                category: "typescript",
                detection: Detection::Regex(
                    Regex::new(r"@ts-(?:ignore|nocheck)").expect("regex: ts suppression"),
                ),
            },
            PatternRule {
                id: "ts-console-log",
                name: "console logging",
                severity: Severity::Low,
                description: "console.log left in code",
                fix: Some("Remove it or route through the project logger"),
                category: "typescript",
                detection: Detection::Regex(
                    Regex::new(r"\bconsole\.(?:log|debug|info)\s*\(")
                        .expect("regex: console log"),
                ),
            },
            PatternRule {
                id: "ts-loose-equality",
                name: "loose equality",
                severity: Severity::Low,
                description: "Loose equality coerces types",
                fix: Some("Use === / !=="),
                category: "typescript",
                detection: Detection::Check(check_loose_equality),
            },
            PatternRule {
                id: "ts-var-declaration",
                name: "var declaration",
                severity: Severity::Low,
                description: "`var` is function-scoped and hoisted",
                fix: Some("Use const or let"),
                category: "typescript",
                detection: Detection::Regex(
                    Regex::new(r"\bvar\s+[A-Za-z_$]").expect("regex: var declaration"),
                ),
            },
            PatternRule {
                id: "ts-non-null-assertion",
                name: "non-null assertion",
                severity: Severity::Info,
                description: "Non-null assertion bypasses null checking",
                fix: Some("Narrow the type with a runtime check"),
                category: "typescript",
                detection: Detection::Regex(
                    Regex::new(r"[A-Za-z0-9_\)\]]!\.").expect("regex: non-null assertion"),
                ),
            },
            PatternRule {
                id: "ts-empty-catch",
                name: "empty catch block",
                severity: Severity::Medium,
                description: "Empty catch block swallows errors silently",
                fix: Some("Handle the error or at least log it"),
                category: "typescript",
                detection: Detection::Check(check_empty_catch),
            },
        ],
    }
}

// ─── Check rules ──────────────────────────────────────────────────────────────

/// Find `==` / `!=` that are not part of `===` / `!==` or a compound operator.
///
/// Lookaround-free by hand: the regex crate cannot express "== not followed
/// by =", so the neighborhood test lives here.
fn check_loose_equality(content: &str) -> anyhow::Result<Vec<CheckMatch>> {
    let mut hits = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let bytes = line.as_bytes();
        let mut i = 0;
        while i + 1 < bytes.len() {
            let pair = &bytes[i..i + 2];
            if pair == b"==" || pair == b"!=" {
                let before = if i > 0 { bytes[i - 1] } else { b' ' };
                let after = if i + 2 < bytes.len() { bytes[i + 2] } else { b' ' };
                let strict = after == b'=' || matches!(before, b'=' | b'!' | b'<' | b'>');
                if !strict {
                    hits.push(CheckMatch {
                        message: "Loose equality coerces types before comparing".to_string(),
                        line: (idx + 1) as u32,
                    });
                }
                // Skip past the operator (and a trailing `=` when strict).
                i += if after == b'=' { 3 } else { 2 };
                continue;
            }
            i += 1;
        }
    }
    Ok(hits)
}

static EMPTY_CATCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"catch\s*(?:\([^)]*\))?\s*\{\s*\}").expect("regex: empty catch")
});

/// Cross-line structural check: `catch (...) { }` with nothing but whitespace
/// in the body. Runs on the whole content so the body may span lines.
fn check_empty_catch(content: &str) -> anyhow::Result<Vec<CheckMatch>> {
    Ok(EMPTY_CATCH
        .find_iter(content)
        .map(|m| CheckMatch {
            message: "Empty catch block swallows errors silently".to_string(),
            line: line_of_offset(content, m.start()),
        })
        .collect())
}
