//! Documentation pattern registry — structural checks for markdown guides.
//!
//! Most rules here are whole-file checks: section presence and heading
//! structure cannot be expressed as a single-line regex.

use regex::Regex;

use super::{CheckMatch, Detection, PatternRegistry, PatternRule};
use crate::review::model::Severity;

pub fn registry() -> PatternRegistry {
    PatternRegistry {
        name: "documentation",
        rules: vec![
            PatternRule {
                id: "doc-missing-prerequisites",
                name: "missing Prerequisites section",
                severity: Severity::Low,
                description: "Sectioned guide has no Prerequisites section",
                fix: Some("Add a `## Prerequisites` section listing required tools and versions"),
                category: "documentation",
                detection: Detection::Check(check_missing_prerequisites),
            },
            PatternRule {
                id: "doc-todo-marker",
                name: "unresolved placeholder",
                severity: Severity::Low,
                description: "Unresolved TODO/FIXME placeholder in documentation",
                fix: Some("Resolve the placeholder or track it in the issue tracker"),
                category: "documentation",
                detection: Detection::Regex(
                    Regex::new(r"\b(?:TODO|FIXME|XXX)\b").expect("regex: todo marker"),
                ),
            },
            PatternRule {
                id: "doc-bare-url",
                name: "bare URL",
                severity: Severity::Info,
                description: "Bare URL outside markdown link syntax",
                fix: Some("Wrap the URL: [link text](url)"),
                category: "documentation",
                detection: Detection::Check(check_bare_url),
            },
            PatternRule {
                id: "doc-heading-skip",
                name: "skipped heading level",
                severity: Severity::Low,
                description: "Heading level jumps by more than one",
                fix: Some("Increase heading depth one level at a time"),
                category: "documentation",
                detection: Detection::Check(check_heading_skip),
            },
        ],
    }
}

// ─── Check rules ──────────────────────────────────────────────────────────────

/// Whole-file rule: a document that has section headings but no
/// `Prerequisites` section reports a single finding at line 1.
fn check_missing_prerequisites(content: &str) -> anyhow::Result<Vec<CheckMatch>> {
    let mut has_sections = false;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if let Some(title) = trimmed.strip_prefix("##") {
            has_sections = true;
            if title
                .trim_start_matches('#')
                .trim()
                .eq_ignore_ascii_case("prerequisites")
            {
                return Ok(vec![]);
            }
        }
    }

    if has_sections {
        Ok(vec![CheckMatch {
            message: "Guide has sections but no Prerequisites section".to_string(),
            line: 1,
        }])
    } else {
        Ok(vec![])
    }
}

/// Flag URLs that are not wrapped in markdown link or autolink syntax.
fn check_bare_url(content: &str) -> anyhow::Result<Vec<CheckMatch>> {
    let mut hits = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        for (pos, _) in line.match_indices("http") {
            let rest = &line[pos..];
            if !rest.starts_with("http://") && !rest.starts_with("https://") {
                continue;
            }
            // `](url)`, `<url>`, and backticked URLs are fine.
            let before = line[..pos].chars().next_back();
            if matches!(before, Some('(') | Some('<') | Some('`')) {
                continue;
            }
            hits.push(CheckMatch {
                message: "Bare URL — wrap it in [link text](url)".to_string(),
                line: (idx + 1) as u32,
            });
        }
    }
    Ok(hits)
}

/// Report headings whose level increases by more than one step, e.g. `#`
/// directly followed by `###`.
fn check_heading_skip(content: &str) -> anyhow::Result<Vec<CheckMatch>> {
    let mut hits = Vec::new();
    let mut prev_level: Option<usize> = None;

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        let level = trimmed.bytes().take_while(|&b| b == b'#').count();
        if level == 0 || level > 6 || !trimmed[level..].starts_with(' ') {
            continue;
        }
        if let Some(prev) = prev_level {
            if level > prev + 1 {
                hits.push(CheckMatch {
                    message: format!(
                        "Heading level jumps from {} to {} — increase one level at a time",
                        prev, level
                    ),
                    line: (idx + 1) as u32,
                });
            }
        }
        prev_level = Some(level);
    }
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::evaluate;

    #[test]
    fn missing_prerequisites_reports_line_one() {
        let content = "# Deploy guide\n\n## Setup\n\ntext\n\n## Usage\n\nmore\n";
        let findings = evaluate(&registry(), content, "guide.md");
        let hit = findings
            .iter()
            .find(|f| f.rule == "doc-missing-prerequisites")
            .expect("rule should fire");
        assert_eq!(hit.line, 1);
    }

    #[test]
    fn prerequisites_section_satisfies_rule() {
        let content = "# Guide\n\n## Prerequisites\n\n- rust\n\n## Setup\n\ntext\n";
        let findings = evaluate(&registry(), content, "guide.md");
        assert!(!findings.iter().any(|f| f.rule == "doc-missing-prerequisites"));
    }

    #[test]
    fn unsectioned_notes_are_exempt() {
        let content = "Just a paragraph of notes.\nNo headings here.\n";
        let findings = evaluate(&registry(), content, "notes.md");
        assert!(!findings.iter().any(|f| f.rule == "doc-missing-prerequisites"));
    }

    #[test]
    fn bare_url_flagged_but_linked_url_is_not() {
        let content = "See https://docs.example.org for details.\nOr [docs](https://docs.example.org).\n";
        let findings = evaluate(&registry(), content, "readme.md");
        let hits: Vec<_> = findings
            .iter()
            .filter(|f| f.rule == "doc-bare-url")
            .map(|f| f.line)
            .collect();
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn heading_skip_detected() {
        let content = "# Title\n\n### Deep dive\n";
        let findings = evaluate(&registry(), content, "doc.md");
        let hit = findings
            .iter()
            .find(|f| f.rule == "doc-heading-skip")
            .expect("skip should fire");
        assert_eq!(hit.line, 3);
    }
}
